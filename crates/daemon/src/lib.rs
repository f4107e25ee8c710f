#![forbid(unsafe_code)]

//! Control-plane daemon: admits jobs and sessions over HTTP.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod service;
pub mod sweeper;
