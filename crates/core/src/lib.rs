#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared models and in-memory state for the control plane.

pub mod api;
pub mod model;
pub mod queue;
pub mod registry;
pub mod time;
pub mod validation;

mod util;

pub use queue::{JobQueue, QueueError};
pub use registry::{RegistryError, SessionRegistry};
pub use time::{Clock, ManualClock, SystemClock};
pub use util::new_id;
