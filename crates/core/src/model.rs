//! Jobs, sessions and their enums.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A globally unique identifier (ULID as string by convention).
pub type Id = String;

/// Execution language of a job's code payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// CPython.
    Python,
    /// Node.js.
    Node,
}

impl Language {
    /// Every supported language, in the order reported to callers.
    pub const ALL: [Language; 2] = [Language::Python, Language::Node];

    /// Canonical wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Node => "node",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    /// Case-insensitive; accepts the runtime aliases executors commonly send.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "python3" | "py" => Ok(Language::Python),
            "node" | "nodejs" | "javascript" | "js" => Ok(Language::Node),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

/// Returned when a language name is not in the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0}")]
pub struct UnknownLanguage(pub String);

/// Runtime status for a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Admitted, waiting for an executor.
    Pending,
    /// Claimed by an executor.
    Running,
    /// Finished successfully.
    Done,
    /// Finished with an error.
    Failed,
}

/// An admitted unit of asynchronous work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Opaque identifier.
    pub id: Id,
    /// Owning tenant.
    pub tenant_id: String,
    /// Agent acting on behalf of the tenant.
    pub agent_id: String,
    /// Policy the work is admitted under.
    pub policy_id: String,
    /// Execution language.
    pub language: Language,
    /// Opaque payload, interpreted by the downstream executor. Handed off
    /// and cleared from the queue on claim.
    pub code: String,
    /// Current status.
    pub status: JobStatus,
    /// Admission time.
    pub created_at: DateTime<Utc>,
}

/// Liveness of a session as reported to callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Still live.
    Active,
    /// Past `expiresAt`.
    Expired,
}

/// A time-bounded registration of an agent's activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Opaque identifier.
    pub id: Id,
    /// Owning tenant.
    pub tenant_id: String,
    /// Agent acting on behalf of the tenant.
    pub agent_id: String,
    /// Policy the work is admitted under.
    pub policy_id: String,
    /// Lifetime in seconds.
    pub ttl_seconds: u64,
    /// Admission time.
    pub created_at: DateTime<Utc>,
    /// `created_at + ttl_seconds`.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session is usable only while `now < expires_at`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Status as of `now`.
    pub fn status(&self, now: DateTime<Utc>) -> SessionStatus {
        if self.is_live(now) {
            SessionStatus::Active
        } else {
            SessionStatus::Expired
        }
    }
}
