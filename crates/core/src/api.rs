//! Request/response bodies exchanged with the daemon.
//!
//! Field names are camelCase on the wire. Create requests also accept the
//! snake_case spellings older clients send.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Id, Job, JobStatus, Language, Session, SessionStatus};

/// `POST /jobs` body.
///
/// Every field is optional at the serde level so that missing fields surface
/// as field-level validation errors instead of opaque decode failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobCreateRequest {
    /// Opaque identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Owning tenant.
    #[serde(alias = "tenant_id")]
    pub tenant_id: Option<String>,
    /// Agent acting on behalf of the tenant.
    #[serde(alias = "agent_id")]
    pub agent_id: Option<String>,
    /// Policy the work is admitted under.
    #[serde(alias = "policy_id")]
    pub policy_id: Option<String>,
    /// Execution language.
    pub language: Option<String>,
    /// Source payload.
    pub code: Option<String>,
}

/// `202 Accepted` body for `POST /jobs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAccepted {
    /// Opaque identifier.
    pub id: Id,
    /// Current status.
    pub status: JobStatus,
}

/// `GET /jobs/{id}` body. The code payload is not echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
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
    /// Current status.
    pub status: JobStatus,
    /// Admission time.
    pub created_at: DateTime<Utc>,
}

impl From<&Job> for JobView {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            tenant_id: job.tenant_id.clone(),
            agent_id: job.agent_id.clone(),
            policy_id: job.policy_id.clone(),
            language: job.language,
            status: job.status,
            created_at: job.created_at,
        }
    }
}

/// `POST /sessions` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionCreateRequest {
    /// Opaque identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Owning tenant.
    #[serde(alias = "tenant_id")]
    pub tenant_id: Option<String>,
    /// Agent acting on behalf of the tenant.
    #[serde(alias = "agent_id")]
    pub agent_id: Option<String>,
    /// Policy the work is admitted under.
    #[serde(alias = "policy_id")]
    pub policy_id: Option<String>,
    /// Lifetime in seconds.
    #[serde(alias = "ttl_seconds")]
    pub ttl_seconds: Option<i64>,
}

/// `201 Created` body for `POST /sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    /// Opaque identifier.
    pub id: Id,
    /// Instant after which the session is gone.
    pub expires_at: DateTime<Utc>,
    /// Current status.
    pub status: SessionStatus,
}

/// `GET /sessions/{id}` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
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
    /// Instant after which the session is gone.
    pub expires_at: DateTime<Utc>,
    /// Current status.
    pub status: SessionStatus,
}

impl SessionView {
    /// View of `session` as of `now`.
    pub fn at(session: &Session, now: DateTime<Utc>) -> Self {
        Self {
            id: session.id.clone(),
            tenant_id: session.tenant_id.clone(),
            agent_id: session.agent_id.clone(),
            policy_id: session.policy_id.clone(),
            ttl_seconds: session.ttl_seconds,
            created_at: session.created_at,
            expires_at: session.expires_at,
            status: session.status(now),
        }
    }
}

/// Machine-readable error code carried in every error body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Request failed validation.
    InvalidInput,
    /// Missing or wrong bearer token.
    Unauthorized,
    /// No such resource.
    NotFound,
    /// Id already in use.
    Conflict,
    /// Unexpected server fault.
    Internal,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Offending request field, for validation errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
