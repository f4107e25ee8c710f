//! Admission-time checks for job and session requests.

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use crate::api::{JobCreateRequest, SessionCreateRequest};
use crate::model::{Id, Job, JobStatus, Language, Session};

/// Why a create request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required field absent or blank.
    #[error("{0} is required and must not be empty")]
    MissingField(&'static str),
    /// `id` supplied but blank.
    #[error("id must not be blank when supplied")]
    BlankId,
    /// `language` outside the supported set.
    #[error("unsupported language '{0}' (supported: {supported})", supported = supported_languages())]
    UnsupportedLanguage(String),
    /// `ttlSeconds` of zero or less.
    #[error("ttlSeconds must be greater than zero (got {0})")]
    NonPositiveTtl(i64),
    /// `ttlSeconds` too large to turn into an expiry time.
    #[error("ttlSeconds {0} is out of range")]
    TtlOutOfRange(i64),
    /// Body was not a decodable JSON object.
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

impl ValidationError {
    /// Wire name of the offending field, if the error is about one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingField(f) => Some(*f),
            ValidationError::BlankId => Some("id"),
            ValidationError::UnsupportedLanguage(_) => Some("language"),
            ValidationError::NonPositiveTtl(_) | ValidationError::TtlOutOfRange(_) => {
                Some("ttlSeconds")
            }
            ValidationError::MalformedBody(_) => None,
        }
    }
}

/// A job request that passed validation. Not yet admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidJob {
    /// Caller-supplied id, if any.
    pub id: Option<Id>,
    /// Owning tenant.
    pub tenant_id: String,
    /// Agent acting on behalf of the tenant.
    pub agent_id: String,
    /// Policy the work is admitted under.
    pub policy_id: String,
    /// Execution language.
    pub language: Language,
    /// Source payload.
    pub code: String,
}

impl ValidJob {
    /// Builds the pending job under `id`.
    pub fn into_job(self, id: Id, now: DateTime<Utc>) -> Job {
        Job {
            id,
            tenant_id: self.tenant_id,
            agent_id: self.agent_id,
            policy_id: self.policy_id,
            language: self.language,
            code: self.code,
            status: JobStatus::Pending,
            created_at: now,
        }
    }
}

/// A session request that passed validation. Not yet admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSession {
    /// Caller-supplied id, if any.
    pub id: Option<Id>,
    /// Owning tenant.
    pub tenant_id: String,
    /// Agent acting on behalf of the tenant.
    pub agent_id: String,
    /// Policy the work is admitted under.
    pub policy_id: String,
    /// Lifetime in seconds.
    pub ttl_seconds: u64,
}

impl ValidSession {
    /// Stamps the session with `now` and derives `expires_at`.
    pub fn into_session(self, id: Id, now: DateTime<Utc>) -> Result<Session, ValidationError> {
        let ttl = self.ttl_seconds as i64;
        let expires_at = TimeDelta::try_seconds(ttl)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or(ValidationError::TtlOutOfRange(ttl))?;
        Ok(Session {
            id,
            tenant_id: self.tenant_id,
            agent_id: self.agent_id,
            policy_id: self.policy_id,
            ttl_seconds: self.ttl_seconds,
            created_at: now,
            expires_at,
        })
    }
}

/// Validate a `POST /jobs` body. Fields are checked in wire order and the
/// first failure is reported.
pub fn validate_job(req: &JobCreateRequest) -> Result<ValidJob, ValidationError> {
    let id = caller_id(req.id.as_deref())?;
    let tenant_id = required("tenantId", req.tenant_id.as_deref())?;
    let agent_id = required("agentId", req.agent_id.as_deref())?;
    let policy_id = required("policyId", req.policy_id.as_deref())?;
    let language_raw = required("language", req.language.as_deref())?;
    let language: Language = language_raw
        .parse()
        .map_err(|_| ValidationError::UnsupportedLanguage(language_raw))?;

    // The payload is opaque: keep it byte-for-byte, only reject empty ones.
    let code = match req.code.as_deref() {
        Some(c) if !c.trim().is_empty() => c.to_string(),
        _ => return Err(ValidationError::MissingField("code")),
    };

    Ok(ValidJob {
        id,
        tenant_id,
        agent_id,
        policy_id,
        language,
        code,
    })
}

/// Validate a `POST /sessions` body.
pub fn validate_session(req: &SessionCreateRequest) -> Result<ValidSession, ValidationError> {
    let id = caller_id(req.id.as_deref())?;
    let tenant_id = required("tenantId", req.tenant_id.as_deref())?;
    let agent_id = required("agentId", req.agent_id.as_deref())?;
    let policy_id = required("policyId", req.policy_id.as_deref())?;
    let ttl = req
        .ttl_seconds
        .ok_or(ValidationError::MissingField("ttlSeconds"))?;
    if ttl <= 0 {
        return Err(ValidationError::NonPositiveTtl(ttl));
    }
    if TimeDelta::try_seconds(ttl).is_none() {
        return Err(ValidationError::TtlOutOfRange(ttl));
    }

    Ok(ValidSession {
        id,
        tenant_id,
        agent_id,
        policy_id,
        ttl_seconds: ttl as u64,
    })
}

fn supported_languages() -> String {
    Language::ALL.map(Language::as_str).join(", ")
}

fn required(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn caller_id(value: Option<&str>) -> Result<Option<Id>, ValidationError> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Err(ValidationError::BlankId),
        Some(v) => Ok(Some(v.trim().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_that_overflows_the_calendar_is_rejected_at_admission() {
        let valid = ValidSession {
            id: None,
            tenant_id: "t".into(),
            agent_id: "a".into(),
            policy_id: "p".into(),
            ttl_seconds: 9_000_000_000_000,
        };
        let err = valid.into_session("s".into(), Utc::now()).unwrap_err();
        assert_eq!(err.field(), Some("ttlSeconds"));
    }
}
