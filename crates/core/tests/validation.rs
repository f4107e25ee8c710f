use chrono::{Duration, Utc};
use control_plane_core::api::{JobCreateRequest, SessionCreateRequest};
use control_plane_core::model::{JobStatus, Language};
use control_plane_core::validation::{validate_job, validate_session, ValidationError};

fn job_request() -> JobCreateRequest {
    JobCreateRequest {
        id: None,
        tenant_id: Some("tenant-1".into()),
        agent_id: Some("agent-1".into()),
        policy_id: Some("policy-1".into()),
        language: Some("python".into()),
        code: Some("print('ok')".into()),
    }
}

fn session_request() -> SessionCreateRequest {
    SessionCreateRequest {
        id: None,
        tenant_id: Some("tenant-1".into()),
        agent_id: Some("agent-1".into()),
        policy_id: Some("policy-1".into()),
        ttl_seconds: Some(60),
    }
}

#[test]
fn accepts_valid_job() {
    let valid = validate_job(&job_request()).unwrap();
    assert_eq!(valid.language, Language::Python);
    assert_eq!(valid.id, None);

    let now = Utc::now();
    let job = valid.into_job("job-x".into(), now);
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.created_at, now);
    assert_eq!(job.code, "print('ok')");
}

#[test]
fn reports_each_missing_job_field() {
    for field in ["tenantId", "agentId", "policyId", "language", "code"] {
        let mut req = job_request();
        match field {
            "tenantId" => req.tenant_id = None,
            "agentId" => req.agent_id = Some("   ".into()),
            "policyId" => req.policy_id = Some(String::new()),
            "language" => req.language = None,
            _ => req.code = Some("".into()),
        }
        let err = validate_job(&req).unwrap_err();
        assert_eq!(err, ValidationError::MissingField(field), "field {field}");
        assert_eq!(err.field(), Some(field));
    }
}

#[test]
fn rejects_unsupported_language() {
    let mut req = job_request();
    req.language = Some("fortran".into());
    let err = validate_job(&req).unwrap_err();
    assert_eq!(err, ValidationError::UnsupportedLanguage("fortran".into()));
    assert_eq!(err.field(), Some("language"));
    assert_eq!(
        err.to_string(),
        "unsupported language 'fortran' (supported: python, node)"
    );
}

#[test]
fn trims_identifiers_but_not_code() {
    let mut req = job_request();
    req.id = Some("  job-7 ".into());
    req.tenant_id = Some(" tenant-1 ".into());
    req.code = Some("  x = 1\n".into());
    let valid = validate_job(&req).unwrap();
    assert_eq!(valid.id.as_deref(), Some("job-7"));
    assert_eq!(valid.tenant_id, "tenant-1");
    assert_eq!(valid.code, "  x = 1\n");
}

#[test]
fn rejects_blank_caller_id() {
    let mut req = job_request();
    req.id = Some(" ".into());
    assert_eq!(validate_job(&req).unwrap_err(), ValidationError::BlankId);
}

#[test]
fn accepts_valid_session_and_derives_expiry() {
    let valid = validate_session(&session_request()).unwrap();
    assert_eq!(valid.ttl_seconds, 60);

    let now = Utc::now();
    let session = valid.into_session("s-1".into(), now).unwrap();
    assert_eq!(session.expires_at, now + Duration::seconds(60));
    assert!(session.is_live(now));
}

#[test]
fn rejects_non_positive_ttl() {
    for ttl in [0, -1, i64::MIN] {
        let mut req = session_request();
        req.ttl_seconds = Some(ttl);
        assert_eq!(
            validate_session(&req).unwrap_err(),
            ValidationError::NonPositiveTtl(ttl)
        );
    }
}

#[test]
fn rejects_missing_ttl_and_ids() {
    let mut req = session_request();
    req.ttl_seconds = None;
    assert_eq!(
        validate_session(&req).unwrap_err(),
        ValidationError::MissingField("ttlSeconds")
    );

    let mut req = session_request();
    req.policy_id = None;
    assert_eq!(
        validate_session(&req).unwrap_err(),
        ValidationError::MissingField("policyId")
    );
}

#[test]
fn rejects_absurd_ttl() {
    let mut req = session_request();
    req.ttl_seconds = Some(i64::MAX);
    assert_eq!(
        validate_session(&req).unwrap_err(),
        ValidationError::TtlOutOfRange(i64::MAX)
    );
}
