use std::sync::Arc;

use control_plane_core::{
    api::{JobAccepted, JobCreateRequest, JobView, SessionCreateRequest, SessionCreated, SessionView},
    model::{JobStatus, SessionStatus},
    new_id,
    validation::{validate_job, validate_session},
    Clock, JobQueue, QueueError, SessionRegistry,
};
use tracing::{debug, info};

use crate::error::ApiError;

/// Admission logic shared by every handler.
///
/// Validation runs before any shared state is touched, so a rejected request
/// leaves the queue and registry exactly as they were.
pub struct ControlPlane {
    queue: JobQueue,
    sessions: SessionRegistry,
    clock: Arc<dyn Clock>,
}

impl ControlPlane {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            queue: JobQueue::new(),
            sessions: SessionRegistry::new(),
            clock,
        }
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn admit_job(&self, req: &JobCreateRequest) -> Result<JobAccepted, ApiError> {
        let valid = validate_job(req)?;
        let caller_supplied = valid.id.is_some();
        let id = valid.id.clone().unwrap_or_else(new_id);
        let job = valid.into_job(id.clone(), self.clock.now());
        let (tenant_id, language) = (job.tenant_id.clone(), job.language);

        match self.queue.enqueue(job) {
            Ok(()) => {}
            Err(QueueError::DuplicateId(dup)) if !caller_supplied => {
                return Err(ApiError::Internal(format!("generated job id collided: {dup}")));
            }
            Err(e) => return Err(e.into()),
        }

        info!(job_id = %id, tenant_id = %tenant_id, language = %language, "job accepted");
        Ok(JobAccepted {
            id,
            status: JobStatus::Pending,
        })
    }

    pub fn admit_session(&self, req: &SessionCreateRequest) -> Result<SessionCreated, ApiError> {
        let valid = validate_session(req)?;
        let caller_supplied = valid.id.is_some();
        let id = valid.id.clone().unwrap_or_else(new_id);
        let now = self.clock.now();
        let session = valid.into_session(id.clone(), now)?;
        let (tenant_id, expires_at) = (session.tenant_id.clone(), session.expires_at);

        if let Err(e) = self.sessions.insert(session, now) {
            if !caller_supplied {
                return Err(ApiError::Internal(format!("generated session id collided: {e}")));
            }
            return Err(e.into());
        }

        info!(session_id = %id, tenant_id = %tenant_id, %expires_at, "session created");
        Ok(SessionCreated {
            id,
            expires_at,
            status: SessionStatus::Active,
        })
    }

    pub fn job(&self, id: &str) -> Result<JobView, ApiError> {
        self.queue
            .get(id)
            .map(|job| JobView::from(&job))
            .ok_or_else(|| ApiError::NotFound(format!("job {id}")))
    }

    /// Expired sessions read as absent even before the sweeper removes them.
    pub fn session(&self, id: &str) -> Result<SessionView, ApiError> {
        let now = self.clock.now();
        self.sessions
            .get(id, now)
            .map(|s| SessionView::at(&s, now))
            .ok_or_else(|| ApiError::NotFound(format!("session {id}")))
    }

    pub fn sweep_sessions(&self) -> usize {
        let removed = self.sessions.sweep(self.clock.now());
        if removed > 0 {
            debug!(removed, remaining = self.sessions.len(), "expired sessions swept");
        }
        removed
    }
}
