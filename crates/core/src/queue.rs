//! FIFO of admitted jobs.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::debug;

use crate::model::{Id, Job, JobStatus};

/// Queue operation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Id was admitted before.
    #[error("job id already used: {0}")]
    DuplicateId(Id),
    /// No job with that id.
    #[error("job not found: {0}")]
    NotFound(Id),
    /// Status change not allowed from the current state.
    #[error("job {id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        /// Job id.
        id: Id,
        /// Status the job was in.
        from: JobStatus,
        /// Status that was requested.
        to: JobStatus,
    },
}

/// FIFO queue of admitted jobs, polled by an external executor pool.
///
/// Every id ever enqueued stays reserved: claimed and finished jobs remain
/// addressable by id so that status can be read back and ids are never reused.
#[derive(Default)]
pub struct JobQueue {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    /// Ids of pending jobs, oldest first.
    pending: VecDeque<Id>,
    jobs: HashMap<Id, Job>,
}

impl JobQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a pending job at the tail. Either the job is fully recorded or
    /// nothing changes.
    pub fn enqueue(&self, job: Job) -> Result<(), QueueError> {
        let mut inner = self.lock();
        if inner.jobs.contains_key(&job.id) {
            return Err(QueueError::DuplicateId(job.id));
        }
        let mut job = job;
        job.status = JobStatus::Pending;
        inner.pending.push_back(job.id.clone());
        inner.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    /// Pop the oldest pending job and mark it running.
    ///
    /// The code payload moves to the caller; the queue only keeps the
    /// metadata needed to report status and reserve the id.
    pub fn claim_next(&self) -> Option<Job> {
        let mut inner = self.lock();
        let id = inner.pending.pop_front()?;
        let job = inner.jobs.get_mut(&id)?;
        job.status = JobStatus::Running;
        let code = std::mem::take(&mut job.code);
        debug!(job_id = %job.id, "job claimed");
        Some(Job {
            code,
            ..job.clone()
        })
    }

    /// Finish a running job.
    pub fn complete(&self, id: &str, succeeded: bool) -> Result<Job, QueueError> {
        let to = if succeeded {
            JobStatus::Done
        } else {
            JobStatus::Failed
        };
        let mut inner = self.lock();
        let job = inner
            .jobs
            .get_mut(id)
            .ok_or_else(|| QueueError::NotFound(id.to_string()))?;
        if job.status != JobStatus::Running {
            return Err(QueueError::InvalidTransition {
                id: id.to_string(),
                from: job.status,
                to,
            });
        }
        job.status = to;
        debug!(job_id = %id, status = ?to, "job finished");
        Ok(job.clone())
    }

    /// Snapshot of a job in any state.
    pub fn get(&self, id: &str) -> Option<Job> {
        self.lock().jobs.get(id).cloned()
    }

    /// Jobs waiting to be claimed.
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Number of jobs ever admitted.
    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    /// True when nothing was ever admitted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
