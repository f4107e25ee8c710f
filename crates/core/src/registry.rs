//! In-memory session registry with TTL expiry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Id, Session};

/// Registry operation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A live session already holds the id.
    #[error("session id already in use: {0}")]
    DuplicateId(Id),
}

/// Live sessions keyed by id.
///
/// Expiry is lazy on read: every lookup takes `now` and treats sessions with
/// `now >= expires_at` as absent. [`SessionRegistry::sweep`] reclaims them.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<HashMap<Id, Session>>,
}

impl SessionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Id, Session>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a session. An expired entry that has not been swept yet does
    /// not block reuse of its id.
    pub fn insert(&self, session: Session, now: DateTime<Utc>) -> Result<(), RegistryError> {
        let mut sessions = self.lock();
        if let Some(existing) = sessions.get(&session.id) {
            if existing.is_live(now) {
                return Err(RegistryError::DuplicateId(session.id));
            }
        }
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    /// The session, if it is still live at `now`.
    pub fn get(&self, id: &str, now: DateTime<Utc>) -> Option<Session> {
        self.lock().get(id).filter(|s| s.is_live(now)).cloned()
    }

    /// Live sessions, soonest-expiring first.
    pub fn list(&self, now: DateTime<Utc>) -> Vec<Session> {
        let mut live: Vec<Session> = self
            .lock()
            .values()
            .filter(|s| s.is_live(now))
            .cloned()
            .collect();
        live.sort_by(|a, b| a.expires_at.cmp(&b.expires_at).then_with(|| a.id.cmp(&b.id)));
        live
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.is_live(now));
        before - sessions.len()
    }

    /// Raw entry count, including expired sessions not yet swept.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no entries are held, expired or not.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(id: &str, now: DateTime<Utc>, ttl: i64) -> Session {
        Session {
            id: id.to_string(),
            tenant_id: "tenant-1".into(),
            agent_id: "agent-1".into(),
            policy_id: "policy-1".into(),
            ttl_seconds: ttl as u64,
            created_at: now,
            expires_at: now + Duration::seconds(ttl),
        }
    }

    #[test]
    fn test_new_registry_is_empty() {
        let r = SessionRegistry::new();
        assert!(r.is_empty());
        assert!(r.list(Utc::now()).is_empty());
    }

    #[test]
    fn test_get_respects_expiry() {
        let r = SessionRegistry::new();
        let t0 = Utc::now();
        r.insert(session("s1", t0, 60), t0).unwrap();

        assert!(r.get("s1", t0).is_some());
        assert!(r.get("s1", t0 + Duration::seconds(59)).is_some());
        assert!(r.get("s1", t0 + Duration::seconds(60)).is_none());
        assert!(r.get("s1", t0 + Duration::seconds(61)).is_none());
        // Lazy expiry does not remove anything by itself.
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_duplicate_live_id_is_rejected() {
        let r = SessionRegistry::new();
        let t0 = Utc::now();
        r.insert(session("s1", t0, 60), t0).unwrap();
        assert_eq!(
            r.insert(session("s1", t0, 120), t0 + Duration::seconds(1)),
            Err(RegistryError::DuplicateId("s1".into()))
        );
        assert_eq!(r.get("s1", t0).unwrap().ttl_seconds, 60);
    }

    #[test]
    fn test_expired_id_can_be_reused() {
        let r = SessionRegistry::new();
        let t0 = Utc::now();
        r.insert(session("s1", t0, 10), t0).unwrap();
        let later = t0 + Duration::seconds(10);
        r.insert(session("s1", later, 30), later).unwrap();
        assert_eq!(r.get("s1", later).unwrap().ttl_seconds, 30);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let r = SessionRegistry::new();
        let t0 = Utc::now();
        r.insert(session("short", t0, 5), t0).unwrap();
        r.insert(session("long", t0, 500), t0).unwrap();

        assert_eq!(r.sweep(t0), 0);
        assert_eq!(r.sweep(t0 + Duration::seconds(5)), 1);
        assert_eq!(r.len(), 1);
        assert!(r.get("long", t0 + Duration::seconds(5)).is_some());
    }

    #[test]
    fn test_list_orders_by_expiry() {
        let r = SessionRegistry::new();
        let t0 = Utc::now();
        r.insert(session("b", t0, 200), t0).unwrap();
        r.insert(session("a", t0, 100), t0).unwrap();
        r.insert(session("gone", t0, 1), t0).unwrap();

        let ids: Vec<_> = r
            .list(t0 + Duration::seconds(2))
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
