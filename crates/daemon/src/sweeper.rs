use std::time::Duration;

use tokio::{task::JoinHandle, time::interval};

use crate::api::AppState;

/// Periodically reclaim expired sessions. Lookups already hide them; this
/// only bounds memory.
pub fn spawn_sweeper(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(Duration::from_secs(state.config.sweep_interval_seconds));
        loop {
            tick.tick().await;
            state.cp.sweep_sessions();
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use control_plane_core::{api::SessionCreateRequest, ManualClock};

    use super::*;
    use crate::config::DaemonConfig;

    #[tokio::test]
    async fn reclaims_expired_sessions_on_its_own() {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        ));
        let state = AppState::new(
            DaemonConfig {
                sweep_interval_seconds: 1,
                ..DaemonConfig::default()
            },
            clock.clone(),
        );
        state
            .cp
            .admit_session(&SessionCreateRequest {
                tenant_id: Some("tenant-1".into()),
                agent_id: Some("agent-1".into()),
                policy_id: Some("policy-1".into()),
                ttl_seconds: Some(60),
                ..SessionCreateRequest::default()
            })
            .unwrap();

        let handle = spawn_sweeper(state.clone());

        // Live sessions survive the first ticks.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(state.cp.sessions().len(), 1);

        clock.advance(chrono::Duration::seconds(61));
        let mut waited = 0;
        while !state.cp.sessions().is_empty() && waited < 30 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            waited += 1;
        }
        handle.abort();

        assert!(state.cp.sessions().is_empty());
    }
}
