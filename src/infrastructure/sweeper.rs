//! Periodic removal of sessions older than the configured maximum age.

use crate::config::SessionConfig;
use crate::domain::{MetricsPtr, SessionStore, SessionStorePtr};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Runs one sweep. Returns the number of sessions removed, or `None` on a
/// storage failure (logged, retried on the next tick).
pub async fn sweep_once(sessions: &dyn SessionStore, max_age: chrono::Duration) -> Option<u64> {
    // ---
    match sessions.delete_expired_sessions(max_age).await {
        Ok(removed) => {
            info!(removed, "Swept expired sessions");
            Some(removed)
        }
        Err(e) => {
            error!(error = ?e, "Session sweep failed");
            None
        }
    }
}

/// Spawns the sweep loop. The first sweep runs immediately.
///
/// The task exits when `shutdown` flips to `true` or its sender is dropped.
pub fn spawn_session_sweeper(
    sessions: SessionStorePtr,
    metrics: MetricsPtr,
    config: SessionConfig,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    // ---
    tokio::spawn(async move {
        let max_age =
            chrono::Duration::from_std(config.max_age).unwrap_or(chrono::Duration::hours(1));
        info!(
            interval_secs = config.sweep_interval.as_secs(),
            max_age_secs = max_age.num_seconds(),
            "Starting session sweeper"
        );

        let mut ticker = interval(config.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(removed) = sweep_once(sessions.as_ref(), max_age).await {
                        metrics.record_sessions_swept(removed);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Session sweeper shutting down");
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Session;
    use crate::infrastructure::memory::MemorySessionStore;
    use crate::infrastructure::metrics::create_noop_metrics;
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;

    fn session_aged(minutes: i64) -> Session {
        // ---
        let mut session = Session::new(Uuid::new_v4(), Uuid::new_v4().to_string());
        session.created_at = Utc::now() - chrono::Duration::minutes(minutes);
        session
    }

    #[tokio::test]
    async fn sweep_removes_only_sessions_past_max_age() {
        // ---
        let store = MemorySessionStore::new();
        let ages = [10, 59, 61, 120];
        let sessions: Vec<Session> = ages.iter().map(|m| session_aged(*m)).collect();
        for session in &sessions {
            store.insert_session(session.clone());
        }

        let removed = sweep_once(&store, chrono::Duration::hours(1)).await;
        assert_eq!(removed, Some(2));

        for (session, age) in sessions.iter().zip(ages) {
            let alive = store.get_session_id(session.user_id).await.is_ok();
            assert_eq!(alive, age < 60, "session aged {age}m");
        }
    }

    #[tokio::test]
    async fn sweeper_runs_and_stops_on_shutdown() {
        // ---
        let store = Arc::new(MemorySessionStore::new());
        store.insert_session(session_aged(180));

        let (tx, rx) = watch::channel(false);
        let config = SessionConfig {
            max_age: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(3600),
        };
        let metrics = create_noop_metrics().unwrap();
        let handle = spawn_session_sweeper(store.clone(), metrics, config, rx);

        for _ in 0..100 {
            if store.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(store.is_empty(), "first sweep should run immediately");

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
