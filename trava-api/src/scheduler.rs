use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use trava_jobs::RetrySupervisor;
use trava_store::SearchRules;

/// Spawn the interval-driven supervisor loops: failed-check retries and
/// expired-search cleanup. Both run for the life of the process.
pub fn spawn_supervisor_loops(supervisor: Arc<RetrySupervisor>, rules: &SearchRules) {
    let retry_every = Duration::from_secs(rules.retry_interval_seconds);
    let cleanup_every = Duration::from_secs(rules.cleanup_interval_seconds);
    let retention = rules.retention();

    let retry_supervisor = supervisor.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(retry_every);
        // interval fires immediately; skip the initial tick
        ticker.tick().await;
        info!(every_seconds = retry_every.as_secs(), "retry loop started");
        loop {
            ticker.tick().await;
            retry_supervisor.retry_all_failed().await;
        }
    });

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(cleanup_every);
        ticker.tick().await;
        info!(every_seconds = cleanup_every.as_secs(), "cleanup loop started");
        loop {
            ticker.tick().await;
            supervisor.purge_expired_searches(retention).await;
        }
    });
}
