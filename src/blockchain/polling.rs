use crate::blockchain::sync::SyncEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Periodic trigger for the sync engine. Passes never overlap: a slow pass delays the
/// next tick instead of bursting.
pub async fn start_sync_loop(
    engine: Arc<SyncEngine>,
    initial_delay: Duration,
    period: Duration,
    shutdown: CancellationToken,
) {
    info!(
        "Starting sync loop: first pass in {:?}, then every {:?}",
        initial_delay, period
    );

    tokio::select! {
        _ = sleep(initial_delay) => {}
        _ = shutdown.cancelled() => {
            info!("Sync loop cancelled before first pass");
            return;
        }
    }

    // interval panics on a zero period
    let period = period.max(Duration::from_secs(1));
    let mut ticker = interval_at(Instant::now(), period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = engine.run_sync_pass().await {
                    error!("Sync pass aborted: {}", e);
                }
            }
            _ = shutdown.cancelled() => {
                info!("Shutting down sync loop");
                break;
            }
        }
    }
}
