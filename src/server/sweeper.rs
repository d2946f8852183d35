use crate::domain::RevocationStore;
use crate::logger::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Spawns the periodic retention sweep on its own task. Request handling
/// never calls `sweep` inline; this task is the only writer that removes
/// entries.
pub fn spawn_sweeper(
    store: Arc<dyn RevocationStore>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval's first tick completes immediately
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("revocation sweeper cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = store.sweep();
                    let stats = store.stats();
                    if removed > 0 {
                        info!(
                            removed,
                            revoked = stats.revoked_tokens,
                            watermarks = stats.subject_watermarks,
                            "revocation sweep"
                        );
                    } else {
                        debug!("revocation sweep removed nothing");
                    }
                }
            }
        }
    })
}
