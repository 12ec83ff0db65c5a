//! Fixed-delay tick driver
//!
//! One tick at a time, then a full interval of sleep measured from the end
//! of the tick. No catch-up, no jitter, no backoff.
//!
//! ## Shutdown
//!
//! When the shutdown future resolves:
//! - during a sleep, the scheduler stops immediately;
//! - during a tick that is writing to the zone, the tick runs to completion;
//! - during any other part of a tick, the tick is dropped.

use std::future::Future;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::info;

use super::{EngineEvent, Reconciler};

/// Drives a [`Reconciler`] until shutdown
pub struct Scheduler {
    reconciler: Reconciler,

    /// Delay between the end of one tick and the start of the next
    interval: Duration,
}

impl Scheduler {
    pub fn new(reconciler: Reconciler, interval: Duration) -> Self {
        Self {
            reconciler,
            interval,
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Run ticks until `shutdown` resolves
    ///
    /// Tick errors never stop the loop; they are logged by the reconciler and
    /// the next tick retries.
    ///
    /// # Returns
    ///
    /// The number of ticks that ran to completion
    pub async fn run_until<F>(&mut self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            "Starting scheduler for {} (interval={:?})",
            self.reconciler.record_name(),
            self.interval
        );

        let mut completed = 0u64;

        loop {
            let stop = {
                let writing = self.reconciler.write_flag();
                let tick = self.reconciler.reconcile();
                tokio::pin!(tick);

                tokio::select! {
                    _ = &mut tick => {
                        completed += 1;
                        false
                    }
                    () = &mut shutdown => {
                        if writing.load(Ordering::SeqCst) {
                            info!("Shutdown signal received during zone write, letting it finish");
                            tick.await;
                            completed += 1;
                        } else {
                            info!("Shutdown signal received, abandoning in-flight tick");
                        }
                        true
                    }
                }
            };

            if stop {
                break;
            }

            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                () = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.reconciler.emit_event(EngineEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });
        info!("Scheduler stopped after {} tick(s)", completed);

        completed
    }
}
