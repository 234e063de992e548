use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::domain_port::{Clock, Sweep};

/// Periodic sweep over every registered store, bounding memory held by
/// expired credentials, revocations and sessions.
pub struct Reaper {
    interval: Duration,
    clock: Arc<dyn Clock>,
    stores: Vec<Arc<dyn Sweep>>,
}

impl Reaper {
    pub fn new(interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            interval,
            clock,
            stores: Vec::new(),
        }
    }

    pub fn register(mut self, store: Arc<dyn Sweep>) -> Self {
        self.stores.push(store);
        self
    }

    pub fn spawn(self) -> ReaperHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(run(self.interval, self.clock, self.stores, token.clone()));
        ReaperHandle { token, task }
    }
}

pub struct ReaperHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Stop the loop: no new tick starts, the in-flight sweep finishes,
    /// and the task is joined before this returns.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            tracing::error!("reaper task join failed: {e}");
        }
    }
}

async fn run(
    interval: Duration,
    clock: Arc<dyn Clock>,
    stores: Vec<Arc<dyn Sweep>>,
    token: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "reaper started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => break,

            _ = ticker.tick() => {
                let now = clock.now();
                for store in &stores {
                    match store.sweep(now).await {
                        Ok(0) => {}
                        Ok(removed) => {
                            tracing::debug!(store = store.name(), removed, "swept expired entries");
                        }
                        Err(e) => {
                            tracing::error!(store = store.name(), "sweep failed: {e}");
                        }
                    }
                }
            }
        }
    }

    tracing::info!("reaper stopped");
}
