// Missed-token sweeper
// Periodically marks WAITING tokens as MISSED according to a NoShowPolicy

mod shutdown;

pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::queue::QueueService;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Decides when a WAITING token counts as a no-show
pub trait NoShowPolicy: Send + Sync {
    /// A queue head called before the returned instant (epoch ms) is a
    /// no-show
    fn cutoff(&self, now_millis: i64) -> i64;
}

/// A queue head is a no-show once it has been callable for more than
/// `grace_minutes`
#[derive(Debug, Clone, Copy)]
pub struct GraceWindowPolicy {
    pub grace_minutes: i64,
}

impl GraceWindowPolicy {
    pub fn new(grace_minutes: i64) -> Self {
        Self { grace_minutes }
    }
}

impl NoShowPolicy for GraceWindowPolicy {
    fn cutoff(&self, now_millis: i64) -> i64 {
        now_millis - self.grace_minutes.max(0) * 60_000
    }
}

/// Missed-token sweeper
///
/// Runs `QueueService::sweep_missed` every interval until shutdown
pub struct MissedTokenSweeper {
    queue: Arc<QueueService>,
    policy: Arc<dyn NoShowPolicy>,
    interval: Duration,
}

impl MissedTokenSweeper {
    /// Create a new sweeper
    ///
    /// # Arguments
    /// * `queue` - Queue service whose departments are swept
    /// * `policy` - No-show policy
    /// * `interval` - Time between sweeps
    pub fn new(queue: Arc<QueueService>, policy: Arc<dyn NoShowPolicy>, interval: Duration) -> Self {
        Self {
            queue,
            policy,
            interval,
        }
    }

    /// Run sweep loop (background task)
    ///
    /// Should be spawned in tokio::spawn
    pub async fn run(self, mut shutdown: ShutdownToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Missed-token sweeper started"
        );

        let mut tick = interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                _ = tick.tick() => {
                    if let Err(e) = self.run_now().await {
                        error!(error = ?e, "Missed-token sweep failed");
                    }
                }
            }
        }

        info!("Missed-token sweeper stopped");
    }

    /// Sweep immediately (for manual trigger)
    pub async fn run_now(&self) -> crate::error::Result<usize> {
        self.queue.sweep_missed(self.policy.as_ref()).await
    }
}
