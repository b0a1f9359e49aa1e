use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct PollingLoop {
    interval: Duration,
    run_on_start: bool,
}

impl PollingLoop {
    pub fn new(interval: Duration, run_on_start: bool) -> Self {
        Self {
            interval,
            run_on_start,
        }
    }

    /// Invoke `job` once per interval until `shutdown` resolves.
    ///
    /// A failed run is logged and the loop waits for the next tick.
    pub async fn run<F, Fut, T, E>(&self, mut job: F, shutdown: impl Future<Output = ()>)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: Display,
        E: Display,
    {
        let now = Instant::now();
        let start = if self.run_on_start {
            now
        } else {
            now.checked_add(self.interval).unwrap_or_else(far_future)
        };
        let mut ticker = time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            run_on_start = self.run_on_start,
            "Polling loop started"
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match job().await {
                        Ok(outcome) => tracing::info!(%outcome, "Scheduled check finished"),
                        Err(e) => tracing::error!(error = %e, "Scheduled check failed"),
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("Polling loop stopped");
                    break;
                }
            }
        }
    }
}

// Roughly 30 years out, the same horizon tokio uses for an unbounded sleep.
fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86400 * 365 * 30)
}

impl Default for PollingLoop {
    fn default() -> Self {
        Self::new(DEFAULT_CHECK_INTERVAL, false)
    }
}
