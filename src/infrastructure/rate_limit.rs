//! Per-client request rate limiting
//!
//! Each client key gets its own token bucket. The whole table is dropped on a
//! fixed interval so that keys seen once do not accumulate forever.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::shared::ShutdownSignal;

pub struct RateLimiter {
    quota: Quota,
    buckets: Mutex<HashMap<String, Arc<DefaultDirectRateLimiter>>>,
}

impl RateLimiter {
    /// `requests` per `window`, with the full allowance available as a burst.
    pub fn new(requests: u32, window: Duration) -> Self {
        let burst = NonZeroU32::new(requests.max(1)).unwrap_or(NonZeroU32::MIN);
        let period = window / burst.get();
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            quota,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Consume one request for `client`. Returns `false` when over quota.
    pub fn check(&self, client: &str) -> bool {
        let bucket = {
            let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
            buckets
                .entry(client.to_string())
                .or_insert_with(|| Arc::new(governor::RateLimiter::direct(self.quota)))
                .clone()
        };
        bucket.check().is_ok()
    }

    /// Forget every client. Returns how many were tracked.
    pub fn clear(&self) -> usize {
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        let cleared = buckets.len();
        buckets.clear();
        cleared
    }

    pub fn tracked_clients(&self) -> usize {
        self.buckets.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Spawn the task that clears all state every `every` until shutdown.
    pub fn start_sweeper(self: &Arc<Self>, every: Duration, shutdown: ShutdownSignal) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let cleared = limiter.clear();
                        debug!(cleared, "Rate limiter state cleared");
                    }
                    _ = shutdown.wait() => {
                        info!("Rate limiter sweeper stopped");
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_burst_then_rejects() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.1"));
        assert!(!limiter.check("10.0.0.1"));
    }

    #[test]
    fn clients_are_limited_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("10.0.0.1"));
        assert!(!limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.2"));
    }

    #[test]
    fn clear_resets_every_client() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("a"));
        assert!(limiter.check("b"));
        assert!(!limiter.check("a"));

        assert_eq!(limiter.clear(), 2);
        assert_eq!(limiter.tracked_clients(), 0);
        assert!(limiter.check("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_clears_on_interval_and_stops_on_shutdown() {
        let limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(60)));
        let shutdown = ShutdownSignal::new();
        let task = limiter.start_sweeper(Duration::from_secs(3600), shutdown.clone());

        assert!(limiter.check("a"));
        assert_eq!(limiter.tracked_clients(), 1);

        tokio::time::sleep(Duration::from_secs(3601)).await;
        assert_eq!(limiter.tracked_clients(), 0);

        shutdown.trigger();
        task.await.unwrap();
    }
}
