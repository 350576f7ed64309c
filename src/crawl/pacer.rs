//! Request pacing between fetches
//!
//! One request is in flight at a time; the pacer enforces the minimum
//! interval between consecutive fetches. The effective interval is the
//! maximum of the user-configured delay and any robots-declared crawl-delay.

use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::time::Duration;

/// Sequential request pacer
pub struct Pacer {
    period: Duration,
    limiter: Option<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl Pacer {
    /// Create a pacer from the user delay and an optional robots hint,
    /// both in seconds. A zero effective delay disables pacing.
    pub fn new(delay_secs: f64, robots_delay_secs: Option<f64>) -> Self {
        let effective = robots_delay_secs
            .map(|d| d.max(delay_secs))
            .unwrap_or(delay_secs)
            .max(0.0);

        let period = Duration::from_secs_f64(effective);
        let limiter = Quota::with_period(period)
            .map(|quota| RateLimiter::direct(quota.allow_burst(nonzero!(1u32))));

        Self { period, limiter }
    }

    /// The interval this pacer enforces
    pub fn interval(&self) -> Duration {
        self.period
    }

    /// Wait until the next request is allowed
    pub async fn pause(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_pacer_enforces_interval() {
        let pacer = Pacer::new(0.05, None);

        let start = Instant::now();
        pacer.pause().await;
        pacer.pause().await;
        pacer.pause().await;
        let elapsed = start.elapsed();

        // Three requests means two full intervals
        assert!(elapsed >= Duration::from_millis(90));
    }

    #[tokio::test]
    async fn test_zero_delay_is_free() {
        let pacer = Pacer::new(0.0, None);

        let start = Instant::now();
        for _ in 0..10 {
            pacer.pause().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_robots_delay_takes_precedence_when_larger() {
        let pacer = Pacer::new(0.01, Some(0.08));

        let start = Instant::now();
        pacer.pause().await;
        pacer.pause().await;
        assert!(start.elapsed() >= Duration::from_millis(70));
    }
}
