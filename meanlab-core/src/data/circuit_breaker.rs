//! Circuit breaker for data provider rate limiting and IP bans.
//!
//! When the provider returns HTTP 403 (IP ban) or repeated 429 (rate limit),
//! the breaker trips and refuses all subsequent requests for a cooldown
//! period (default 30 minutes).

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct BreakerInner {
    tripped_at: Option<Instant>,
    consecutive_failures: u32,
}

/// Circuit breaker that prevents hammering a provider after a ban or rate limit.
#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<BreakerInner>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given cooldown duration.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            inner: Mutex::new(BreakerInner {
                tripped_at: None,
                consecutive_failures: 0,
            }),
            cooldown,
            failure_threshold: 3,
        }
    }

    /// Default breaker: 30-minute cooldown, trips after 3 consecutive failures.
    pub fn default_provider() -> Self {
        Self::new(Duration::from_secs(30 * 60))
    }

    /// Check if requests are currently allowed.
    pub fn is_allowed(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.tripped_at {
            None => true,
            Some(tripped_at) => {
                if tripped_at.elapsed() >= self.cooldown {
                    // Cooldown expired, reset
                    inner.tripped_at = None;
                    inner.consecutive_failures = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful request, resetting the failure counter.
    pub fn record_success(&self) {
        self.inner.lock().unwrap().consecutive_failures = 0;
    }

    /// Record a failure. Trips the breaker once the threshold is reached.
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= self.failure_threshold {
            inner.tripped_at = Some(Instant::now());
        }
    }

    /// Immediately trip the breaker (for 403 Forbidden / IP ban).
    pub fn trip(&self) {
        self.inner.lock().unwrap().tripped_at = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let cb = CircuitBreaker::new(Duration::from_secs(60));
        assert!(cb.is_allowed());
    }

    #[test]
    fn trips_after_threshold_failures() {
        let cb = CircuitBreaker::new(Duration::from_secs(60));
        cb.record_failure();
        cb.record_failure();
        assert!(cb.is_allowed()); // 2 < 3
        cb.record_failure();
        assert!(!cb.is_allowed()); // 3 >= 3 → tripped
    }

    #[test]
    fn immediate_trip() {
        let cb = CircuitBreaker::new(Duration::from_secs(60));
        cb.trip();
        assert!(!cb.is_allowed());
    }

    #[test]
    fn success_resets_counter() {
        let cb = CircuitBreaker::new(Duration::from_secs(60));
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        cb.record_failure(); // 1 failure after reset
        assert!(cb.is_allowed());
    }

    #[test]
    fn expires_after_cooldown() {
        let cb = CircuitBreaker::new(Duration::from_millis(10));
        cb.trip();
        assert!(!cb.is_allowed());
        std::thread::sleep(Duration::from_millis(15));
        assert!(cb.is_allowed());
    }
}
