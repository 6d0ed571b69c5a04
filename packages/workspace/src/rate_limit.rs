//! Sliding-window request limiter shared by everything that writes content.
//!
//! Each key keeps the times of its accepted requests; a request is refused
//! once `max_requests` of them fall within the last `window`.

use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Key the save endpoint is limited under
pub const ADMIN_SAVE_KEY: &str = "admin-save";

pub struct RateLimiter {
    /// Accepted request times per key, oldest first
    requests: DashMap<String, Vec<Instant>>,
    window: Duration,
    max_requests: usize,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            requests: DashMap::new(),
            window,
            max_requests,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// Check if a request is allowed and record it
    pub fn check_and_record(&self, key: &str) -> bool {
        self.check_and_record_at(key, Instant::now())
    }

    pub(crate) fn check_and_record_at(&self, key: &str, now: Instant) -> bool {
        // The entry guard holds the shard lock, so check and record are atomic
        let mut entry = self.requests.entry(key.to_string()).or_default();
        entry.retain(|&at| now.saturating_duration_since(at) < self.window);

        if entry.len() >= self.max_requests {
            return false;
        }
        entry.push(now);
        true
    }

    /// Drop keys with no request inside the window
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.requests.retain(|_, times| {
            times.retain(|&at| now.saturating_duration_since(at) < self.window);
            !times.is_empty()
        });
    }
}

impl Default for RateLimiter {
    /// 5 requests per minute
    fn default() -> Self {
        Self::new(5, Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixth_request_in_window_is_rejected() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        for i in 0..5 {
            assert!(limiter.check_and_record_at(ADMIN_SAVE_KEY, start + Duration::from_secs(i)));
        }
        assert!(!limiter.check_and_record_at(ADMIN_SAVE_KEY, start + Duration::from_secs(10)));
    }

    #[test]
    fn test_window_slides() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_and_record_at("k", start));
        assert!(limiter.check_and_record_at("k", start + Duration::from_secs(30)));
        assert!(!limiter.check_and_record_at("k", start + Duration::from_secs(59)));
        // First request has aged out
        assert!(limiter.check_and_record_at("k", start + Duration::from_secs(60)));
        assert!(!limiter.check_and_record_at("k", start + Duration::from_secs(61)));
    }

    #[test]
    fn test_rejections_are_not_recorded() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_and_record_at("k", start));
        for s in 1..10 {
            assert!(!limiter.check_and_record_at("k", start + Duration::from_secs(s)));
        }
        assert!(limiter.check_and_record_at("k", start + Duration::from_secs(60)));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check_and_record("a"));
        assert!(limiter.check_and_record("b"));
        assert!(!limiter.check_and_record("a"));
    }

    #[test]
    fn test_cleanup_keeps_live_keys() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        limiter.check_and_record("a");
        limiter.cleanup();
        assert!(limiter.requests.contains_key("a"));
    }
}
