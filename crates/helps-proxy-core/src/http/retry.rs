//! Retry policy with exponential backoff

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// When and how often a failed upstream call is retried.
///
/// Attempt `k` (0-indexed) of the retry schedule waits
/// `retry_delay_ms * backoff_factor^k` first, so the defaults attempt at
/// t=0, 1s, 2s and 4s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    /// Additional attempts after the first
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub backoff_factor: f64,
    /// Per-attempt timeout
    pub timeout_ms: u64,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
            backoff_factor: 2.0,
            timeout_ms: 30_000,
            retryable_statuses: DEFAULT_RETRYABLE_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_delay_ms = delay_ms;
        self
    }

    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Delay before retry `attempt` (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self.retry_delay_ms as f64 * self.backoff_factor.powi(attempt as i32);
        Duration::from_millis(delay_ms.round() as u64)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(4000));
        assert_eq!(policy.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_retryable_statuses() {
        let policy = RetryPolicy::default();
        for status in [408, 429, 500, 502, 503, 504] {
            assert!(policy.is_retryable_status(status), "{status} should retry");
        }
        for status in [400, 401, 403, 404, 422, 501] {
            assert!(!policy.is_retryable_status(status), "{status} should not retry");
        }
    }

    #[test]
    fn test_camel_case_config() {
        let policy: RetryPolicy =
            serde_json::from_str(r#"{"maxRetries":1,"retryDelayMs":5,"retryableStatuses":[503]}"#).unwrap();
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.retry_delay_ms, 5);
        assert_eq!(policy.backoff_factor, 2.0);
        assert!(!policy.is_retryable_status(500));
    }
}
