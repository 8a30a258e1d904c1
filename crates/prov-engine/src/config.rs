use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bounded retry with capped exponential backoff.
///
/// Applied to idempotent collaborator calls only: content upload and fetch,
/// salt writes and reads, ledger lookups. Ledger registration is never
/// retried by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    /// Single attempt, no backoff.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before attempt `attempt + 1`, for `attempt >= 1`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(20);
        let ms = self
            .initial_backoff_ms
            .saturating_mul(1u64 << shift)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 50,
            max_backoff_ms: 1_000,
        }
    }
}

/// Configuration for the commitment and verification engines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub retry: RetryPolicy,
    /// Lifetime of a root-cache entry.
    pub cache_ttl_secs: u64,
    /// Deadline applied to a whole commit or verify when the caller gives none.
    pub operation_timeout_ms: u64,
    /// Window for confirming, by lookup, a registration whose deadline passed.
    pub registration_confirm_ms: u64,
}

impl EngineConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn registration_confirm(&self) -> Duration {
        Duration::from_millis(self.registration_confirm_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            cache_ttl_secs: 300,
            operation_timeout_ms: 30_000,
            registration_confirm_ms: 5_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_three_attempts() {
        let p = RetryPolicy::default();
        assert_eq!(p.attempts(), 3);
        assert_eq!(p.backoff(1), Duration::from_millis(50));
        assert_eq!(p.backoff(2), Duration::from_millis(100));
    }

    #[test]
    fn backoff_is_capped() {
        let p = RetryPolicy {
            max_attempts: 10,
            initial_backoff_ms: 100,
            max_backoff_ms: 250,
        };
        assert_eq!(p.backoff(3), Duration::from_millis(250));
        assert_eq!(p.backoff(64), Duration::from_millis(250));
    }

    #[test]
    fn zero_attempts_means_one() {
        let p = RetryPolicy {
            max_attempts: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(p.attempts(), 1);
    }

    #[test]
    fn default_engine_config() {
        let c = EngineConfig::default();
        assert_eq!(c.cache_ttl(), Duration::from_secs(300));
        assert_eq!(c.operation_timeout(), Duration::from_secs(30));
        assert_eq!(c.registration_confirm(), Duration::from_secs(5));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let c: EngineConfig = serde_json::from_str(r#"{"cache_ttl_secs": 5}"#).unwrap();
        assert_eq!(c.cache_ttl_secs, 5);
        assert_eq!(c.retry, RetryPolicy::default());
    }
}
