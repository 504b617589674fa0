//! Per-family query policies.

use std::time::Duration;

use showcase_core::CacheConfig;
use showcase_data::RetryPolicy;

/// How a family of queries is cached and retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPolicy {
    /// How long a successful result is served without a new fetch.
    pub stale_time: Duration,
    /// Retry budget for failed fetches.
    pub retry: RetryPolicy,
    /// Whether regaining focus re-fetches stale entries.
    pub refetch_on_focus: bool,
    /// Disabled queries never fetch on their own; `refetch` still works.
    pub enabled: bool,
}

impl QueryPolicy {
    /// Create a policy with the default retry budget and focus re-fetching off.
    pub fn new(stale_time: Duration) -> Self {
        Self {
            stale_time,
            retry: RetryPolicy::default(),
            refetch_on_focus: false,
            enabled: true,
        }
    }

    /// Policy for product pages and single products.
    pub fn products(config: &CacheConfig) -> Self {
        Self::from_config(config.product_stale_time(), config)
    }

    /// Policy for the category list.
    pub fn categories(config: &CacheConfig) -> Self {
        Self::from_config(config.category_stale_time(), config)
    }

    fn from_config(stale_time: Duration, config: &CacheConfig) -> Self {
        Self::new(stale_time)
            .with_retry(RetryPolicy::new(config.retries))
            .with_refetch_on_focus(config.refetch_on_focus)
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enable or disable focus re-fetching.
    pub fn with_refetch_on_focus(mut self, enabled: bool) -> Self {
        self.refetch_on_focus = enabled;
        self
    }

    /// Enable or disable automatic fetching.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
