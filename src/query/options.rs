//! Query configuration and the retry schedule.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;

/// Default TTL for persisted cache entries (5 minutes)
pub const DEFAULT_CACHE_TIME: Duration = Duration::from_millis(300_000);

/// Default in-memory freshness window (1 minute)
pub const DEFAULT_STALE_TIME: Duration = Duration::from_millis(60_000);

/// Default number of retries after the first failed attempt
pub const DEFAULT_RETRY: u32 = 3;

/// Default base delay between retries
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1_000);

/// Invoked once per successful resolution (network or cache hit).
pub type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Invoked once per terminal failure.
pub type ErrorCallback = Arc<dyn Fn(&Error) + Send + Sync>;

/// Linear backoff: the delay before retry number `attempt` (1-based).
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(attempt)
}

/// Options for a [`Query`](super::Query).
pub struct QueryOptions<T> {
    /// When false, no fetch is attempted
    pub enabled: bool,
    /// Enables the persistent cache adapter under this key
    pub cache_key: Option<String>,
    /// TTL for persisted entries
    pub cache_time: Duration,
    /// Minimum data age before a non-forced fetch goes back to the network
    pub stale_time: Duration,
    /// Maximum retries after a failure
    pub retry: u32,
    /// Base delay, multiplied by the attempt number
    pub retry_delay: Duration,
    pub on_success: Option<SuccessCallback<T>>,
    pub on_error: Option<ErrorCallback>,
}

impl<T> Default for QueryOptions<T> {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_key: None,
            cache_time: DEFAULT_CACHE_TIME,
            stale_time: DEFAULT_STALE_TIME,
            retry: DEFAULT_RETRY,
            retry_delay: DEFAULT_RETRY_DELAY,
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> Clone for QueryOptions<T> {
    fn clone(&self) -> Self {
        Self {
            enabled: self.enabled,
            cache_key: self.cache_key.clone(),
            cache_time: self.cache_time,
            stale_time: self.stale_time,
            retry: self.retry,
            retry_delay: self.retry_delay,
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
        }
    }
}

impl<T> fmt::Debug for QueryOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("enabled", &self.enabled)
            .field("cache_key", &self.cache_key)
            .field("cache_time", &self.cache_time)
            .field("stale_time", &self.stale_time)
            .field("retry", &self.retry)
            .field("retry_delay", &self.retry_delay)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl<T> QueryOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[allow(dead_code)]
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    pub fn cache_time(mut self, cache_time: Duration) -> Self {
        self.cache_time = cache_time;
        self
    }

    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(f));
        self
    }
}
