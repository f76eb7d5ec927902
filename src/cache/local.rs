//! Single-key cache adapter with a TTL.
//!
//! `LocalCache<T>` persists one serialized value under one key of the shared
//! [`CacheStorage`]. It never returns an error: storage and serde failures are
//! logged and read as a miss.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use super::CacheStorage;
use crate::error::CacheError;

/// Storage handle shared by every adapter in the process.
pub type SharedStorage = Arc<Mutex<CacheStorage>>;

/// Wall-clock source for entry timestamps, in Unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// The real clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Endpoint label used when an adapter is not scoped.
const DEFAULT_ENDPOINT: &str = "query";

/// Persists one value under one key with a time-to-live.
pub struct LocalCache<T> {
    storage: SharedStorage,
    key: String,
    ttl: Duration,
    endpoint: String,
    user_id: Option<String>,
    clock: Arc<dyn Clock>,
    _value: PhantomData<fn() -> T>,
}

impl<T> LocalCache<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(storage: SharedStorage, key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            storage,
            key: key.into(),
            ttl,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_id: None,
            clock: Arc::new(SystemClock),
            _value: PhantomData,
        }
    }

    /// Tag the entry with the endpoint and user it belongs to, so
    /// `CacheStorage::delete_by_endpoint` can drop it after a write.
    pub fn scoped(mut self, endpoint: &str, user_id: Option<&str>) -> Self {
        self.endpoint = endpoint.to_string();
        self.user_id = user_id.map(str::to_string);
        self
    }

    #[allow(dead_code)]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Return the value if present and not expired. Expired entries are
    /// evicted here.
    pub fn get(&self) -> Option<T> {
        match self.try_get() {
            Ok(value) => value,
            Err(e) => {
                log::debug!("Cache read failed for {}: {}", self.key, e);
                None
            }
        }
    }

    /// Overwrite the entry, stamped with the current time.
    pub fn set(&self, value: &T) {
        if let Err(e) = self.try_set(value) {
            log::debug!("Cache write failed for {}: {}", self.key, e);
        }
    }

    /// Remove the entry unconditionally.
    pub fn clear(&self) {
        let result = self
            .storage
            .lock()
            .map_err(|_| CacheError::Poisoned)
            .and_then(|storage| storage.delete_by_key(&self.key));
        if let Err(e) = result {
            log::debug!("Cache clear failed for {}: {}", self.key, e);
        }
    }

    fn try_get(&self) -> Result<Option<T>, CacheError> {
        let storage = self.storage.lock().map_err(|_| CacheError::Poisoned)?;
        let Some(entry) = storage.get_entry(&self.key)? else {
            return Ok(None);
        };

        if !entry.is_valid_at(self.clock.now_ms()) {
            log::debug!("Cache entry expired: {}", self.key);
            storage.delete_by_key(&self.key)?;
            return Ok(None);
        }

        serde_json::from_slice(&entry.data)
            .map(Some)
            .map_err(|e| CacheError::Serde(e.to_string()))
    }

    fn try_set(&self, value: &T) -> Result<(), CacheError> {
        let json = serde_json::to_vec(value).map_err(|e| CacheError::Serde(e.to_string()))?;
        let storage = self.storage.lock().map_err(|_| CacheError::Poisoned)?;
        storage.put(
            &self.key,
            &json,
            &self.endpoint,
            self.user_id.as_deref(),
            self.clock.now_ms(),
            ttl_millis(self.ttl),
        )
    }
}

/// TTL in milliseconds, saturating at `i64::MAX`.
fn ttl_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

/// A settable clock for exercising TTL boundaries.
#[cfg(test)]
pub mod test_clock {
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::Clock;

    #[derive(Debug, Default)]
    pub struct ManualClock(AtomicI64);

    impl ManualClock {
        pub fn at(ms: i64) -> Self {
            Self(AtomicI64::new(ms))
        }

        pub fn set(&self, ms: i64) {
            self.0.store(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }
}
