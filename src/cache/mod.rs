//! Local cache for query results
//!
//! SQLite-backed storage with file blob spill for large values, plus the
//! single-key [`LocalCache`] adapter the query layer reads and writes through.

pub mod key;
pub mod local;
pub mod storage;

use std::sync::{Arc, Mutex};

pub use key::cache_key;
pub use local::{LocalCache, SharedStorage};
pub use storage::{CacheStats, CacheStorage};

/// Endpoint labels used to group cached reads for invalidation.
pub struct Endpoint;

impl Endpoint {
    pub const LIST_MEALS: &'static str = "list_meals";
    pub const DAILY_GOALS: &'static str = "get_daily_goals";
    pub const QUICK_FOODS: &'static str = "list_quick_foods";
    pub const PROFILE: &'static str = "get_profile";
}

/// Open the default on-disk cache and wrap it for sharing.
///
/// Returns `None` when the cache cannot be opened; callers then run without
/// a cache, which is the same as every read missing.
pub fn open_shared() -> Option<SharedStorage> {
    match CacheStorage::open() {
        Ok(storage) => Some(Arc::new(Mutex::new(storage))),
        Err(e) => {
            log::warn!("Cache unavailable, continuing without it: {}", e);
            None
        }
    }
}
