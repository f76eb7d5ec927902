//! Query execution: cache lookup, staleness window, retry with linear
//! backoff, and cancellation of superseded work.
//!
//! A [`Query`] owns one fetch function and one piece of state. Reads never
//! return an error to the caller; the outcome is published through
//! [`Query::state`] / [`Query::subscribe`] and the configured callbacks.
//!
//! # Example
//!
//! ```ignore
//! let store = ctx.store.clone();
//! let query = Query::new(
//!     move |_token| {
//!         let store = store.clone();
//!         async move { store.list_quick_foods("user-1").await }
//!     },
//!     QueryOptions::new().cache_key("quick-foods"),
//! );
//!
//! query.fetch(false).await;
//! if let Some(foods) = query.state().data {
//!     // render
//! }
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use log::debug;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::options::{QueryOptions, backoff_delay};
use crate::cache::{LocalCache, SharedStorage};
use crate::error::{Error, Result};

/// A boxed fetch function. The token fires when the attempt is superseded
/// or the query is torn down.
type Fetcher<T> = Arc<dyn Fn(CancellationToken) -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// Snapshot of a query.
///
/// `data` survives failed fetches; only [`Query::invalidate`] drops it.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<T>,
    /// True only while a network attempt (or its retry delay) is in flight
    pub loading: bool,
    pub error: Option<Arc<Error>>,
    /// When data was last committed from the network
    pub last_fetch: Option<Instant>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            last_fetch: None,
        }
    }
}

impl<T> QueryState<T> {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        self.data.is_some() && self.last_fetch.is_some_and(|at| at.elapsed() < stale_time)
    }
}

#[derive(Debug)]
struct Control {
    enabled: bool,
    retry_count: u32,
    /// Bumped by every network invocation; results from older ones are dropped
    generation: u64,
    in_flight: Option<CancellationToken>,
}

/// A cached, retrying, cancellable read.
pub struct Query<T> {
    fetcher: Fetcher<T>,
    options: QueryOptions<T>,
    cache: Option<LocalCache<T>>,
    state: watch::Sender<QueryState<T>>,
    control: Mutex<Control>,
    teardown: CancellationToken,
}

impl<T> Query<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new<F, Fut>(fetcher: F, options: QueryOptions<T>) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let fetcher: Fetcher<T> = Arc::new(move |token| Box::pin(fetcher(token)));
        let (state, _) = watch::channel(QueryState::default());

        Self {
            fetcher,
            control: Mutex::new(Control {
                enabled: options.enabled,
                retry_count: 0,
                generation: 0,
                in_flight: None,
            }),
            options,
            cache: None,
            state,
            teardown: CancellationToken::new(),
        }
    }

    /// Back the configured `cache_key` with the given storage. Without a
    /// `cache_key` this is a no-op.
    #[allow(dead_code)]
    pub fn with_storage(mut self, storage: SharedStorage) -> Self {
        self.cache = self
            .options
            .cache_key
            .as_ref()
            .map(|key| LocalCache::new(storage, key.clone(), self.options.cache_time));
        self
    }

    /// Attach a prepared cache adapter; its key becomes the query's cache key.
    pub fn with_cache(mut self, cache: LocalCache<T>) -> Self {
        self.options.cache_key = Some(cache.key().to_string());
        self.cache = Some(cache);
        self
    }

    /// Current snapshot.
    pub fn state(&self) -> QueryState<T> {
        self.state.borrow().clone()
    }

    /// Receive every state change.
    #[allow(dead_code)]
    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state.subscribe()
    }

    /// Run the query. Without `force`, fresh in-memory data or a cache hit
    /// short-circuits the network.
    pub async fn fetch(&self, force: bool) {
        if !self.lock_control().enabled {
            return;
        }

        if !force {
            let fresh = self.state.borrow().is_fresh(self.options.stale_time);
            if fresh {
                debug!("Query data still fresh, skipping fetch");
                return;
            }

            if let Some(value) = self.cache.as_ref().and_then(LocalCache::get) {
                debug!("Cache hit: {}", self.cache_key_label());
                self.state.send_modify(|s| {
                    s.data = Some(value.clone());
                    s.error = None;
                });
                if let Some(on_success) = &self.options.on_success {
                    on_success(&value);
                }
                return;
            }
        }

        let Some((generation, token)) = self.begin() else {
            return;
        };

        loop {
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                outcome = (self.fetcher)(token.clone()) => outcome,
            };

            match outcome {
                Ok(value) => {
                    self.settle_success(generation, value);
                    return;
                }
                Err(err) => {
                    let Some(attempt) = self.next_retry() else {
                        self.settle_failure(generation, err);
                        return;
                    };

                    let delay = backoff_delay(self.options.retry_delay, attempt);
                    debug!(
                        "Query attempt failed ({}), retry {} of {} in {:?}",
                        err, attempt, self.options.retry, delay
                    );

                    tokio::select! {
                        biased;
                        _ = token.cancelled() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// Always goes to the network, bypassing staleness and cache.
    pub async fn refetch(&self) {
        self.fetch(true).await;
    }

    /// Drop the cached entry and in-memory data so the next read goes to
    /// the network.
    pub fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        self.state.send_modify(|s| {
            s.data = None;
            s.last_fetch = None;
        });
    }

    /// Toggle the query. Enabling a disabled query runs it.
    #[allow(dead_code)]
    pub async fn set_enabled(&self, enabled: bool) {
        let was_enabled = {
            let mut control = self.lock_control();
            std::mem::replace(&mut control.enabled, enabled)
        };

        if enabled && !was_enabled {
            self.fetch(false).await;
        }
    }

    fn begin(&self) -> Option<(u64, CancellationToken)> {
        if self.teardown.is_cancelled() {
            return None;
        }

        let mut control = self.lock_control();
        if let Some(previous) = control.in_flight.take() {
            debug!("Cancelling in-flight query");
            previous.cancel();
        }

        let token = self.teardown.child_token();
        control.generation += 1;
        control.retry_count = 0;
        control.in_flight = Some(token.clone());

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        Some((control.generation, token))
    }

    fn next_retry(&self) -> Option<u32> {
        let mut control = self.lock_control();
        if control.retry_count < self.options.retry {
            control.retry_count += 1;
            Some(control.retry_count)
        } else {
            None
        }
    }

    fn settle_success(&self, generation: u64, value: T) {
        {
            let mut control = self.lock_control();
            if !self.owns_state(&control, generation) {
                debug!("Discarding result of superseded query");
                return;
            }
            control.retry_count = 0;
            control.in_flight = None;

            self.state.send_modify(|s| {
                s.data = Some(value.clone());
                s.last_fetch = Some(Instant::now());
                s.error = None;
                s.loading = false;
            });
        }

        if let Some(cache) = &self.cache {
            cache.set(&value);
        }
        if let Some(on_success) = &self.options.on_success {
            on_success(&value);
        }
    }

    fn settle_failure(&self, generation: u64, err: Error) {
        let err = Arc::new(err);
        {
            let mut control = self.lock_control();
            if !self.owns_state(&control, generation) {
                debug!("Discarding failure of superseded query");
                return;
            }
            control.in_flight = None;

            self.state.send_modify(|s| {
                s.error = Some(err.clone());
                s.loading = false;
            });
        }

        if let Some(on_error) = &self.options.on_error {
            on_error(&err);
        }
    }

    fn owns_state(&self, control: &Control, generation: u64) -> bool {
        control.generation == generation && !self.teardown.is_cancelled()
    }

    fn lock_control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache_key_label(&self) -> &str {
        self.options.cache_key.as_deref().unwrap_or("<none>")
    }
}

impl<T> Query<T> {
    /// Cancel outstanding work. Later fetches are no-ops.
    pub fn unmount(&self) {
        self.teardown.cancel();
    }
}

impl<T> Drop for Query<T> {
    fn drop(&mut self) {
        self.unmount();
    }
}
