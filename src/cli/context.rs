//! Command execution context
//!
//! Loads and validates the config once, builds the store client and hands
//! commands cached queries and invalidating mutations for their reads and
//! writes.

use std::future::Future;
use std::sync::Arc;

use log::debug;
use serde::{Serialize, de::DeserializeOwned};
use tokio_util::sync::CancellationToken;

use crate::analysis::OpenAiAnalyzer;
use crate::cache::{self, LocalCache, SharedStorage, cache_key};
use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::{NutritionStore, SupabaseClient};
use crate::config::Config;
use crate::device::{AnimationSettings, DeviceProfile};
use crate::error::{Error, Result};
use crate::query::{Mutation, MutationOptions, Query, QueryOptions};

/// Context for command execution containing config, store and runtime options.
pub struct CommandContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// Row store for meals, goals, quick foods and profiles
    pub store: Arc<dyn NutritionStore>,
    /// Output format preference
    pub format: OutputFormat,
    /// Spinner settings for this terminal
    pub animation: AnimationSettings,
    cache: Option<SharedStorage>,
    no_cache: bool,
    user_id: String,
}

impl CommandContext {
    /// Load config from the given options, require store credentials and
    /// build the Supabase client.
    pub fn new(opts: &GlobalOptions, device: &DeviceProfile) -> Result<Self> {
        let config = Config::load_at(opts.config_ref())?;
        config.validate_store()?;

        let store: Arc<dyn NutritionStore> = Arc::new(SupabaseClient::from_config(&config)?);
        let format = opts.resolve_format(&config);
        let animation = device.animation(config.preferences.animations);

        Self::with_store(config, store, format, animation, cache::open_shared(), opts.no_cache)
    }

    /// Assemble a context around an existing store.
    pub fn with_store(
        config: Config,
        store: Arc<dyn NutritionStore>,
        format: OutputFormat,
        animation: AnimationSettings,
        cache: Option<SharedStorage>,
        no_cache: bool,
    ) -> Result<Self> {
        let user_id = config.user_id()?.to_string();
        Ok(Self {
            config,
            store,
            format,
            animation,
            cache,
            no_cache,
            user_id,
        })
    }

    /// The user every row belongs to
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Build the AI analyzer, requiring an API key.
    pub fn analyzer(&self) -> Result<OpenAiAnalyzer> {
        self.config.validate_ai()?;
        OpenAiAnalyzer::from_config(&self.config)
    }

    /// A read of `endpoint` for the current user, persisted under a key
    /// derived from the endpoint, user and `params`. With `--no-cache` the
    /// query has no persistent adapter.
    pub fn query<T, F, Fut>(&self, endpoint: &'static str, params: &[(&str, &str)], fetch: F) -> Query<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let key = cache_key(endpoint, Some(&self.user_id), params);
        let options = self
            .config
            .query
            .apply(QueryOptions::new())
            .on_success(move |_: &T| debug!("Loaded {}", endpoint))
            .on_error(move |e| debug!("Failed to load {}: {}", endpoint, e));
        let cache_time = options.cache_time;
        let query = Query::new(fetch, options);

        match (&self.cache, self.no_cache) {
            (Some(storage), false) => query.with_cache(
                LocalCache::new(storage.clone(), key, cache_time)
                    .scoped(endpoint, Some(&self.user_id)),
            ),
            _ => query,
        }
    }

    /// Run a query to completion under a spinner and hand back its data.
    pub async fn read<T>(&self, query: &Query<T>, message: &'static str) -> Result<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let spinner = self.animation.spinner(message);
        if self.no_cache {
            query.refetch().await;
        } else {
            query.fetch(false).await;
        }
        spinner.finish_and_clear();

        let state = query.state();
        match (state.data, state.error) {
            (_, Some(err)) => Err(Error::Query(err)),
            (Some(data), None) => Ok(data),
            (None, None) => Err(Error::Other("query produced no data".to_string())),
        }
    }

    /// A write that drops every cached read of `invalidates` for the current
    /// user once it succeeds.
    pub fn mutation<I, R, F, Fut>(&self, invalidates: &'static [&'static str], mutate: F) -> Mutation<I, R>
    where
        I: Send + 'static,
        R: Send + Sync + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let storage = self.cache.clone();
        let user_id = self.user_id.clone();

        Mutation::new(
            mutate,
            MutationOptions::new().on_success(move |_: &R| {
                if let Some(storage) = &storage {
                    invalidate_endpoints(storage, invalidates, &user_id);
                }
            }),
        )
    }
}

fn invalidate_endpoints(storage: &SharedStorage, endpoints: &[&str], user_id: &str) {
    let Ok(storage) = storage.lock() else {
        debug!("Cache lock poisoned, skipping invalidation");
        return;
    };

    for endpoint in endpoints {
        match storage.delete_by_endpoint(endpoint, Some(user_id)) {
            Ok(removed) => debug!("Invalidated {} cached {} entries", removed, endpoint),
            Err(e) => debug!("Failed to invalidate {}: {}", endpoint, e),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use tempfile::TempDir;

    use super::*;
    use crate::cache::CacheStorage;
    use crate::client::MockStore;

    /// Context around a mock store with a throwaway on-disk cache.
    pub fn context(store: Arc<MockStore>, no_cache: bool) -> (CommandContext, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = CacheStorage::open_at(dir.path()).unwrap();

        let config = Config {
            user_id: Some("u1".to_string()),
            ..Default::default()
        };

        let ctx = CommandContext::with_store(
            config,
            store,
            OutputFormat::Json,
            AnimationSettings::disabled(),
            Some(Arc::new(Mutex::new(storage))),
            no_cache,
        )
        .unwrap();
        (ctx, dir)
    }
}
