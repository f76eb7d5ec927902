//! Single-shot writes with loading/error state and callbacks.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use log::debug;
use tokio::sync::watch;

use super::options::{ErrorCallback, SuccessCallback};
use crate::error::{Error, Result};

type MutationFn<I, R> = Arc<dyn Fn(I) -> BoxFuture<'static, Result<R>> + Send + Sync>;

/// Callbacks for a [`Mutation`]. Mutations never retry.
pub struct MutationOptions<R> {
    pub on_success: Option<SuccessCallback<R>>,
    pub on_error: Option<ErrorCallback>,
}

impl<R> Default for MutationOptions<R> {
    fn default() -> Self {
        Self {
            on_success: None,
            on_error: None,
        }
    }
}

impl<R> fmt::Debug for MutationOptions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationOptions")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl<R> MutationOptions<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) + Send + Sync + 'static,
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

/// `loading` stays true until every overlapping call has finished.
#[derive(Debug, Clone, Default)]
pub struct MutationState {
    pub loading: bool,
    pub error: Option<Arc<Error>>,
    in_flight: usize,
}

impl MutationState {
    fn start(&mut self) {
        self.in_flight += 1;
        self.loading = true;
        self.error = None;
    }

    fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.loading = self.in_flight > 0;
    }
}

/// A write operation: one attempt per [`Mutation::mutate`] call.
pub struct Mutation<I, R> {
    mutate_fn: MutationFn<I, R>,
    options: MutationOptions<R>,
    state: watch::Sender<MutationState>,
}

impl<I, R> Mutation<I, R>
where
    I: Send + 'static,
    R: Send + Sync + 'static,
{
    pub fn new<F, Fut>(mutate_fn: F, options: MutationOptions<R>) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let mutate_fn: MutationFn<I, R> = Arc::new(move |input| Box::pin(mutate_fn(input)));
        let (state, _) = watch::channel(MutationState::default());
        Self {
            mutate_fn,
            options,
            state,
        }
    }

    /// Run the write. Returns the result on success; on failure returns
    /// `None` and records the error in [`Mutation::state`].
    pub async fn mutate(&self, input: I) -> Option<R> {
        self.state.send_modify(MutationState::start);

        match (self.mutate_fn)(input).await {
            Ok(result) => {
                self.state.send_modify(MutationState::finish);
                if let Some(on_success) = &self.options.on_success {
                    on_success(&result);
                }
                Some(result)
            }
            Err(err) => {
                debug!("Mutation failed: {}", err);
                let err = Arc::new(err);
                self.state.send_modify(|s| {
                    s.finish();
                    s.error = Some(err.clone());
                });
                if let Some(on_error) = &self.options.on_error {
                    on_error(&err);
                }
                None
            }
        }
    }

    /// Like [`Mutation::mutate`], but hands back the failure as an error.
    pub async fn run(&self, input: I) -> Result<R> {
        match self.mutate(input).await {
            Some(result) => Ok(result),
            None => Err(self
                .state()
                .error
                .map(Error::Query)
                .unwrap_or_else(|| Error::Other("mutation failed".to_string()))),
        }
    }

    pub fn state(&self) -> MutationState {
        self.state.borrow().clone()
    }

    #[allow(dead_code)]
    pub fn subscribe(&self) -> watch::Receiver<MutationState> {
        self.state.subscribe()
    }
}
