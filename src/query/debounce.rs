//! Trailing-edge debounce for async work.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use log::trace;
use tokio_util::sync::CancellationToken;

type Action<A> = Arc<dyn Fn(A) -> BoxFuture<'static, ()> + Send + Sync>;

/// Runs an action once the calls stop for `wait`, with the arguments of
/// the last call. An execution that has already started is not cancelled.
///
/// Must be used inside a Tokio runtime.
pub struct Debouncer<A> {
    action: Action<A>,
    wait: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl<A> Debouncer<A>
where
    A: Send + 'static,
{
    pub fn new<F, Fut>(wait: Duration, action: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            action: Arc::new(move |args| Box::pin(action(args))),
            wait,
            pending: Mutex::new(None),
        }
    }

    /// Schedule the action, replacing any call still waiting.
    pub fn call(&self, args: A) {
        let token = CancellationToken::new();
        if let Some(previous) = self.lock_pending().replace(token.clone()) {
            trace!("Debounce: superseding pending call");
            previous.cancel();
        }

        let action = self.action.clone();
        let wait = self.wait;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(wait) => {
                    // Past this point the run is no longer cancellable
                    token.cancel();
                    action(args).await;
                }
            }
        });
    }

    /// Drop the pending call, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.lock_pending().take() {
            token.cancel();
        }
    }

    /// True while a call is scheduled and has not started.
    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Some(token) = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }
}
