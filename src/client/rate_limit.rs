//! Client-side rate limiting per remote service
//!
//! The store limiter is reactive: it only starts pacing requests after the
//! server has answered 429 once. The analyzer limiter paces from the start,
//! since AI endpoints meter by the minute.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;

/// Remote services we talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Supabase PostgREST
    Store,
    /// Chat-completions food analysis
    Analysis,
}

impl Service {
    /// Allowed requests per second
    pub fn rate_limit(&self) -> f64 {
        match self {
            Service::Store => 10.0,
            Service::Analysis => 0.5, // 30 per minute
        }
    }
}

/// Rate limiter for one service.
pub struct ServiceRateLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    active: AtomicBool,
    service: Service,
}

impl ServiceRateLimiter {
    /// A limiter that stays idle until [`activate`](Self::activate) is called.
    pub fn reactive(service: Service) -> Self {
        let rate = service.rate_limit();

        // Sub-1 rates become per-minute quotas
        let quota = if rate >= 1.0 {
            Quota::per_second(NonZeroU32::new(rate as u32).unwrap_or(NonZeroU32::MIN))
        } else {
            let per_min = (rate * 60.0).round() as u32;
            Quota::per_minute(NonZeroU32::new(per_min).unwrap_or(NonZeroU32::MIN))
        };

        Self {
            limiter: RateLimiter::direct(quota),
            active: AtomicBool::new(false),
            service,
        }
    }

    /// A limiter that paces every request.
    pub fn always_on(service: Service) -> Self {
        let limiter = Self::reactive(service);
        limiter.active.store(true, Ordering::SeqCst);
        limiter
    }

    /// Start pacing (called on 429).
    pub fn activate(&self) {
        let was_active = self.active.swap(true, Ordering::SeqCst);
        if !was_active {
            debug!("Rate limiting activated for {:?}", self.service);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait for permission if pacing is active.
    pub async fn wait_if_active(&self) {
        if self.is_active() {
            debug!("Waiting for rate limiter {:?}", self.service);
            self.limiter.until_ready().await;
        }
    }
}
