//! Process-wide throttle for E-utilities calls.
//!
//! NCBI allows three requests per second without a key. The limiter is a GCRA
//! with a burst of one, so consecutive permits are always at least one interval
//! apart no matter which stage or task asks for them.
//!
//! The limiter is also a request middleware. Registered inside the retry
//! middleware, it gates every attempt, retries included.

use std::sync::Arc;
use std::time::Duration;

use axum::http::Extensions;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Gcra};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};

type DirectLimiter = Gcra<NotKeyed, InMemoryState, DefaultClock>;

/// Shared minimum-interval limiter. Clones share the same state.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Option<Arc<DirectLimiter>>,
    interval: Duration,
}

impl RateLimiter {
    /// Create a limiter that spaces permits `interval` apart.
    ///
    /// A zero interval disables throttling.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval).map(|quota| Arc::new(Gcra::direct(quota)));
        Self { limiter, interval }
    }

    /// Wait until the next call may be issued.
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[async_trait::async_trait]
impl Middleware for RateLimiter {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        self.acquire().await;
        next.run(req, extensions).await
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").field("interval", &self.interval).finish()
    }
}
