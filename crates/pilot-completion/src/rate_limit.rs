//! Centralized fixed-delay rate limiting
//!
//! All completion traffic funnels through one limiter so that adding
//! groups never multiplies the request rate. The limiter keeps one
//! last-dispatch instant per tier and sleeps out the remainder of the
//! configured gap before releasing the next call.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::client::{CompletionClient, CompletionError, CompletionRequest, ModelTier};

/// Pacing policy for outbound completion calls
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Block until the next call on `tier` may be dispatched
    async fn acquire(&self, tier: ModelTier);
}

/// Per-tier minimum gap between dispatches
///
/// Deep-tier calls (interviews) get the longer gap, fast-tier calls
/// (check-ins, step inputs) the shorter one. Both tiers share the
/// limiter instance but pace independently.
pub struct FixedDelayLimiter {
    deep_gap: Duration,
    fast_gap: Duration,
    last_deep: Mutex<Option<Instant>>,
    last_fast: Mutex<Option<Instant>>,
}

impl FixedDelayLimiter {
    /// Limiter with explicit per-tier gaps
    #[must_use]
    pub fn new(deep_gap: Duration, fast_gap: Duration) -> Self {
        Self {
            deep_gap,
            fast_gap,
            last_deep: Mutex::new(None),
            last_fast: Mutex::new(None),
        }
    }

    async fn pace(&self, slot: &Mutex<Option<Instant>>, gap: Duration) {
        let mut last = slot.lock().await;
        let now = Instant::now();
        if let Some(prev) = *last {
            let elapsed = now.duration_since(prev);
            if elapsed < gap {
                tokio::time::sleep(gap - elapsed).await;
            }
        }
        // Re-read after the sleep so the gap measures actual dispatch
        *last = Some(Instant::now());
    }
}

impl Default for FixedDelayLimiter {
    /// Production pacing: 4s between deep calls, 1s between fast calls
    fn default() -> Self {
        Self::new(Duration::from_secs(4), Duration::from_secs(1))
    }
}

#[async_trait]
impl RateLimiter for FixedDelayLimiter {
    async fn acquire(&self, tier: ModelTier) {
        match tier {
            ModelTier::Deep => self.pace(&self.last_deep, self.deep_gap).await,
            ModelTier::Fast => self.pace(&self.last_fast, self.fast_gap).await,
        }
    }
}

/// No pacing at all; for tests
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelayLimiter;

#[async_trait]
impl RateLimiter for NoDelayLimiter {
    async fn acquire(&self, _tier: ModelTier) {}
}

/// A client wrapper that paces every call through a limiter
pub struct RateLimitedClient<C, L> {
    inner: C,
    limiter: L,
}

impl<C, L> RateLimitedClient<C, L> {
    /// Wrap `inner` so each call first acquires from `limiter`
    #[inline]
    #[must_use]
    pub fn new(inner: C, limiter: L) -> Self {
        Self { inner, limiter }
    }
}

#[async_trait]
impl<C, L> CompletionClient for RateLimitedClient<C, L>
where
    C: CompletionClient,
    L: RateLimiter,
{
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        self.limiter.acquire(request.tier).await;
        self.inner.complete(request).await
    }
}
