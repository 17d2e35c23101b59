//! Pilot Completion - the external completion service seam
//!
//! The completion service is an opaque external capability: one request
//! (model id, token budget, temperature, prompt) in, raw text out. This
//! crate defines the trait every phase runner calls through, the error
//! taxonomy for that boundary, a centralized fixed-delay rate limiter,
//! and the HTTP-backed live client.
//!
//! The client and its credential are stateless and safely shared across
//! all groups; calls are independent, so no locking is needed beyond the
//! rate limiter's own bookkeeping.

#![warn(unreachable_pub)]

pub mod client;
pub mod live;
pub mod rate_limit;

pub use client::{CompletionClient, CompletionError, CompletionRequest, ModelTier};
pub use live::LiveCompletionClient;
pub use rate_limit::{FixedDelayLimiter, NoDelayLimiter, RateLimitedClient, RateLimiter};
