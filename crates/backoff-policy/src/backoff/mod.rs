//! Backoff policies and jitter.
//!
//! # Key Types
//!
//! - [`Backoff`] - Core trait: `RetryContext -> BackoffDelay`
//! - [`BackoffPolicy`] - The built-in zero, fixed and exponential policies
//! - [`ExponentialBackoff`] - Exponential parameters and validated builder
//! - [`Jitter`] - Optional randomization applied to a computed delay

mod exponential;
mod jitter;
mod policy;

pub use exponential::{ExponentialBackoff, ExponentialBackoffBuilder};
pub use jitter::Jitter;
pub use policy::{Backoff, BackoffPolicy};

use crate::context::RetryContext;
use crate::delay::BackoffDelay;

/// Emit the per-evaluation `trace!` event and pass the delay through.
#[inline]
fn traced(strategy: &'static str, context: &RetryContext, delay: BackoffDelay) -> BackoffDelay {
    #[cfg(feature = "tracing")]
    tracing::trace!(
        strategy,
        iteration = context.iteration(),
        previous_backoff = ?context.previous_backoff(),
        delay = ?delay.delay(),
        "evaluated backoff"
    );
    #[cfg(not(feature = "tracing"))]
    let _ = (strategy, context);

    delay
}
