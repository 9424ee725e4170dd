#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Pure backoff policies for retry loops.
//!
//! A retry orchestrator counts attempts, builds a [`RetryContext`] for each
//! retry and asks a [`Backoff`] how long to wait. This crate provides the
//! policies and nothing else: it never sleeps, never decides whether to retry
//! and holds no mutable state, so one policy can serve any number of
//! concurrent retry loops.
//!
//! - **Zero**: retry immediately
//! - **Fixed**: constant delay
//! - **Exponential**: `first * factor^(n-1)`, or `previous * factor` floored at
//!   `first` when built on the previous value, saturating instead of
//!   overflowing
//! - **Jitter**: optional randomization of a computed delay within its bounds
//! - **Configuration**: `serde`-friendly [`BackoffConfig`]
//!
//! Enable the `tracing` feature to get `debug!` events on construction,
//! `warn!` on rejected configuration and `trace!` on every evaluation.
//!
//! # Examples
//!
//! Using the prelude for convenient imports:
//!
//! ```rust
//! use backoff_policy::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> backoff_policy::Result<()> {
//! let policy = BackoffPolicy::exponential(
//!     Duration::from_millis(100),
//!     Some(Duration::from_secs(5)),
//!     2,
//!     true,
//! )?;
//! let jitter = Jitter::random_default();
//!
//! let mut context = RetryContext::first();
//! for _ in 0..5 {
//!     let wait = jitter.apply(&policy.evaluate(&context));
//!     assert!(wait <= Duration::from_secs(5));
//!     // the orchestrator sleeps for `wait` here, then retries
//!     context = context.next(wait);
//! }
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod config;
pub mod context;
pub mod delay;
pub mod error;


pub use backoff::{Backoff, BackoffPolicy, ExponentialBackoff, ExponentialBackoffBuilder, Jitter};
pub use config::BackoffConfig;
pub use context::RetryContext;
pub use delay::BackoffDelay;
pub use error::{BackoffError, Result};

/// Convenient re-exports of commonly used items.
///
/// Import everything with:
///
/// ```rust
/// use backoff_policy::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backoff::{Backoff, BackoffPolicy, ExponentialBackoff, Jitter};
    pub use crate::config::BackoffConfig;
    pub use crate::context::RetryContext;
    pub use crate::delay::BackoffDelay;
    pub use crate::error::BackoffError;
}
