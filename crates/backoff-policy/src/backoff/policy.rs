//! The `Backoff` capability and the closed set of built-in policies.

use super::exponential::ExponentialBackoff;
use crate::context::RetryContext;
use crate::delay::BackoffDelay;
use crate::error::Result;
use std::time::Duration;

/// A pure function from retry context to backoff delay.
///
/// Implementations must be deterministic and side-effect free: the same
/// context always yields the same delay, and evaluation never fails. That
/// makes a single instance safe to share across any number of concurrent
/// retry loops.
///
/// Any `Fn(&RetryContext) -> BackoffDelay` closure is a `Backoff`, so custom
/// strategies plug into the same seam as [`BackoffPolicy`].
///
/// # Examples
///
/// ```rust
/// use backoff_policy::{Backoff, BackoffDelay, RetryContext};
/// use std::time::Duration;
///
/// // Linear backoff as a closure
/// let linear = |ctx: &RetryContext| {
///     BackoffDelay::new(Duration::from_millis(100) * ctx.iteration())
/// };
///
/// assert_eq!(
///     linear.evaluate(&RetryContext::new(3, None)).delay(),
///     Duration::from_millis(300)
/// );
/// ```
pub trait Backoff: Send + Sync {
    /// Compute the delay to wait before the attempt described by `context`.
    fn evaluate(&self, context: &RetryContext) -> BackoffDelay;
}

impl<F> Backoff for F
where
    F: Fn(&RetryContext) -> BackoffDelay + Send + Sync,
{
    fn evaluate(&self, context: &RetryContext) -> BackoffDelay {
        self(context)
    }
}

/// Built-in backoff policies.
///
/// Policies only hold the parameters captured at construction; two policies
/// built from the same parameters compare equal and produce identical
/// delays.
///
/// # Examples
///
/// ```rust
/// use backoff_policy::{BackoffPolicy, RetryContext};
/// use std::time::Duration;
///
/// # fn main() -> backoff_policy::Result<()> {
/// let policy = BackoffPolicy::exponential(
///     Duration::from_secs(1),
///     Some(Duration::from_secs(60)),
///     2,
///     false,
/// )?;
///
/// let ctx = RetryContext::first();
/// assert_eq!(policy.evaluate(&ctx).delay(), Duration::from_secs(1));
/// assert_eq!(
///     policy.evaluate(&ctx.next(Duration::from_secs(1))).delay(),
///     Duration::from_secs(2)
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackoffPolicy {
    /// Retry immediately.
    #[default]
    Zero,
    /// Wait the same interval before every retry.
    Fixed(Duration),
    /// Exponentially growing delay.
    Exponential(ExponentialBackoff),
}

impl BackoffPolicy {
    /// Policy with no backoff delay.
    pub fn zero() -> Self {
        Self::Zero
    }

    /// Policy with a constant delay.
    ///
    /// Any interval is accepted, including zero.
    pub fn fixed(interval: Duration) -> Self {
        #[cfg(feature = "tracing")]
        tracing::debug!(interval = ?interval, "built fixed backoff");
        Self::Fixed(interval)
    }

    /// Policy with an exponentially growing delay.
    ///
    /// With `based_on_previous_value == false` the delay for iteration `n` is
    /// `first_backoff * factor^(n - 1)`. Otherwise it is
    /// `previous_backoff * factor`, never below `first_backoff`. A `None`
    /// ceiling means unbounded. See [`ExponentialBackoff`] for details.
    ///
    /// # Errors
    ///
    /// [`BackoffError::InvalidConfiguration`](crate::BackoffError::InvalidConfiguration)
    /// when `first_backoff` is zero, when `max_backoff` is not greater than
    /// `first_backoff`, or when `factor` is 0.
    pub fn exponential(
        first_backoff: Duration,
        max_backoff: Option<Duration>,
        factor: u32,
        based_on_previous_value: bool,
    ) -> Result<Self> {
        ExponentialBackoff::builder()
            .first_backoff(first_backoff)
            .max_backoff_opt(max_backoff)
            .factor(factor)
            .based_on_previous_value(based_on_previous_value)
            .build()
            .map(Self::Exponential)
    }

    /// Compute the delay for `context`.
    pub fn evaluate(&self, context: &RetryContext) -> BackoffDelay {
        match self {
            Self::Zero => super::traced("zero", context, BackoffDelay::ZERO),
            Self::Fixed(interval) => {
                super::traced("fixed", context, BackoffDelay::new(*interval))
            }
            Self::Exponential(exponential) => exponential.evaluate(context),
        }
    }
}

impl Backoff for BackoffPolicy {
    fn evaluate(&self, context: &RetryContext) -> BackoffDelay {
        BackoffPolicy::evaluate(self, context)
    }
}

impl Backoff for ExponentialBackoff {
    fn evaluate(&self, context: &RetryContext) -> BackoffDelay {
        ExponentialBackoff::evaluate(self, context)
    }
}

impl From<ExponentialBackoff> for BackoffPolicy {
    fn from(value: ExponentialBackoff) -> Self {
        Self::Exponential(value)
    }
}
