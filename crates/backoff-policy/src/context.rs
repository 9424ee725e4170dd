//! Per-attempt input handed to a backoff policy.

use std::num::NonZeroU32;
use std::time::Duration;

/// Snapshot of the retry loop at the moment a backoff is requested.
///
/// The orchestrator builds a fresh context for every retry: `iteration` is
/// 1-based (1 on the first retry) and `previous_backoff` is the delay that was
/// actually waited last time, if any. Contexts are immutable; use
/// [`RetryContext::next`] to derive the one for the following attempt.
///
/// # Examples
///
/// ```rust
/// use backoff_policy::RetryContext;
/// use std::time::Duration;
///
/// let first = RetryContext::first();
/// assert_eq!(first.iteration(), 1);
/// assert_eq!(first.previous_backoff(), None);
///
/// let second = first.next(Duration::from_secs(1));
/// assert_eq!(second.iteration(), 2);
/// assert_eq!(second.previous_backoff(), Some(Duration::from_secs(1)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RetryContext {
    iteration: NonZeroU32,
    previous_backoff: Option<Duration>,
}

impl RetryContext {
    /// Build a context for the given attempt.
    ///
    /// An `iteration` of 0 is treated as the first retry.
    pub fn new(iteration: u32, previous_backoff: Option<Duration>) -> Self {
        Self {
            iteration: NonZeroU32::new(iteration).unwrap_or(NonZeroU32::MIN),
            previous_backoff,
        }
    }

    /// Context for the first retry: iteration 1, no previous delay.
    pub fn first() -> Self {
        Self::new(1, None)
    }

    /// Context for the attempt after this one, remembering `backoff` as the
    /// delay that was applied.
    pub fn next(self, backoff: Duration) -> Self {
        Self {
            iteration: self.iteration.saturating_add(1),
            previous_backoff: Some(backoff),
        }
    }

    /// 1-based retry number.
    pub fn iteration(&self) -> u32 {
        self.iteration.get()
    }

    /// Delay applied before the previous attempt.
    pub fn previous_backoff(&self) -> Option<Duration> {
        self.previous_backoff
    }
}

impl Default for RetryContext {
    fn default() -> Self {
        Self::first()
    }
}
