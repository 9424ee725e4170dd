//! Output of a backoff evaluation.

use std::time::Duration;

/// Delay to wait before the next attempt, plus the bounds a jitter step may
/// use.
///
/// Bounded delays come from the exponential strategy: `min` is the first
/// backoff and `max` is the configured ceiling. The exponential strategy does
/// not clamp `delay` itself, so `delay` may exceed `max`; apply
/// [`Jitter`](crate::Jitter) or call [`BackoffDelay::capped`] before sleeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackoffDelay {
    delay: Duration,
    min: Option<Duration>,
    max: Option<Duration>,
}

impl BackoffDelay {
    /// No wait.
    pub const ZERO: BackoffDelay = BackoffDelay::new(Duration::ZERO);

    /// An unbounded delay.
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            min: None,
            max: None,
        }
    }

    /// A delay with jitter bounds attached.
    ///
    /// `min` must not exceed `max`; this is checked in debug builds.
    pub const fn bounded(min: Duration, max: Option<Duration>, delay: Duration) -> Self {
        if let Some(max) = max {
            debug_assert!(
                min.as_nanos() <= max.as_nanos(),
                "backoff min bound exceeds max bound"
            );
        }
        Self {
            delay,
            min: Some(min),
            max,
        }
    }

    /// The raw computed delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Lower bound for jitter, if any.
    pub fn min(&self) -> Option<Duration> {
        self.min
    }

    /// Upper bound for jitter, if any.
    pub fn max(&self) -> Option<Duration> {
        self.max
    }

    /// Whether this delay means "retry immediately".
    pub fn is_zero(&self) -> bool {
        self.delay.is_zero()
    }

    /// The delay clamped into `[min, max]`.
    ///
    /// Missing bounds do not constrain. Use this when no jitter is applied and
    /// the ceiling must still hold.
    ///
    /// ```rust
    /// use backoff_policy::BackoffDelay;
    /// use std::time::Duration;
    ///
    /// let delay = BackoffDelay::bounded(
    ///     Duration::from_secs(1),
    ///     Some(Duration::from_secs(5)),
    ///     Duration::from_secs(8),
    /// );
    /// assert_eq!(delay.capped(), Duration::from_secs(5));
    /// ```
    pub fn capped(&self) -> Duration {
        let mut delay = self.delay;
        if let Some(max) = self.max {
            delay = delay.min(max);
        }
        if let Some(min) = self.min {
            delay = delay.max(min);
        }
        delay
    }
}

impl Default for BackoffDelay {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<BackoffDelay> for Duration {
    fn from(value: BackoffDelay) -> Self {
        value.delay
    }
}
