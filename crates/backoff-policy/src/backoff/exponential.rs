//! Exponential backoff with an optional ceiling.

use crate::context::RetryContext;
use crate::delay::BackoffDelay;
use crate::error::{BackoffError, Result};
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Exponential backoff parameters.
///
/// Two evaluation modes are available:
///
/// - **Absolute** (`based_on_previous_value == false`): the delay for
///   iteration `n` is `first_backoff * factor^(n - 1)`.
/// - **Relative** (`based_on_previous_value == true`): the delay is
///   `previous_backoff * factor`, floored at `first_backoff`. Feeding back the
///   jittered delay that was actually waited keeps the growth exponential even
///   when every individual value is perturbed.
///
/// # Mathematical Formula
///
/// ```text
/// absolute: delay = first_backoff * factor^(iteration - 1)
/// relative: delay = max(first_backoff, previous_backoff * factor)
/// ```
///
/// Both modes saturate at [`Duration::MAX`] instead of overflowing. Neither
/// clamps the delay to `max_backoff`; the ceiling travels in the returned
/// [`BackoffDelay`] for the jitter step (or [`BackoffDelay::capped`]) to apply.
///
/// # Examples
///
/// ```rust
/// use backoff_policy::{ExponentialBackoff, RetryContext};
/// use std::time::Duration;
///
/// # fn main() -> backoff_policy::Result<()> {
/// let backoff = ExponentialBackoff::builder()
///     .first_backoff(Duration::from_secs(1))
///     .max_backoff(Duration::from_secs(30))
///     .factor(2)
///     .build()?;
///
/// let delay = backoff.evaluate(&RetryContext::new(4, None));
/// assert_eq!(delay.delay(), Duration::from_secs(8));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExponentialBackoff {
    first_backoff: Duration,
    max_backoff: Option<Duration>,
    factor: u32,
    based_on_previous_value: bool,
}

impl ExponentialBackoff {
    /// Create a new builder for configuring exponential backoff.
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// Delay used on the first retry and as the floor in relative mode.
    pub fn first_backoff(&self) -> Duration {
        self.first_backoff
    }

    /// Configured ceiling, if any.
    pub fn max_backoff(&self) -> Option<Duration> {
        self.max_backoff
    }

    /// Ceiling used for validation and absolute-mode bounds:
    /// [`Duration::MAX`] when no ceiling was configured.
    pub fn effective_max(&self) -> Duration {
        self.max_backoff.unwrap_or(Duration::MAX)
    }

    /// Growth multiplier.
    pub fn factor(&self) -> u32 {
        self.factor
    }

    /// Whether the relative mode is selected.
    pub fn based_on_previous_value(&self) -> bool {
        self.based_on_previous_value
    }

    /// Compute the delay for `context`.
    pub fn evaluate(&self, context: &RetryContext) -> BackoffDelay {
        if self.based_on_previous_value {
            super::traced(
                "relative",
                context,
                self.relative(context.previous_backoff()),
            )
        } else {
            super::traced("absolute", context, self.absolute(context.iteration()))
        }
    }

    fn absolute(&self, iteration: u32) -> BackoffDelay {
        let next = match u64::from(self.factor).checked_pow(iteration.saturating_sub(1)) {
            Some(multiplier) => saturating_mul(self.first_backoff, multiplier),
            None => Duration::MAX,
        };
        BackoffDelay::bounded(self.first_backoff, Some(self.effective_max()), next)
    }

    fn relative(&self, previous: Option<Duration>) -> BackoffDelay {
        let candidate = saturating_mul(previous.unwrap_or(Duration::ZERO), u64::from(self.factor));
        let next = candidate.max(self.first_backoff);
        BackoffDelay::bounded(self.first_backoff, self.max_backoff, next)
    }
}

/// Multiply a duration, saturating at [`Duration::MAX`].
pub(crate) fn saturating_mul(duration: Duration, multiplier: u64) -> Duration {
    let nanos = duration.as_nanos().saturating_mul(u128::from(multiplier));
    match u64::try_from(nanos / NANOS_PER_SEC) {
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}

/// Builder for [`ExponentialBackoff`].
///
/// `first_backoff` is required. `factor` defaults to 2, `max_backoff` to no
/// ceiling and the mode to absolute. All validation happens in
/// [`build`](Self::build).
#[derive(Debug, Default, Clone)]
pub struct ExponentialBackoffBuilder {
    first_backoff: Option<Duration>,
    max_backoff: Option<Duration>,
    factor: Option<u32>,
    based_on_previous_value: bool,
}

impl ExponentialBackoffBuilder {
    /// Set the delay before the first retry. Must be strictly positive.
    pub fn first_backoff(mut self, delay: Duration) -> Self {
        self.first_backoff = Some(delay);
        self
    }

    /// Set the ceiling. Must be strictly greater than the first backoff.
    pub fn max_backoff(mut self, delay: Duration) -> Self {
        self.max_backoff = Some(delay);
        self
    }

    /// Set or clear the ceiling.
    pub fn max_backoff_opt(mut self, delay: Option<Duration>) -> Self {
        self.max_backoff = delay;
        self
    }

    /// Set the growth multiplier. Must be at least 1.
    ///
    /// Default: 2
    pub fn factor(mut self, factor: u32) -> Self {
        self.factor = Some(factor);
        self
    }

    /// Grow from the previously applied delay instead of the iteration count.
    pub fn based_on_previous_value(mut self, enabled: bool) -> Self {
        self.based_on_previous_value = enabled;
        self
    }

    /// Validate the parameters and build the backoff.
    ///
    /// # Errors
    ///
    /// [`BackoffError::InvalidConfiguration`] when `first_backoff` is unset or
    /// zero, when the effective ceiling is not greater than `first_backoff`,
    /// or when `factor` is 0.
    pub fn build(self) -> Result<ExponentialBackoff> {
        let first_backoff = match self.first_backoff {
            Some(first) if !first.is_zero() => first,
            _ => return Err(BackoffError::invalid("firstBackoff must be > 0")),
        };

        if self.max_backoff.unwrap_or(Duration::MAX) <= first_backoff {
            return Err(BackoffError::invalid(format!(
                "maxBackoff ({:?}) must be greater than firstBackoff ({:?})",
                self.max_backoff.unwrap_or(Duration::MAX),
                first_backoff
            )));
        }

        let factor = self.factor.unwrap_or(2);
        if factor == 0 {
            return Err(BackoffError::invalid("factor must be >= 1"));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            first_backoff = ?first_backoff,
            max_backoff = ?self.max_backoff,
            factor,
            based_on_previous_value = self.based_on_previous_value,
            "built exponential backoff"
        );

        Ok(ExponentialBackoff {
            first_backoff,
            max_backoff: self.max_backoff,
            factor,
            based_on_previous_value: self.based_on_previous_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn absolute(first: Duration, max: Option<Duration>, factor: u32) -> ExponentialBackoff {
        ExponentialBackoff::builder()
            .first_backoff(first)
            .max_backoff_opt(max)
            .factor(factor)
            .build()
            .unwrap()
    }

    fn relative(first: Duration, max: Option<Duration>, factor: u32) -> ExponentialBackoff {
        ExponentialBackoff::builder()
            .first_backoff(first)
            .max_backoff_opt(max)
            .factor(factor)
            .based_on_previous_value(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_absolute_delay_calculation() {
        let backoff = absolute(secs(1), None, 2);

        // 1s * 2^0
        assert_eq!(
            backoff.evaluate(&RetryContext::new(1, None)).delay(),
            secs(1)
        );
        // 1s * 2^1
        assert_eq!(
            backoff.evaluate(&RetryContext::new(2, None)).delay(),
            secs(2)
        );
        // 1s * 2^3
        assert_eq!(
            backoff.evaluate(&RetryContext::new(4, None)).delay(),
            secs(8)
        );
    }

    #[test]
    fn test_absolute_ignores_previous_backoff() {
        let backoff = absolute(secs(1), None, 2);
        let ctx = RetryContext::new(3, Some(secs(100)));
        assert_eq!(backoff.evaluate(&ctx).delay(), secs(4));
    }

    #[test]
    fn test_absolute_carries_bounds_without_clamping() {
        let backoff = absolute(secs(1), Some(secs(5)), 2);
        let delay = backoff.evaluate(&RetryContext::new(5, None));

        assert_eq!(delay.delay(), secs(16));
        assert_eq!(delay.min(), Some(secs(1)));
        assert_eq!(delay.max(), Some(secs(5)));
        assert_eq!(delay.capped(), secs(5));
    }

    #[test]
    fn test_absolute_unbounded_uses_max_sentinel() {
        let backoff = absolute(secs(1), None, 2);
        let delay = backoff.evaluate(&RetryContext::first());
        assert_eq!(delay.max(), Some(Duration::MAX));
    }

    #[test]
    fn test_absolute_saturates() {
        let backoff = absolute(secs(1), None, 10);
        let delay = backoff.evaluate(&RetryContext::new(u32::MAX, None));
        assert_eq!(delay.delay(), Duration::MAX);

        // 10^20 overflows the u64 multiplier, still saturates
        let delay = backoff.evaluate(&RetryContext::new(21, None));
        assert_eq!(delay.delay(), Duration::MAX);
    }

    #[test]
    fn test_factor_one_is_constant() {
        let backoff = absolute(Duration::from_millis(300), None, 1);
        for iteration in 1..20 {
            let delay = backoff.evaluate(&RetryContext::new(iteration, None));
            assert_eq!(delay.delay(), Duration::from_millis(300));
        }

        let backoff = relative(Duration::from_millis(300), None, 1);
        let mut ctx = RetryContext::first();
        for _ in 0..5 {
            let delay = backoff.evaluate(&ctx).delay();
            assert_eq!(delay, Duration::from_millis(300));
            ctx = ctx.next(delay);
        }
    }

    #[test]
    fn test_relative_first_iteration_uses_floor() {
        let backoff = relative(secs(1), None, 2);
        let delay = backoff.evaluate(&RetryContext::first());

        assert_eq!(delay.delay(), secs(1));
        assert_eq!(delay.min(), Some(secs(1)));
        assert_eq!(delay.max(), None);
    }

    #[test]
    fn test_relative_feeds_back_previous() {
        let backoff = relative(secs(1), Some(secs(60)), 2);
        let ctx = RetryContext::first();
        let first = backoff.evaluate(&ctx).delay();
        let second = backoff.evaluate(&ctx.next(first)).delay();

        assert_eq!(first, secs(1));
        assert_eq!(second, secs(2));
        assert_eq!(
            backoff.evaluate(&RetryContext::new(2, Some(secs(1)))).max(),
            Some(secs(60))
        );
    }

    #[test]
    fn test_relative_clamps_below_floor() {
        let backoff = relative(secs(1), None, 2);
        for iteration in [1, 2, 7, 100] {
            let ctx = RetryContext::new(iteration, Some(Duration::from_millis(100)));
            assert_eq!(backoff.evaluate(&ctx).delay(), secs(1));
        }
    }

    #[test]
    fn test_relative_uses_jittered_previous() {
        let backoff = relative(Duration::from_millis(100), None, 3);
        let ctx = RetryContext::new(4, Some(Duration::from_millis(1_234)));
        assert_eq!(backoff.evaluate(&ctx).delay(), Duration::from_millis(3_702));
    }

    #[test]
    fn test_rejects_missing_first_backoff() {
        let err = ExponentialBackoff::builder().build().unwrap_err();
        assert!(matches!(err, BackoffError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_rejects_zero_first_backoff() {
        let err = ExponentialBackoff::builder()
            .first_backoff(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, BackoffError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_rejects_max_not_above_first() {
        for max in [secs(3), secs(5)] {
            let result = ExponentialBackoff::builder()
                .first_backoff(secs(5))
                .max_backoff(max)
                .build();
            assert!(matches!(result, Err(BackoffError::InvalidConfiguration(_))));
        }
    }

    #[test]
    fn test_rejects_first_equal_to_unbounded_sentinel() {
        let result = ExponentialBackoff::builder()
            .first_backoff(Duration::MAX)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_factor() {
        let result = ExponentialBackoff::builder()
            .first_backoff(secs(1))
            .factor(0)
            .build();
        assert!(matches!(result, Err(BackoffError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_builder_defaults() {
        let backoff = ExponentialBackoff::builder()
            .first_backoff(Duration::from_millis(100))
            .build()
            .unwrap();

        assert_eq!(backoff.first_backoff(), Duration::from_millis(100));
        assert_eq!(backoff.max_backoff(), None);
        assert_eq!(backoff.effective_max(), Duration::MAX);
        assert_eq!(backoff.factor(), 2);
        assert!(!backoff.based_on_previous_value());
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn test_every_evaluation_emits_one_trace_event() {
        use crate::backoff::{Backoff, BackoffPolicy};
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use tracing::span::{Attributes, Id, Record};
        use tracing::{Event, Level, Metadata, Subscriber};

        struct TraceCounter(Arc<AtomicUsize>);

        impl Subscriber for TraceCounter {
            fn enabled(&self, _: &Metadata<'_>) -> bool {
                true
            }
            fn new_span(&self, _: &Attributes<'_>) -> Id {
                Id::from_u64(1)
            }
            fn record(&self, _: &Id, _: &Record<'_>) {}
            fn record_follows_from(&self, _: &Id, _: &Id) {}
            fn event(&self, event: &Event<'_>) {
                if *event.metadata().level() == Level::TRACE {
                    self.0.fetch_add(1, Ordering::SeqCst);
                }
            }
            fn enter(&self, _: &Id) {}
            fn exit(&self, _: &Id) {}
        }

        let absolute_backoff = absolute(secs(1), None, 2);
        let relative_backoff = relative(secs(1), None, 2);
        let policy = BackoffPolicy::from(absolute_backoff);
        let ctx = RetryContext::first();

        let events = Arc::new(AtomicUsize::new(0));
        tracing::subscriber::with_default(TraceCounter(Arc::clone(&events)), || {
            absolute_backoff.evaluate(&ctx);
            Backoff::evaluate(&relative_backoff, &ctx);
            // wrapped in a policy: still a single event
            policy.evaluate(&ctx);
        });

        assert_eq!(events.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_saturating_mul() {
        assert_eq!(
            saturating_mul(Duration::from_millis(1_500), 3),
            Duration::from_millis(4_500)
        );
        assert_eq!(saturating_mul(Duration::from_nanos(7), 0), Duration::ZERO);
        assert_eq!(saturating_mul(Duration::MAX, 2), Duration::MAX);
        assert_eq!(saturating_mul(secs(u64::MAX / 2 + 1), 2), Duration::MAX);
    }
}
