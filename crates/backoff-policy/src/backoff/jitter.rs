//! Jitter applied on top of a computed backoff.

use crate::delay::BackoffDelay;
use crate::error::{BackoffError, Result};
use rand::Rng;
use std::time::Duration;

const NANOS_PER_SEC: i128 = 1_000_000_000;
const MAX_NANOS: i128 = Duration::MAX.as_nanos() as i128;

/// Randomizes a [`BackoffDelay`] within its bounds.
///
/// Jitter spreads retries from many clients over time so they do not hit a
/// recovering service in lockstep. It runs after the policy: the policy stays
/// deterministic and the orchestrator decides whether to perturb the result.
///
/// - [`Jitter::none`] returns the raw delay untouched.
/// - [`Jitter::random`] moves the delay by up to `factor * delay` in either
///   direction, never leaving `[min, max]`. A delay already outside the bounds
///   (an uncapped exponential value) is clamped into them instead.
///
/// # Examples
///
/// ```rust
/// use backoff_policy::{BackoffPolicy, Jitter, RetryContext};
/// use std::time::Duration;
///
/// # fn main() -> backoff_policy::Result<()> {
/// let policy = BackoffPolicy::exponential(
///     Duration::from_secs(1),
///     Some(Duration::from_secs(10)),
///     2,
///     false,
/// )?;
/// let jitter = Jitter::random(0.5)?;
///
/// let raw = policy.evaluate(&RetryContext::new(8, None));
/// assert_eq!(raw.delay(), Duration::from_secs(128));
/// assert!(jitter.apply(&raw) <= Duration::from_secs(10));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Jitter(Kind);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Kind {
    #[default]
    None,
    Random(f64),
}

impl Jitter {
    /// Random factor used by [`Jitter::random_default`].
    pub const DEFAULT_RANDOM_FACTOR: f64 = 0.5;

    /// No jitter.
    pub const fn none() -> Self {
        Self(Kind::None)
    }

    /// Random jitter of up to `factor * delay`.
    ///
    /// # Errors
    ///
    /// [`BackoffError::InvalidConfiguration`] unless `factor` is within
    /// `[0.0, 1.0]`.
    pub fn random(factor: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&factor) {
            return Err(BackoffError::invalid(format!(
                "random factor must be between 0 and 1, got {factor}"
            )));
        }
        Ok(Self(Kind::Random(factor)))
    }

    /// Random jitter with a factor of 0.5.
    pub const fn random_default() -> Self {
        Self(Kind::Random(Self::DEFAULT_RANDOM_FACTOR))
    }

    /// The random factor, or `None` when jitter is disabled.
    pub fn factor(&self) -> Option<f64> {
        match self.0 {
            Kind::None => None,
            Kind::Random(factor) => Some(factor),
        }
    }

    /// Apply jitter using the thread-local RNG.
    pub fn apply(&self, backoff: &BackoffDelay) -> Duration {
        self.apply_with(backoff, &mut rand::thread_rng())
    }

    /// Apply jitter using the given RNG.
    pub fn apply_with<R: Rng>(&self, backoff: &BackoffDelay, rng: &mut R) -> Duration {
        match self.0 {
            Kind::None => backoff.delay(),
            Kind::Random(factor) => random_jitter(backoff, factor, rng),
        }
    }
}

fn random_jitter<R: Rng>(backoff: &BackoffDelay, factor: f64, rng: &mut R) -> Duration {
    let delay = backoff.delay().as_nanos() as i128;
    let min = backoff.min().map_or(0, |d| d.as_nanos() as i128);
    let max = backoff.max().map_or(MAX_NANOS, |d| d.as_nanos() as i128);
    // float-to-int casts saturate
    let offset = (delay as f64 * factor) as i128;

    let low = (min - delay).max(-offset);
    let high = (max - delay).min(offset);
    if low > high {
        return backoff.capped();
    }

    let jitter = if low == high {
        low
    } else {
        rng.gen_range(low..=high)
    };
    from_nanos(delay + jitter)
}

fn from_nanos(nanos: i128) -> Duration {
    let nanos = nanos.clamp(0, MAX_NANOS);
    Duration::new(
        (nanos / NANOS_PER_SEC) as u64,
        (nanos % NANOS_PER_SEC) as u32,
    )
}
