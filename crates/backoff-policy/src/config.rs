//! Serializable policy configuration.

use crate::backoff::BackoffPolicy;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_factor() -> u32 {
    2
}

/// Declarative description of a [`BackoffPolicy`], suitable for config files.
///
/// Internally tagged by `strategy`; durations are in milliseconds.
///
/// ```toml
/// strategy = "exponential"
/// first_backoff_ms = 100
/// max_backoff_ms = 30000
/// factor = 2
/// based_on_previous_value = true
/// ```
///
/// # Examples
///
/// ```rust
/// use backoff_policy::{BackoffConfig, RetryContext};
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config: BackoffConfig = serde_json::from_str(
///     r#"{"strategy": "fixed", "interval_ms": 250}"#,
/// )?;
/// let policy = config.build()?;
///
/// assert_eq!(
///     policy.evaluate(&RetryContext::first()).delay(),
///     Duration::from_millis(250)
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BackoffConfig {
    /// See [`BackoffPolicy::zero`].
    #[default]
    Zero,

    /// See [`BackoffPolicy::fixed`].
    Fixed {
        /// Constant delay between attempts
        interval_ms: u64,
    },

    /// See [`BackoffPolicy::exponential`].
    Exponential {
        /// Delay before the first retry
        first_backoff_ms: u64,

        /// Ceiling; absent means unbounded
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_backoff_ms: Option<u64>,

        /// Growth multiplier
        #[serde(default = "default_factor")]
        factor: u32,

        /// Grow from the previously applied delay
        #[serde(default)]
        based_on_previous_value: bool,
    },
}

impl BackoffConfig {
    /// Validate and turn the configuration into a policy.
    ///
    /// # Errors
    ///
    /// Same as [`BackoffPolicy::exponential`].
    pub fn build(&self) -> Result<BackoffPolicy> {
        match *self {
            Self::Zero => Ok(BackoffPolicy::zero()),
            Self::Fixed { interval_ms } => {
                Ok(BackoffPolicy::fixed(Duration::from_millis(interval_ms)))
            }
            Self::Exponential {
                first_backoff_ms,
                max_backoff_ms,
                factor,
                based_on_previous_value,
            } => BackoffPolicy::exponential(
                Duration::from_millis(first_backoff_ms),
                max_backoff_ms.map(Duration::from_millis),
                factor,
                based_on_previous_value,
            ),
        }
    }
}

impl TryFrom<BackoffConfig> for BackoffPolicy {
    type Error = crate::error::BackoffError;

    fn try_from(config: BackoffConfig) -> Result<Self> {
        config.build()
    }
}
