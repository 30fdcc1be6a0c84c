//! Time units for duration parameters.
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EphysError;

/// Number of nanoseconds per second, used to round converted durations.
const NANOSECONDS_PER_SECOND: f64 = 1e9;

/// Time units accepted for duration parameters, e.g., bin sizes and interval sizes.
///
/// All computations are carried out in seconds; durations expressed in any
/// other unit are converted first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    #[default]
    Seconds,
    Milliseconds,
    Microseconds,
}

impl TimeUnit {
    /// Convert a duration expressed in this unit to seconds.
    ///
    /// The result is rounded to the nearest nanosecond, so equivalent durations
    /// expressed in different units convert to the same number of seconds.
    pub fn to_seconds(&self, value: f64) -> f64 {
        let seconds = match self {
            TimeUnit::Seconds => value,
            TimeUnit::Milliseconds => value * 1e-3,
            TimeUnit::Microseconds => value * 1e-6,
        };
        (seconds * NANOSECONDS_PER_SECOND).round() / NANOSECONDS_PER_SECOND
    }
}

impl FromStr for TimeUnit {
    type Err = EphysError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" => Ok(TimeUnit::Seconds),
            "ms" => Ok(TimeUnit::Milliseconds),
            "us" => Ok(TimeUnit::Microseconds),
            _ => Err(EphysError::InvalidParameter(format!(
                "unknown time unit '{}', expected 's', 'ms' or 'us'",
                s
            ))),
        }
    }
}
