//! Regularly sampled continuous signals.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::epoch::EpochSet;
use crate::error::EphysError;

/// A regularly sampled signal with one or more channels.
///
/// Samples are indexed by a strictly increasing time index, in seconds. The
/// nominal sampling rate is derived from the index, and the default time
/// support extends one sample period past the last sample so that every
/// sample lies inside the half-open support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    times: Vec<f64>,
    channels: Vec<Vec<f64>>,
    rate: f64,
    support: EpochSet,
}

impl Signal {
    /// Create a new multichannel signal from a time index and channel columns.
    pub fn new(times: Vec<f64>, channels: Vec<Vec<f64>>) -> Result<Self, EphysError> {
        let rate = Self::check_samples(&times, &channels)?;
        let support = EpochSet::single(times[0], times[times.len() - 1] + 1.0 / rate)?;
        debug!(
            "Built signal with {} channels of {} samples at {} Hz",
            channels.len(),
            times.len(),
            rate
        );
        Ok(Signal {
            times,
            channels,
            rate,
            support,
        })
    }

    /// Create a new single-channel signal from a time index and sample values.
    pub fn from_samples(times: Vec<f64>, values: Vec<f64>) -> Result<Self, EphysError> {
        Self::new(times, vec![values])
    }

    /// Create a new multichannel signal with an explicit time support.
    ///
    /// The support is taken as given; it typically holds the valid recording
    /// windows of a session with gaps.
    pub fn with_support(
        times: Vec<f64>,
        channels: Vec<Vec<f64>>,
        support: EpochSet,
    ) -> Result<Self, EphysError> {
        let rate = Self::check_samples(&times, &channels)?;
        Ok(Signal {
            times,
            channels,
            rate,
            support,
        })
    }

    fn check_samples(times: &[f64], channels: &[Vec<f64>]) -> Result<f64, EphysError> {
        if times.len() < 2 {
            return Err(EphysError::InvalidParameter(format!(
                "a signal needs at least two samples, got {}",
                times.len()
            )));
        }
        if times.iter().any(|t| !t.is_finite()) {
            return Err(EphysError::InvalidTimes(
                "signal times must be finite".to_string(),
            ));
        }
        if times.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(EphysError::InvalidTimes(
                "signal times must be strictly increasing".to_string(),
            ));
        }
        if channels.is_empty() {
            return Err(EphysError::InvalidParameter(
                "a signal needs at least one channel".to_string(),
            ));
        }
        if let Some(channel) = channels.iter().find(|channel| channel.len() != times.len()) {
            return Err(EphysError::InvalidParameter(format!(
                "mismatched channel length: expected {} samples, got {}",
                times.len(),
                channel.len()
            )));
        }

        let num_periods = (times.len() - 1) as f64;
        Ok(num_periods / (times[times.len() - 1] - times[0]))
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Nominal sampling rate, in samples per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn support(&self) -> &EpochSet {
        &self.support
    }

    pub fn num_samples(&self) -> usize {
        self.times.len()
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Sample values of the given channel.
    pub fn channel(&self, channel: usize) -> Option<&[f64]> {
        self.channels.get(channel).map(|values| values.as_slice())
    }

    /// Iterate over the channels in channel order.
    pub fn channels(&self) -> impl Iterator<Item = &[f64]> {
        self.channels.iter().map(|values| values.as_slice())
    }

    /// Half-open sample-index range of the samples with `start <= t < end`.
    pub fn slice_range(&self, start: f64, end: f64) -> (usize, usize) {
        let lo = self.times.partition_point(|&t| t < start);
        let hi = self.times.partition_point(|&t| t < end);
        (lo, hi)
    }
}
