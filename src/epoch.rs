//! Recording epochs and epoch segmentation.
use std::cmp::Ordering;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::EphysError;

/// A half-open time interval [start, end), in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Epoch {
    start: f64,
    end: f64,
}

impl Epoch {
    /// Create a new epoch from its bounds.
    pub fn new(start: f64, end: f64) -> Result<Self, EphysError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(EphysError::InvalidTimes(format!(
                "epoch bounds must be finite, got [{}, {})",
                start, end
            )));
        }
        if start >= end {
            return Err(EphysError::InvalidParameter(format!(
                "epoch start must be strictly before its end, got [{}, {})",
                start, end
            )));
        }
        Ok(Epoch { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Duration of the epoch.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the epoch contains the given time (the end is excluded).
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}

/// An ordered collection of non-overlapping epochs.
///
/// The constructor sorts its inputs and merges overlapping or touching
/// epochs, so every value of this type satisfies the ordering and
/// non-overlap invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochSet {
    epochs: Vec<Epoch>,
}

impl EpochSet {
    pub fn new(mut epochs: Vec<Epoch>) -> Self {
        epochs.sort_by(|epoch_1, epoch_2| {
            if epoch_1.start < epoch_2.start {
                Ordering::Less
            } else if epoch_1.start > epoch_2.start {
                Ordering::Greater
            } else if epoch_1.end < epoch_2.end {
                Ordering::Less
            } else if epoch_1.end > epoch_2.end {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        });

        let mut merged: Vec<Epoch> = vec![];
        for epoch in epochs {
            match merged.last_mut() {
                Some(last) if epoch.start <= last.end => {
                    last.end = last.end.max(epoch.end);
                }
                _ => merged.push(epoch),
            }
        }

        EpochSet { epochs: merged }
    }

    /// Build an epoch set from parallel arrays of start and end times.
    pub fn from_bounds(starts: &[f64], ends: &[f64]) -> Result<Self, EphysError> {
        if starts.len() != ends.len() {
            return Err(EphysError::InvalidParameter(format!(
                "mismatched epoch bounds: {} starts and {} ends",
                starts.len(),
                ends.len()
            )));
        }
        let epochs = starts
            .iter()
            .zip(ends.iter())
            .map(|(&start, &end)| Epoch::new(start, end))
            .collect::<Result<Vec<Epoch>, EphysError>>()?;
        Ok(Self::new(epochs))
    }

    /// Build an epoch set holding a single epoch.
    pub fn single(start: f64, end: f64) -> Result<Self, EphysError> {
        Ok(EpochSet {
            epochs: vec![Epoch::new(start, end)?],
        })
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Epoch> {
        self.epochs.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<Epoch> {
        self.epochs.iter()
    }

    pub fn contains(&self, time: f64) -> bool {
        self.epochs.iter().any(|epoch| epoch.contains(time))
    }

    /// Sum of the durations of all epochs.
    pub fn total_duration(&self) -> f64 {
        self.epochs.iter().map(|epoch| epoch.duration()).sum()
    }

    /// The epoch spanning from the earliest start to the latest end, or
    /// `None` if the set is empty.
    pub fn time_span(&self) -> Option<Epoch> {
        match (self.epochs.first(), self.epochs.last()) {
            (Some(first), Some(last)) => Some(Epoch {
                start: first.start,
                end: last.end,
            }),
            _ => None,
        }
    }

    /// Split every epoch into fixed-duration, optionally overlapping
    /// sub-intervals.
    ///
    /// Starting from an epoch's start, a sub-interval `[t, t + interval_size)`
    /// is emitted while `t + interval_size` lies strictly before the epoch's
    /// end, and `t` then advances by `interval_size * (1.0 - overlap)`. An
    /// epoch whose duration is exactly `interval_size` therefore contributes
    /// no sub-interval, and no sub-interval ever crosses its parent's bounds.
    /// Sub-intervals of consecutive parents are emitted in parent order.
    ///
    /// Note that for `overlap > 0.0` consecutive sub-intervals overlap, so
    /// the output is a plain sequence rather than an [`EpochSet`].
    pub fn split_with_overlap(
        &self,
        interval_size: f64,
        overlap: f64,
    ) -> Result<Vec<Epoch>, EphysError> {
        if !interval_size.is_finite() || interval_size <= 0.0 {
            return Err(EphysError::InvalidParameter(format!(
                "interval_size must be positive and finite, got {}",
                interval_size
            )));
        }
        if !(0.0..1.0).contains(&overlap) {
            return Err(EphysError::InvalidParameter(format!(
                "overlap must be in [0.0, 1.0), got {}",
                overlap
            )));
        }

        let step = interval_size * (1.0 - overlap);
        let mut sub_epochs = vec![];
        for epoch in self.iter() {
            let mut t = epoch.start;
            while t + interval_size < epoch.end {
                sub_epochs.push(Epoch {
                    start: t,
                    end: t + interval_size,
                });
                t += step;
            }
        }
        debug!(
            "Split {} epochs into {} sub-intervals of {} s (overlap {})",
            self.len(),
            sub_epochs.len(),
            interval_size,
            overlap
        );
        Ok(sub_epochs)
    }
}
