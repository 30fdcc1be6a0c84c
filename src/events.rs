//! Event trains and grouped units.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::epoch::EpochSet;
use crate::error::EphysError;

/// A sorted sequence of event timestamps belonging to one unit, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTrain {
    times: Vec<f64>,
}

impl EventTrain {
    /// Create a new event train, sorting the timestamps.
    pub fn new(mut times: Vec<f64>) -> Result<Self, EphysError> {
        if times.iter().any(|t| !t.is_finite()) {
            return Err(EphysError::InvalidTimes(
                "event times must be finite".to_string(),
            ));
        }
        times.sort_by(|time_1, time_2| time_1.partial_cmp(time_2).unwrap());
        Ok(EventTrain { times })
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.times.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// The events falling inside the given epochs.
    ///
    /// Epochs are half-open, so an event exactly at an epoch's end is
    /// excluded.
    pub fn restrict(&self, epochs: &EpochSet) -> EventTrain {
        let mut times = vec![];
        for epoch in epochs.iter() {
            let lo = self.times.partition_point(|&t| t < epoch.start());
            let hi = self.times.partition_point(|&t| t < epoch.end());
            times.extend_from_slice(&self.times[lo..hi]);
        }
        EventTrain { times }
    }
}

/// An ordered collection of event trains, keyed by unit ID.
///
/// Units are kept sorted by ID. Each unit carries a mean firing rate, defined
/// as its event count divided by the total duration of the group's time
/// support; the rate is recomputed whenever the group is restricted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventGroup {
    units: Vec<(usize, EventTrain)>,
    rates: Vec<f64>,
    support: EpochSet,
}

impl EventGroup {
    /// Create a new group, deriving its support from the events.
    ///
    /// The derived support is the single epoch spanning the earliest to the
    /// latest event across all units.
    pub fn new(units: Vec<(usize, EventTrain)>) -> Result<Self, EphysError> {
        let units = Self::check_units(units)?;

        let start = units
            .iter()
            .filter_map(|(_, train)| train.first())
            .fold(f64::INFINITY, f64::min);
        let end = units
            .iter()
            .filter_map(|(_, train)| train.last())
            .fold(f64::NEG_INFINITY, f64::max);
        if start > end {
            return Err(EphysError::InvalidParameter(
                "cannot derive a time support from a group with no events".to_string(),
            ));
        }
        if start == end {
            return Err(EphysError::InvalidParameter(
                "cannot derive a time support from a single event time; use with_support"
                    .to_string(),
            ));
        }
        let support = EpochSet::single(start, end)?;

        let rates = Self::compute_rates(&units, &support);
        debug!(
            "Built event group with {} units over {} s of support",
            units.len(),
            support.total_duration()
        );
        Ok(EventGroup {
            units,
            rates,
            support,
        })
    }

    /// Create a new group with an explicit time support.
    ///
    /// Every train is restricted to the support, and rates are computed over
    /// the support's total duration.
    pub fn with_support(
        units: Vec<(usize, EventTrain)>,
        support: EpochSet,
    ) -> Result<Self, EphysError> {
        if support.is_empty() {
            return Err(EphysError::InvalidParameter(
                "the time support of a group must contain at least one epoch".to_string(),
            ));
        }
        let units = Self::check_units(units)?
            .into_iter()
            .map(|(id, train)| (id, train.restrict(&support)))
            .collect::<Vec<(usize, EventTrain)>>();

        let rates = Self::compute_rates(&units, &support);
        Ok(EventGroup {
            units,
            rates,
            support,
        })
    }

    /// The group restricted to the given epochs, with recomputed rates.
    pub fn restrict(&self, epochs: &EpochSet) -> EventGroup {
        let units = self
            .units
            .iter()
            .map(|(id, train)| (*id, train.restrict(epochs)))
            .collect::<Vec<(usize, EventTrain)>>();
        let rates = Self::compute_rates(&units, epochs);
        EventGroup {
            units,
            rates,
            support: epochs.clone(),
        }
    }

    fn check_units(
        mut units: Vec<(usize, EventTrain)>,
    ) -> Result<Vec<(usize, EventTrain)>, EphysError> {
        if units.is_empty() {
            return Err(EphysError::InvalidParameter(
                "a group needs at least one unit".to_string(),
            ));
        }
        units.sort_by_key(|(id, _)| *id);
        if let Some(pair) = units.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(EphysError::InvalidParameter(format!(
                "duplicate unit ID {} in group",
                pair[0].0
            )));
        }
        Ok(units)
    }

    fn compute_rates(units: &[(usize, EventTrain)], support: &EpochSet) -> Vec<f64> {
        let duration = support.total_duration();
        units
            .iter()
            .map(|(_, train)| train.len() as f64 / duration)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn support(&self) -> &EpochSet {
        &self.support
    }

    /// Unit IDs, in ascending order.
    pub fn unit_ids(&self) -> Vec<usize> {
        self.units.iter().map(|(id, _)| *id).collect()
    }

    /// The event train of the given unit.
    pub fn train(&self, id: usize) -> Option<&EventTrain> {
        self.units
            .binary_search_by_key(&id, |(unit_id, _)| *unit_id)
            .ok()
            .map(|position| &self.units[position].1)
    }

    /// The mean firing rate of the given unit, in events per second.
    pub fn rate(&self, id: usize) -> Option<f64> {
        self.units
            .binary_search_by_key(&id, |(unit_id, _)| *unit_id)
            .ok()
            .map(|position| self.rates[position])
    }

    /// Iterate over (unit ID, train) pairs in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &EventTrain)> {
        self.units.iter().map(|(id, train)| (*id, train))
    }

    /// Iterate over (unit ID, train, mean rate) triples in ascending ID order.
    pub fn iter_with_rates(&self) -> impl Iterator<Item = (usize, &EventTrain, f64)> {
        self.units
            .iter()
            .zip(self.rates.iter())
            .map(|((id, train), rate)| (*id, train, *rate))
    }
}
