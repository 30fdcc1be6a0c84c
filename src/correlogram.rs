//! Binned correlograms between event trains.
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;

use crate::epoch::EpochSet;
use crate::error::EphysError;
use crate::events::{EventGroup, EventTrain};
use crate::frame::Frame;
use crate::units::TimeUnit;

/// Minimum number of correlogram columns to compute them in parallel.
pub const MIN_COLUMNS_PAR: usize = 8;

/// Correlogram input: a single event group, or an ordered pair of groups.
#[derive(Debug, Clone, Copy)]
pub enum GroupInput<'a> {
    Single(&'a EventGroup),
    Pair(&'a EventGroup, &'a EventGroup),
}

impl<'a> From<&'a EventGroup> for GroupInput<'a> {
    fn from(group: &'a EventGroup) -> Self {
        GroupInput::Single(group)
    }
}

impl<'a> From<(&'a EventGroup, &'a EventGroup)> for GroupInput<'a> {
    fn from(groups: (&'a EventGroup, &'a EventGroup)) -> Self {
        GroupInput::Pair(groups.0, groups.1)
    }
}

/// Number of lag bins and effective half-width of the lag range.
///
/// The bin count is `floor(2 * window_size / bin_size) + 1`, forced to the
/// next odd number so that the layout is symmetric around the central bin.
fn bin_layout(bin_size: f64, window_size: f64) -> (usize, f64) {
    let mut nbins = (2.0 * window_size / bin_size).floor() as usize + 1;
    if nbins % 2 == 0 {
        nbins += 1;
    }
    let half_width = (nbins as f64 / 2.0) * bin_size;
    (nbins, half_width)
}

/// Lag-bin centers, symmetric around zero and spaced by the bin size.
fn bin_centers(bin_size: f64, window_size: f64) -> Vec<f64> {
    let (nbins, half_width) = bin_layout(bin_size, window_size);
    let first_center = -half_width + bin_size / 2.0;
    (0..nbins)
        .map(|j| first_center + j as f64 * bin_size)
        .collect()
}

/// Compute the binned cross-correlogram between two ascending event-time
/// sequences.
///
/// For every reference time in `times_a`, the events of `times_b` are counted
/// into half-open lag bins covering `[-window_size, window_size]`, walking
/// both sequences with a single merge cursor. The accumulated counts are
/// divided by `times_a.len() * bin_size`, giving the average rate of `times_b`
/// events around a reference event; an empty `times_a` therefore yields NaN
/// counts. When both arguments are the same train, an event pairs with itself
/// at lag zero, so the central bin counts every event once.
///
/// Returns the counts and the lag-bin centers. Both inputs must be sorted in
/// ascending order; `bin_size` and `window_size` must be positive.
pub fn cross_correlogram(
    times_a: &[f64],
    times_b: &[f64],
    bin_size: f64,
    window_size: f64,
) -> (Vec<f64>, Vec<f64>) {
    let (nbins, half_width) = bin_layout(bin_size, window_size);
    let mut counts = vec![0.0; nbins];

    let mut start = 0;
    for &reference in times_a {
        let lbound = reference - half_width;
        while start > 0 && times_b[start - 1] >= lbound {
            start -= 1;
        }
        while start < times_b.len() && times_b[start] < lbound {
            start += 1;
        }

        let mut position = start;
        let mut rbound = lbound;
        for count in counts.iter_mut() {
            rbound += bin_size;
            let mut hits = 0;
            while position < times_b.len() && times_b[position] < rbound {
                position += 1;
                hits += 1;
            }
            *count += hits as f64;
        }
    }

    let scale = times_a.len() as f64 * bin_size;
    counts.iter_mut().for_each(|count| *count /= scale);

    (counts, bin_centers(bin_size, window_size))
}

/// Compute the autocorrelogram of every unit in a group.
///
/// Each unit's train is correlated against itself. With `norm`, the column is
/// divided by the unit's mean firing rate. The central (zero-lag) row, which
/// would count every event against itself, is zeroed. With `epochs`, trains
/// are restricted first and rates recomputed over the restricted support.
///
/// Accepts a single group; a pair of groups is rejected as an unknown format.
pub fn compute_autocorrelogram<'a, G>(
    group: G,
    bin_size: f64,
    window_size: f64,
    epochs: Option<&EpochSet>,
    time_unit: TimeUnit,
    norm: bool,
) -> Result<Frame<usize, f64>, EphysError>
where
    G: Into<GroupInput<'a>>,
{
    let group = match group.into() {
        GroupInput::Single(group) => group,
        GroupInput::Pair(_, _) => return Err(EphysError::UnknownGroupFormat),
    };
    let (bin_size, window_size) =
        check_correlogram_parameters(bin_size, window_size, epochs, time_unit)?;

    let restricted;
    let group = match epochs {
        Some(epochs) => {
            restricted = group.restrict(epochs);
            &restricted
        }
        None => group,
    };

    let jobs = group
        .iter_with_rates()
        .map(|(id, train, rate)| (id, train, train, rate))
        .collect::<Vec<(usize, &EventTrain, &EventTrain, f64)>>();
    let (keys, mut columns) = correlogram_columns(&jobs, bin_size, window_size, norm);

    let centers = bin_centers(bin_size, window_size);
    let center_row = centers.len() / 2;
    for column in columns.iter_mut() {
        column[center_row] = 0.0;
    }

    Frame::new(centers, keys, columns)
}

/// Compute the cross-correlogram of every pair of units.
///
/// With a single group, every unordered pair of distinct units is analyzed in
/// ascending combination order; `reverse` swaps each pair so that the second
/// unit becomes the reference. With a pair of groups, every unit of the first
/// group is correlated against every unit of the second (Cartesian product),
/// and `reverse` does not apply; swap the groups instead.
///
/// Column `(a, b)` holds the correlogram of reference `a` against target `b`;
/// with `norm`, it is divided by the rate of the second unit `b`. With
/// `epochs`, trains are restricted first and rates recomputed.
pub fn compute_crosscorrelogram<'a, G>(
    groups: G,
    bin_size: f64,
    window_size: f64,
    epochs: Option<&EpochSet>,
    time_unit: TimeUnit,
    norm: bool,
    reverse: bool,
) -> Result<Frame<(usize, usize), f64>, EphysError>
where
    G: Into<GroupInput<'a>>,
{
    let input = groups.into();
    let (bin_size, window_size) =
        check_correlogram_parameters(bin_size, window_size, epochs, time_unit)?;

    let (keys, columns) = match input {
        GroupInput::Single(group) => {
            let restricted;
            let group = match epochs {
                Some(epochs) => {
                    restricted = group.restrict(epochs);
                    &restricted
                }
                None => group,
            };

            let units = group
                .iter_with_rates()
                .collect::<Vec<(usize, &EventTrain, f64)>>();
            let mut pairs = units
                .iter()
                .copied()
                .tuple_combinations()
                .collect::<Vec<((usize, &EventTrain, f64), (usize, &EventTrain, f64))>>();
            if reverse {
                pairs = pairs.into_iter().map(|(unit_a, unit_b)| (unit_b, unit_a)).collect();
            }
            let jobs = pairs
                .into_iter()
                .map(|((id_a, train_a, _), (id_b, train_b, rate_b))| {
                    ((id_a, id_b), train_a, train_b, rate_b)
                })
                .collect::<Vec<((usize, usize), &EventTrain, &EventTrain, f64)>>();
            correlogram_columns(&jobs, bin_size, window_size, norm)
        }
        GroupInput::Pair(group_1, group_2) => {
            let restricted_1;
            let group_1 = match epochs {
                Some(epochs) => {
                    restricted_1 = group_1.restrict(epochs);
                    &restricted_1
                }
                None => group_1,
            };
            let restricted_2;
            let group_2 = match epochs {
                Some(epochs) => {
                    restricted_2 = group_2.restrict(epochs);
                    &restricted_2
                }
                None => group_2,
            };

            let jobs = group_1
                .iter()
                .cartesian_product(group_2.iter_with_rates().collect::<Vec<_>>())
                .map(|((id_a, train_a), (id_b, train_b, rate_b))| {
                    ((id_a, id_b), train_a, train_b, rate_b)
                })
                .collect::<Vec<((usize, usize), &EventTrain, &EventTrain, f64)>>();
            correlogram_columns(&jobs, bin_size, window_size, norm)
        }
    };

    Frame::new(bin_centers(bin_size, window_size), keys, columns)
}

/// Compute the correlogram of every unit in a group against a fixed
/// reference train.
///
/// Each column holds the correlogram with the reference train as reference
/// and the unit's train as target, i.e., the average rate of unit events
/// around a reference event. With `norm`, the column is divided by the
/// unit's rate. With `epochs`, the reference and the group are both
/// restricted first.
///
/// Accepts a single group; a pair of groups is rejected as an unknown format.
pub fn compute_eventcorrelogram<'a, G>(
    group: G,
    reference: &EventTrain,
    bin_size: f64,
    window_size: f64,
    epochs: Option<&EpochSet>,
    time_unit: TimeUnit,
    norm: bool,
) -> Result<Frame<usize, f64>, EphysError>
where
    G: Into<GroupInput<'a>>,
{
    let group = match group.into() {
        GroupInput::Single(group) => group,
        GroupInput::Pair(_, _) => return Err(EphysError::UnknownGroupFormat),
    };
    let (bin_size, window_size) =
        check_correlogram_parameters(bin_size, window_size, epochs, time_unit)?;

    let restricted_group;
    let group = match epochs {
        Some(epochs) => {
            restricted_group = group.restrict(epochs);
            &restricted_group
        }
        None => group,
    };
    let restricted_reference;
    let reference = match epochs {
        Some(epochs) => {
            restricted_reference = reference.restrict(epochs);
            &restricted_reference
        }
        None => reference,
    };

    let jobs = group
        .iter_with_rates()
        .map(|(id, train, rate)| (id, reference, train, rate))
        .collect::<Vec<(usize, &EventTrain, &EventTrain, f64)>>();
    let (keys, columns) = correlogram_columns(&jobs, bin_size, window_size, norm);

    Frame::new(bin_centers(bin_size, window_size), keys, columns)
}

/// Convert and validate the lag parameters shared by all correlogram entry
/// points.
fn check_correlogram_parameters(
    bin_size: f64,
    window_size: f64,
    epochs: Option<&EpochSet>,
    time_unit: TimeUnit,
) -> Result<(f64, f64), EphysError> {
    let bin_size = time_unit.to_seconds(bin_size);
    let window_size = time_unit.to_seconds(window_size);
    if !bin_size.is_finite() || bin_size <= 0.0 {
        return Err(EphysError::InvalidParameter(format!(
            "bin_size must be positive and finite, got {} s",
            bin_size
        )));
    }
    if !window_size.is_finite() || window_size <= 0.0 {
        return Err(EphysError::InvalidParameter(format!(
            "window_size must be positive and finite, got {} s",
            window_size
        )));
    }
    if let Some(epochs) = epochs {
        if epochs.is_empty() {
            return Err(EphysError::InvalidParameter(
                "epochs must contain at least one epoch".to_string(),
            ));
        }
    }
    Ok((bin_size, window_size))
}

/// Compute one correlogram column per (key, reference, target, rate) job,
/// in parallel above [`MIN_COLUMNS_PAR`] columns.
fn correlogram_columns<K: Copy + Send + Sync>(
    jobs: &[(K, &EventTrain, &EventTrain, f64)],
    bin_size: f64,
    window_size: f64,
    norm: bool,
) -> (Vec<K>, Vec<Vec<f64>>) {
    let compute = |reference: &EventTrain, target: &EventTrain, rate: f64| -> Vec<f64> {
        let (mut counts, _) =
            cross_correlogram(reference.times(), target.times(), bin_size, window_size);
        if norm {
            counts.iter_mut().for_each(|count| *count /= rate);
        }
        counts
    };

    let columns = if jobs.len() >= MIN_COLUMNS_PAR {
        jobs.par_iter()
            .map(|&(_, reference, target, rate)| compute(reference, target, rate))
            .collect::<Vec<Vec<f64>>>()
    } else {
        jobs.iter()
            .map(|&(_, reference, target, rate)| compute(reference, target, rate))
            .collect::<Vec<Vec<f64>>>()
    };
    let keys = jobs.iter().map(|&(key, _, _, _)| key).collect::<Vec<K>>();
    debug!(
        "Computed {} correlogram columns of {} lag bins each",
        keys.len(),
        columns.first().map_or(0, |column| column.len())
    );
    (keys, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_layout_is_odd_and_symmetric() {
        let (counts, centers) = cross_correlogram(&[0.0], &[0.0], 1.0, 100.0);
        assert_eq!(counts.len(), 201);
        let expected = (-100..=100).map(|lag| lag as f64).collect::<Vec<f64>>();
        assert_eq!(centers, expected);

        // An even raw bin count is bumped to the next odd number.
        let (counts, centers) = cross_correlogram(&[0.0], &[0.0], 1.0, 100.5);
        assert_eq!(counts.len(), 203);
        for (left, right) in centers.iter().zip(centers.iter().rev()) {
            assert!((left + right).abs() < 1e-9);
        }
    }

    #[test]
    fn test_cross_correlogram_unit_lag() {
        let (counts, _) = cross_correlogram(&[0.0], &[1.0], 1.0, 100.0);
        for (position, count) in counts.iter().enumerate() {
            let expected = if position == 101 { 1.0 } else { 0.0 };
            assert_eq!(*count, expected);
        }

        let (counts, _) = cross_correlogram(&[1.0], &[0.0], 1.0, 100.0);
        for (position, count) in counts.iter().enumerate() {
            let expected = if position == 99 { 1.0 } else { 0.0 };
            assert_eq!(*count, expected);
        }
    }

    #[test]
    fn test_cross_correlogram_window_edge_lag() {
        let (counts, _) = cross_correlogram(&[0.0], &[100.0], 1.0, 100.0);
        assert_eq!(counts[200], 1.0);
        assert_eq!(counts.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn test_cross_correlogram_scales_counts_by_bin_size() {
        // A single pair at lag +1 in 0.5 s bins.
        let (counts, centers) = cross_correlogram(&[0.0], &[1.0], 0.5, 2.0);
        assert_eq!(counts.len(), 9);
        assert_eq!(centers[4], 0.0);
        assert_eq!(counts[6], 2.0);
        assert_eq!(counts.iter().sum::<f64>(), 2.0);

        // The same pair in 1 s bins counts half the rate.
        let (counts, _) = cross_correlogram(&[0.0], &[1.0], 1.0, 2.0);
        assert_eq!(counts[3], 1.0);
        assert_eq!(counts.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn test_cross_correlogram_counts_self_pairs() {
        let (counts, _) = cross_correlogram(&[0.0, 10.0], &[0.0, 10.0], 1.0, 100.0);
        assert_eq!(counts[100], 1.0);
        assert_eq!(counts[90], 0.5);
        assert_eq!(counts[110], 0.5);
        assert_eq!(counts.iter().sum::<f64>(), 2.0);
    }

    #[test]
    fn test_cross_correlogram_triangle() {
        for num_events in [100usize, 200] {
            let times = (0..num_events).map(|t| t as f64).collect::<Vec<f64>>();
            let (counts, _) =
                cross_correlogram(&times, &times, 1.0, num_events as f64);
            assert_eq!(counts.len(), 2 * num_events + 1);
            for (position, count) in counts.iter().enumerate() {
                let lag = position as i64 - num_events as i64;
                let expected =
                    (num_events as i64 - lag.abs()) as f64 / num_events as f64;
                assert!((count - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_cross_correlogram_empty_reference_is_nan() {
        let (counts, _) = cross_correlogram(&[], &[1.0, 2.0], 1.0, 10.0);
        assert!(counts.iter().all(|count| count.is_nan()));
    }

    #[test]
    fn test_group_input_conversions() {
        let group = EventGroup::new(vec![
            (0, EventTrain::new(vec![0.0, 1.0]).unwrap()),
            (1, EventTrain::new(vec![0.5, 2.0]).unwrap()),
        ])
        .unwrap();

        assert!(matches!(GroupInput::from(&group), GroupInput::Single(_)));
        assert!(matches!(
            GroupInput::from((&group, &group)),
            GroupInput::Pair(_, _)
        ));
    }
}
