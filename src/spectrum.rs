//! FFT-based power spectral density estimation.
use std::f64::consts::PI;

use log::debug;
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

use crate::epoch::EpochSet;
use crate::error::EphysError;
use crate::frame::Frame;
use crate::signal::Signal;
use crate::units::TimeUnit;

/// Spectral estimate: complex transform values keyed by frequency, one
/// column per signal channel.
pub type SpectrumFrame = Frame<usize, Complex64>;

/// Compute the power spectral density of a signal over a single epoch.
///
/// The resolved epoch set (`epochs`, or the signal's time support) must hold
/// exactly one epoch. One forward DFT is computed per channel over the
/// samples falling inside the epoch. The transform length defaults to the
/// number of restricted samples; an explicit `n` truncates or zero-pads the
/// input. With `norm`, every transform value is divided by the transform
/// length. The returned frame is indexed by frequency in ascending order,
/// keeping only non-negative frequencies unless `full_range` is set.
pub fn compute_power_spectral_density(
    signal: &Signal,
    sampling_rate: Option<f64>,
    epochs: Option<&EpochSet>,
    full_range: bool,
    norm: bool,
    n: Option<usize>,
) -> Result<SpectrumFrame, EphysError> {
    let epochs = epochs.unwrap_or_else(|| signal.support());
    if epochs.len() != 1 {
        return Err(EphysError::InvalidEpochCount {
            found: epochs.len(),
        });
    }
    let epoch = epochs.get(0).ok_or(EphysError::InvalidEpochCount { found: 0 })?;
    let fs = resolve_sampling_rate(signal, sampling_rate)?;
    if n == Some(0) {
        return Err(EphysError::InvalidParameter(
            "the transform length n must be positive".to_string(),
        ));
    }

    let (lo, hi) = signal.slice_range(epoch.start(), epoch.end());
    let num_samples = hi - lo;
    let transform_len = n.unwrap_or(num_samples);
    if transform_len == 0 {
        return Err(EphysError::IncompatibleData(
            "the epoch does not contain any sample; check the epochs or the signal time support"
                .to_string(),
        ));
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(transform_len);

    let mut columns = Vec::with_capacity(signal.num_channels());
    for values in signal.channels() {
        let slice = &values[lo..hi];
        let taken = slice.len().min(transform_len);
        let mut buffer = Vec::with_capacity(transform_len);
        buffer.extend(slice[..taken].iter().map(|&value| Complex64::new(value, 0.0)));
        buffer.resize(transform_len, Complex64::new(0.0, 0.0));
        fft.process(&mut buffer);
        if norm {
            let scale = transform_len as f64;
            buffer.iter_mut().for_each(|value| *value /= scale);
        }
        columns.push(buffer);
    }
    debug!(
        "Computed a {}-point spectrum for {} channels over [{}, {}) s",
        transform_len,
        columns.len(),
        epoch.start(),
        epoch.end()
    );

    assemble_frame(columns, transform_len, fs, full_range)
}

/// Compute an epoch-averaged (Welch-style) power spectral density.
///
/// Every epoch of the resolved epoch set is split into sub-intervals of
/// `interval_size` (expressed in `time_unit`) with the given `overlap`
/// fraction. Each sub-interval is windowed with a symmetric Hamming window
/// and transformed, and the complex spectra are summed across sub-intervals.
/// With `norm`, the sum is divided by the transform length times the number
/// of sub-intervals. Windowing reduces leakage from the finite segments, and
/// averaging many overlapping segments trades frequency resolution for a
/// lower-variance estimate.
#[allow(clippy::too_many_arguments)]
pub fn compute_mean_power_spectral_density(
    signal: &Signal,
    interval_size: f64,
    sampling_rate: Option<f64>,
    overlap: f64,
    epochs: Option<&EpochSet>,
    full_range: bool,
    norm: bool,
    time_unit: TimeUnit,
) -> Result<SpectrumFrame, EphysError> {
    if !(0.0..1.0).contains(&overlap) {
        return Err(EphysError::InvalidParameter(format!(
            "overlap must be in [0.0, 1.0), got {}",
            overlap
        )));
    }
    if !interval_size.is_finite() || interval_size <= 0.0 {
        return Err(EphysError::InvalidParameter(format!(
            "interval_size must be positive and finite, got {}",
            interval_size
        )));
    }
    let fs = resolve_sampling_rate(signal, sampling_rate)?;
    let epochs = epochs.unwrap_or_else(|| signal.support());
    let interval_size = time_unit.to_seconds(interval_size);

    let empty_split = || {
        EphysError::IncompatibleData(format!(
            "splitting epochs with interval_size={} generated an empty epoch set; try decreasing interval_size",
            interval_size
        ))
    };
    let max_duration = epochs
        .iter()
        .map(|epoch| epoch.duration())
        .fold(0.0, f64::max);
    if max_duration < interval_size {
        return Err(empty_split());
    }
    let sub_epochs = epochs.split_with_overlap(interval_size, overlap)?;
    if sub_epochs.is_empty() {
        return Err(empty_split());
    }

    let slices = sub_epochs
        .iter()
        .map(|sub_epoch| signal.slice_range(sub_epoch.start(), sub_epoch.end()))
        .collect::<Vec<(usize, usize)>>();
    let transform_len = slices
        .iter()
        .map(|(lo, hi)| hi - lo)
        .min()
        .ok_or_else(empty_split)?;
    if transform_len == 0 {
        return Err(EphysError::IncompatibleData(
            "one sub-interval does not contain any sample; check the epochs or the signal time support"
                .to_string(),
        ));
    }

    let window = hamming_window(transform_len);
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(transform_len);

    let mut accumulated =
        vec![vec![Complex64::new(0.0, 0.0); transform_len]; signal.num_channels()];
    let mut buffer = vec![Complex64::new(0.0, 0.0); transform_len];
    for &(lo, _) in &slices {
        for (channel, values) in signal.channels().enumerate() {
            for ((slot, &value), &weight) in buffer
                .iter_mut()
                .zip(values[lo..lo + transform_len].iter())
                .zip(window.iter())
            {
                *slot = Complex64::new(value * weight, 0.0);
            }
            fft.process(&mut buffer);
            for (accumulator, &value) in accumulated[channel].iter_mut().zip(buffer.iter()) {
                *accumulator += value;
            }
        }
    }
    if norm {
        let scale = transform_len as f64 * slices.len() as f64;
        for column in accumulated.iter_mut() {
            column.iter_mut().for_each(|value| *value /= scale);
        }
    }
    debug!(
        "Averaged {} windowed sub-intervals of {} samples each",
        slices.len(),
        transform_len
    );

    assemble_frame(accumulated, transform_len, fs, full_range)
}

fn resolve_sampling_rate(signal: &Signal, sampling_rate: Option<f64>) -> Result<f64, EphysError> {
    let fs = sampling_rate.unwrap_or_else(|| signal.rate());
    if !fs.is_finite() || fs <= 0.0 {
        return Err(EphysError::InvalidParameter(format!(
            "sampling_rate must be positive and finite, got {}",
            fs
        )));
    }
    Ok(fs)
}

/// A symmetric Hamming window of the given length.
fn hamming_window(len: usize) -> Vec<f64> {
    if len == 1 {
        return vec![1.0];
    }
    let denominator = (len - 1) as f64;
    (0..len)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / denominator).cos())
        .collect()
}

/// Reorder raw transform columns by ascending frequency and pack them into a
/// frame, dropping negative frequencies unless the full range is requested.
fn assemble_frame(
    columns: Vec<Vec<Complex64>>,
    transform_len: usize,
    fs: f64,
    full_range: bool,
) -> Result<SpectrumFrame, EphysError> {
    // Bins 0..split hold non-negative frequencies, bins split.. the negative
    // ones, so ascending frequency order is the negative block first.
    let split = (transform_len + 1) / 2;
    let order = if full_range {
        (split..transform_len).chain(0..split).collect::<Vec<usize>>()
    } else {
        (0..split).collect::<Vec<usize>>()
    };

    let index = order
        .iter()
        .map(|&k| {
            if k < split {
                k as f64 * fs / transform_len as f64
            } else {
                (k as f64 - transform_len as f64) * fs / transform_len as f64
            }
        })
        .collect::<Vec<f64>>();
    let keys = (0..columns.len()).collect::<Vec<usize>>();
    let sorted_columns = columns
        .iter()
        .map(|column| order.iter().map(|&k| column[k]).collect::<Vec<Complex64>>())
        .collect::<Vec<Vec<Complex64>>>();

    Frame::new(index, keys, sorted_columns)
}
