use std::f64::consts::PI;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusty_ephys::epoch::EpochSet;
use rusty_ephys::signal::Signal;
use rusty_ephys::spectrum::{compute_mean_power_spectral_density, compute_power_spectral_density};
use rusty_ephys::units::TimeUnit;
use rusty_ephys::DEFAULT_OVERLAP;

const SEED: u64 = 42;

/// A 2 Hz tone plus a half-amplitude 10 Hz tone.
fn two_tone_signal(num_samples: usize, rate: f64) -> Signal {
    let times = (0..num_samples).map(|i| i as f64 / rate).collect::<Vec<f64>>();
    let values = times
        .iter()
        .map(|t| (2.0 * PI * 2.0 * t).sin() + 0.5 * (2.0 * PI * 10.0 * t).sin())
        .collect::<Vec<f64>>();
    Signal::from_samples(times, values).unwrap()
}

fn peak_position(column: &[rustfft::num_complex::Complex64]) -> usize {
    (0..column.len())
        .max_by(|&a, &b| column[a].norm().partial_cmp(&column[b].norm()).unwrap())
        .unwrap()
}

#[test]
fn test_psd_peaks_at_tone_frequencies() {
    let signal = two_tone_signal(2000, 200.0);
    let frame = compute_power_spectral_density(&signal, None, None, false, true, None).unwrap();

    let index = frame.index();
    let column = frame.column(&0).unwrap();
    assert_eq!(index.len(), 1000);

    // Both tones fall on exact frequency bins, so the normalized amplitudes
    // are half the tone amplitudes.
    let peak = peak_position(column);
    assert_relative_eq!(index[peak], 2.0, max_relative = 1e-9);
    assert_relative_eq!(column[peak].norm(), 0.5, max_relative = 1e-6);

    let bin_10 = index
        .iter()
        .position(|&frequency| (frequency - 10.0).abs() < 0.05)
        .unwrap();
    assert_relative_eq!(column[bin_10].norm(), 0.25, max_relative = 1e-6);
}

#[test]
fn test_full_range_spectrum_is_conjugate_symmetric() {
    let signal = two_tone_signal(2000, 200.0);
    let frame = compute_power_spectral_density(&signal, None, None, true, false, None).unwrap();

    assert_eq!(frame.num_rows(), 2000);
    let index = frame.index();
    assert!(index.windows(2).all(|pair| pair[0] < pair[1]));
    assert_relative_eq!(index[0], -100.0, max_relative = 1e-9);

    // For a real signal, the value at -f is the conjugate of the value at f.
    let column = frame.column(&0).unwrap();
    let zero_position = 1000;
    assert_eq!(index[zero_position], 0.0);
    for offset in 1..1000 {
        let positive = column[zero_position + offset];
        let negative = column[zero_position - offset];
        assert_relative_eq!(positive.re, negative.re, epsilon = 1e-6);
        assert_relative_eq!(positive.im, -negative.im, epsilon = 1e-6);
    }
}

#[test]
fn test_psd_restricted_to_an_epoch() {
    let signal = two_tone_signal(2000, 200.0);
    let epochs = EpochSet::single(0.0, 5.0).unwrap();
    let frame =
        compute_power_spectral_density(&signal, None, Some(&epochs), false, false, None).unwrap();

    // 5 s of signal at 200 Hz leave 1000 samples, i.e., 500 one-sided bins.
    assert_eq!(frame.num_rows(), 500);
    let column = frame.column(&0).unwrap();
    assert_relative_eq!(frame.index()[peak_position(column)], 2.0, max_relative = 1e-9);
}

#[test]
fn test_mean_psd_finds_the_same_peak() {
    let signal = two_tone_signal(4000, 200.0);
    let frame = compute_mean_power_spectral_density(
        &signal,
        2.0,
        None,
        DEFAULT_OVERLAP,
        None,
        false,
        true,
        TimeUnit::Seconds,
    )
    .unwrap();

    // 2 s sub-intervals step by 1.5 s, a whole number of cycles of both
    // tones, so the averaged segments add in phase.
    assert_eq!(frame.num_rows(), 200);
    let column = frame.column(&0).unwrap();
    assert_relative_eq!(frame.index()[peak_position(column)], 2.0, max_relative = 1e-9);
}

#[test]
fn test_mean_psd_norm_keeps_the_window_gain() {
    let signal = two_tone_signal(2000, 200.0);
    let frame = compute_mean_power_spectral_density(
        &signal,
        1.0,
        None,
        0.0,
        None,
        false,
        true,
        TimeUnit::Seconds,
    )
    .unwrap();

    // Sub-intervals start on whole seconds, so the 2 Hz tone is in phase
    // across segments: the averaged peak is the single-epoch amplitude of
    // 1/2 scaled by the mean of a 200-point Hamming window.
    let column = frame.column(&0).unwrap();
    let peak = peak_position(column);
    assert_relative_eq!(frame.index()[peak], 2.0, max_relative = 1e-9);
    let window_mean = 0.54 - 0.46 / 200.0;
    assert_relative_eq!(column[peak].norm(), 0.5 * window_mean, max_relative = 0.02);
}

#[test]
fn test_mean_psd_interval_units_are_equivalent() {
    let signal = two_tone_signal(2000, 200.0);
    let seconds = compute_mean_power_spectral_density(
        &signal,
        1.0,
        None,
        0.0,
        None,
        false,
        true,
        TimeUnit::Seconds,
    )
    .unwrap();
    let milliseconds = compute_mean_power_spectral_density(
        &signal,
        1000.0,
        None,
        0.0,
        None,
        false,
        true,
        TimeUnit::Milliseconds,
    )
    .unwrap();

    assert_eq!(seconds, milliseconds);
}

#[test]
fn test_psd_of_seeded_noise_preserves_energy() {
    let mut rng = StdRng::seed_from_u64(SEED);
    let num_samples = 1024;
    let times = (0..num_samples)
        .map(|i| i as f64 / 128.0)
        .collect::<Vec<f64>>();
    let values = (0..num_samples)
        .map(|_| rng.gen_range(-1.0..1.0))
        .collect::<Vec<f64>>();
    let energy = values.iter().map(|value| value * value).sum::<f64>();

    let signal = Signal::from_samples(times, values).unwrap();
    let frame = compute_power_spectral_density(&signal, None, None, true, false, None).unwrap();

    // Parseval: the squared transform magnitudes sum to N times the energy.
    let spectral_energy = frame
        .column(&0)
        .unwrap()
        .iter()
        .map(|value| value.norm_sqr())
        .sum::<f64>();
    assert_relative_eq!(
        spectral_energy / num_samples as f64,
        energy,
        max_relative = 1e-9
    );
}
