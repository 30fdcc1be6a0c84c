//! This crate provides tools for quantitative analysis of electrophysiology recordings in Rust.
//!
//! Event trains, continuous signals, and analysis results all carry times in
//! seconds, and every computation can be restricted to a set of half-open
//! recording epochs.
//!
//! # Restricting Events to Epochs
//!
//! ```rust
//! use rusty_ephys::epoch::EpochSet;
//! use rusty_ephys::events::{EventGroup, EventTrain};
//!
//! // One unit firing every second
//! let times = (0..100).map(|t| t as f64).collect::<Vec<f64>>();
//! let group = EventGroup::new(vec![(0, EventTrain::new(times).unwrap())]).unwrap();
//!
//! // Keep only the events of the first 50 seconds
//! let epochs = EpochSet::single(0.0, 50.0).unwrap();
//! let restricted = group.restrict(&epochs);
//! assert_eq!(restricted.train(0).unwrap().len(), 50);
//! ```
//!
//! # Estimating Power Spectra
//!
//! ```rust
//! use rusty_ephys::signal::Signal;
//! use rusty_ephys::spectrum::compute_power_spectral_density;
//!
//! // A pure 16 Hz cosine sampled at 128 Hz for 8 seconds
//! let times = (0..1024).map(|i| i as f64 / 128.0).collect::<Vec<f64>>();
//! let values = times
//!     .iter()
//!     .map(|t| (2.0 * std::f64::consts::PI * 16.0 * t).cos())
//!     .collect::<Vec<f64>>();
//! let signal = Signal::from_samples(times, values).unwrap();
//!
//! // One-sided normalized spectrum over the whole recording
//! let spectrum = compute_power_spectral_density(&signal, None, None, false, true, None).unwrap();
//!
//! // The amplitude peaks at 16 Hz
//! let column = spectrum.column(&0).unwrap();
//! let peak = (0..column.len())
//!     .max_by(|&a, &b| column[a].norm().partial_cmp(&column[b].norm()).unwrap())
//!     .unwrap();
//! assert_eq!(spectrum.index()[peak], 16.0);
//! ```
//!
//! # Computing Correlograms
//!
//! ```rust
//! use rusty_ephys::correlogram::compute_autocorrelogram;
//! use rusty_ephys::events::{EventGroup, EventTrain};
//! use rusty_ephys::units::TimeUnit;
//!
//! // Two units firing every 10 ms
//! let times = (0..1000).map(|t| t as f64 / 100.0).collect::<Vec<f64>>();
//! let group = EventGroup::new(vec![
//!     (0, EventTrain::new(times.clone()).unwrap()),
//!     (1, EventTrain::new(times).unwrap()),
//! ])
//! .unwrap();
//!
//! // Autocorrelograms with 1 ms bins over a +/- 100 ms window
//! let correlogram =
//!     compute_autocorrelogram(&group, 1.0, 100.0, None, TimeUnit::Milliseconds, false).unwrap();
//! assert_eq!(correlogram.num_columns(), 2);
//! assert_eq!(correlogram.num_rows(), 201);
//! ```

pub mod correlogram;
pub mod epoch;
pub mod error;
pub mod events;
pub mod frame;
pub mod signal;
pub mod spectrum;
pub mod units;

/// The default fraction of overlap between consecutive sub-intervals when
/// averaging spectra.
pub const DEFAULT_OVERLAP: f64 = 0.25;
