//! Error module for the Rusty Ephys library.
use std::error::Error;
use std::fmt;

/// Error types for the library.
#[derive(Debug, Clone, PartialEq)]
pub enum EphysError {
    /// Error for parameters outside their valid range, e.g., a negative bin size.
    InvalidParameter(String),
    /// Error for an epoch set which does not contain exactly one epoch.
    InvalidEpochCount { found: usize },
    /// Error for correlogram inputs which are neither a group nor a pair of groups.
    UnknownGroupFormat,
    /// Error for invalid timestamps, e.g., non-finite or unordered times.
    InvalidTimes(String),
    /// Error for parameters which are valid in isolation but incompatible with the data.
    IncompatibleData(String),
    /// Error for I/O operations.
    IOError(String),
}

impl fmt::Display for EphysError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EphysError::InvalidParameter(e) => write!(f, "Invalid parameter: {}", e),
            EphysError::InvalidEpochCount { found } => write!(
                f,
                "Invalid epoch count: the epoch set (or the signal time support) must contain exactly 1 epoch, found {}",
                found
            ),
            EphysError::UnknownGroupFormat => write!(f, "Unknown format for group"),
            EphysError::InvalidTimes(e) => write!(f, "Invalid times: {}", e),
            EphysError::IncompatibleData(e) => write!(f, "Incompatible data: {}", e),
            EphysError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for EphysError {}
