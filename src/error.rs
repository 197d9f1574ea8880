//! Error types for the heart rate estimation library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[cfg(feature = "camera")]
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer than two samples were collected, so no heart rate can be estimated
    #[error("Insufficient samples: collected {collected}, need at least 2")]
    InsufficientSamples {
        /// Number of samples collected before the run ended
        collected: usize,
    },

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Filter design or application error
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Frame acquisition or region detection failed
    #[error("Acquisition error: {0}")]
    AcquisitionError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

impl Error {
    /// True for the fatal "not enough data" outcome of a run
    #[must_use]
    pub const fn is_insufficient_samples(&self) -> bool {
        matches!(self, Self::InsufficientSamples { .. })
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_samples_message() {
        let err = Error::InsufficientSamples { collected: 1 };
        assert!(err.is_insufficient_samples());
        assert_eq!(err.to_string(), "Insufficient samples: collected 1, need at least 2");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_insufficient_samples());
    }
}
