//! Time series types flowing between the pipeline stages.

use crate::{Error, Result};

/// One intensity measurement and the time it was taken
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Seconds since the start of the run
    pub timestamp: f64,
    /// Mean green intensity of the forehead region
    pub value: f64,
}

impl Sample {
    /// Create a new sample
    #[must_use]
    pub const fn new(timestamp: f64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Append-only buffer of samples with non-decreasing timestamps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<Sample>,
}

impl SampleBuffer {
    /// Create an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the timestamp is not finite or precedes the last one
    pub fn push(&mut self, sample: Sample) -> Result<()> {
        if !sample.timestamp.is_finite() || !sample.value.is_finite() {
            return Err(Error::InvalidInput(format!("Non-finite sample: {sample:?}")));
        }
        if let Some(last) = self.samples.last() {
            if sample.timestamp < last.timestamp {
                return Err(Error::InvalidInput(format!(
                    "Sample timestamp {} precedes previous timestamp {}",
                    sample.timestamp, last.timestamp
                )));
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Number of buffered samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if nothing has been buffered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Borrow the buffered samples in append order
    #[must_use]
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    /// Hand the completed sequence over to the analysis phase
    #[must_use]
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

impl TryFrom<Vec<Sample>> for SampleBuffer {
    type Error = Error;

    fn try_from(samples: Vec<Sample>) -> Result<Self> {
        let mut buffer = Self::new();
        for sample in samples {
            buffer.push(sample)?;
        }
        Ok(buffer)
    }
}

/// Evenly spaced values at a fixed sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSeries {
    /// Resampled values
    pub values: Vec<f64>,
    /// Effective sample rate in Hz
    pub sample_rate: f64,
    /// Timestamp of the first value
    pub start: f64,
    /// Timestamp of the last value
    pub end: f64,
}

impl UniformSeries {
    /// Number of values
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the series has no values
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Band-pass filtered counterpart of a [`UniformSeries`]
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSeries {
    /// Filtered values, same length and spacing as the input series
    pub values: Vec<f64>,
    /// Effective sample rate in Hz
    pub sample_rate: f64,
}

impl FilteredSeries {
    /// Number of values
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the series has no values
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
