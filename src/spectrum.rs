//! Dominant frequency estimation from the magnitude spectrum.

use crate::constants::SECONDS_PER_MINUTE;
use crate::series::FilteredSeries;
use crate::{Error, Result};
use num_complex::Complex64;
use rustfft::FftPlanner;

/// One-sided magnitude spectrum of a real signal
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Bin frequencies in Hz, from 0 to Nyquist
    pub frequencies: Vec<f64>,
    /// Magnitude of each bin
    pub magnitudes: Vec<f64>,
}

/// The strongest spectral component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    /// Bin index in the one-sided spectrum
    pub bin: usize,
    /// Bin frequency in Hz
    pub frequency_hz: f64,
    /// Bin magnitude
    pub magnitude: f64,
}

impl SpectralPeak {
    /// Peak frequency in cycles per minute
    #[must_use]
    pub fn per_minute(&self) -> f64 {
        self.frequency_hz * SECONDS_PER_MINUTE
    }
}

impl Spectrum {
    /// Compute bins `0..=n/2` of the DFT of `values` sampled at `sample_rate`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty signal or a non-positive sample rate
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(values: &[f64], sample_rate: f64) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidInput("Cannot analyse an empty signal".to_string()));
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::InvalidInput(format!(
                "Sample rate must be positive, got {sample_rate}"
            )));
        }

        let n = values.len();
        let mut buffer: Vec<Complex64> = values.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        FftPlanner::<f64>::new().plan_fft_forward(n).process(&mut buffer);

        let bins = n / 2 + 1;
        let magnitudes = buffer[..bins].iter().map(|c| c.norm()).collect();
        let frequencies = (0..bins).map(|k| k as f64 * sample_rate / n as f64).collect();

        Ok(Self {
            frequencies,
            magnitudes,
        })
    }

    /// Strongest bin, or `None` for an empty spectrum
    #[must_use]
    pub fn peak(&self) -> Option<SpectralPeak> {
        let bin = peak_bin(&self.magnitudes)?;
        Some(SpectralPeak {
            bin,
            frequency_hz: self.frequencies[bin],
            magnitude: self.magnitudes[bin],
        })
    }
}

/// Index of the largest magnitude; the lowest index wins among exact ties
#[must_use]
pub fn peak_bin(magnitudes: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &m) in magnitudes.iter().enumerate() {
        match best {
            Some((_, top)) if m <= top => {}
            _ => best = Some((i, m)),
        }
    }
    best.map(|(i, _)| i)
}

/// Picks the dominant frequency of a filtered series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpectralEstimator;

impl SpectralEstimator {
    /// Dominant spectral component of `series`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty series or invalid sample rate
    pub fn estimate(&self, series: &FilteredSeries) -> Result<SpectralPeak> {
        Spectrum::compute(&series.values, series.sample_rate)?
            .peak()
            .ok_or_else(|| Error::InvalidInput("Spectrum has no bins".to_string()))
    }
}
