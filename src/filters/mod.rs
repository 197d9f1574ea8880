//! Band-pass filtering of the resampled intensity signal.
//!
//! This module designs a Butterworth band-pass for the physiological heart
//! rate band and applies it forward and backward so the filtered signal has
//! no phase distortion.

/// Butterworth band-pass coefficient design
pub mod butterworth;

/// Forward-backward IIR application
pub mod zero_phase;

use crate::config::FilterConfig;
use crate::constants::{NORMALIZED_HIGH_CLAMP, NORMALIZED_LOW_CLAMP};
use crate::series::{FilteredSeries, UniformSeries};
use crate::{Error, Result};
use log::{debug, warn};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Rational transfer function `B(z) / A(z)` in powers of `z^-1`
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl TransferFunction {
    /// Create a transfer function from numerator and denominator coefficients
    ///
    /// Both are zero-padded to the same length and scaled so that `a[0] == 1`
    /// when the leading denominator coefficient is non-zero.
    #[must_use]
    pub fn new(mut b: Vec<f64>, mut a: Vec<f64>) -> Self {
        let len = b.len().max(a.len()).max(1);
        b.resize(len, 0.0);
        a.resize(len, 0.0);

        let lead = a[0];
        if lead != 0.0 && lead != 1.0 {
            b.iter_mut().for_each(|c| *c /= lead);
            a.iter_mut().for_each(|c| *c /= lead);
        }
        Self { b, a }
    }

    /// Numerator coefficients
    #[must_use]
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Denominator coefficients
    #[must_use]
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Length of the filter state (number of delays)
    #[must_use]
    pub fn state_len(&self) -> usize {
        self.a.len() - 1
    }

    /// Gain at a frequency normalized to Nyquist (0 = DC, 1 = Nyquist)
    #[must_use]
    pub fn magnitude_at(&self, normalized_freq: f64) -> f64 {
        let z_inv = Complex64::from_polar(1.0, -PI * normalized_freq);
        let eval = |coeffs: &[f64]| {
            coeffs
                .iter()
                .rev()
                .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z_inv + c)
        };
        (eval(&self.b) / eval(&self.a)).norm()
    }
}

/// Band edges normalized to the Nyquist frequency, always inside (0, 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBand {
    /// Effective low edge
    pub low: f64,
    /// Effective high edge
    pub high: f64,
}

impl NormalizedBand {
    /// Widest band the design accepts
    pub const WIDEST: Self = Self {
        low: NORMALIZED_LOW_CLAMP,
        high: NORMALIZED_HIGH_CLAMP,
    };

    /// Normalize `lowcut_hz` and `highcut_hz` at `sample_rate`, clamping into (0, 1)
    ///
    /// A high edge at or above Nyquist becomes 0.99, a low edge at or below
    /// zero becomes 0.01. If the band is still empty the widest band is used.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a non-positive sample rate or non-finite edges
    pub fn from_hz(lowcut_hz: f64, highcut_hz: f64, sample_rate: f64) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(Error::InvalidInput(format!(
                "Sample rate must be positive, got {sample_rate}"
            )));
        }
        if !(lowcut_hz.is_finite() && highcut_hz.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "Band edges must be finite, got [{lowcut_hz}, {highcut_hz}]"
            )));
        }

        let nyquist = sample_rate / 2.0;
        let mut low = lowcut_hz / nyquist;
        let mut high = highcut_hz / nyquist;

        if high >= 1.0 {
            debug!("High cutoff {highcut_hz} Hz at or above Nyquist {nyquist} Hz, clamping");
            high = NORMALIZED_HIGH_CLAMP;
        }
        if low <= 0.0 {
            debug!("Low cutoff {lowcut_hz} Hz at or below zero, clamping");
            low = NORMALIZED_LOW_CLAMP;
        }
        if low >= high {
            warn!(
                "Band [{lowcut_hz}, {highcut_hz}] Hz is empty at {sample_rate:.3} Hz sampling, using widest band [{}, {}]",
                Self::WIDEST.low,
                Self::WIDEST.high
            );
            return Ok(Self::WIDEST);
        }

        Ok(Self { low, high })
    }
}

/// Zero-phase Butterworth band-pass over a uniform series
#[derive(Debug, Clone, PartialEq)]
pub struct BandPassFilter {
    lowcut_hz: f64,
    highcut_hz: f64,
    order: usize,
}

impl From<&FilterConfig> for BandPassFilter {
    fn from(config: &FilterConfig) -> Self {
        Self::new(config.lowcut_hz, config.highcut_hz, config.filter_order)
    }
}

impl BandPassFilter {
    /// Create a filter passing `lowcut_hz..highcut_hz`
    #[must_use]
    pub const fn new(lowcut_hz: f64, highcut_hz: f64, order: usize) -> Self {
        Self {
            lowcut_hz,
            highcut_hz,
            order,
        }
    }

    /// Effective band at a sample rate
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a non-positive sample rate
    pub fn band(&self, sample_rate: f64) -> Result<NormalizedBand> {
        NormalizedBand::from_hz(self.lowcut_hz, self.highcut_hz, sample_rate)
    }

    /// Coefficients designed for a sample rate
    ///
    /// # Errors
    ///
    /// Returns an error if the sample rate is invalid or the order is zero
    pub fn design(&self, sample_rate: f64) -> Result<(TransferFunction, NormalizedBand)> {
        let band = self.band(sample_rate)?;
        let tf = butterworth::bandpass(self.order, band.low, band.high)?;
        Ok((tf, band))
    }

    /// Filter a series, keeping its length and sample rate
    ///
    /// # Errors
    ///
    /// Returns an error if the filter cannot be designed for the series' sample rate
    pub fn apply(&self, series: &UniformSeries) -> Result<(FilteredSeries, NormalizedBand)> {
        let (tf, band) = self.design(series.sample_rate)?;
        debug!(
            "Band-pass order {} at {:.3} Hz: normalized band [{:.4}, {:.4}]",
            self.order, series.sample_rate, band.low, band.high
        );

        let values = zero_phase::filtfilt(&tf, &series.values)?;
        Ok((
            FilteredSeries {
                values,
                sample_rate: series.sample_rate,
            },
            band,
        ))
    }
}
