//! Resampling of irregularly timed samples onto a uniform grid.

use crate::config::RateBasis;
use crate::constants::MIN_SAMPLES;
use crate::series::{Sample, UniformSeries};
use crate::{Error, Result};

/// Converts a buffered sample sequence into a [`UniformSeries`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resampler {
    capture_duration_secs: f64,
    rate_basis: RateBasis,
}

impl Resampler {
    /// Create a resampler whose sample rate is `count / capture_duration_secs`
    #[must_use]
    pub const fn new(capture_duration_secs: f64) -> Self {
        Self {
            capture_duration_secs,
            rate_basis: RateBasis::Configured,
        }
    }

    /// Select how the sample rate is derived
    #[must_use]
    pub const fn with_rate_basis(mut self, rate_basis: RateBasis) -> Self {
        self.rate_basis = rate_basis;
        self
    }

    /// Effective sample rate for a sequence
    #[allow(clippy::cast_precision_loss)]
    fn sample_rate(&self, samples: &[Sample]) -> f64 {
        let count = samples.len() as f64;
        match (self.rate_basis, samples.first(), samples.last()) {
            (RateBasis::Observed, Some(first), Some(last)) if last.timestamp > first.timestamp => {
                count / (last.timestamp - first.timestamp)
            }
            _ => count / self.capture_duration_secs,
        }
    }

    /// Resample onto an evenly spaced grid with the same length and bounds
    ///
    /// # Errors
    ///
    /// Returns `InsufficientSamples` for fewer than two samples and
    /// `InvalidInput` for a non-positive capture duration
    pub fn resample(&self, samples: &[Sample]) -> Result<UniformSeries> {
        if samples.len() < MIN_SAMPLES {
            return Err(Error::InsufficientSamples {
                collected: samples.len(),
            });
        }
        if !(self.capture_duration_secs.is_finite() && self.capture_duration_secs > 0.0) {
            return Err(Error::InvalidInput(format!(
                "Capture duration must be positive, got {}",
                self.capture_duration_secs
            )));
        }

        let times: Vec<f64> = samples.iter().map(|s| s.timestamp).collect();
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        let grid = linspace(times[0], times[times.len() - 1], samples.len());

        Ok(UniformSeries {
            values: grid.iter().map(|&t| interpolate(&times, &values, t)).collect(),
            sample_rate: self.sample_rate(samples),
            start: grid[0],
            end: grid[grid.len() - 1],
        })
    }
}

/// `count` evenly spaced points from `start` to `end`, both endpoints exact
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut grid: Vec<f64> = (0..count).map(|i| step.mul_add(i as f64, start)).collect();
            grid[count - 1] = end;
            grid
        }
    }
}

/// Piecewise-linear interpolation of `(xs, ys)` at `x`
///
/// `xs` must be non-decreasing and non-empty. Values outside the range take
/// the nearest endpoint. Repeated abscissae are bridged from the last point
/// at or before `x` to the first point after it.
#[must_use]
pub fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    // First index with xs[i] > x
    let upper = xs.partition_point(|&v| v <= x);
    if upper == 0 {
        return ys[0];
    }
    if upper >= xs.len() {
        return ys[xs.len() - 1];
    }

    let lower = upper - 1;
    let (x0, x1) = (xs[lower], xs[upper]);
    let (y0, y1) = (ys[lower], ys[upper]);
    (y1 - y0).mul_add((x - x0) / (x1 - x0), y0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_linspace_endpoints() {
        let grid = linspace(0.1, 14.7, 450);
        assert_eq!(grid.len(), 450);
        assert_eq!(grid[0], 0.1);
        assert_eq!(grid[449], 14.7);
        assert_relative_eq!(grid[1] - grid[0], 14.6 / 449.0, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolate_midpoint() {
        let xs = [0.0, 1.0, 3.0];
        let ys = [10.0, 20.0, 0.0];
        assert_relative_eq!(interpolate(&xs, &ys, 0.5), 15.0);
        assert_relative_eq!(interpolate(&xs, &ys, 2.0), 10.0);
        assert_eq!(interpolate(&xs, &ys, 3.0), 0.0);
        assert_eq!(interpolate(&xs, &ys, 0.0), 10.0);
    }

    #[test]
    fn test_interpolate_repeated_timestamps() {
        let xs = [0.0, 1.0, 1.0, 2.0];
        let ys = [0.0, 5.0, 7.0, 9.0];
        assert_eq!(interpolate(&xs, &ys, 1.0), 7.0);
        assert_relative_eq!(interpolate(&xs, &ys, 1.5), 8.0);
        assert!(interpolate(&xs, &ys, 0.999).is_finite());
    }

    #[test]
    fn test_resample_too_few_samples() {
        let resampler = Resampler::new(15.0);
        for samples in [vec![], vec![Sample::new(0.0, 1.0)]] {
            let collected = samples.len();
            match resampler.resample(&samples) {
                Err(Error::InsufficientSamples { collected: c }) => assert_eq!(c, collected),
                other => panic!("Expected InsufficientSamples, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_resample_rate_from_configured_duration() {
        let samples: Vec<Sample> = (0..300).map(|i| Sample::new(f64::from(i) / 20.0, 1.0)).collect();
        let series = Resampler::new(15.0).resample(&samples).unwrap();
        assert_relative_eq!(series.sample_rate, 20.0);
    }

    #[test]
    fn test_resample_rate_from_observed_span() {
        let samples: Vec<Sample> = (0..11).map(|i| Sample::new(f64::from(i) * 0.5, 1.0)).collect();
        let series = Resampler::new(15.0)
            .with_rate_basis(RateBasis::Observed)
            .resample(&samples)
            .unwrap();
        assert_relative_eq!(series.sample_rate, 11.0 / 5.0);

        // Zero span falls back to the configured duration
        let flat = vec![Sample::new(1.0, 1.0), Sample::new(1.0, 2.0)];
        let series = Resampler::new(4.0).with_rate_basis(RateBasis::Observed).resample(&flat).unwrap();
        assert_relative_eq!(series.sample_rate, 0.5);
    }

    #[test]
    fn test_resample_irregular_linear_signal() {
        // A linear signal survives linear interpolation unchanged
        let times = [0.0, 0.03, 0.09, 0.1, 0.2, 0.21, 0.3];
        let samples: Vec<Sample> = times.iter().map(|&t| Sample::new(t, 2.0f64.mul_add(t, 1.0))).collect();
        let series = Resampler::new(1.0).resample(&samples).unwrap();
        let grid = linspace(0.0, 0.3, times.len());
        for (value, t) in series.values.iter().zip(grid) {
            assert_relative_eq!(*value, 2.0f64.mul_add(t, 1.0), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_resample_rejects_bad_duration() {
        let samples = vec![Sample::new(0.0, 1.0), Sample::new(1.0, 1.0)];
        assert!(matches!(Resampler::new(0.0).resample(&samples), Err(Error::InvalidInput(_))));
    }

    fn sorted_samples() -> impl Strategy<Value = Vec<Sample>> {
        prop::collection::vec((0.0f64..0.5, 0.0f64..255.0), 2..200).prop_map(|steps| {
            let mut t = 0.0;
            steps
                .into_iter()
                .map(|(dt, v)| {
                    t += dt;
                    Sample::new(t, v)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_resample_preserves_length_and_bounds(samples in sorted_samples()) {
            let series = Resampler::new(15.0).resample(&samples).unwrap();
            prop_assert_eq!(series.len(), samples.len());
            prop_assert_eq!(series.start, samples[0].timestamp);
            prop_assert_eq!(series.end, samples[samples.len() - 1].timestamp);
            prop_assert!(series.values.iter().all(|v| v.is_finite()));
        }

        #[test]
        fn prop_resampled_values_within_input_range(samples in sorted_samples()) {
            let series = Resampler::new(15.0).resample(&samples).unwrap();
            let min = samples.iter().map(|s| s.value).fold(f64::INFINITY, f64::min);
            let max = samples.iter().map(|s| s.value).fold(f64::NEG_INFINITY, f64::max);
            for value in series.values {
                prop_assert!(value >= min - 1e-9 && value <= max + 1e-9);
            }
        }
    }
}
