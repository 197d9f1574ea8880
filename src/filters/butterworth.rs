//! Digital Butterworth band-pass design.
//!
//! The analog low-pass prototype is moved to the requested band with a
//! low-pass to band-pass transform (edges pre-warped for the bilinear
//! transform), then mapped to the z-plane and expanded into transfer
//! function coefficients.

use super::TransferFunction;
use crate::{Error, Result};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Sample rate the normalized design works at (Nyquist = 1)
const DESIGN_FS: f64 = 2.0;

/// Design an `order`-th order band-pass filter
///
/// `low` and `high` are band edges normalized to the Nyquist frequency and
/// must satisfy `0 < low < high < 1`. The result has `2 * order + 1`
/// coefficients in both numerator and denominator.
///
/// # Errors
///
/// Returns `FilterError` for a zero order or edges outside `(0, 1)`
pub fn bandpass(order: usize, low: f64, high: f64) -> Result<TransferFunction> {
    if order == 0 {
        return Err(Error::FilterError("Filter order must be at least 1".to_string()));
    }
    if !(low > 0.0 && low < high && high < 1.0) {
        return Err(Error::FilterError(format!(
            "Band edges must satisfy 0 < low < high < 1, got [{low}, {high}]"
        )));
    }

    let prototype = analog_prototype_poles(order);

    // Pre-warp the edges so the bilinear transform lands them exactly
    let warped_low = 2.0 * DESIGN_FS * (PI * low / DESIGN_FS).tan();
    let warped_high = 2.0 * DESIGN_FS * (PI * high / DESIGN_FS).tan();
    let bandwidth = warped_high - warped_low;
    let center = (warped_low * warped_high).sqrt();

    let (zeros, poles, gain) = lowpass_to_bandpass(&prototype, center, bandwidth);
    let (zeros, poles, gain) = bilinear(&zeros, &poles, gain, DESIGN_FS);

    let b = expand(&zeros).iter().map(|c| gain * c.re).collect();
    let a = expand(&poles).iter().map(|c| c.re).collect();

    Ok(TransferFunction::new(b, a))
}

/// Poles of the unit-cutoff analog Butterworth low-pass (no zeros, unit gain)
#[allow(clippy::cast_precision_loss)]
fn analog_prototype_poles(order: usize) -> Vec<Complex64> {
    let n = order as f64;
    (0..order)
        .map(|k| {
            let theta = PI * (2.0 * k as f64 + n + 1.0) / (2.0 * n);
            Complex64::from_polar(1.0, theta)
        })
        .collect()
}

/// Move a zero-free low-pass prototype to a band centered at `center` with width `bandwidth`
fn lowpass_to_bandpass(poles: &[Complex64], center: f64, bandwidth: f64) -> (Vec<Complex64>, Vec<Complex64>, f64) {
    let center_sq = Complex64::new(center * center, 0.0);
    let scaled: Vec<Complex64> = poles.iter().map(|&p| p * (bandwidth / 2.0)).collect();

    let mut band_poles = Vec::with_capacity(2 * poles.len());
    band_poles.extend(scaled.iter().map(|&p| p + (p * p - center_sq).sqrt()));
    band_poles.extend(scaled.iter().map(|&p| p - (p * p - center_sq).sqrt()));

    // Every prototype pole without a matching zero leaves a zero at the origin
    let band_zeros = vec![Complex64::new(0.0, 0.0); poles.len()];
    let gain = bandwidth.powi(i32::try_from(poles.len()).unwrap_or(i32::MAX));

    (band_zeros, band_poles, gain)
}

/// Bilinear transform of an analog zero-pole-gain system at sample rate `fs`
fn bilinear(zeros: &[Complex64], poles: &[Complex64], gain: f64, fs: f64) -> (Vec<Complex64>, Vec<Complex64>, f64) {
    let fs2 = Complex64::new(2.0 * fs, 0.0);
    let map = |&s: &Complex64| (fs2 + s) / (fs2 - s);

    let mut digital_zeros: Vec<Complex64> = zeros.iter().map(map).collect();
    // Zeros at infinity map to Nyquist
    digital_zeros.resize(poles.len().max(zeros.len()), Complex64::new(-1.0, 0.0));
    let digital_poles: Vec<Complex64> = poles.iter().map(map).collect();

    let zero_product: Complex64 = zeros.iter().map(|&z| fs2 - z).product();
    let pole_product: Complex64 = poles.iter().map(|&p| fs2 - p).product();
    let digital_gain = gain * (zero_product / pole_product).re;

    (digital_zeros, digital_poles, digital_gain)
}

/// Monic polynomial coefficients (highest power first) with the given roots
fn expand(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }
    coeffs
}
