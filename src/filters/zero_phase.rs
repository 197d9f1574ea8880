//! Forward-backward (zero-phase) IIR filtering.
//!
//! The signal is extended at both ends by odd reflection, filtered forward
//! and then backward with initial states matched to the edge values, and
//! the padding is stripped again. The two passes cancel each other's phase
//! response, so features in the output line up with the input in time.

use super::TransferFunction;
use crate::constants::FILTFILT_PAD_FACTOR;
use crate::{Error, Result};
use nalgebra::{DMatrix, DVector};

/// Direct form II transposed filtering of `input` starting from `state`
///
/// `state` must hold `len(a) - 1` values and is updated in place.
#[must_use]
pub fn lfilter(tf: &TransferFunction, input: &[f64], state: &mut [f64]) -> Vec<f64> {
    let b = tf.b();
    let a = tf.a();
    let order = state.len();

    input
        .iter()
        .map(|&x| {
            let y = b[0].mul_add(x, state.first().copied().unwrap_or(0.0));
            for i in 0..order {
                let carry = if i + 1 < order { state[i + 1] } else { 0.0 };
                state[i] = b[i + 1].mul_add(x, carry) - a[i + 1] * y;
            }
            y
        })
        .collect()
}

/// Filter state corresponding to the steady-state response to a unit step
///
/// Scaling the result by the first input value starts the filter as if the
/// signal had been constant at that value forever.
///
/// # Errors
///
/// Returns `FilterError` if the steady state does not exist
pub fn steady_state(tf: &TransferFunction) -> Result<Vec<f64>> {
    let b = tf.b();
    let a = tf.a();
    let n = tf.state_len();
    if n == 0 {
        return Ok(Vec::new());
    }

    // (I - C^T) zi = b[1..] - a[1..] * b[0], with C the companion matrix of `a`
    let companion = DMatrix::from_fn(n, n, |row, col| match row {
        0 => -a[col + 1],
        _ if col + 1 == row => 1.0,
        _ => 0.0,
    });
    let system = DMatrix::identity(n, n) - companion.transpose();
    let rhs = DVector::from_fn(n, |i, _| b[i + 1] - a[i + 1] * b[0]);

    system
        .lu()
        .solve(&rhs)
        .map(|zi| zi.iter().copied().collect())
        .ok_or_else(|| Error::FilterError("Filter has no steady state (singular system)".to_string()))
}

/// Apply `tf` forward and backward over `input`
///
/// The output has the same length as the input. The edge padding is
/// `3 * len(coefficients)` samples, shortened to `len - 1` for short inputs.
///
/// # Errors
///
/// Returns `FilterError` if the filter has no steady state
pub fn filtfilt(tf: &TransferFunction, input: &[f64]) -> Result<Vec<f64>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }

    let pad = (FILTFILT_PAD_FACTOR * tf.a().len().max(tf.b().len())).min(input.len() - 1);
    let extended = odd_extend(input, pad);
    let zi = steady_state(tf)?;

    let mut state: Vec<f64> = zi.iter().map(|z| z * extended[0]).collect();
    let mut forward = lfilter(tf, &extended, &mut state);

    forward.reverse();
    let mut state: Vec<f64> = zi.iter().map(|z| z * forward[0]).collect();
    let mut backward = lfilter(tf, &forward, &mut state);
    backward.reverse();

    Ok(backward[pad..backward.len() - pad].to_vec())
}

/// Extend `input` by `pad` samples at each end, reflecting through the edge values
///
/// `pad` must be smaller than `input.len()`.
#[must_use]
pub fn odd_extend(input: &[f64], pad: usize) -> Vec<f64> {
    let n = input.len();
    let first = input[0];
    let last = input[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0f64.mul_add(first, -input[i])));
    extended.extend_from_slice(input);
    extended.extend((1..=pad).map(|i| 2.0f64.mul_add(last, -input[n - 1 - i])));
    extended
}

#[cfg(test)]
mod tests {
    use super::super::butterworth;
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_odd_extend() {
        let extended = odd_extend(&[1.0, 2.0, 4.0, 7.0], 2);
        assert_eq!(extended, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 7.0, 10.0, 12.0]);
    }

    #[test]
    fn test_lfilter_moving_sum() {
        let tf = TransferFunction::new(vec![1.0, 1.0], vec![1.0, 0.0]);
        let mut state = vec![0.0];
        assert_eq!(lfilter(&tf, &[1.0, 2.0, 3.0], &mut state), vec![1.0, 3.0, 5.0]);
        assert_eq!(state, vec![3.0]);
    }

    #[test]
    fn test_lfilter_recursive() {
        // y[n] = x[n] + 0.5 y[n-1]
        let tf = TransferFunction::new(vec![1.0, 0.0], vec![1.0, -0.5]);
        let mut state = vec![0.0];
        assert_eq!(lfilter(&tf, &[1.0, 0.0, 0.0], &mut state), vec![1.0, 0.5, 0.25]);
    }

    #[test]
    fn test_steady_state_holds_constant_input() {
        let tf = butterworth::bandpass(3, 0.05, 0.3).unwrap();
        let zi = steady_state(&tf).unwrap();

        let mut state: Vec<f64> = zi.iter().map(|z| z * 5.0).collect();
        let output = lfilter(&tf, &[5.0; 50], &mut state);
        for y in output {
            assert_relative_eq!(y, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_filtfilt_preserves_length() {
        let tf = butterworth::bandpass(3, 0.05, 0.3).unwrap();
        for n in [1u32, 2, 5, 21, 22, 100] {
            let input: Vec<f64> = (0..n).map(|i| f64::from(i).sin()).collect();
            assert_eq!(filtfilt(&tf, &input).unwrap().len(), n as usize);
        }
        assert!(filtfilt(&tf, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_filtfilt_has_no_phase_shift() {
        // An in-band sinusoid keeps its zero crossings in place
        let fs = 30.0;
        let tf = butterworth::bandpass(3, 0.7 / 15.0, 4.0 / 15.0).unwrap();
        let input: Vec<f64> = (0..600).map(|i| (2.0 * PI * 1.5 * f64::from(i) / fs).sin()).collect();
        let output = filtfilt(&tf, &input).unwrap();

        for i in 150..450 {
            assert!((output[i] - input[i]).abs() < 0.05, "sample {i}: {} vs {}", output[i], input[i]);
        }
    }

    #[test]
    fn test_filtfilt_removes_dc() {
        let tf = butterworth::bandpass(3, 0.7 / 15.0, 4.0 / 15.0).unwrap();
        let output = filtfilt(&tf, &[120.0; 300]).unwrap();
        for y in output {
            assert!(y.abs() < 1e-6);
        }
    }
}
