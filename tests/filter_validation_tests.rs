//! Tests for band-pass design, clamping and zero-phase application

use heart_rate_estimation::config::FilterConfig;
use heart_rate_estimation::filters::{butterworth, zero_phase, BandPassFilter, NormalizedBand};
use heart_rate_estimation::series::UniformSeries;
use proptest::prelude::*;
use std::f64::consts::PI;

fn series(values: Vec<f64>, sample_rate: f64) -> UniformSeries {
    #[allow(clippy::cast_precision_loss)]
    let end = (values.len().saturating_sub(1)) as f64 / sample_rate;
    UniformSeries {
        values,
        sample_rate,
        start: 0.0,
        end,
    }
}

#[test]
fn test_heart_rate_band_response() {
    // 30 Hz sampling: Nyquist 15 Hz
    let tf = butterworth::bandpass(3, 0.7 / 15.0, 4.0 / 15.0).unwrap();

    assert!(tf.magnitude_at(1.2 / 15.0) > 0.95);
    assert!(tf.magnitude_at(0.1 / 15.0) < 0.01);
    assert!(tf.magnitude_at(10.0 / 15.0) < 0.05);
}

#[test]
fn test_higher_order_rolls_off_faster() {
    let gains: Vec<f64> = (1..=6)
        .map(|order| {
            butterworth::bandpass(order, 0.7 / 15.0, 4.0 / 15.0)
                .unwrap()
                .magnitude_at(8.0 / 15.0)
        })
        .collect();
    for pair in gains.windows(2) {
        assert!(pair[1] < pair[0], "{gains:?}");
    }
}

#[test]
fn test_cutoff_clamping() {
    assert_eq!(NormalizedBand::from_hz(0.7, 4.0, 7.9).unwrap().high, 0.99);
    assert_eq!(NormalizedBand::from_hz(0.0, 4.0, 30.0).unwrap().low, 0.01);
    assert_eq!(NormalizedBand::from_hz(0.7, 4.0, 1.0).unwrap(), NormalizedBand::WIDEST);
}

#[test]
fn test_out_of_band_tone_removed() {
    let fs = 30.0;
    let values: Vec<f64> = (0..600)
        .map(|i| {
            let t = f64::from(i) / fs;
            (2.0 * PI * 1.2 * t).sin() + (2.0 * PI * 9.0 * t).sin() + 50.0
        })
        .collect();
    let filter = BandPassFilter::from(&FilterConfig::default());
    let (filtered, _) = filter.apply(&series(values, fs)).unwrap();

    for i in 150..450 {
        let t = f64::from(i) / fs;
        let expected = (2.0 * PI * 1.2 * t).sin();
        assert!((filtered.values[i as usize] - expected).abs() < 0.1, "sample {i}");
    }
}

#[test]
fn test_zero_phase_keeps_peak_position() {
    // A smooth pulse centered on sample 200 stays centered
    let values: Vec<f64> = (0..400)
        .map(|i| {
            let d = (f64::from(i) - 200.0) / 6.0;
            (-d * d).exp()
        })
        .collect();
    let tf = butterworth::bandpass(3, 0.02, 0.4).unwrap();
    let filtered = zero_phase::filtfilt(&tf, &values).unwrap();

    let peak = filtered
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0;
    assert_eq!(peak, 200);
}

proptest! {
    #[test]
    fn prop_filter_preserves_length(
        values in prop::collection::vec(0.0f64..255.0, 2..400),
        sample_rate in 0.1f64..120.0,
    ) {
        let len = values.len();
        let filter = BandPassFilter::from(&FilterConfig::default());
        let (filtered, band) = filter.apply(&series(values, sample_rate)).unwrap();
        prop_assert_eq!(filtered.len(), len);
        prop_assert!(band.low > 0.0 && band.low < band.high && band.high < 1.0);
        prop_assert!(filtered.values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn prop_band_always_inside_unit_interval(
        lowcut in -5.0f64..10.0,
        width in 0.01f64..10.0,
        sample_rate in 0.05f64..240.0,
    ) {
        let band = NormalizedBand::from_hz(lowcut, lowcut + width, sample_rate).unwrap();
        prop_assert!(band.low > 0.0 && band.high < 1.0 && band.low < band.high);
    }
}
