//! Helper functions and synthetic collaborators for tests
#![allow(dead_code)]

use heart_rate_estimation::acquisition::{Clock, FrameSource, RegionDetector};
use heart_rate_estimation::config::Config;
use heart_rate_estimation::constants::GREEN_CHANNEL;
use heart_rate_estimation::frame::{Frame, Region};
use heart_rate_estimation::series::Sample;
use heart_rate_estimation::Result;
use std::cell::Cell;
use std::f64::consts::PI;
use std::rc::Rc;
use std::time::Duration;

/// Samples of `offset + amplitude * sin(2 pi f t)` at `t = i / sample_rate`
pub fn pulse_samples(freq_hz: f64, sample_rate: f64, count: u32, amplitude: f64, offset: f64) -> Vec<Sample> {
    (0..count)
        .map(|i| {
            let t = f64::from(i) / sample_rate;
            Sample::new(t, amplitude.mul_add((2.0 * PI * freq_hz * t).sin(), offset))
        })
        .collect()
}

/// Default configuration with a different capture duration
pub fn config_with_duration(duration_secs: f64) -> Config {
    let mut config = Config::default();
    config.capture.duration_secs = duration_secs;
    config
}

/// Clock that advances one frame period each time the source delivers a frame
#[derive(Clone)]
pub struct FrameClock {
    frames: Rc<Cell<u32>>,
    fps: f64,
}

impl FrameClock {
    pub fn new(fps: f64) -> Self {
        Self {
            frames: Rc::new(Cell::new(0)),
            fps,
        }
    }

    fn tick(&self) {
        self.frames.set(self.frames.get() + 1);
    }
}

impl Clock for FrameClock {
    fn elapsed(&self) -> Duration {
        Duration::from_secs_f64(f64::from(self.frames.get()) / self.fps)
    }
}

/// Video of a face whose green channel pulses at a fixed frequency
pub struct PulsingFaceSource {
    clock: FrameClock,
    pulse_hz: f64,
    remaining: u32,
    height: usize,
    width: usize,
}

impl PulsingFaceSource {
    pub fn new(clock: FrameClock, pulse_hz: f64, frames: u32) -> Self {
        Self {
            clock,
            pulse_hz,
            remaining: frames,
            height: 60,
            width: 80,
        }
    }
}

impl FrameSource for PulsingFaceSource {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        self.clock.tick();

        let t = self.clock.elapsed().as_secs_f64();
        let green = 10.0f64.mul_add((2.0 * PI * self.pulse_hz * t).sin(), 120.0).round() as u8;
        let mut frame = Frame::filled(self.height, self.width, [90, 100, 160]);
        for row in 0..self.height {
            for col in 0..self.width {
                frame.pixels_mut()[[row, col, GREEN_CHANNEL]] = green;
            }
        }
        Ok(Some(frame))
    }
}

/// Detector returning the same regions on every frame
pub struct FixedDetector(pub Vec<Region>);

impl RegionDetector for FixedDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Region>> {
        Ok(self.0.clone())
    }
}

/// Assert that two floats are within `tolerance`
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} +/- {tolerance}, got {actual}"
    );
}
