//! Heart rate estimation from webcam video using remote photoplethysmography (rPPG).
//!
//! Blood volume changes under the skin slightly modulate how much green light
//! the face reflects. This library tracks the mean green intensity of the
//! forehead over a capture window and reads the pulse off the dominant
//! frequency of that signal.
//!
//! The estimation pipeline consists of:
//! 1. Face detection on every frame (external detector behind a trait)
//! 2. Forehead extraction: mean green value over the top 30% of each face
//! 3. Resampling of the irregularly timed samples onto a uniform grid
//! 4. Zero-phase Butterworth band-pass filtering (0.7-4.0 Hz by default)
//! 5. FFT peak picking, converted to beats per minute
//!
//! Acquisition and analysis are separate phases: frames are consumed until
//! the capture duration elapses, a stop signal fires or the stream ends, and
//! only then is the buffered signal analysed.
//!
//! # Examples
//!
//! ## Analysing a recorded signal
//!
//! ```
//! use heart_rate_estimation::{config::Config, pipeline::analyze, series::Sample};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 15 seconds of a 1.2 Hz pulse sampled at 30 Hz
//! let samples: Vec<Sample> = (0..450)
//!     .map(|i| {
//!         let t = f64::from(i) / 30.0;
//!         Sample::new(t, 100.0 + (2.0 * std::f64::consts::PI * 1.2 * t).sin())
//!     })
//!     .collect();
//!
//! let estimate = analyze(&samples, &Config::default())?;
//! assert!((estimate.bpm - 72.0).abs() < 3.0);
//! println!("{estimate}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Live capture
//!
//! ```ignore
//! use heart_rate_estimation::acquisition::AnyStop;
//! use heart_rate_estimation::camera::{CameraSource, HaarCascadeDetector, HighGuiDisplay};
//! use heart_rate_estimation::{config::Config, pipeline};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let mut source = CameraSource::from_config(&config.capture)?;
//! let mut detector = HaarCascadeDetector::new(&config.detection)?;
//! let mut display = HighGuiDisplay::new()?;
//! let stop = AnyStop::new().with(display.quit_flag());
//!
//! let estimate = pipeline::run(&config, &mut source, &mut detector, Some(&mut display), &stop)?;
//! println!("{estimate}");
//! # Ok(())
//! # }
//! ```

/// Frame source, detector, display and stop signal interfaces
pub mod acquisition;

/// `OpenCV` capture, Haar cascade detection and preview window
#[cfg(feature = "camera")]
pub mod camera;

/// Configuration management
pub mod config;

/// Constants used throughout the application
pub mod constants;

/// Error types and result handling
pub mod error;

/// Forehead signal extraction
pub mod extraction;

/// Band-pass filter design and zero-phase application
pub mod filters;

/// Frame and region types
pub mod frame;

/// Acquisition loop and analysis phase
pub mod pipeline;

/// Uniform resampling of the sample sequence
pub mod resample;

/// Sample and series types
pub mod series;

/// Dominant frequency estimation
pub mod spectrum;

pub use error::{Error, Result};
pub use pipeline::HeartRateEstimate;
