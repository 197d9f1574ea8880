//! Configuration management for the heart rate estimation application

use crate::constants::{
    DEFAULT_CAMERA_INDEX, DEFAULT_CAPTURE_DURATION_SECS, DEFAULT_CASCADE_PATH, DEFAULT_FILTER_ORDER,
    DEFAULT_FOREHEAD_FRACTION, DEFAULT_HIGHCUT_HZ, DEFAULT_LOWCUT_HZ, DEFAULT_MIN_FACE_SIZE, DEFAULT_MIN_NEIGHBORS,
    DEFAULT_SCALE_FACTOR, MAX_FILTER_ORDER,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frame acquisition configuration
    pub capture: CaptureConfig,

    /// Face detection configuration
    pub detection: DetectionConfig,

    /// Forehead region configuration
    pub roi: RoiConfig,

    /// Band-pass filter configuration
    pub filter: FilterConfig,

    /// Spectral analysis configuration
    pub analysis: AnalysisConfig,
}

/// Frame acquisition parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Wall-clock capture duration in seconds; also the divisor of the sample rate
    pub duration_secs: f64,

    /// Webcam index, used when no video file is given
    pub camera_index: i32,

    /// Optional video file to read instead of the webcam
    pub video_path: Option<PathBuf>,

    /// Show the annotated preview window
    pub show_window: bool,
}

/// Face detector tuning, passed through to the detector unchanged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Path to the Haar cascade XML file
    pub cascade_path: PathBuf,

    /// Image pyramid step; smaller is more sensitive and slower
    pub scale_factor: f64,

    /// Neighbor votes required to keep a detection; higher suppresses false positives
    pub min_neighbors: i32,

    /// Smallest detectable face (width, height) in pixels
    pub min_size: (i32, i32),
}

/// Forehead region parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiConfig {
    /// Fraction of the face height, from the top, taken as the forehead
    pub forehead_fraction: f64,
}

/// Band-pass filter parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Lower band edge in Hz
    pub lowcut_hz: f64,

    /// Upper band edge in Hz
    pub highcut_hz: f64,

    /// Butterworth order; higher gives a steeper roll-off
    pub filter_order: usize,
}

/// How the effective sample rate of the buffered signal is derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateBasis {
    /// Sample count divided by the configured capture duration
    #[default]
    Configured,
    /// Sample count divided by the span between first and last timestamp
    Observed,
}

/// Spectral analysis parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sample rate basis
    pub rate_basis: RateBasis,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_CAPTURE_DURATION_SECS,
            camera_index: DEFAULT_CAMERA_INDEX,
            video_path: None,
            show_window: true,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            cascade_path: PathBuf::from(DEFAULT_CASCADE_PATH),
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            min_size: (DEFAULT_MIN_FACE_SIZE, DEFAULT_MIN_FACE_SIZE),
        }
    }
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            forehead_fraction: DEFAULT_FOREHEAD_FRACTION,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            lowcut_hz: DEFAULT_LOWCUT_HZ,
            highcut_hz: DEFAULT_HIGHCUT_HZ,
            filter_order: DEFAULT_FILTER_ORDER,
        }
    }
}

impl CaptureConfig {
    /// Capture duration as a `Duration`
    ///
    /// Call [`Config::validate`] first; a non-finite or negative value saturates.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_secs).unwrap_or(Duration::MAX)
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the first invalid field
    pub fn validate(&self) -> Result<()> {
        if !self.capture.duration_secs.is_finite() || self.capture.duration_secs <= 0.0 {
            return Err(Error::ConfigError(
                "Capture duration must be a positive number of seconds".to_string(),
            ));
        }

        if !(self.detection.scale_factor.is_finite() && self.detection.scale_factor > 1.0) {
            return Err(Error::ConfigError("Scale factor must be greater than 1.0".to_string()));
        }
        if self.detection.min_neighbors < 0 {
            return Err(Error::ConfigError("Minimum neighbors must be non-negative".to_string()));
        }
        if self.detection.min_size.0 < 0 || self.detection.min_size.1 < 0 {
            return Err(Error::ConfigError("Minimum face size must be non-negative".to_string()));
        }

        if !(self.roi.forehead_fraction > 0.0 && self.roi.forehead_fraction <= 1.0) {
            return Err(Error::ConfigError(
                "Forehead fraction must be in (0.0, 1.0]".to_string(),
            ));
        }

        if !(self.filter.lowcut_hz.is_finite() && self.filter.lowcut_hz > 0.0) {
            return Err(Error::ConfigError("Low cutoff must be positive".to_string()));
        }
        if !(self.filter.highcut_hz.is_finite() && self.filter.highcut_hz > self.filter.lowcut_hz) {
            return Err(Error::ConfigError(
                "High cutoff must be greater than low cutoff".to_string(),
            ));
        }
        if !(1..=MAX_FILTER_ORDER).contains(&self.filter.filter_order) {
            return Err(Error::ConfigError(format!(
                "Filter order must be between 1 and {MAX_FILTER_ORDER}"
            )));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Heart Rate Estimation Configuration

# Frame acquisition
capture:
  duration_secs: 15.0
  camera_index: 0
  video_path: null
  show_window: true

# Haar cascade face detection
detection:
  cascade_path: "assets/haarcascade_frontalface_default.xml"
  scale_factor: 1.1
  min_neighbors: 5
  min_size: [30, 30]

# Forehead region of interest
roi:
  forehead_fraction: 0.3

# Band-pass filter (0.7-4.0 Hz = 42-240 BPM)
filter:
  lowcut_hz: 0.7
  highcut_hz: 4.0
  filter_order: 3

# Spectral analysis
analysis:
  rate_basis: configured
"#;
