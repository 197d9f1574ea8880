//! Constants used throughout the application

/// Default capture duration in seconds
pub const DEFAULT_CAPTURE_DURATION_SECS: f64 = 15.0;

/// Default webcam index
pub const DEFAULT_CAMERA_INDEX: i32 = 0;

/// Default Haar cascade for frontal faces
pub const DEFAULT_CASCADE_PATH: &str = "assets/haarcascade_frontalface_default.xml";

/// Haar cascade detector defaults
pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;
pub const DEFAULT_MIN_NEIGHBORS: i32 = 5;
pub const DEFAULT_MIN_FACE_SIZE: i32 = 30;

/// Fraction of the face height used as the forehead region
pub const DEFAULT_FOREHEAD_FRACTION: f64 = 0.3;

/// Index of the green channel in a 3-channel frame (BGR and RGB alike)
pub const GREEN_CHANNEL: usize = 1;

/// Physiological heart rate band (42-240 BPM)
pub const DEFAULT_LOWCUT_HZ: f64 = 0.7;
pub const DEFAULT_HIGHCUT_HZ: f64 = 4.0;

/// Butterworth filter order
pub const DEFAULT_FILTER_ORDER: usize = 3;
pub const MAX_FILTER_ORDER: usize = 8;

/// Normalized cutoff clamps applied when a band edge leaves (0, 1)
pub const NORMALIZED_HIGH_CLAMP: f64 = 0.99;
pub const NORMALIZED_LOW_CLAMP: f64 = 0.01;

/// Edge padding for forward-backward filtering, in multiples of the coefficient count
pub const FILTFILT_PAD_FACTOR: usize = 3;

/// Minimum number of samples required for analysis
pub const MIN_SAMPLES: usize = 2;

/// Seconds per minute
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Preview window title
pub const WINDOW_NAME: &str = "Forehead isolation";
