//! `OpenCV` backends: webcam or video file capture, Haar cascade face
//! detection and the `HighGUI` preview window.

use crate::acquisition::{DisplaySink, FrameSource, InterruptFlag, RegionDetector};
use crate::config::{CaptureConfig, DetectionConfig};
use crate::constants::WINDOW_NAME;
use crate::frame::{Frame, Region, CHANNELS};
use crate::{Error, Result};
use log::{info, warn};
use ndarray::Array3;
use opencv::core::{Mat, Rect, Scalar, Size, Vec3b, Vector, CV_8UC3};
use opencv::highgui;
use opencv::imgproc::{self, COLOR_BGR2GRAY, LINE_8};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use opencv::videoio::{VideoCapture, CAP_ANY};
use std::path::Path;

/// Escape key code reported by `wait_key`
const KEY_ESCAPE: i32 = 27;

/// Convert a BGR `Mat` into a [`Frame`]
///
/// # Errors
///
/// Returns an error if the `Mat` is empty or not 3-channel 8-bit
#[allow(clippy::cast_sign_loss)] // Dimensions are checked positive
pub fn mat_to_frame(mat: &Mat) -> Result<Frame> {
    let rows = mat.rows();
    let cols = mat.cols();
    if rows <= 0 || cols <= 0 || mat.typ() != CV_8UC3 {
        return Err(Error::InvalidInput(format!(
            "Expected a non-empty 8-bit 3-channel image, got {rows}x{cols} of type {}",
            mat.typ()
        )));
    }

    let mut pixels = Array3::<u8>::zeros((rows as usize, cols as usize, CHANNELS));
    for row in 0..rows {
        for col in 0..cols {
            let pixel = mat.at_2d::<Vec3b>(row, col)?;
            for ch in 0..CHANNELS {
                pixels[[row as usize, col as usize, ch]] = pixel[ch];
            }
        }
    }
    Frame::new(pixels)
}

/// Convert a [`Frame`] back into a BGR `Mat` for drawing and display
///
/// # Errors
///
/// Returns an error if the frame is too large for `OpenCV` or allocation fails
pub fn frame_to_mat(frame: &Frame) -> Result<Mat> {
    let rows = i32::try_from(frame.height()).map_err(|_| Error::InvalidInput("Frame too tall".to_string()))?;
    let cols = i32::try_from(frame.width()).map_err(|_| Error::InvalidInput("Frame too wide".to_string()))?;

    let mut mat = Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::default())?;
    let pixels = frame.pixels();
    for (row, line) in (0..rows).zip(pixels.outer_iter()) {
        for (col, source) in (0..cols).zip(line.outer_iter()) {
            let mut pixel = Vec3b::default();
            for ch in 0..CHANNELS {
                pixel[ch] = source[ch];
            }
            *mat.at_2d_mut::<Vec3b>(row, col)? = pixel;
        }
    }
    Ok(mat)
}

/// Webcam or video file frame source; the device is released on drop
pub struct CameraSource {
    capture: VideoCapture,
    label: String,
}

impl CameraSource {
    /// Open a webcam by index
    ///
    /// # Errors
    ///
    /// Returns `AcquisitionError` if the device cannot be opened
    pub fn open_camera(index: i32) -> Result<Self> {
        info!("Opening camera {index}");
        let capture = VideoCapture::new(index, CAP_ANY)?;
        Self::checked(capture, format!("camera {index}"))
    }

    /// Open a video file
    ///
    /// # Errors
    ///
    /// Returns `AcquisitionError` if the file cannot be opened
    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening video file: {}", path.display());
        let name = path
            .to_str()
            .ok_or_else(|| Error::InvalidInput(format!("Non UTF-8 video path: {}", path.display())))?;
        let capture = VideoCapture::from_file(name, CAP_ANY)?;
        Self::checked(capture, name.to_string())
    }

    /// Open whichever source the capture configuration names
    ///
    /// # Errors
    ///
    /// Returns `AcquisitionError` if the source cannot be opened
    pub fn from_config(config: &CaptureConfig) -> Result<Self> {
        match &config.video_path {
            Some(path) => Self::open_file(path),
            None => Self::open_camera(config.camera_index),
        }
    }

    fn checked(capture: VideoCapture, label: String) -> Result<Self> {
        if !capture.is_opened()? {
            return Err(Error::AcquisitionError(format!("Cannot open {label}")));
        }
        Ok(Self { capture, label })
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let mut mat = Mat::default();
        if !self.capture.read(&mut mat)? || mat.empty() {
            info!("No more frames from {}", self.label);
            return Ok(None);
        }
        mat_to_frame(&mat).map(Some)
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            warn!("Failed to release {}: {e}", self.label);
        }
    }
}

/// Haar cascade face detector
pub struct HaarCascadeDetector {
    classifier: CascadeClassifier,
    scale_factor: f64,
    min_neighbors: i32,
    min_size: Size,
}

impl HaarCascadeDetector {
    /// Load a cascade and keep the tuning parameters for every detection
    ///
    /// # Errors
    ///
    /// Returns `AcquisitionError` if the cascade file cannot be loaded
    pub fn new(config: &DetectionConfig) -> Result<Self> {
        let path = config.cascade_path.to_str().ok_or_else(|| {
            Error::InvalidInput(format!("Non UTF-8 cascade path: {}", config.cascade_path.display()))
        })?;
        let classifier = CascadeClassifier::new(path)?;
        if classifier.empty()? {
            return Err(Error::AcquisitionError(format!("Cannot load face cascade from {path}")));
        }
        info!("Loaded face cascade from {path}");

        Ok(Self {
            classifier,
            scale_factor: config.scale_factor,
            min_neighbors: config.min_neighbors,
            min_size: Size::new(config.min_size.0, config.min_size.1),
        })
    }
}

impl RegionDetector for HaarCascadeDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>> {
        let image = frame_to_mat(frame)?;
        let mut gray = Mat::default();
        imgproc::cvt_color(&image, &mut gray, COLOR_BGR2GRAY, 0)?;

        let mut faces = Vector::<Rect>::new();
        self.classifier.detect_multi_scale(
            &gray,
            &mut faces,
            self.scale_factor,
            self.min_neighbors,
            0,
            self.min_size,
            Size::default(),
        )?;

        Ok(faces
            .iter()
            .map(|r| Region::new(r.x, r.y, r.width, r.height))
            .collect())
    }
}

/// Preview window showing the forehead regions in green
///
/// Pressing `q` or Escape raises the flag returned by [`HighGuiDisplay::quit_flag`].
/// The window is destroyed on drop.
pub struct HighGuiDisplay {
    quit: InterruptFlag,
}

impl HighGuiDisplay {
    /// Create the preview window
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be created
    pub fn new() -> Result<Self> {
        highgui::named_window(WINDOW_NAME, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self {
            quit: InterruptFlag::new(),
        })
    }

    /// Flag raised when the user presses `q` or Escape in the window
    #[must_use]
    pub fn quit_flag(&self) -> InterruptFlag {
        self.quit.clone()
    }
}

impl DisplaySink for HighGuiDisplay {
    fn present(&mut self, frame: &Frame, regions: &[Region]) -> Result<()> {
        let mut canvas = frame_to_mat(frame)?;
        for region in regions {
            imgproc::rectangle(
                &mut canvas,
                Rect::new(region.x, region.y, region.width, region.height),
                Scalar::new(0.0, 255.0, 0.0, 0.0),
                2,
                LINE_8,
                0,
            )?;
        }
        highgui::imshow(WINDOW_NAME, &canvas)?;

        let key = highgui::wait_key(1)?;
        if key == KEY_ESCAPE || key & 0xFF == i32::from(b'q') {
            info!("Exit requested by user");
            self.quit.raise();
        }
        Ok(())
    }
}

impl Drop for HighGuiDisplay {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_all_windows() {
            warn!("Failed to close preview window: {e}");
        }
    }
}
