//! Forehead signal extraction.
//!
//! Each detected face contributes one sample per frame: the mean green
//! intensity over the top slice of the face rectangle.

use crate::constants::{DEFAULT_FOREHEAD_FRACTION, GREEN_CHANNEL};
use crate::frame::{Frame, Region};
use crate::series::{Sample, SampleBuffer};
use crate::Result;
use log::debug;

/// Derives green-channel samples from forehead regions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalExtractor {
    forehead_fraction: f64,
}

impl Default for SignalExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_FOREHEAD_FRACTION)
    }
}

impl SignalExtractor {
    /// Create an extractor using the top `forehead_fraction` of each face
    #[must_use]
    pub const fn new(forehead_fraction: f64) -> Self {
        Self { forehead_fraction }
    }

    /// Forehead sub-rectangle of a face region
    #[must_use]
    pub fn forehead(&self, face: &Region) -> Region {
        face.top_fraction(self.forehead_fraction)
    }

    /// Mean green intensity of the forehead, or `None` if the crop is empty
    #[must_use]
    pub fn measure(&self, frame: &Frame, face: &Region) -> Option<f64> {
        frame.channel_mean(&self.forehead(face), GREEN_CHANNEL)
    }

    /// Append one sample per face with a non-empty forehead crop
    ///
    /// All samples share `timestamp`. Returns the number of samples appended.
    ///
    /// # Errors
    ///
    /// Returns an error if `timestamp` precedes the last buffered sample
    pub fn extract(&self, frame: &Frame, faces: &[Region], timestamp: f64, buffer: &mut SampleBuffer) -> Result<usize> {
        let mut appended = 0;
        for face in faces {
            match self.measure(frame, face) {
                Some(value) => {
                    buffer.push(Sample::new(timestamp, value))?;
                    appended += 1;
                }
                None => debug!("Skipping empty forehead crop for face {face:?}"),
            }
        }
        Ok(appended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forehead_frame() -> Frame {
        // Green 200 in the top 3 rows, 50 elsewhere
        let mut frame = Frame::filled(20, 20, [0, 50, 0]);
        for row in 0..3 {
            for col in 0..20 {
                frame.pixels_mut()[[row, col, GREEN_CHANNEL]] = 200;
            }
        }
        frame
    }

    #[test]
    fn test_forehead_is_top_thirty_percent() {
        let extractor = SignalExtractor::default();
        assert_eq!(extractor.forehead(&Region::new(4, 6, 50, 100)), Region::new(4, 6, 50, 30));
    }

    #[test]
    fn test_measure_uses_forehead_only() {
        let extractor = SignalExtractor::default();
        let value = extractor.measure(&forehead_frame(), &Region::new(0, 0, 20, 10)).unwrap();
        assert!((value - 200.0).abs() < 1e-12);
    }

    #[test]
    fn test_measure_ignores_other_channels() {
        let extractor = SignalExtractor::default();
        let frame = Frame::filled(10, 10, [255, 17, 255]);
        assert_eq!(extractor.measure(&frame, &Region::new(0, 0, 10, 10)), Some(17.0));
    }

    #[test]
    fn test_empty_crop_yields_nothing() {
        let extractor = SignalExtractor::default();
        let frame = forehead_frame();
        let mut buffer = SampleBuffer::new();

        // Height 3 truncates to a zero-height forehead
        let faces = [Region::new(0, 0, 10, 3), Region::new(20, 0, 10, 10), Region::new(0, 0, 0, 10)];
        assert_eq!(extractor.extract(&frame, &faces, 0.1, &mut buffer).unwrap(), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_multiple_faces_share_timestamp() {
        let extractor = SignalExtractor::default();
        let frame = forehead_frame();
        let mut buffer = SampleBuffer::new();

        let faces = [Region::new(0, 0, 10, 10), Region::new(10, 0, 10, 10)];
        assert_eq!(extractor.extract(&frame, &faces, 0.25, &mut buffer).unwrap(), 2);
        let samples = buffer.as_slice();
        assert_eq!(samples[0].timestamp, 0.25);
        assert_eq!(samples[1].timestamp, 0.25);
    }

    #[test]
    fn test_crop_clipped_at_frame_edge() {
        let extractor = SignalExtractor::default();
        let frame = forehead_frame();
        // Starts 5 columns from the right edge; only those 5 columns are averaged
        let value = extractor.measure(&frame, &Region::new(15, 0, 40, 10)).unwrap();
        assert!((value - 200.0).abs() < 1e-12);
    }
}
