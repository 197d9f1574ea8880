//! Frame and region types shared by the acquisition and extraction stages.

use crate::{Error, Result};
use ndarray::{s, Array3, ArrayView3};

/// Number of color channels in a frame
pub const CHANNELS: usize = 3;

/// A color video frame stored as (height, width, channel) bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Array3<u8>,
}

impl Frame {
    /// Wrap a (height, width, 3) pixel array
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the array does not have exactly 3 channels
    pub fn new(pixels: Array3<u8>) -> Result<Self> {
        let channels = pixels.dim().2;
        if channels != CHANNELS {
            return Err(Error::InvalidInput(format!(
                "Frame must have {CHANNELS} channels, got {channels}"
            )));
        }
        Ok(Self { pixels })
    }

    /// Create a frame of uniform color
    #[must_use]
    pub fn filled(height: usize, width: usize, color: [u8; CHANNELS]) -> Self {
        let pixels = Array3::from_shape_fn((height, width, CHANNELS), |(_, _, ch)| color[ch]);
        Self { pixels }
    }

    /// Frame height in pixels
    #[must_use]
    pub fn height(&self) -> usize {
        self.pixels.dim().0
    }

    /// Frame width in pixels
    #[must_use]
    pub fn width(&self) -> usize {
        self.pixels.dim().1
    }

    /// Borrow the raw pixel array
    #[must_use]
    pub fn pixels(&self) -> ArrayView3<'_, u8> {
        self.pixels.view()
    }

    /// Mutable access for synthetic frame construction and annotation
    pub fn pixels_mut(&mut self) -> &mut Array3<u8> {
        &mut self.pixels
    }

    /// Mean of one channel over a region, clipped to the frame
    ///
    /// Returns `None` when the clipped region has zero area or the channel does not exist.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Pixel counts stay far below 2^52
    pub fn channel_mean(&self, region: &Region, channel: usize) -> Option<f64> {
        if channel >= CHANNELS {
            return None;
        }
        let clipped = region.clip(self.width(), self.height())?;
        let view = self.pixels.slice(s![
            clipped.top..clipped.bottom,
            clipped.left..clipped.right,
            channel
        ]);

        let count = view.len();
        if count == 0 {
            return None;
        }
        let sum: u64 = view.iter().map(|&v| u64::from(v)).sum();
        Some(sum as f64 / count as f64)
    }
}

/// Axis-aligned rectangle in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

/// Half-open pixel bounds of a region after clipping to a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    /// First column
    pub left: usize,
    /// One past the last column
    pub right: usize,
    /// First row
    pub top: usize,
    /// One past the last row
    pub bottom: usize,
}

impl Region {
    /// Create a new region
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Top `fraction` of the region's height at full width, anchored at the top-left corner
    ///
    /// The height is truncated toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Truncation is the intended rounding
    pub fn top_fraction(&self, fraction: f64) -> Self {
        let height = (f64::from(self.height) * fraction) as i32;
        Self::new(self.x, self.y, self.width, height)
    }

    /// Clip to a `width` × `height` frame, returning `None` if nothing remains
    #[must_use]
    pub fn clip(&self, frame_width: usize, frame_height: usize) -> Option<PixelBounds> {
        let clamp = |value: i64, max: usize| -> usize {
            usize::try_from(value.max(0)).map_or(max, |v| v.min(max))
        };

        let left = clamp(i64::from(self.x), frame_width);
        let right = clamp(i64::from(self.x) + i64::from(self.width), frame_width);
        let top = clamp(i64::from(self.y), frame_height);
        let bottom = clamp(i64::from(self.y) + i64::from(self.height), frame_height);

        if right <= left || bottom <= top {
            return None;
        }

        Some(PixelBounds {
            left,
            right,
            top,
            bottom,
        })
    }
}
