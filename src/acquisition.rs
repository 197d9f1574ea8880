//! Interfaces to the frame source, face detector, preview display and stop signals.
//!
//! The acquisition loop only talks to these traits. The OpenCV-backed
//! implementations live in [`crate::camera`] behind the `camera` feature;
//! tests drive the loop with synthetic sources.

use crate::frame::{Frame, Region};
use crate::{Error, Result};
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Produces successive video frames
pub trait FrameSource {
    /// Next frame, or `Ok(None)` at end of stream
    ///
    /// # Errors
    ///
    /// Returns an error if the device fails to deliver a frame
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Locates face rectangles in a frame
pub trait RegionDetector {
    /// Face regions in frame coordinates, possibly none
    ///
    /// # Errors
    ///
    /// Returns an error if the detector backend fails on this frame
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>>;
}

/// Receives each frame with its forehead regions for annotation
pub trait DisplaySink {
    /// Show `frame` with `regions` highlighted
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails
    fn present(&mut self, frame: &Frame, regions: &[Region]) -> Result<()>;
}

/// Polled between loop iterations to end acquisition early
pub trait StopSignal {
    /// True once the run should stop
    fn stop_requested(&self) -> bool;
}

/// Stop signal that never fires
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverStop;

impl StopSignal for NeverStop {
    fn stop_requested(&self) -> bool {
        false
    }
}

/// Shared flag set from another context, such as a Ctrl-C handler or a key press
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    /// Create a lowered flag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a flag raised by Ctrl-C
    ///
    /// Only one handler can be installed per process.
    ///
    /// # Errors
    ///
    /// Returns `AcquisitionError` if the signal handler cannot be installed
    pub fn ctrlc() -> Result<Self> {
        let flag = Self::new();
        let handle = flag.clone();
        ctrlc::set_handler(move || {
            info!("Interrupt received, finishing capture");
            handle.raise();
        })
        .map_err(|e| Error::AcquisitionError(format!("Failed to install Ctrl-C handler: {e}")))?;
        Ok(flag)
    }

    /// Raise the flag
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    /// True once raised
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

impl StopSignal for InterruptFlag {
    fn stop_requested(&self) -> bool {
        self.is_raised()
    }
}

/// Fires when any of its members fires
#[derive(Default)]
pub struct AnyStop {
    signals: Vec<Box<dyn StopSignal>>,
}

impl AnyStop {
    /// Create an empty combination, which never fires
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member signal
    #[must_use]
    pub fn with(mut self, signal: impl StopSignal + 'static) -> Self {
        self.signals.push(Box::new(signal));
        self
    }
}

impl StopSignal for AnyStop {
    fn stop_requested(&self) -> bool {
        self.signals.iter().any(|s| s.stop_requested())
    }
}

/// Time elapsed since the start of a run
pub trait Clock {
    /// Elapsed time; must never decrease
    fn elapsed(&self) -> Duration;
}

/// Wall clock anchored at construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    /// Start counting now
    #[must_use]
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }
}

impl Clock for MonotonicClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
