//! Two-phase heart rate run: frame acquisition, then analysis.
//!
//! [`RunContext`] owns the state of one acquisition phase (start clock,
//! sample buffer, deadline). When it stops, the completed sample sequence is
//! handed to [`analyze`], which resamples, filters and picks the dominant
//! frequency.

use crate::acquisition::{Clock, DisplaySink, FrameSource, MonotonicClock, RegionDetector, StopSignal};
use crate::config::Config;
use crate::constants::SECONDS_PER_MINUTE;
use crate::extraction::SignalExtractor;
use crate::filters::{BandPassFilter, NormalizedBand};
use crate::frame::{Frame, Region};
use crate::resample::Resampler;
use crate::series::{Sample, SampleBuffer};
use crate::spectrum::SpectralEstimator;
use crate::Result;
use log::{debug, info, warn};
use std::fmt;
use std::time::Duration;

/// Why the acquisition phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured capture duration elapsed
    Deadline,
    /// A stop signal fired
    StopRequested,
    /// The frame source ran out of frames or failed
    EndOfStream,
}

/// Result of a completed run, with the values it was derived from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartRateEstimate {
    /// Beats per minute
    pub bpm: f64,
    /// Dominant frequency in Hz
    pub peak_hz: f64,
    /// Effective sample rate in Hz
    pub sample_rate: f64,
    /// Number of samples analysed
    pub sample_count: usize,
    /// Normalized band edges actually used by the filter
    pub band: NormalizedBand,
}

impl fmt::Display for HeartRateEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Estimated Heart Rate: {:.2} BPM", self.bpm)
    }
}

/// State of one acquisition phase
pub struct RunContext<C: Clock = MonotonicClock> {
    clock: C,
    deadline: Duration,
    extractor: SignalExtractor,
    buffer: SampleBuffer,
    frames: usize,
}

impl RunContext<MonotonicClock> {
    /// Start a run now
    #[must_use]
    pub fn start(config: &Config) -> Self {
        Self::with_clock(config, MonotonicClock::start())
    }
}

impl<C: Clock> RunContext<C> {
    /// Start a run timed by `clock`
    #[must_use]
    pub fn with_clock(config: &Config, clock: C) -> Self {
        Self {
            clock,
            deadline: config.capture.duration(),
            extractor: SignalExtractor::new(config.roi.forehead_fraction),
            buffer: SampleBuffer::new(),
            frames: 0,
        }
    }

    /// Frames processed so far
    #[must_use]
    pub const fn frames(&self) -> usize {
        self.frames
    }

    /// Samples buffered so far
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        self.buffer.as_slice()
    }

    /// Extract samples from one frame's face regions, timestamped now
    ///
    /// Returns the forehead regions that were measured.
    ///
    /// # Errors
    ///
    /// Returns an error if the clock went backwards
    pub fn record(&mut self, frame: &Frame, faces: &[Region]) -> Result<Vec<Region>> {
        let timestamp = self.clock.elapsed().as_secs_f64();
        let appended = self.extractor.extract(frame, faces, timestamp, &mut self.buffer)?;
        self.frames += 1;
        debug!(
            "Frame {} at {timestamp:.3}s: {} face(s), {appended} sample(s)",
            self.frames,
            faces.len()
        );
        Ok(faces.iter().map(|face| self.extractor.forehead(face)).collect())
    }

    /// Run the acquisition loop until the deadline, a stop signal or end of stream
    ///
    /// Frame source failures end the stream, detector failures count as a
    /// frame without faces and display failures are ignored; all three are
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns an error only if sample timestamps go backwards
    pub fn acquire(
        &mut self,
        source: &mut dyn FrameSource,
        detector: &mut dyn RegionDetector,
        mut display: Option<&mut dyn DisplaySink>,
        stop: &dyn StopSignal,
    ) -> Result<StopReason> {
        info!("Capturing for {:.1}s", self.deadline.as_secs_f64());

        let reason = loop {
            if self.clock.elapsed() >= self.deadline {
                break StopReason::Deadline;
            }
            if stop.stop_requested() {
                break StopReason::StopRequested;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break StopReason::EndOfStream,
                Err(e) => {
                    warn!("Frame acquisition failed, ending capture: {e}");
                    break StopReason::EndOfStream;
                }
            };

            let faces = detector.detect(&frame).unwrap_or_else(|e| {
                warn!("Face detection failed on frame {}: {e}", self.frames + 1);
                Vec::new()
            });

            let foreheads = self.record(&frame, &faces)?;

            if let Some(sink) = display.as_deref_mut() {
                if let Err(e) = sink.present(&frame, &foreheads) {
                    warn!("Display failed: {e}");
                }
            }
        };

        info!(
            "Capture finished ({reason:?}) after {} frame(s), {} sample(s)",
            self.frames,
            self.buffer.len()
        );
        Ok(reason)
    }

    /// End the acquisition phase and take ownership of the samples
    #[must_use]
    pub fn finish(self) -> Vec<Sample> {
        self.buffer.into_samples()
    }
}

/// Estimate the heart rate from a completed sample sequence
///
/// # Errors
///
/// Returns `InsufficientSamples` for fewer than two samples, or an error if
/// the filter cannot be designed for the effective sample rate
pub fn analyze(samples: &[Sample], config: &Config) -> Result<HeartRateEstimate> {
    let series = Resampler::new(config.capture.duration_secs)
        .with_rate_basis(config.analysis.rate_basis)
        .resample(samples)?;

    let (filtered, band) = BandPassFilter::from(&config.filter).apply(&series)?;
    let peak = SpectralEstimator.estimate(&filtered)?;

    let estimate = HeartRateEstimate {
        bpm: peak.frequency_hz * SECONDS_PER_MINUTE,
        peak_hz: peak.frequency_hz,
        sample_rate: filtered.sample_rate,
        sample_count: samples.len(),
        band,
    };
    info!(
        "Analysed {} samples at {:.3} Hz: peak {:.4} Hz (bin {}), band [{:.4}, {:.4}]",
        estimate.sample_count, estimate.sample_rate, estimate.peak_hz, peak.bin, band.low, band.high
    );
    Ok(estimate)
}

/// Acquire with a fresh [`RunContext`] and analyse the result
///
/// # Errors
///
/// Returns `InsufficientSamples` if fewer than two samples were captured
pub fn run(
    config: &Config,
    source: &mut dyn FrameSource,
    detector: &mut dyn RegionDetector,
    display: Option<&mut dyn DisplaySink>,
    stop: &dyn StopSignal,
) -> Result<HeartRateEstimate> {
    let mut context = RunContext::start(config);
    context.acquire(source, detector, display, stop)?;
    analyze(&context.finish(), config)
}
