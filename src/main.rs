//! Webcam heart rate estimation: capture, then print the estimated pulse.

use anyhow::{Context, Result};
use clap::Parser;
use heart_rate_estimation::acquisition::{AnyStop, DisplaySink, InterruptFlag};
use heart_rate_estimation::camera::{CameraSource, HaarCascadeDetector, HighGuiDisplay};
use heart_rate_estimation::config::{Config, EXAMPLE_CONFIG};
use heart_rate_estimation::pipeline;
use log::{info, warn};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status when too few samples were captured to estimate a heart rate
const EXIT_INSUFFICIENT_SAMPLES: u8 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long)]
    cam: Option<i32>,

    /// Video file to process instead of the camera
    #[arg(short, long)]
    video: Option<PathBuf>,

    /// Capture duration in seconds
    #[arg(short = 't', long)]
    duration: Option<f64>,

    /// Haar cascade XML file for face detection
    #[arg(long)]
    cascade: Option<PathBuf>,

    /// Run without the preview window (stop with Ctrl-C)
    #[arg(long)]
    no_gui: bool,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Write an example configuration file to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

impl Args {
    /// Layer command line overrides on top of the file configuration
    fn apply(&self, config: &mut Config) {
        if let Some(cam) = self.cam {
            config.capture.camera_index = cam;
        }
        if let Some(video) = &self.video {
            config.capture.video_path = Some(video.clone());
        }
        if let Some(duration) = self.duration {
            config.capture.duration_secs = duration;
        }
        if let Some(cascade) = &self.cascade {
            config.detection.cascade_path = cascade.clone();
        }
        if self.no_gui {
            config.capture.show_window = false;
        }
    }
}

fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if let Some(path) = &args.write_config {
        std::fs::write(path, EXAMPLE_CONFIG).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote example configuration to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path)?
        }
        None => Config::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    info!("Heart Rate Estimation");

    let mut source = CameraSource::from_config(&config.capture)?;
    let mut detector = HaarCascadeDetector::new(&config.detection)?;

    let mut stop = AnyStop::new();
    match InterruptFlag::ctrlc() {
        Ok(flag) => stop = stop.with(flag),
        Err(e) => warn!("{e}"),
    }

    let mut window = if config.capture.show_window {
        let window = HighGuiDisplay::new()?;
        stop = stop.with(window.quit_flag());
        Some(window)
    } else {
        None
    };
    let display = window.as_mut().map(|w| w as &mut dyn DisplaySink);

    match pipeline::run(&config, &mut source, &mut detector, display, &stop) {
        Ok(estimate) => {
            println!("{estimate}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_insufficient_samples() => {
            eprintln!("Error: {e}. Make sure your face is visible to the camera.");
            Ok(ExitCode::from(EXIT_INSUFFICIENT_SAMPLES))
        }
        Err(e) => Err(e.into()),
    }
}
