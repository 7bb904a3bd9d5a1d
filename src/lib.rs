//! # vidascii - video to ASCII frame pre-renderer
//!
//! `vidascii` converts a video (or a directory of still frames) into a list of
//! fixed-width text frames. Each frame is resized, converted to luminance and
//! sharpened, then every intensity is mapped to a glyph through a per-frame
//! histogram-equalized lookup table so that every glyph of the ramp covers
//! roughly the same share of the picture.
//!
//! ## Features
//!
//! - Video decoding through `ffmpeg`/`ffprobe`, or image directories via `image`
//! - Offset / step / length frame sampling
//! - Parallel frame conversion with order-preserving output
//! - Cooperative cancellation and progress reporting
//!
//! ## Example
//!
//! ```no_run
//! use vidascii::{ConversionOptions, VideoAsciiConverter, VideoOptions};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let converter = VideoAsciiConverter::new();
//! let conv = ConversionOptions::default().with_width(120).with_height(0);
//! let video = VideoOptions::default().with_step(2);
//! let frames = converter.convert_video(
//!     Path::new("video.mp4"),
//!     Path::new("video.mp4.txt"),
//!     &conv,
//!     &video,
//! )?;
//! println!("{} frames written", frames);
//! # Ok(())
//! # }
//! ```
//!
//! ## Converting a single frame
//!
//! ```
//! use vidascii::{ConversionOptions, VideoAsciiConverter};
//! use image::{Rgb, RgbImage};
//!
//! let converter = VideoAsciiConverter::new();
//! let frame = RgbImage::from_pixel(64, 32, Rgb([0, 0, 0]));
//! let options = ConversionOptions::default().with_width(8).with_height(2);
//! let text = converter.frame_to_string(&frame, &options).unwrap();
//! assert_eq!(text, "████████\n████████");
//! ```

pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod histogram;
pub mod mapper;
pub mod output;
pub mod pipeline;
pub mod ramp;
pub mod render;
pub mod sampler;
pub mod sequence;
pub mod source;
pub mod transform;

pub use config::{AppConfig, Preset};
pub use error::{RampError, SampleError, SourceError};
pub use ffmpeg::{FfmpegConfig, FfmpegSource};
pub use histogram::LuminanceHistogram;
pub use mapper::{LookupTable, DARK_CLAMP_THRESHOLD, LIGHT_CLAMP_THRESHOLD, ROUNDING_BIAS};
pub use pipeline::FrameConverter;
pub use ramp::GlyphRamp;
pub use render::AsciiFrame;
pub use sampler::{FrameSampler, LastFrame, SampleWindow, SampledFrame};
pub use sequence::ImageSequenceSource;
pub use source::{FrameSource, VideoInfo};
pub use transform::{FrameSize, IntensityTransform, StandardTransform};

use anyhow::{Context, Result};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::AtomicBool;

/// Represents the current phase of a conversion operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressPhase {
    /// Opening and probing the input
    Probing,
    /// Converting sampled frames to ASCII art
    ConvertingFrames,
    /// Writing the frame file
    Writing,
    /// Conversion completed
    Complete,
}

/// Progress information for conversion operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub phase: ProgressPhase,
    /// Number of items completed in the current phase
    pub completed: usize,
    /// Total number of items in the current phase (0 if unknown)
    pub total: usize,
    /// Percentage complete (0.0 to 100.0)
    pub percentage: f64,
    pub message: String,
}

impl Progress {
    pub fn probing() -> Self {
        Self {
            phase: ProgressPhase::Probing,
            completed: 0,
            total: 0,
            percentage: 0.0,
            message: "Probing input...".to_string(),
        }
    }

    pub fn converting_frames(completed: usize, total: usize) -> Self {
        let percentage = if total > 0 {
            (completed as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        Self {
            phase: ProgressPhase::ConvertingFrames,
            completed,
            total,
            percentage,
            message: format!("Converting frame {} of {}", completed, total),
        }
    }

    pub fn writing(frames: usize) -> Self {
        Self {
            phase: ProgressPhase::Writing,
            completed: 0,
            total: frames,
            percentage: 100.0,
            message: format!("Writing {} frames", frames),
        }
    }

    pub fn complete(total_frames: usize) -> Self {
        Self {
            phase: ProgressPhase::Complete,
            completed: total_frames,
            total: total_frames,
            percentage: 100.0,
            message: format!("Conversion complete: {} frames", total_frames),
        }
    }
}

/// Options controlling how each frame is rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Output width in glyphs
    pub width: u32,
    /// Output height in rows; 0 keeps the source aspect ratio
    pub height: u32,
    /// Use the ramp without block characters
    pub no_block: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            width: 90,
            height: 32,
            no_block: false,
        }
    }
}

impl ConversionOptions {
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn with_no_block(mut self, no_block: bool) -> Self {
        self.no_block = no_block;
        self
    }

    pub fn from_preset(preset: &Preset, no_block: bool) -> Self {
        Self {
            width: preset.width,
            height: preset.height,
            no_block,
        }
    }
}

/// Options controlling which frames are sampled and how they are scheduled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOptions {
    /// First frame index
    pub offset: usize,
    /// Distance between sampled frames (at least 1)
    pub step: usize,
    /// Window length in frames; 0 runs to the end
    pub length: usize,
    pub last_frame: LastFrame,
    /// Worker threads; `None` uses the configured value
    pub jobs: Option<usize>,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            offset: 0,
            step: 1,
            length: 0,
            last_frame: LastFrame::Exclude,
            jobs: None,
        }
    }
}

impl VideoOptions {
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_last_frame(mut self, last_frame: LastFrame) -> Self {
        self.last_frame = last_frame;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn window(&self) -> Result<SampleWindow> {
        Ok(SampleWindow::new(self.offset, self.step, self.length)?.with_last_frame(self.last_frame))
    }
}

/// Main converter struct tying sources, sampling and output together
pub struct VideoAsciiConverter {
    config: AppConfig,
}

impl VideoAsciiConverter {
    /// Create a converter with the built-in configuration
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Create a converter with a custom configuration
    pub fn with_config(config: AppConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Load configuration from a file
    pub fn from_config_file(path: &Path) -> Result<Self> {
        Ok(Self {
            config: AppConfig::from_file(path)?,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Conversion options from a named preset
    pub fn options_from_preset(&self, preset_name: &str, no_block: bool) -> Result<ConversionOptions> {
        let preset = self.config.preset(preset_name)?;
        Ok(ConversionOptions::from_preset(preset, no_block))
    }

    /// Open `input` as a frame source: directories are read as still-frame
    /// sequences, files are decoded with ffmpeg.
    pub fn open_source(&self, input: &Path) -> Result<Box<dyn FrameSource>> {
        if input.is_dir() {
            let source = ImageSequenceSource::open(input, self.config.sequence_fps)
                .with_context(|| format!("opening frame directory {}", input.display()))?;
            Ok(Box::new(source))
        } else {
            let source = FfmpegSource::open(input, &self.config.ffmpeg)
                .with_context(|| format!("opening video {}", input.display()))?;
            Ok(Box::new(source))
        }
    }

    /// Resolution, frame rate and frame count of `input`
    pub fn video_info(&self, input: &Path) -> Result<VideoInfo> {
        Ok(self.open_source(input)?.info())
    }

    /// Frame converter for `options` using the configured ramps
    pub fn frame_converter(&self, options: &ConversionOptions) -> Result<FrameConverter> {
        let ramp = self.config.ramp(options.no_block)?;
        Ok(FrameConverter::new(ramp, options.width, options.height))
    }

    /// Convert one decoded frame to its text form
    pub fn frame_to_string(&self, frame: &RgbImage, options: &ConversionOptions) -> Result<String> {
        Ok(self.frame_converter(options)?.convert(frame).to_text())
    }

    /// Convert a still image file to its text form
    pub fn image_to_string(&self, input: &Path, options: &ConversionOptions) -> Result<String> {
        let img = image::open(input)
            .with_context(|| format!("opening {}", input.display()))?
            .to_rgb8();
        self.frame_to_string(&img, options)
    }

    /// Sample and convert frames from an already opened source
    ///
    /// Returns the converted frames ordered by frame index. Frames that fail
    /// to decode are skipped with a warning. If `cancel` becomes set, the
    /// frames completed so far are returned.
    pub fn convert_frames<S, F>(
        &self,
        source: &S,
        conv_opts: &ConversionOptions,
        video_opts: &VideoOptions,
        cancel: Option<&AtomicBool>,
        progress_callback: F,
    ) -> Result<Vec<SampledFrame>>
    where
        S: FrameSource + ?Sized,
        F: Fn(Progress) + Send + Sync,
    {
        let window = video_opts.window()?;
        let converter = self.frame_converter(conv_opts)?;
        let jobs = video_opts.jobs.unwrap_or(self.config.jobs);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("building worker pool")?;

        let mut sampler = FrameSampler::new(source, &converter);
        if let Some(flag) = cancel {
            sampler = sampler.with_cancel(flag);
        }

        let total = window.indices(source.info().frame_count).len();
        log::info!(
            "converting {} frames (offset {}, step {}, length {}) with {} glyphs",
            total,
            window.offset(),
            window.step(),
            window.length(),
            converter.ramp().len()
        );
        progress_callback(Progress::converting_frames(0, total));

        let frames = pool.install(|| {
            sampler.run(&window, |completed, total| {
                progress_callback(Progress::converting_frames(completed, total))
            })
        });
        Ok(frames)
    }

    /// Convert a video and write the `SPLIT`-delimited frame file to `output`
    ///
    /// Returns the number of frames written.
    pub fn convert_video(
        &self,
        input: &Path,
        output: &Path,
        conv_opts: &ConversionOptions,
        video_opts: &VideoOptions,
    ) -> Result<usize> {
        self.convert_video_with_progress(input, output, conv_opts, video_opts, None, |_| {})
    }

    /// Convert a video with cancellation and detailed progress reporting
    pub fn convert_video_with_progress<F>(
        &self,
        input: &Path,
        output: &Path,
        conv_opts: &ConversionOptions,
        video_opts: &VideoOptions,
        cancel: Option<&AtomicBool>,
        progress_callback: F,
    ) -> Result<usize>
    where
        F: Fn(Progress) + Send + Sync,
    {
        progress_callback(Progress::probing());
        let source = self.open_source(input)?;

        let frames = self.convert_frames(source.as_ref(), conv_opts, video_opts, cancel, &progress_callback)?;

        progress_callback(Progress::writing(frames.len()));
        output::write_frames(output, frames.iter().map(|f| f.frame.to_text()))?;

        progress_callback(Progress::complete(frames.len()));
        Ok(frames.len())
    }
}

impl Default for VideoAsciiConverter {
    fn default() -> Self {
        Self::new()
    }
}
