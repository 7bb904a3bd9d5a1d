//! Video files decoded through `ffprobe`/`ffmpeg` subprocesses.
//!
//! `ffprobe` reports the stream metadata once at open time. Every frame read
//! spawns a short-lived `ffmpeg` that seeks to the frame's timestamp and writes
//! a single raw `rgb24` frame to stdout, so reads for different indices are
//! independent and can run in parallel.

use crate::error::SourceError;
use crate::source::{FrameSource, VideoInfo};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command as ProcCommand, Stdio};

/// Names (or paths) of the ffmpeg binaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl FfmpegConfig {
    pub fn ffmpeg_cmd(&self) -> &str {
        &self.ffmpeg
    }

    pub fn ffprobe_cmd(&self) -> &str {
        &self.ffprobe
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
    #[serde(default)]
    tags: ProbeTags,
}

#[derive(Debug, Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

impl ProbeStream {
    /// Display rotation in degrees, from the display matrix side data or the
    /// older `rotate` tag.
    fn rotation(&self) -> f64 {
        self.side_data_list
            .iter()
            .find_map(|d| d.rotation)
            .or_else(|| self.tags.rotate.as_deref().and_then(|r| r.trim().parse().ok()))
            .unwrap_or(0.0)
    }
}

/// Parse an ffprobe rate such as `30000/1001` or `25`.
fn parse_rate(rate: &str) -> Option<f64> {
    let mut parts = rate.trim().splitn(2, '/');
    let num: f64 = parts.next()?.parse().ok()?;
    let den: f64 = match parts.next() {
        Some(d) => d.parse().ok()?,
        None => 1.0,
    };
    if den > 0.0 && num > 0.0 {
        Some(num / den)
    } else {
        None
    }
}

fn parse_probe(path: &Path, json: &[u8]) -> Result<VideoInfo, SourceError> {
    let probe_err = |message: String| SourceError::Probe {
        path: path.to_path_buf(),
        message,
    };

    let output: ProbeOutput =
        serde_json::from_slice(json).map_err(|e| probe_err(format!("invalid ffprobe output: {}", e)))?;
    let stream = output
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| probe_err("no video stream".to_string()))?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(probe_err("video stream has no resolution".to_string())),
    };
    // ffmpeg applies the display rotation when decoding, so quarter turns
    // swap the decoded frame's dimensions.
    let quarter_turns = (stream.rotation() / 90.0).round() as i64;
    let (width, height) = if quarter_turns.rem_euclid(2) == 1 {
        (height, width)
    } else {
        (width, height)
    };

    let fps = stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .or_else(|| stream.avg_frame_rate.as_deref().and_then(parse_rate))
        .ok_or_else(|| probe_err("video stream has no frame rate".to_string()))?;

    let frame_count = stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .or_else(|| {
            let secs: f64 = stream.duration.as_deref()?.trim().parse().ok()?;
            Some((secs * fps).round() as usize)
        })
        .unwrap_or(0);

    Ok(VideoInfo {
        width,
        height,
        fps,
        frame_count,
    })
}

/// A video file read through ffmpeg.
#[derive(Debug, Clone)]
pub struct FfmpegSource {
    path: PathBuf,
    info: VideoInfo,
    config: FfmpegConfig,
}

impl FfmpegSource {
    /// Probe `path` and prepare it for frame reads.
    pub fn open(path: &Path, config: &FfmpegConfig) -> Result<Self, SourceError> {
        if !path.is_file() {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }

        let output = ProcCommand::new(config.ffprobe_cmd())
            .args(["-v", "error", "-select_streams", "v:0", "-show_streams", "-print_format", "json"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| SourceError::Spawn {
                program: config.ffprobe_cmd().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(SourceError::Probe {
                path: path.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let info = parse_probe(path, &output.stdout)?;
        log::info!(
            "opened {}: {}x{} @ {:.3}fps, {} frames",
            path.display(),
            info.width,
            info.height,
            info.fps,
            info.frame_count
        );

        Ok(Self {
            path: path.to_path_buf(),
            info,
            config: config.clone(),
        })
    }
}

impl FrameSource for FfmpegSource {
    fn info(&self) -> VideoInfo {
        self.info
    }

    fn read_frame(&self, index: usize) -> Result<RgbImage, SourceError> {
        if index >= self.info.frame_count {
            return Err(SourceError::OutOfRange {
                index,
                count: self.info.frame_count,
            });
        }

        let timestamp = format!("{:.6}", index as f64 / self.info.fps);
        let output = ProcCommand::new(self.config.ffmpeg_cmd())
            .args(["-v", "error", "-ss", &timestamp, "-i"])
            .arg(&self.path)
            .args(["-frames:v", "1", "-an", "-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .output()
            .map_err(|source| SourceError::Spawn {
                program: self.config.ffmpeg_cmd().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(SourceError::Decode {
                index,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let expected = self.info.width as usize * self.info.height as usize * 3;
        let actual = output.stdout.len();
        if actual != expected {
            return Err(SourceError::FrameSize {
                index,
                expected,
                actual,
            });
        }

        RgbImage::from_raw(self.info.width, self.info.height, output.stdout).ok_or(SourceError::FrameSize {
            index,
            expected,
            actual,
        })
    }
}
