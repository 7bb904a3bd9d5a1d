//! Error types shared by the frame sources, glyph ramps and the sampler.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening a frame source or decoding one of its frames.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The input path does not exist.
    #[error("input not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A helper binary (ffmpeg/ffprobe) could not be started.
    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// ffprobe ran but did not describe a usable video stream.
    #[error("could not probe {}: {message}", path.display())]
    Probe { path: PathBuf, message: String },

    /// The decoder exited with an error for a specific frame.
    #[error("failed to decode frame #{index}: {message}")]
    Decode { index: usize, message: String },

    /// The decoder returned a buffer whose size does not match the resolution.
    #[error("frame #{index} has {actual} bytes, expected {expected}")]
    FrameSize {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// The requested index lies past the last frame.
    #[error("frame #{index} is out of range ({count} frames)")]
    OutOfRange { index: usize, count: usize },

    /// A still frame could not be read.
    #[error("failed to read {}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The directory of still frames could not be listed.
    #[error("failed to list {}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Errors raised when validating a glyph ramp.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RampError {
    #[error("glyph ramp needs at least 2 glyphs, got {0}")]
    TooShort(usize),

    #[error("glyph ramp contains control character {0:?}")]
    ControlChar(char),
}

/// Errors raised when building a sampling window.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SampleError {
    #[error("frame step must be at least 1")]
    ZeroStep,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_mentions_path() {
        let err = SourceError::NotFound(PathBuf::from("missing.mp4"));
        assert_eq!(err.to_string(), "input not found: missing.mp4");
    }

    #[test]
    fn frame_size_reports_both_lengths() {
        let err = SourceError::FrameSize {
            index: 7,
            expected: 12,
            actual: 4,
        };
        assert_eq!(err.to_string(), "frame #7 has 4 bytes, expected 12");
    }

    #[test]
    fn wrapped_causes_are_not_repeated() {
        use std::error::Error as _;

        let err = SourceError::Spawn {
            program: "ffmpeg".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.to_string(), "failed to run ffmpeg");
        assert_eq!(err.source().unwrap().to_string(), "no such file");

        let err = SourceError::Image {
            path: PathBuf::from("f.png"),
            source: image::ImageError::IoError(std::io::Error::other("truncated")),
        };
        let chain = format!("{:#}", anyhow::Error::new(err));
        assert_eq!(chain.matches("truncated").count(), 1);
    }

    #[test]
    fn ramp_error_display() {
        assert_eq!(
            RampError::TooShort(1).to_string(),
            "glyph ramp needs at least 2 glyphs, got 1"
        );
    }
}
