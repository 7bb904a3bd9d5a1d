//! Frame-source interface consumed by the sampler.

use crate::error::SourceError;
use image::RgbImage;
use std::fmt;

/// Stream metadata reported by a frame source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: usize,
}

impl fmt::Display for VideoInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Resolution: \t {} x {}", self.width, self.height)?;
        writeln!(f, "Framerate: \t {:?}", self.fps)?;
        write!(f, "Frames: \t {}", self.frame_count)
    }
}

/// Random access to decoded RGB frames.
///
/// Implementations must be shareable across worker threads; `read_frame` may be
/// called concurrently for different indices.
pub trait FrameSource: Sync {
    fn info(&self) -> VideoInfo;

    /// Decode frame `index` (0-based).
    fn read_frame(&self, index: usize) -> Result<RgbImage, SourceError>;
}

impl<S: FrameSource + ?Sized> FrameSource for &S {
    fn info(&self) -> VideoInfo {
        (**self).info()
    }

    fn read_frame(&self, index: usize) -> Result<RgbImage, SourceError> {
        (**self).read_frame(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_display_lists_resolution_rate_and_count() {
        let info = VideoInfo {
            width: 640,
            height: 360,
            fps: 25.0,
            frame_count: 120,
        };
        assert_eq!(
            info.to_string(),
            "Resolution: \t 640 x 360\nFramerate: \t 25.0\nFrames: \t 120"
        );
    }

    #[test]
    fn info_display_keeps_fractional_rate() {
        let info = VideoInfo {
            width: 1920,
            height: 1080,
            fps: 29.97,
            frame_count: 0,
        };
        assert!(info.to_string().contains("Framerate: \t 29.97\n"));
    }
}
