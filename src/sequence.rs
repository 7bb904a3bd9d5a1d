use crate::error::SourceError;
use crate::source::{FrameSource, VideoInfo};
use image::RgbImage;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FRAME_EXTENSIONS.iter().any(|ext| ext.eq_ignore_ascii_case(e)))
}

/// A directory of still images treated as a video, one file per frame in file
/// name order.
#[derive(Debug, Clone)]
pub struct ImageSequenceSource {
    frames: Vec<PathBuf>,
    info: VideoInfo,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path, fps: f64) -> Result<Self, SourceError> {
        if !dir.is_dir() {
            return Err(SourceError::NotFound(dir.to_path_buf()));
        }

        let mut frames: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|source| SourceError::Walk {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.into_path();
            if path.is_file() && is_frame_file(&path) {
                frames.push(path);
            }
        }
        frames.sort();

        // The first frame with a readable header sets the resolution; broken
        // frames are left in place and skipped when read.
        let (width, height) = frames
            .iter()
            .find_map(|path| match image::image_dimensions(path) {
                Ok(dims) => Some(dims),
                Err(e) => {
                    log::warn!("cannot read dimensions of {}: {}", path.display(), e);
                    None
                }
            })
            .unwrap_or((0, 0));

        log::info!("opened {}: {} frames of {}x{}", dir.display(), frames.len(), width, height);

        let info = VideoInfo {
            width,
            height,
            fps,
            frame_count: frames.len(),
        };
        Ok(Self { frames, info })
    }

    pub fn frame_paths(&self) -> &[PathBuf] {
        &self.frames
    }
}

impl FrameSource for ImageSequenceSource {
    fn info(&self) -> VideoInfo {
        self.info
    }

    fn read_frame(&self, index: usize) -> Result<RgbImage, SourceError> {
        let path = self.frames.get(index).ok_or(SourceError::OutOfRange {
            index,
            count: self.frames.len(),
        })?;
        let img = image::open(path).map_err(|source| SourceError::Image {
            path: path.clone(),
            source,
        })?;
        Ok(img.to_rgb8())
    }
}
