use crate::ramp::GlyphRamp;
use crate::render::{quantize, AsciiFrame};
use crate::transform::{FrameSize, IntensityTransform, StandardTransform};
use image::RgbImage;

/// Pure per-frame conversion: resize → grayscale → sharpen → histogram →
/// lookup table → text grid. Holds no state between frames.
#[derive(Debug, Clone)]
pub struct FrameConverter<T = StandardTransform> {
    ramp: GlyphRamp,
    width: u32,
    height: u32,
    transform: T,
}

impl FrameConverter<StandardTransform> {
    /// `height` 0 derives the row count from each frame's aspect ratio.
    pub fn new(ramp: GlyphRamp, width: u32, height: u32) -> Self {
        Self::with_transform(ramp, width, height, StandardTransform::default())
    }
}

impl<T: IntensityTransform> FrameConverter<T> {
    pub fn with_transform(ramp: GlyphRamp, width: u32, height: u32, transform: T) -> Self {
        Self {
            ramp,
            width,
            height,
            transform,
        }
    }

    pub fn ramp(&self) -> &GlyphRamp {
        &self.ramp
    }

    /// Grid size used for a source frame of the given resolution.
    pub fn frame_size(&self, source_width: u32, source_height: u32) -> FrameSize {
        FrameSize::resolve(self.width, self.height, source_width, source_height)
    }

    pub fn convert(&self, frame: &RgbImage) -> AsciiFrame {
        let size = self.frame_size(frame.width(), frame.height());
        let intensity = self.transform.to_intensity(frame, size);
        let sharpened = self.transform.sharpen(&intensity);
        quantize(sharpened.as_raw(), &self.ramp, size.width as usize)
    }
}
