//! Resize, grayscale and sharpen stages that turn a decoded RGB frame into the
//! intensity image the quantizer works on.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgb, RgbImage};

/// Sharpening kernel applied before quantization, normalised by `SHARPEN_SCALE`.
pub const SHARPEN_KERNEL: [[i32; 3]; 3] = [[-2, -2, -2], [-2, 32, -2], [-2, -2, -2]];
pub const SHARPEN_SCALE: i32 = 16;

/// ITU-R 601-2 luma weights in 16.16 fixed point; they sum to 65536.
const LUMA_R: u32 = 19595;
const LUMA_G: u32 = 38470;
const LUMA_B: u32 = 7471;

/// `L = R * 299/1000 + G * 587/1000 + B * 114/1000`, rounded.
#[inline]
pub fn luma(px: &Rgb<u8>) -> u8 {
    let [r, g, b] = px.0;
    ((r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B + 0x8000) >> 16) as u8
}

fn to_luma(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| Luma([luma(image.get_pixel(x, y))]))
}

/// Output grid size in glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// Resolve the target size for a source of `orig_width`×`orig_height`.
    ///
    /// A `target_height` of 0 keeps the source aspect ratio.
    pub fn resolve(target_width: u32, target_height: u32, orig_width: u32, orig_height: u32) -> Self {
        let width = target_width.max(1);
        let height = if target_height == 0 {
            let h = (width as f64 * orig_height as f64 / orig_width.max(1) as f64).round() as u32;
            h.max(1)
        } else {
            target_height
        };
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Conversion of decoded frames into sharpened intensity images.
pub trait IntensityTransform: Sync {
    /// Resample `frame` to `size` and convert it to single-channel luminance.
    fn to_intensity(&self, frame: &RgbImage, size: FrameSize) -> GrayImage;

    /// Apply the sharpening filter; dimensions are preserved.
    fn sharpen(&self, image: &GrayImage) -> GrayImage;
}

/// `image`-crate backed transform.
#[derive(Debug, Clone, Copy)]
pub struct StandardTransform {
    pub filter: FilterType,
}

impl Default for StandardTransform {
    fn default() -> Self {
        Self {
            filter: FilterType::CatmullRom,
        }
    }
}

impl IntensityTransform for StandardTransform {
    fn to_intensity(&self, frame: &RgbImage, size: FrameSize) -> GrayImage {
        if frame.dimensions() == (size.width, size.height) {
            return to_luma(frame);
        }
        let resized = imageops::resize(frame, size.width, size.height, self.filter);
        to_luma(&resized)
    }

    fn sharpen(&self, image: &GrayImage) -> GrayImage {
        sharpen(image)
    }
}

/// Convolve with `SHARPEN_KERNEL`. Border pixels are copied unchanged.
pub fn sharpen(image: &GrayImage) -> GrayImage {
    let (w, h) = image.dimensions();
    if w < 3 || h < 3 {
        return image.clone();
    }

    GrayImage::from_fn(w, h, |x, y| {
        if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
            return *image.get_pixel(x, y);
        }
        let mut acc = 0i32;
        for (ky, row) in SHARPEN_KERNEL.iter().enumerate() {
            for (kx, k) in row.iter().enumerate() {
                acc += k * image.get_pixel(x + kx as u32 - 1, y + ky as u32 - 1)[0] as i32;
            }
        }
        let v = (acc as f32 / SHARPEN_SCALE as f32).round();
        Luma([v.clamp(0.0, 255.0) as u8])
    })
}
