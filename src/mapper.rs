//! Histogram-equalizing intensity → glyph mapping.
//!
//! Every intensity in `1..=255` is assigned a glyph index by walking the
//! cumulative distribution of the frame's histogram, so that each glyph covers
//! roughly the same number of pixels. Pure black pixels do not take part in the
//! balancing, and both ends of the intensity range are clamped to the first and
//! last glyph regardless of the distribution.

use crate::histogram::LuminanceHistogram;

/// Intensities below this value always map to glyph 0.
pub const DARK_CLAMP_THRESHOLD: u8 = 16;

/// Intensities at or above this value always map to the last glyph.
pub const LIGHT_CLAMP_THRESHOLD: u8 = 241;

/// Subtracted before truncating a bucket position, so a pixel sitting exactly
/// on a bucket edge falls into the lower bucket.
pub const ROUNDING_BIAS: f64 = 0.001;

/// Intensity → glyph index table for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTable {
    indices: [usize; 256],
}

impl LookupTable {
    /// Build the table for a ramp of `ramp_len` glyphs.
    ///
    /// `ramp_len` must be at least 1; `GlyphRamp` guarantees 2.
    pub fn build(histogram: &LuminanceHistogram, ramp_len: usize) -> Self {
        let last = ramp_len.saturating_sub(1);
        let mut indices = [0usize; 256];

        let nonzero = histogram.nonzero();
        if nonzero > 0 {
            let per_glyph = nonzero as f64 / ramp_len as f64;
            let mut processed = 0u64;
            for v in 1..=255u8 {
                let position = processed as f64 / per_glyph - ROUNDING_BIAS;
                // `as` saturates negatives to 0, matching truncation toward zero.
                indices[v as usize] = (position as usize).min(last);
                processed += histogram.count(v);
            }
        }

        for slot in &mut indices[..DARK_CLAMP_THRESHOLD as usize] {
            *slot = 0;
        }
        for slot in &mut indices[LIGHT_CLAMP_THRESHOLD as usize..] {
            *slot = last;
        }

        Self { indices }
    }

    #[inline]
    pub fn get(&self, intensity: u8) -> usize {
        self.indices[intensity as usize]
    }

    pub fn as_slice(&self) -> &[usize; 256] {
        &self.indices
    }
}
