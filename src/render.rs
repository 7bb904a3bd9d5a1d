use crate::histogram::LuminanceHistogram;
use crate::mapper::LookupTable;
use crate::ramp::GlyphRamp;
use std::fmt;

/// A rendered text frame: `height` rows of exactly `width` glyphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiFrame {
    width: usize,
    rows: Vec<String>,
}

impl AsciiFrame {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Rows joined with `\n`, without a trailing line break.
    pub fn to_text(&self) -> String {
        self.rows.join("\n")
    }
}

impl fmt::Display for AsciiFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(row)?;
        }
        Ok(())
    }
}

/// Map every intensity through `lut` into `ramp` and fold the glyphs into rows
/// of `width`.
///
/// `intensity.len()` is expected to be a multiple of `width`; the resizer
/// produces buffers of exactly `width * height` bytes.
pub fn render(intensity: &[u8], lut: &LookupTable, ramp: &GlyphRamp, width: usize) -> AsciiFrame {
    debug_assert!(width > 0, "render width must be positive");
    debug_assert_eq!(intensity.len() % width.max(1), 0);

    let rows = intensity
        .chunks(width.max(1))
        .map(|row| row.iter().map(|&v| ramp.glyph(lut.get(v))).collect())
        .collect();
    AsciiFrame { width, rows }
}

/// Histogram, lookup table and render in one step for an intensity buffer.
pub fn quantize(intensity: &[u8], ramp: &GlyphRamp, width: usize) -> AsciiFrame {
    let histogram = LuminanceHistogram::from_pixels(intensity);
    let lut = LookupTable::build(&histogram, ramp.len());
    render(intensity, &lut, ramp, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> Vec<u8> {
        (0..width * height)
            .map(|i| ((i % width) * 255 / (width - 1)) as u8)
            .collect()
    }

    #[test]
    fn frame_shape_matches_dimensions() {
        let pixels = gradient(40, 20);
        let frame = quantize(&pixels, &GlyphRamp::block(), 40);
        assert_eq!(frame.height(), 20);
        assert!(frame.rows().iter().all(|r| r.chars().count() == 40));
    }

    #[test]
    fn uniform_black_is_densest_glyph() {
        let ramp = GlyphRamp::block();
        let frame = quantize(&[0u8; 12], &ramp, 4);
        assert_eq!(frame.to_text(), "████\n████\n████");
    }

    #[test]
    fn uniform_white_is_blank_glyph() {
        let ramp = GlyphRamp::plain();
        let frame = quantize(&[255u8; 6], &ramp, 3);
        assert_eq!(frame.to_text(), "   \n   ");
    }

    #[test]
    fn rendering_is_deterministic() {
        let pixels = gradient(33, 7);
        let ramp = GlyphRamp::plain();
        assert_eq!(quantize(&pixels, &ramp, 33), quantize(&pixels, &ramp, 33));
    }

    #[test]
    fn gradient_goes_dark_to_light() {
        let pixels = gradient(64, 1);
        let ramp = GlyphRamp::plain();
        let frame = quantize(&pixels, &ramp, 64);
        let row: Vec<char> = frame.rows()[0].chars().collect();
        assert_eq!(row[0], '@');
        assert_eq!(row[63], ' ');
    }

    #[test]
    fn display_matches_to_text() {
        let frame = quantize(&gradient(10, 3), &GlyphRamp::block(), 10);
        assert_eq!(frame.to_string(), frame.to_text());
    }
}
