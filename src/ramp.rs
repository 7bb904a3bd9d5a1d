//! Glyph ramps: the output palette, ordered from densest to lightest glyph.

use crate::error::RampError;
use std::fmt;

/// Ramp including the Unicode shade/block characters.
pub const BLOCK_RAMP: &str = "█▓▒@░MGC0%t;:,. ";

/// Ramp restricted to plain ASCII glyphs.
pub const PLAIN_RAMP: &str = "@MGC0%t;:,. ";

/// An ordered glyph alphabet. Index 0 is the densest glyph, the last index the
/// blank one. Always holds at least two glyphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphRamp {
    glyphs: Vec<char>,
}

impl GlyphRamp {
    /// Build a ramp from a string, one glyph per `char`.
    pub fn new(glyphs: &str) -> Result<Self, RampError> {
        let glyphs: Vec<char> = glyphs.chars().collect();
        if glyphs.len() < 2 {
            return Err(RampError::TooShort(glyphs.len()));
        }
        if let Some(&c) = glyphs.iter().find(|c| c.is_control()) {
            return Err(RampError::ControlChar(c));
        }
        Ok(Self { glyphs })
    }

    /// The 16-glyph ramp with block characters.
    pub fn block() -> Self {
        Self {
            glyphs: BLOCK_RAMP.chars().collect(),
        }
    }

    /// The 12-glyph ramp without block characters.
    pub fn plain() -> Self {
        Self {
            glyphs: PLAIN_RAMP.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Always false for a constructed ramp.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.glyphs.len() - 1
    }

    /// Glyph at `index`. Callers pass indices produced by a lookup table built
    /// for this ramp, which are always in range.
    #[inline]
    pub fn glyph(&self, index: usize) -> char {
        self.glyphs[index]
    }

    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }
}

impl Default for GlyphRamp {
    fn default() -> Self {
        Self::block()
    }
}

impl fmt::Display for GlyphRamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.glyphs.iter().try_for_each(|c| write!(f, "{}", c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ramp_lengths() {
        assert_eq!(GlyphRamp::block().len(), 16);
        assert_eq!(GlyphRamp::plain().len(), 12);
        assert_eq!(GlyphRamp::block().glyph(0), '█');
        assert_eq!(GlyphRamp::plain().glyph(0), '@');
    }

    #[test]
    fn ramps_end_with_blank() {
        let block = GlyphRamp::block();
        let plain = GlyphRamp::plain();
        assert_eq!(block.glyph(block.last_index()), ' ');
        assert_eq!(plain.glyph(plain.last_index()), ' ');
    }

    #[test]
    fn rejects_short_ramp() {
        assert_eq!(GlyphRamp::new("#"), Err(RampError::TooShort(1)));
        assert_eq!(GlyphRamp::new(""), Err(RampError::TooShort(0)));
    }

    #[test]
    fn rejects_control_chars() {
        assert_eq!(GlyphRamp::new("#\n "), Err(RampError::ControlChar('\n')));
    }

    #[test]
    fn display_round_trips() {
        assert_eq!(GlyphRamp::block().to_string(), BLOCK_RAMP);
        assert_eq!(GlyphRamp::new("#. ").unwrap().to_string(), "#. ");
    }
}
