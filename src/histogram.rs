/// Per-intensity pixel counts for one intensity image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuminanceHistogram {
    counts: [u64; 256],
}

impl LuminanceHistogram {
    /// Count every byte of `pixels`.
    pub fn from_pixels(pixels: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &p in pixels {
            counts[p as usize] += 1;
        }
        Self { counts }
    }

    #[inline]
    pub fn count(&self, value: u8) -> u64 {
        self.counts[value as usize]
    }

    /// Total number of pixels counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Pixels whose intensity is not exactly zero.
    pub fn nonzero(&self) -> u64 {
        self.total() - self.counts[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_value() {
        let h = LuminanceHistogram::from_pixels(&[0, 0, 7, 255, 7, 7]);
        assert_eq!(h.count(0), 2);
        assert_eq!(h.count(7), 3);
        assert_eq!(h.count(255), 1);
        assert_eq!(h.count(1), 0);
    }

    #[test]
    fn total_matches_pixel_count() {
        let pixels: Vec<u8> = (0..40 * 20).map(|i| (i * 37 % 256) as u8).collect();
        let h = LuminanceHistogram::from_pixels(&pixels);
        assert_eq!(h.total(), pixels.len() as u64);
    }

    #[test]
    fn nonzero_excludes_black() {
        let h = LuminanceHistogram::from_pixels(&[0, 0, 0, 1, 200]);
        assert_eq!(h.nonzero(), 2);
        assert_eq!(LuminanceHistogram::from_pixels(&[]).nonzero(), 0);
    }
}
