//! Ordered color palette with nearest-color lookup.

use super::error::PaletteError;
use crate::color::Rgb;

/// An ordered list of colors addressed by `u8` index.
///
/// Colors may repeat; lookups always resolve to the first of several equal
/// candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Create a palette from a color list.
    ///
    /// # Errors
    ///
    /// - [`PaletteError::EmptyPalette`] if `colors` is empty
    /// - [`PaletteError::TooManyColors`] if it holds more than 256 entries
    pub fn new(colors: &[Rgb]) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::EmptyPalette);
        }
        if colors.len() > 256 {
            return Err(PaletteError::TooManyColors {
                count: colors.len(),
            });
        }
        Ok(Self {
            colors: colors.to_vec(),
        })
    }

    /// Number of colors.
    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always `false`; construction rejects empty palettes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`, if present.
    #[inline]
    pub fn get(&self, index: u8) -> Option<Rgb> {
        self.colors.get(index as usize).copied()
    }

    /// All colors in index order.
    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Index of the color closest to `target` (Euclidean RGB).
    ///
    /// Ties resolve to the lowest index.
    pub fn find_nearest(&self, target: Rgb) -> u8 {
        self.find_nearest_rgb(target.r as f32, target.g as f32, target.b as f32)
    }

    /// Same as [`find_nearest`](Self::find_nearest) for an unclamped
    /// floating point color, as produced during error diffusion.
    pub fn find_nearest_rgb(&self, r: f32, g: f32, b: f32) -> u8 {
        let mut best = 0usize;
        let mut best_dist = f32::INFINITY;
        for (i, c) in self.colors.iter().enumerate() {
            let dr = r - c.r as f32;
            let dg = g - c.g as f32;
            let db = b - c.b as f32;
            let dist = dr * dr + dg * dg + db * db;
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Palette::new(&[]), Err(PaletteError::EmptyPalette));
    }

    #[test]
    fn test_rejects_more_than_256() {
        let colors = vec![Rgb::BLACK; 257];
        assert_eq!(
            Palette::new(&colors),
            Err(PaletteError::TooManyColors { count: 257 })
        );
        assert!(Palette::new(&colors[..256]).is_ok());
    }

    #[test]
    fn test_find_nearest() {
        let palette = Palette::new(&[Rgb::BLACK, Rgb::WHITE, Rgb::new(255, 0, 0)]).unwrap();
        assert_eq!(palette.find_nearest(Rgb::new(10, 10, 10)), 0);
        assert_eq!(palette.find_nearest(Rgb::new(240, 250, 245)), 1);
        assert_eq!(palette.find_nearest(Rgb::new(200, 30, 20)), 2);
    }

    #[test]
    fn test_find_nearest_tie_prefers_lowest_index() {
        let palette = Palette::new(&[Rgb::new(0, 0, 0), Rgb::new(20, 0, 0)]).unwrap();
        assert_eq!(palette.find_nearest(Rgb::new(10, 0, 0)), 0);

        let dup = Palette::new(&[Rgb::WHITE, Rgb::WHITE]).unwrap();
        assert_eq!(dup.find_nearest(Rgb::WHITE), 0);
    }
}
