//! [`IndexedImage`]: palette indices plus the palette they refer to.

use crate::color::Rgb;
use crate::palette::Palette;

/// The canonical output of the quantizer.
///
/// Stores one `u8` palette index per pixel in row-major order, along with
/// image dimensions and the palette. Every index is `< palette().len()`.
///
/// # Example
///
/// ```
/// use chart_quant::{IndexedImage, Palette, Rgb};
///
/// let palette = Palette::new(&[Rgb::BLACK, Rgb::WHITE]).unwrap();
/// let image = IndexedImage::new(vec![0, 1, 1, 0], 2, 2, palette);
///
/// assert_eq!(image.get(1, 0), Some(1));
/// assert_eq!(image.to_rgb().len(), 2 * 2 * 3);
/// ```
#[derive(Debug, Clone)]
pub struct IndexedImage {
    indices: Vec<u8>,
    width: usize,
    height: usize,
    palette: Palette,
}

impl IndexedImage {
    /// Create a new `IndexedImage`.
    ///
    /// # Panics (debug only)
    ///
    /// Debug-asserts that `indices.len() == width * height`.
    pub fn new(indices: Vec<u8>, width: usize, height: usize, palette: Palette) -> Self {
        debug_assert_eq!(
            indices.len(),
            width * height,
            "indices length ({}) must match width * height ({}x{}={})",
            indices.len(),
            width,
            height,
            width * height,
        );
        Self {
            indices,
            width,
            height,
            palette,
        }
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Palette indices, row-major.
    #[inline]
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// The palette the indices refer to.
    #[inline]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Index at `(x, y)`, `None` outside the image.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.indices[y * self.width + x])
        } else {
            None
        }
    }

    /// Expand to packed RGB bytes (3 per pixel).
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.indices.len() * 3);
        for &i in &self.indices {
            let c = self.palette.get(i).unwrap_or(Rgb::WHITE);
            out.extend_from_slice(&c.to_bytes());
        }
        out
    }

    /// Split into `(indices, palette colors)`.
    pub fn into_parts(self) -> (Vec<u8>, Vec<Rgb>) {
        (self.indices, self.palette.colors().to_vec())
    }
}
