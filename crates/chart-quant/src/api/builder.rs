//! Builder API for quantization.
//!
//! [`Quantizer`] bundles palette size, dither algorithm and dither options
//! behind a fluent builder.

use super::error::QuantError;
use crate::color::Rgb;
use crate::dither::{dither_with_kernel, map_nearest, DitherAlgorithm, DitherOptions};
use crate::output::IndexedImage;
use crate::palette::{median_cut, Palette};

/// Smallest palette the quantizer will build.
pub const MIN_COLORS: usize = 2;

/// Largest palette addressable by a `u8` index.
pub const MAX_COLORS: usize = 256;

/// Median-cut quantizer with error diffusion.
///
/// # Example
///
/// ```
/// use chart_quant::{DitherAlgorithm, Quantizer, Rgb};
///
/// let pixels = vec![Rgb::new(200, 10, 10), Rgb::new(10, 10, 200)];
/// let result = Quantizer::new(8)
///     .algorithm(DitherAlgorithm::None)
///     .quantize(&pixels, 2, 1)
///     .unwrap();
///
/// assert_eq!(result.palette().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Quantizer {
    max_colors: usize,
    algorithm: DitherAlgorithm,
    options: DitherOptions,
}

impl Quantizer {
    /// Create a quantizer producing at most `max_colors` colors.
    ///
    /// The count is clamped to `2..=256`.
    pub fn new(max_colors: usize) -> Self {
        Self {
            max_colors: max_colors.clamp(MIN_COLORS, MAX_COLORS),
            algorithm: DitherAlgorithm::default(),
            options: DitherOptions::default(),
        }
    }

    /// Effective (clamped) color limit.
    pub fn max_colors(&self) -> usize {
        self.max_colors
    }

    /// Select the dither algorithm.
    pub fn algorithm(mut self, algorithm: DitherAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Enable or disable serpentine scanning.
    pub fn serpentine(mut self, enabled: bool) -> Self {
        self.options = self.options.serpentine(enabled);
        self
    }

    /// Set the error clamp (fraction of the channel range).
    pub fn error_clamp(mut self, clamp: f32) -> Self {
        self.options = self.options.error_clamp(clamp);
        self
    }

    /// Quantize row-major `pixels` of a `width`×`height` image.
    ///
    /// # Errors
    ///
    /// - [`QuantError::EmptyImage`] when either dimension is zero
    /// - [`QuantError::DimensionMismatch`] when `pixels.len() != width * height`
    pub fn quantize(
        &self,
        pixels: &[Rgb],
        width: usize,
        height: usize,
    ) -> Result<IndexedImage, QuantError> {
        if width == 0 || height == 0 {
            return Err(QuantError::EmptyImage);
        }
        if pixels.len() != width * height {
            return Err(QuantError::DimensionMismatch {
                expected: width * height,
                actual: pixels.len(),
            });
        }

        let colors = median_cut(pixels, self.max_colors);
        let palette = Palette::new(&colors)?;

        let indices = match self.algorithm.kernel() {
            Some(kernel) => {
                dither_with_kernel(pixels, width, height, &palette, kernel, &self.options)
            }
            None => map_nearest(pixels, &palette),
        };

        Ok(IndexedImage::new(indices, width, height, palette))
    }
}
