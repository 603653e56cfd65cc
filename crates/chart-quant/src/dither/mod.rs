//! Error diffusion dithering.
//!
//! Pixels are processed in scan order; each is mapped to its nearest
//! palette color and the difference is pushed onto unvisited neighbors
//! according to a [`Kernel`]. All arithmetic happens on sRGB channel
//! values in `0.0..=255.0`, the same space the chart colors live in.

mod kernel;
mod options;

pub use kernel::*;
pub use options::DitherOptions;

use crate::color::Rgb;
use crate::palette::Palette;

/// Dither algorithm selection for the [`Quantizer`](crate::Quantizer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitherAlgorithm {
    /// Floyd-Steinberg error diffusion (100% propagation).
    #[default]
    FloydSteinberg,

    /// Atkinson error diffusion (75% propagation).
    Atkinson,

    /// Sierra Lite error diffusion (100% propagation, 3 neighbors).
    SierraLite,

    /// Plain nearest-color mapping, no diffusion.
    None,
}

impl DitherAlgorithm {
    /// Diffusion kernel, or `None` for plain nearest-color mapping.
    pub fn kernel(self) -> Option<&'static Kernel> {
        match self {
            DitherAlgorithm::FloydSteinberg => Some(&FLOYD_STEINBERG),
            DitherAlgorithm::Atkinson => Some(&ATKINSON),
            DitherAlgorithm::SierraLite => Some(&SIERRA_LITE),
            DitherAlgorithm::None => None,
        }
    }
}

/// Error buffer for efficient error diffusion.
///
/// Keeps only the rows the kernel can reach: `rows[0]` is the current row,
/// `rows[1]` the next one, and so on.
#[derive(Debug)]
pub struct ErrorBuffer {
    rows: Vec<Vec<[f32; 3]>>,
    width: usize,
}

impl ErrorBuffer {
    /// Create a buffer for `width` pixels tracking `row_depth` rows.
    pub fn new(width: usize, row_depth: usize) -> Self {
        Self {
            rows: (0..row_depth).map(|_| vec![[0.0; 3]; width]).collect(),
            width,
        }
    }

    /// Accumulated error for pixel `x` of the current row.
    #[inline]
    pub fn get_accumulated(&self, x: usize) -> [f32; 3] {
        self.rows[0][x]
    }

    /// Add error to a future pixel. Out-of-bounds targets are ignored.
    #[inline]
    pub fn add_error(&mut self, x: usize, row_offset: usize, error: [f32; 3]) {
        if x < self.width && row_offset < self.rows.len() {
            for c in 0..3 {
                self.rows[row_offset][x][c] += error[c];
            }
        }
    }

    /// Discard the current row and start a zeroed one at the end.
    pub fn advance_row(&mut self) {
        self.rows.rotate_left(1);
        if let Some(last) = self.rows.last_mut() {
            last.fill([0.0; 3]);
        }
    }
}

/// Clamp a channel value plus error to `[-max, 255 + max]`.
#[inline]
pub(crate) fn clamp_channel(value: f32, max_error: f32) -> f32 {
    value.clamp(-max_error, 255.0 + max_error)
}

/// Map every pixel to its nearest palette index without diffusion.
pub(crate) fn map_nearest(image: &[Rgb], palette: &Palette) -> Vec<u8> {
    image.iter().map(|&p| palette.find_nearest(p)).collect()
}

/// Core error diffusion loop shared by all kernels.
///
/// Returns one palette index per pixel, row-major.
pub(crate) fn dither_with_kernel(
    image: &[Rgb],
    width: usize,
    height: usize,
    palette: &Palette,
    kernel: &Kernel,
    options: &DitherOptions,
) -> Vec<u8> {
    let mut output = vec![0u8; width * height];
    let max_error = options.error_clamp * 255.0;
    let divisor = kernel.divisor as f32;

    let mut error_buf = ErrorBuffer::new(width, kernel.max_dy + 1);

    for y in 0..height {
        let reverse = options.serpentine && y % 2 == 1;

        let x_range: Box<dyn Iterator<Item = usize>> = if reverse {
            Box::new((0..width).rev())
        } else {
            Box::new(0..width)
        };

        for x in x_range {
            let idx = y * width + x;
            let src = image[idx];
            let accumulated = error_buf.get_accumulated(x);

            let r = clamp_channel(src.r as f32 + accumulated[0], max_error);
            let g = clamp_channel(src.g as f32 + accumulated[1], max_error);
            let b = clamp_channel(src.b as f32 + accumulated[2], max_error);

            let nearest = palette.find_nearest_rgb(r, g, b);
            output[idx] = nearest;

            // Palette colors always resolve; index comes from find_nearest.
            let chosen = palette.colors()[nearest as usize];
            let error = [r - chosen.r as f32, g - chosen.g as f32, b - chosen.b as f32];

            for &(dx, dy, weight) in kernel.entries {
                let dx = if reverse { -dx } else { dx };
                let tx = x as i64 + dx as i64;
                if tx < 0 {
                    continue;
                }
                let factor = weight as f32 / divisor;
                error_buf.add_error(
                    tx as usize,
                    dy as usize,
                    [error[0] * factor, error[1] * factor, error[2] * factor],
                );
            }
        }

        error_buf.advance_row();
    }

    output
}
