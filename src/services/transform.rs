//! Photographic pre-processing ahead of quantization.
//!
//! Tonal adjustments follow the "enhance" convention: each one blends the
//! image with a degenerate version of itself (black for brightness, the mean
//! gray for contrast, the grayscale image for saturation) by a factor, so
//! 1.0 is always the identity and values above 1.0 extrapolate.

use chart_quant::Rgb;
use image::imageops::FilterType;
use image::RgbImage;

use crate::error::ChartError;
use crate::models::{DisplayParams, GenerationParams, MAX_GRID_HEIGHT, MAX_GRID_WIDTH};

/// Decode any supported image format into 8-bit RGB
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, ChartError> {
    if bytes.is_empty() {
        return Err(ChartError::InvalidImage("empty upload".to_string()));
    }
    let image =
        image::load_from_memory(bytes).map_err(|e| ChartError::InvalidImage(e.to_string()))?;
    let rgb = image.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(ChartError::InvalidImage("image has no pixels".to_string()));
    }
    Ok(rgb)
}

/// Chart dimensions in cells for a source of `src_w`×`src_h` pixels.
///
/// Rows are stretched by the gauge ratio so that the knitted piece keeps
/// the photo's proportions. Very tall photos are cut off at
/// [`MAX_GRID_HEIGHT`] rows.
pub fn target_size(src_w: u32, src_h: u32, display: &DisplayParams) -> (u32, u32) {
    let width = display.grid_width_cells.clamp(1, MAX_GRID_WIDTH);
    if src_w == 0 {
        return (width, 1);
    }
    let height = (width as f64 * src_h as f64 / src_w as f64 * display.gauge_ratio()).round();
    (width, height.clamp(1.0, MAX_GRID_HEIGHT as f64) as u32)
}

/// Apply the tonal adjustments, then resample to chart size with Lanczos3
pub fn prepare(
    source: &RgbImage,
    generation: &GenerationParams,
    display: &DisplayParams,
) -> RgbImage {
    let adjusted = adjust(source, generation);
    let (width, height) = target_size(source.width(), source.height(), display);
    image::imageops::resize(&adjusted, width, height, FilterType::Lanczos3)
}

/// Brightness, contrast, saturation, gamma and posterize, in that order
pub fn adjust(source: &RgbImage, params: &GenerationParams) -> RgbImage {
    let mut image = source.clone();

    if params.brightness != 1.0 {
        let factor = params.brightness;
        for pixel in image.pixels_mut() {
            for c in pixel.0.iter_mut() {
                *c = blend(0.0, *c, factor);
            }
        }
    }

    if params.contrast != 1.0 {
        let mean = mean_luma(&image);
        let factor = params.contrast;
        for pixel in image.pixels_mut() {
            for c in pixel.0.iter_mut() {
                *c = blend(mean, *c, factor);
            }
        }
    }

    if params.saturation != 1.0 {
        let factor = params.saturation;
        for pixel in image.pixels_mut() {
            let [r, g, b] = pixel.0;
            let gray = luma(r, g, b) as f32;
            pixel.0 = [
                blend(gray, r, factor),
                blend(gray, g, factor),
                blend(gray, b, factor),
            ];
        }
    }

    if params.gamma != 1.0 && params.gamma > 0.0 {
        let lut = gamma_table(params.gamma);
        for pixel in image.pixels_mut() {
            for c in pixel.0.iter_mut() {
                *c = lut[*c as usize];
            }
        }
    }

    if params.posterize_bits < 8 {
        let mask = posterize_mask(params.posterize_bits);
        for pixel in image.pixels_mut() {
            for c in pixel.0.iter_mut() {
                *c &= mask;
            }
        }
    }

    image
}

/// Flatten into the quantizer's pixel format
pub fn to_pixels(image: &RgbImage) -> Vec<Rgb> {
    image.pixels().map(|p| Rgb::from(p.0)).collect()
}

/// `degenerate + factor × (value − degenerate)`, truncated and clipped
fn blend(degenerate: f32, value: u8, factor: f32) -> u8 {
    let v = degenerate + factor * (value as f32 - degenerate);
    (v as i32).clamp(0, 255) as u8
}

/// ITU-R 601-2 luma with 16-bit fixed point rounding
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// Mean gray level, rounded to an integer
fn mean_luma(image: &RgbImage) -> f32 {
    let count = image.width() as u64 * image.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = image
        .pixels()
        .map(|p| luma(p.0[0], p.0[1], p.0[2]) as u64)
        .sum();
    (sum as f64 / count as f64 + 0.5).floor() as f32
}

/// Lookup table for `255 × (v / 255)^(1 / gamma)`; gamma above 1 lifts midtones
fn gamma_table(gamma: f32) -> [u8; 256] {
    let exponent = 1.0 / gamma as f64;
    let mut lut = [0u8; 256];
    for (v, out) in lut.iter_mut().enumerate() {
        let normalized = v as f64 / 255.0;
        *out = (255.0 * normalized.powf(exponent)).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Keep the `bits` most significant bits of a channel
fn posterize_mask(bits: u8) -> u8 {
    let bits = bits.clamp(1, 8);
    !(0xFFu8.checked_shr(bits as u32).unwrap_or(0))
}
