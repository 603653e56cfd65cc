//! Test fixtures and constants.

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// Colors of the stripes fixture, left to right
pub const STRIPE_COLORS: [[u8; 3]; 4] = [
    [200, 30, 30],
    [30, 160, 40],
    [30, 40, 200],
    [245, 245, 245],
];

/// Stripe width in source pixels
pub const STRIPE_PIXELS: u32 = 10;

/// Chart width that maps one source pixel block per cell
pub const STRIPES_WIDTH: u32 = 20;

/// Four vertical color stripes, 40×20 pixels
pub fn stripes_image() -> RgbImage {
    RgbImage::from_fn(STRIPE_PIXELS * 4, 20, |x, _| {
        Rgb(STRIPE_COLORS[(x / STRIPE_PIXELS) as usize])
    })
}

pub fn stripes_png() -> Vec<u8> {
    encode_png(&stripes_image())
}

/// A single flat color
pub fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    encode_png(&RgbImage::from_pixel(width, height, Rgb(color)))
}

pub fn encode_png(image: &RgbImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("Failed to encode fixture");
    cursor.into_inner()
}
