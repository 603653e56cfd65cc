//! Quantizer output.

mod indexed_image;

pub use indexed_image::IndexedImage;
