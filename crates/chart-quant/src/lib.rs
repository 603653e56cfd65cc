#![allow(clippy::module_inception)]

//! chart-quant: color quantization for stitch charts
//!
//! Reduces a full-color image to an indexed image with at most 256 colors,
//! ready to be used as a knitting or crochet chart where every cell holds
//! one palette index.
//!
//! # Quick Start
//!
//! ```
//! use chart_quant::{Quantizer, Rgb};
//!
//! let pixels = vec![Rgb::new(128, 128, 128); 4];
//! let result = Quantizer::new(16).quantize(&pixels, 2, 2).unwrap();
//!
//! assert_eq!(result.width(), 2);
//! assert_eq!(result.palette().len(), 1);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! sRGB pixels
//!     |
//!     v
//! median cut        (histogram boxes, weighted median split)
//!     |
//!     v
//! Palette           (≤ K colors, dark to light)
//!     |
//!     v
//! error diffusion   (Floyd-Steinberg serpentine by default)
//!     |
//!     v
//! IndexedImage      (u8 index per pixel)
//! ```
//!
//! Palette order is deterministic: the same pixels always produce the same
//! palette and the same indices.

pub mod api;
pub mod color;
pub mod dither;
pub mod output;
pub mod palette;

pub use api::{QuantError, Quantizer};
pub use color::Rgb;
pub use dither::{DitherAlgorithm, DitherOptions, ErrorBuffer, Kernel};
pub use dither::{ATKINSON, FLOYD_STEINBERG, SIERRA_LITE};
pub use output::IndexedImage;
pub use palette::{median_cut, Palette, PaletteError, ParseColorError};
