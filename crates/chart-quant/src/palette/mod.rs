//! Palettes and palette construction
//!
//! A [`Palette`] is an ordered list of at most 256 colors addressed by `u8`
//! index. [`median_cut`] derives such a list from the pixels of an image.

mod error;
mod median_cut;
mod palette;

pub use error::{PaletteError, ParseColorError};
pub use median_cut::median_cut;
pub use palette::Palette;
