//! Color type and distance metrics
//!
//! Everything in this crate works on 8-bit sRGB triples. Charts are built
//! for people reading printed or on-screen squares, so distances are taken
//! directly between the byte values the user sees.
//!
//! # Metrics
//!
//! - [`Rgb::distance`]: plain Euclidean distance, used for nearest-color
//!   matching and merge targets.
//! - [`Rgb::redmean_distance`]: the "red-mean" weighted Euclidean distance,
//!   a cheap perceptual approximation used for merge suggestions.
//! - [`Rgb::luminance`]: Rec. 601 luma, used for contrast heuristics.

mod rgb;

pub use rgb::Rgb;
