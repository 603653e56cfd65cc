//! Public builder API.

mod builder;
mod error;

pub use builder::Quantizer;
pub use error::QuantError;
