//! Error type for the chart-quant public API.

use std::fmt;

use crate::palette::PaletteError;

/// Error returned by [`Quantizer::quantize`](crate::Quantizer::quantize).
#[derive(Debug, Clone, PartialEq)]
pub enum QuantError {
    /// Width or height is zero
    EmptyImage,
    /// Pixel slice length does not match `width * height`
    DimensionMismatch {
        /// `width * height`
        expected: usize,
        /// Pixels actually supplied
        actual: usize,
    },
    /// Palette construction failed
    Palette(PaletteError),
}

impl fmt::Display for QuantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantError::EmptyImage => write!(f, "image has no pixels"),
            QuantError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "pixel count mismatch: expected {} pixels, got {}",
                    expected, actual
                )
            }
            QuantError::Palette(err) => write!(f, "palette error: {}", err),
        }
    }
}

impl std::error::Error for QuantError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QuantError::Palette(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PaletteError> for QuantError {
    fn from(err: PaletteError) -> Self {
        QuantError::Palette(err)
    }
}
