//! Dithering options and configuration.

/// Configuration options for error diffusion dithering.
///
/// # Defaults
///
/// - Serpentine scanning: enabled
/// - Error clamp: 0.5 (fraction of the full channel range)
///
/// # Example
///
/// ```
/// use chart_quant::DitherOptions;
///
/// let options = DitherOptions::new()
///     .serpentine(false)
///     .error_clamp(0.3);
/// assert!(!options.serpentine);
/// ```
#[derive(Debug, Clone)]
pub struct DitherOptions {
    /// Enable serpentine scanning (alternating row direction).
    ///
    /// Odd rows are processed right-to-left with the kernel mirrored.
    ///
    /// Default: `true`
    pub serpentine: bool,

    /// Maximum overshoot per channel, as a fraction of 255.
    ///
    /// A pixel plus its accumulated error is clamped to
    /// `[-clamp, 1 + clamp]` (scaled to the byte range) before matching.
    ///
    /// Default: `0.5`
    pub error_clamp: f32,
}

impl Default for DitherOptions {
    fn default() -> Self {
        Self {
            serpentine: true,
            error_clamp: 0.5,
        }
    }
}

impl DitherOptions {
    /// Create new dither options with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set serpentine scanning mode.
    #[inline]
    pub fn serpentine(mut self, enabled: bool) -> Self {
        self.serpentine = enabled;
        self
    }

    /// Set the error clamp. Negative values are treated as 0.
    #[inline]
    pub fn error_clamp(mut self, clamp: f32) -> Self {
        self.error_clamp = clamp.max(0.0);
        self
    }
}
