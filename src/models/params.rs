use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Pixel size of one chart cell (width; height follows the gauge)
pub const CELL_SIZE: u32 = 22;

/// Allowed presentation zoom range
pub const MIN_ZOOM: f32 = 0.4;
pub const MAX_ZOOM: f32 = 8.0;

/// Allowed chart width in cells
pub const MIN_GRID_WIDTH: u32 = 10;
pub const MAX_GRID_WIDTH: u32 = 400;

/// Tallest chart a generate may produce, in rows
pub const MAX_GRID_HEIGHT: u32 = MAX_GRID_WIDTH * 4;

/// Allowed gauge values (stitches or rows per reference length)
pub const MIN_GAUGE: f32 = 1.0;
pub const MAX_GAUGE: f32 = 100.0;

/// Allowed palette size for generation
pub const MIN_COLORS: u32 = 2;
pub const MAX_COLORS: u32 = 256;

/// Smallest rendered cell height in pixels
pub const MIN_CELL_HEIGHT: u32 = 4;

/// Tonal and quantization settings used when (re)generating a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GenerationParams {
    /// Upper bound for the palette size
    #[serde(default = "default_max_colors")]
    pub max_colors: u32,

    /// Brightness factor, 1.0 = unchanged
    #[serde(default = "identity")]
    pub brightness: f32,

    /// Contrast factor, 1.0 = unchanged
    #[serde(default = "identity")]
    pub contrast: f32,

    /// Saturation factor, 1.0 = unchanged, 0.0 = grayscale
    #[serde(default = "identity")]
    pub saturation: f32,

    /// Gamma exponent, 1.0 = unchanged
    #[serde(default = "identity")]
    pub gamma: f32,

    /// Bits kept per channel, 8 = unchanged
    #[serde(default = "default_posterize_bits")]
    pub posterize_bits: u8,
}

fn default_max_colors() -> u32 {
    64
}

fn identity() -> f32 {
    1.0
}

fn default_posterize_bits() -> u8 {
    8
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_colors: default_max_colors(),
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            gamma: 1.0,
            posterize_bits: default_posterize_bits(),
        }
    }
}

/// Layout and presentation of the rendered chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DisplayParams {
    /// Cell width in pixels
    #[serde(default = "default_cell_size")]
    pub cell_size: u32,

    /// Chart width in cells (stitches)
    #[serde(default = "default_grid_width")]
    pub grid_width_cells: u32,

    /// Stitches per reference length
    #[serde(default = "default_gauge")]
    pub gauge_stitches: f32,

    /// Rows per reference length
    #[serde(default = "default_gauge")]
    pub gauge_rows: f32,

    /// Row shown undimmed, `None` for no highlight
    #[serde(default)]
    pub highlighted_row: Option<u32>,

    /// Draw grid lines and axis numbers
    #[serde(default = "default_show_grid")]
    pub show_grid: bool,

    /// Presentation scale, never affects cell data
    #[serde(default = "default_zoom")]
    pub zoom: f32,
}

fn default_cell_size() -> u32 {
    CELL_SIZE
}

fn default_grid_width() -> u32 {
    130
}

fn default_gauge() -> f32 {
    20.0
}

fn default_show_grid() -> bool {
    true
}

fn default_zoom() -> f32 {
    1.0
}

impl Default for DisplayParams {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE,
            grid_width_cells: default_grid_width(),
            gauge_stitches: default_gauge(),
            gauge_rows: default_gauge(),
            highlighted_row: None,
            show_grid: true,
            zoom: 1.0,
        }
    }
}

impl DisplayParams {
    /// Stitches over rows; 1.0 when either gauge value is not positive.
    ///
    /// Bounded by the gauge limits so values read from a config file cannot
    /// blow up the chart geometry.
    pub fn gauge_ratio(&self) -> f64 {
        if self.gauge_rows > 0.0 && self.gauge_stitches > 0.0 {
            let bound = (MAX_GAUGE / MIN_GAUGE) as f64;
            (self.gauge_stitches as f64 / self.gauge_rows as f64).clamp(1.0 / bound, bound)
        } else {
            1.0
        }
    }

    /// Rendered cell height so that rows × height keeps the source aspect
    pub fn cell_height(&self) -> u32 {
        let h = (self.cell_size as f64 / self.gauge_ratio()).round();
        (h as u32).max(MIN_CELL_HEIGHT)
    }
}

/// Partial update of generation and display parameters.
///
/// Every field is optional and independent of the others, so the order in
/// which fields are applied does not matter.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ParamsPatch {
    pub max_colors: Option<u32>,
    pub grid_width_cells: Option<u32>,
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
    pub gamma: Option<f32>,
    pub posterize_bits: Option<u8>,
    pub gauge_stitches: Option<f32>,
    pub gauge_rows: Option<f32>,
    pub zoom: Option<f32>,
    /// Negative values clear the highlight
    pub highlighted_row: Option<i64>,
    pub show_grid: Option<bool>,
}

impl ParamsPatch {
    /// Whether the patch changes how the current chart is presented
    pub fn touches_display(&self) -> bool {
        self.zoom.is_some() || self.highlighted_row.is_some() || self.show_grid.is_some()
    }

    /// Apply every present field, clamping values to their allowed ranges
    pub fn apply(&self, generation: &mut GenerationParams, display: &mut DisplayParams) {
        if let Some(v) = self.max_colors {
            generation.max_colors = v.clamp(MIN_COLORS, MAX_COLORS);
        }
        if let Some(v) = self.brightness {
            generation.brightness = non_negative(v);
        }
        if let Some(v) = self.contrast {
            generation.contrast = non_negative(v);
        }
        if let Some(v) = self.saturation {
            generation.saturation = non_negative(v);
        }
        if let Some(v) = self.gamma {
            generation.gamma = if v.is_finite() { v.clamp(0.1, 10.0) } else { 1.0 };
        }
        if let Some(v) = self.posterize_bits {
            generation.posterize_bits = v.clamp(1, 8);
        }
        if let Some(v) = self.grid_width_cells {
            display.grid_width_cells = v.clamp(MIN_GRID_WIDTH, MAX_GRID_WIDTH);
        }
        if let Some(v) = self.gauge_stitches {
            display.gauge_stitches = clamp_gauge(v);
        }
        if let Some(v) = self.gauge_rows {
            display.gauge_rows = clamp_gauge(v);
        }
        if let Some(v) = self.zoom {
            display.zoom = clamp_zoom(v);
        }
        if let Some(v) = self.highlighted_row {
            display.highlighted_row = u32::try_from(v).ok();
        }
        if let Some(v) = self.show_grid {
            display.show_grid = v;
        }
    }
}

/// Clamp a zoom factor to the allowed range; NaN falls back to 1.0
pub fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_nan() {
        1.0
    } else {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    }
}

/// Zero (or less) stays 0.0 and means "no gauge"; anything else is
/// clamped to the gauge range. NaN and infinities fall back to no gauge.
pub fn clamp_gauge(v: f32) -> f32 {
    if !v.is_finite() || v <= 0.0 {
        0.0
    } else {
        v.clamp(MIN_GAUGE, MAX_GAUGE)
    }
}

fn non_negative(v: f32) -> f32 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        1.0
    }
}
