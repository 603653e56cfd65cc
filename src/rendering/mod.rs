pub mod glyphs;
pub mod grid;
pub mod png;

pub use grid::{render_grid, resample_nearest, row_at, GridLayout, MARGIN, PAD};
pub use png::{decode_index_png, encode_chart_png, encode_index_png};

use crate::chart::{IndexBuffer, PaletteStore};
use crate::error::RenderError;
use crate::models::DisplayParams;

/// Render the chart and encode it as PNG
pub fn render_chart_png(
    buffer: &IndexBuffer,
    palette: &PaletteStore,
    display: &DisplayParams,
) -> Result<Vec<u8>, RenderError> {
    let pixmap = render_grid(buffer, palette, display)?;
    encode_chart_png(&pixmap)
}
