use super::{IndexBuffer, PaletteStore};
use crate::models::DisplayParams;

/// Everything the rasterizer and the undo history see of a chart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartState {
    /// `None` until the first generation
    pub buffer: Option<IndexBuffer>,
    pub palette: PaletteStore,
    pub display: DisplayParams,
}

impl ChartState {
    pub fn new(display: DisplayParams) -> Self {
        Self {
            buffer: None,
            palette: PaletteStore::default(),
            display,
        }
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }
}
