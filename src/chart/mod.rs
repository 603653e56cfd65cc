//! Indexed-color chart engine
//!
//! A chart is an [`IndexBuffer`] of palette indices bound to a
//! [`PaletteStore`]. [`PaletteEditor`] mutates both together, recording a
//! [`History`] snapshot before every change.
//!
//! Palette indices are stable only within one palette generation: deleting
//! or merging a color compacts the palette to `0..N`, and simplification
//! builds a new palette from scratch.

mod buffer;
mod editor;
mod history;
mod palette;
mod state;

pub use buffer::IndexBuffer;
pub use editor::{
    palette_report, smart_intensity, suggest_clusters, EditOutcome, PaletteEditor, PaletteUsage,
    SIMPLIFY_MAX_DISTANCE,
};
pub use history::{History, HistoryEntry, HISTORY_LIMIT};
pub use palette::PaletteStore;
pub use state::ChartState;

/// Identifier of one chart color
pub type PaletteIndex = u8;
