//! One editing session: source photo, generation settings, the chart
//! being edited and its undo history.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine;
use chart_quant::{Quantizer, Rgb};
use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::Serialize;
use utoipa::ToSchema;

use crate::chart::{
    palette_report, suggest_clusters, ChartState, History, IndexBuffer, PaletteEditor,
    PaletteIndex, PaletteStore, PaletteUsage,
};
use crate::error::{ApiError, ChartError, StoreError};
use crate::models::{DisplayParams, GenerationParams, ParamsPatch, SessionId, SessionRecord};
use crate::rendering;
use crate::services::transform;

/// Result of a chart generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct GenerateSummary {
    /// Chart width in cells
    pub width: u32,
    /// Chart height in cells
    pub height: u32,
    /// Palette size produced by the quantizer
    pub colors: usize,
}

#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    source: Option<Arc<RgbImage>>,
    source_revision: u64,
    pub generation: GenerationParams,
    pub chart: ChartState,
    pub history: History,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, generation: GenerationParams, display: DisplayParams) -> Self {
        let now = Utc::now();
        Self {
            id,
            source: None,
            source_revision: 0,
            generation,
            chart: ChartState::new(display),
            history: History::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn source(&self) -> Option<&RgbImage> {
        self.source.as_deref()
    }

    /// Shared handle to the source, for work that outlives a borrow
    pub fn shared_source(&self) -> Option<Arc<RgbImage>> {
        self.source.clone()
    }

    pub fn source_revision(&self) -> u64 {
        self.source_revision
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Decode and install a new source photo
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(u32, u32), ChartError> {
        let image = transform::decode_image(bytes)?;
        let dimensions = image.dimensions();
        self.set_source(image);
        tracing::info!(
            session_id = %self.id,
            width = dimensions.0,
            height = dimensions.1,
            "Source image loaded"
        );
        Ok(dimensions)
    }

    /// Install a source photo, dropping the chart built from the previous one
    pub fn set_source(&mut self, image: RgbImage) {
        self.source = Some(Arc::new(image));
        self.source_revision += 1;
        self.chart.buffer = None;
        self.chart.palette = PaletteStore::default();
        self.history.clear();
    }

    /// Transform and quantize the source into a fresh chart.
    ///
    /// User overrides survive when their index exists in the new palette.
    pub fn generate(&mut self) -> Result<GenerateSummary, ChartError> {
        let source = self.source.clone().ok_or(ChartError::NoSourceImage)?;

        let prepared = transform::prepare(&source, &self.generation, &self.chart.display);
        let (width, height) = prepared.dimensions();
        let pixels = transform::to_pixels(&prepared);

        let indexed = Quantizer::new(self.generation.max_colors as usize)
            .quantize(&pixels, width as usize, height as usize)
            .map_err(|e| ChartError::InvalidImage(e.to_string()))?;
        let (cells, colors) = indexed.into_parts();
        let buffer = IndexBuffer::from_cells(width, height, cells)
            .ok_or_else(|| ChartError::InvalidImage("quantizer size mismatch".to_string()))?;

        self.history.snapshot(&self.chart);

        let base: BTreeMap<PaletteIndex, Rgb> = colors
            .iter()
            .enumerate()
            .map(|(i, &c)| (i as PaletteIndex, c))
            .collect();
        let keep: BTreeMap<PaletteIndex, PaletteIndex> = base.keys().map(|&i| (i, i)).collect();
        self.chart.palette.replace_with(base, &keep);
        self.chart.buffer = Some(buffer);

        let summary = GenerateSummary {
            width,
            height,
            colors: colors.len(),
        };
        tracing::info!(
            session_id = %self.id,
            width,
            height,
            colors = summary.colors,
            "Chart generated"
        );
        Ok(summary)
    }

    /// Apply a parameter patch. Presentation changes are undoable once a
    /// chart exists; generation settings take effect on the next generate.
    pub fn apply_params(&mut self, patch: &ParamsPatch) {
        if patch.touches_display() {
            self.history.snapshot(&self.chart);
        }
        patch.apply(&mut self.generation, &mut self.chart.display);
        tracing::debug!(session_id = %self.id, ?patch, "Parameters updated");
    }

    pub fn editor(&mut self) -> PaletteEditor<'_> {
        PaletteEditor::new(&mut self.chart, &mut self.history)
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.chart);
        tracing::debug!(session_id = %self.id, undone, remaining = self.history.len(), "Undo");
        undone
    }

    pub fn palette_report(&self) -> Vec<PaletteUsage> {
        palette_report(&self.chart)
    }

    pub fn clusters(&self, threshold: f64) -> Vec<Vec<PaletteIndex>> {
        suggest_clusters(&self.chart.palette, threshold)
    }

    /// Buffer row under a click on the zoomed chart
    pub fn row_at(&self, click_y: f64, zoom: f64) -> Option<u32> {
        let buffer = self.chart.buffer.as_ref()?;
        rendering::row_at(buffer, &self.chart.display, click_y, zoom)
    }

    pub fn render_png(&self) -> Result<Vec<u8>, ApiError> {
        let buffer = self.chart.buffer.as_ref().ok_or(ChartError::EmptyBuffer)?;
        let png = rendering::render_chart_png(buffer, &self.chart.palette, &self.chart.display)?;
        Ok(png)
    }

    pub fn render_base64(&self) -> Result<String, ApiError> {
        let png = self.render_png()?;
        Ok(base64::engine::general_purpose::STANDARD.encode(png))
    }

    /// Snapshot of the persistent parts of this session
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            id: self.id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            generation: self.generation.clone(),
            display: self.chart.display.clone(),
            base_palette: to_triples(self.chart.palette.base()),
            overrides: to_triples(self.chart.palette.overrides()),
            source_revision: self.source_revision,
            has_source: self.source.is_some(),
            chart_size: self
                .chart
                .buffer
                .as_ref()
                .map(|b| (b.width(), b.height())),
        }
    }

    /// Rebuild a session from its record and decoded PNG files.
    ///
    /// History starts empty.
    pub fn from_record(
        record: SessionRecord,
        source: Option<RgbImage>,
        buffer: Option<IndexBuffer>,
    ) -> Result<Self, StoreError> {
        if record.has_source && source.is_none() {
            return Err(corrupt(&record.id, "source image missing"));
        }
        match (&record.chart_size, &buffer) {
            (Some((w, h)), Some(b)) if (b.width(), b.height()) != (*w, *h) => {
                return Err(corrupt(&record.id, "index buffer size mismatch"));
            }
            (Some(_), None) => return Err(corrupt(&record.id, "index buffer missing")),
            _ => {}
        }

        let palette = PaletteStore::new(
            from_triples(&record.base_palette),
            from_triples(&record.overrides),
        );
        Ok(Self {
            id: record.id,
            source: source.map(Arc::new),
            source_revision: record.source_revision,
            generation: record.generation,
            chart: ChartState {
                buffer: record.chart_size.and(buffer),
                palette,
                display: record.display,
            },
            history: History::new(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

fn corrupt(id: &SessionId, reason: &str) -> StoreError {
    StoreError::Corrupt {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

fn to_triples(colors: &BTreeMap<PaletteIndex, Rgb>) -> BTreeMap<PaletteIndex, [u8; 3]> {
    colors.iter().map(|(&i, c)| (i, c.to_bytes())).collect()
}

fn from_triples(colors: &BTreeMap<PaletteIndex, [u8; 3]>) -> BTreeMap<PaletteIndex, Rgb> {
    colors.iter().map(|(&i, &c)| (i, Rgb::from(c))).collect()
}
