//! Palette store: quantizer colors plus user overrides.

use std::collections::BTreeMap;

use chart_quant::Rgb;

use super::PaletteIndex;
use crate::error::ChartError;

/// Index → color mapping with user overrides layered on top.
///
/// Both maps are ordered, so every iteration runs in ascending index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteStore {
    base: BTreeMap<PaletteIndex, Rgb>,
    overrides: BTreeMap<PaletteIndex, Rgb>,
}

impl PaletteStore {
    pub fn new(
        base: BTreeMap<PaletteIndex, Rgb>,
        overrides: BTreeMap<PaletteIndex, Rgb>,
    ) -> Self {
        Self { base, overrides }
    }

    /// Base palette indexed 0..N-1 in list order
    pub fn from_colors(colors: &[Rgb]) -> Self {
        let base = colors
            .iter()
            .take(256)
            .enumerate()
            .map(|(i, &c)| (i as PaletteIndex, c))
            .collect();
        Self {
            base,
            overrides: BTreeMap::new(),
        }
    }

    pub fn base(&self) -> &BTreeMap<PaletteIndex, Rgb> {
        &self.base
    }

    pub fn overrides(&self) -> &BTreeMap<PaletteIndex, Rgb> {
        &self.overrides
    }

    /// Color for `index`: override, else base, else `None`
    pub fn get(&self, index: PaletteIndex) -> Option<Rgb> {
        self.overrides
            .get(&index)
            .or_else(|| self.base.get(&index))
            .copied()
    }

    /// Color for `index`, white when nothing is assigned
    pub fn resolve(&self, index: PaletteIndex) -> Rgb {
        self.get(index).unwrap_or(Rgb::WHITE)
    }

    pub fn contains(&self, index: PaletteIndex) -> bool {
        self.base.contains_key(&index) || self.overrides.contains_key(&index)
    }

    /// Override the color of a known index
    pub fn set_override(&mut self, index: PaletteIndex, color: Rgb) -> Result<(), ChartError> {
        if !self.contains(index) {
            return Err(ChartError::UnknownIndex(index));
        }
        self.overrides.insert(index, color);
        Ok(())
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    /// Drop `index` from base and overrides. Idempotent.
    pub fn remove(&mut self, index: PaletteIndex) {
        self.base.remove(&index);
        self.overrides.remove(&index);
    }

    /// Known indices, ascending
    pub fn indices(&self) -> Vec<PaletteIndex> {
        let mut all: Vec<PaletteIndex> = self
            .base
            .keys()
            .chain(self.overrides.keys())
            .copied()
            .collect();
        all.sort_unstable();
        all.dedup();
        all
    }

    /// Overrides merged over base, ascending by index
    pub fn effective_colors(&self) -> BTreeMap<PaletteIndex, Rgb> {
        let mut merged = self.base.clone();
        merged.extend(self.overrides.iter().map(|(&i, &c)| (i, c)));
        merged
    }

    pub fn len(&self) -> usize {
        self.indices().len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.overrides.is_empty()
    }

    /// Compact the index space to 0..N-1 keeping relative order.
    ///
    /// Returns the old → new mapping; the caller applies it to the buffer.
    pub fn reindex(&mut self) -> BTreeMap<PaletteIndex, PaletteIndex> {
        let mapping: BTreeMap<PaletteIndex, PaletteIndex> = self
            .indices()
            .into_iter()
            .enumerate()
            .map(|(new, old)| (old, new as PaletteIndex))
            .collect();

        self.base = rekey(&self.base, &mapping);
        self.overrides = rekey(&self.overrides, &mapping);
        mapping
    }

    /// Replace the whole palette, re-keying overrides through `mapping`.
    ///
    /// Overrides whose index has no mapping are dropped. When several old
    /// indices map to the same new one, the highest old index wins.
    pub fn replace_with(
        &mut self,
        base: BTreeMap<PaletteIndex, Rgb>,
        mapping: &BTreeMap<PaletteIndex, PaletteIndex>,
    ) {
        self.overrides = rekey(&self.overrides, mapping);
        self.base = base;
    }
}

fn rekey(
    colors: &BTreeMap<PaletteIndex, Rgb>,
    mapping: &BTreeMap<PaletteIndex, PaletteIndex>,
) -> BTreeMap<PaletteIndex, Rgb> {
    colors
        .iter()
        .filter_map(|(old, &c)| mapping.get(old).map(|&new| (new, c)))
        .collect()
}
