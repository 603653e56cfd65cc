//! Palette editing operations.
//!
//! Every mutating operation checks its preconditions first, then records a
//! history snapshot, then mutates. Failed preconditions leave the chart and
//! the history untouched.

use std::collections::BTreeMap;

use chart_quant::Rgb;
use serde::Serialize;
use utoipa::ToSchema;

use super::{ChartState, History, IndexBuffer, PaletteIndex, PaletteStore};
use crate::error::ChartError;

/// Distance that intensity 100 maps to when grouping colors
pub const SIMPLIFY_MAX_DISTANCE: f64 = 300.0;

/// Result of an editing operation
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// State changed; the chart needs re-rendering
    Changed,
    /// Preconditions not met or nothing to do
    Unchanged,
}

impl EditOutcome {
    pub fn is_changed(self) -> bool {
        self == EditOutcome::Changed
    }
}

/// One row of the palette report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaletteUsage {
    pub index: PaletteIndex,
    /// Effective color as `#rrggbb`
    pub hex: String,
    /// Number of cells using this index
    pub count: usize,
}

/// Mutating view over a chart and its undo history
pub struct PaletteEditor<'a> {
    state: &'a mut ChartState,
    history: &'a mut History,
}

impl<'a> PaletteEditor<'a> {
    pub fn new(state: &'a mut ChartState, history: &'a mut History) -> Self {
        Self { state, history }
    }

    fn require_buffer(&self) -> Result<&IndexBuffer, ChartError> {
        self.state.buffer.as_ref().ok_or(ChartError::EmptyBuffer)
    }

    /// Snapshot, then run `f` on the buffer and palette
    fn commit<F>(&mut self, f: F) -> EditOutcome
    where
        F: FnOnce(&mut IndexBuffer, &mut PaletteStore),
    {
        self.history.snapshot(&*self.state);
        if let Some(buffer) = self.state.buffer.as_mut() {
            f(buffer, &mut self.state.palette);
        }
        EditOutcome::Changed
    }

    /// Override the color of `index`. The buffer is untouched.
    pub fn recolor(&mut self, index: PaletteIndex, color: Rgb) -> Result<EditOutcome, ChartError> {
        self.require_buffer()?;
        if !self.state.palette.contains(index) {
            return Ok(EditOutcome::Unchanged);
        }
        tracing::debug!(index, color = %color, "Recolor");
        self.history.snapshot(&*self.state);
        self.state.palette.set_override(index, color)?;
        Ok(EditOutcome::Changed)
    }

    /// Remove `index`, moving its cells to the closest remaining color.
    ///
    /// Closest is Euclidean RGB over effective colors; ties go to the lowest
    /// index. The palette is compacted afterwards.
    pub fn delete_merge_nearest(&mut self, index: PaletteIndex) -> Result<EditOutcome, ChartError> {
        self.require_buffer()?;
        let Some(color) = self.state.palette.get(index) else {
            return Ok(EditOutcome::Unchanged);
        };
        let target = nearest_index(&self.state.palette.effective_colors(), color, Some(index))
            .ok_or(ChartError::NoMergeTarget(index))?;

        tracing::debug!(index, target, "Delete color, merging into nearest");
        Ok(self.commit(|buffer, palette| {
            buffer.replace(index, target);
            palette.remove(index);
            let mapping = palette.reindex();
            buffer.remap(&mapping, 0);
        }))
    }

    /// Move every `from` cell to `to` and drop `from`. The palette is
    /// compacted afterwards.
    pub fn merge(&mut self, from: PaletteIndex, to: PaletteIndex) -> Result<EditOutcome, ChartError> {
        self.require_buffer()?;
        if from == to || !self.state.palette.contains(from) || !self.state.palette.contains(to) {
            return Ok(EditOutcome::Unchanged);
        }

        tracing::debug!(from, to, "Merge colors");
        Ok(self.commit(|buffer, palette| {
            buffer.replace(from, to);
            palette.remove(from);
            let mapping = palette.reindex();
            buffer.remap(&mapping, 0);
        }))
    }

    /// Set a single cell
    pub fn paint(&mut self, x: u32, y: u32, index: PaletteIndex) -> Result<EditOutcome, ChartError> {
        let buffer = self.require_buffer()?;
        if !self.state.palette.contains(index) {
            return Ok(EditOutcome::Unchanged);
        }
        match buffer.get(x, y) {
            Some(current) if current != index => {}
            _ => return Ok(EditOutcome::Unchanged),
        }

        Ok(self.commit(|buffer, _| {
            buffer.set(x, y, index);
        }))
    }

    /// Rewrite `from` cells to `to` inside a rectangle clamped to the grid
    pub fn region_replace(
        &mut self,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        from: PaletteIndex,
        to: PaletteIndex,
    ) -> Result<EditOutcome, ChartError> {
        let buffer = self.require_buffer()?;
        if from == to || !self.state.palette.contains(from) || !self.state.palette.contains(to) {
            return Ok(EditOutcome::Unchanged);
        }
        if buffer.count_in_rect(x, y, w, h, from) == 0 {
            return Ok(EditOutcome::Unchanged);
        }

        tracing::debug!(x, y, w, h, from, to, "Region replace");
        Ok(self.commit(|buffer, _| {
            buffer.replace_in_rect(x, y, w, h, from, to);
        }))
    }

    /// Reduce the palette by grouping similar colors.
    ///
    /// `intensity` (0..=100, clamped) scales both the grouping distance and
    /// the number of groups that survive. The result is a fresh 0-based
    /// palette of group centroids.
    pub fn simplify(&mut self, intensity: u8) -> Result<EditOutcome, ChartError> {
        let buffer = self.require_buffer()?;
        let intensity = intensity.min(100);
        let colors = self.state.palette.effective_colors();
        if colors.is_empty() {
            return Ok(EditOutcome::Unchanged);
        }

        let (new_base, mapping) = simplify_palette(&colors, intensity);

        let mut remapped = buffer.clone();
        let fallback_palette: Vec<(PaletteIndex, Rgb)> =
            new_base.iter().map(|(&i, &c)| (i, c)).collect();
        for cell in remapped.cells_mut() {
            let old = *cell;
            *cell = match mapping.get(&old) {
                Some(&new) => new,
                None => {
                    let color = self.state.palette.resolve(old);
                    nearest_in(&fallback_palette, color, None).unwrap_or(0)
                }
            };
        }

        let mut palette = self.state.palette.clone();
        palette.replace_with(new_base, &mapping);
        if Some(&remapped) == self.state.buffer.as_ref() && palette == self.state.palette {
            return Ok(EditOutcome::Unchanged);
        }

        tracing::debug!(
            intensity,
            before = colors.len(),
            after = palette.len(),
            "Simplify palette"
        );
        self.history.snapshot(&*self.state);
        self.state.buffer = Some(remapped);
        self.state.palette = palette;
        Ok(EditOutcome::Changed)
    }

    /// Simplify with an intensity picked from the palette's luminance range.
    ///
    /// Returns the outcome and the intensity used.
    pub fn simplify_bw_smart(&mut self) -> Result<(EditOutcome, u8), ChartError> {
        self.require_buffer()?;
        let intensity = smart_intensity(&self.state.palette);
        let outcome = self.simplify(intensity)?;
        Ok((outcome, intensity))
    }
}

/// Closest color by Euclidean RGB, first (lowest index) on ties
fn nearest_index(
    colors: &BTreeMap<PaletteIndex, Rgb>,
    target: Rgb,
    skip: Option<PaletteIndex>,
) -> Option<PaletteIndex> {
    let entries: Vec<(PaletteIndex, Rgb)> = colors.iter().map(|(&i, &c)| (i, c)).collect();
    nearest_in(&entries, target, skip)
}

fn nearest_in(
    entries: &[(PaletteIndex, Rgb)],
    target: Rgb,
    skip: Option<PaletteIndex>,
) -> Option<PaletteIndex> {
    let mut best: Option<(PaletteIndex, u32)> = None;
    for &(index, color) in entries {
        if Some(index) == skip {
            continue;
        }
        let d = target.distance_squared(color);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((index, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Group palette colors and compute the old → new index mapping.
///
/// Returns the new 0-based base palette and the mapping.
fn simplify_palette(
    colors: &BTreeMap<PaletteIndex, Rgb>,
    intensity: u8,
) -> (BTreeMap<PaletteIndex, Rgb>, BTreeMap<PaletteIndex, PaletteIndex>) {
    let threshold = intensity as f64 / 100.0 * SIMPLIFY_MAX_DISTANCE;

    // Greedy grouping against each group's seed (first member)
    let mut groups: Vec<Vec<(PaletteIndex, Rgb)>> = Vec::new();
    for (&index, &color) in colors {
        match groups
            .iter_mut()
            .find(|g| g[0].1.distance(color) <= threshold)
        {
            Some(group) => group.push((index, color)),
            None => groups.push(vec![(index, color)]),
        }
    }

    let count = colors.len();
    let target = (1 + count * (100 - intensity as usize) / 100).max(1);

    if groups.len() > target {
        // Stable: equal sizes keep creation order
        groups.sort_by_key(|g| g.len());
        while groups.len() > target {
            let small = groups.remove(0);
            let Some(centroid) = Rgb::average(small.iter().map(|&(_, c)| c)) else {
                continue;
            };
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (i, g) in groups.iter().enumerate() {
                let d = centroid.distance(g[0].1);
                if d < best_dist {
                    best_dist = d;
                    best = i;
                }
            }
            groups[best].extend(small);
        }
    }

    let mut base = BTreeMap::new();
    let mut mapping = BTreeMap::new();
    for (new_index, group) in groups.iter().enumerate() {
        let new_index = new_index as PaletteIndex;
        if let Some(centroid) = Rgb::average(group.iter().map(|&(_, c)| c)) {
            base.insert(new_index, centroid);
        }
        for &(old, _) in group {
            mapping.insert(old, new_index);
        }
    }
    (base, mapping)
}

/// Simplification intensity for the smart black & white preset
pub fn smart_intensity(palette: &PaletteStore) -> u8 {
    let lums: Vec<f64> = palette
        .effective_colors()
        .values()
        .map(|c| c.luminance())
        .collect();
    let min = lums.iter().copied().fold(f64::INFINITY, f64::min);
    let max = lums.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if lums.is_empty() { 0.0 } else { max - min };

    if range < 30.0 {
        8
    } else if range < 80.0 {
        20
    } else {
        35
    }
}

/// Groups of palette indices whose colors lie within `threshold` of the
/// group seed under the red-mean distance. Only groups of two or more are
/// returned. Read-only.
pub fn suggest_clusters(palette: &PaletteStore, threshold: f64) -> Vec<Vec<PaletteIndex>> {
    let entries: Vec<(PaletteIndex, Rgb)> = palette.effective_colors().into_iter().collect();
    let mut visited = vec![false; entries.len()];
    let mut clusters = Vec::new();

    for i in 0..entries.len() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let (seed_index, seed) = entries[i];
        let mut group = vec![seed_index];
        for j in i + 1..entries.len() {
            if !visited[j] && seed.redmean_distance(entries[j].1) < threshold {
                visited[j] = true;
                group.push(entries[j].0);
            }
        }
        if group.len() >= 2 {
            clusters.push(group);
        }
    }
    clusters
}

/// Usage per palette index present in both buffer and palette, most used
/// first (ties by ascending index). Empty before generation.
pub fn palette_report(state: &ChartState) -> Vec<PaletteUsage> {
    let Some(buffer) = &state.buffer else {
        return Vec::new();
    };
    let mut report: Vec<PaletteUsage> = buffer
        .usage()
        .into_iter()
        .filter_map(|(index, count)| {
            state.palette.get(index).map(|color| PaletteUsage {
                index,
                hex: color.to_hex(),
                count,
            })
        })
        .collect();
    report.sort_by(|a, b| b.count.cmp(&a.count).then(a.index.cmp(&b.index)));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DisplayParams;
    use pretty_assertions::assert_eq;

    fn chart(width: u32, height: u32, cells: Vec<u8>, colors: &[Rgb]) -> ChartState {
        ChartState {
            buffer: IndexBuffer::from_cells(width, height, cells),
            palette: PaletteStore::from_colors(colors),
            display: DisplayParams::default(),
        }
    }

    fn three_colors() -> ChartState {
        chart(
            4,
            3,
            vec![0, 0, 1, 2, 0, 1, 1, 2, 0, 0, 2, 2],
            &[Rgb::BLACK, Rgb::new(128, 128, 128), Rgb::WHITE],
        )
    }

    fn cells(state: &ChartState) -> Vec<u8> {
        state.buffer.as_ref().unwrap().cells().to_vec()
    }

    #[test]
    fn test_operations_require_buffer() {
        let mut state = ChartState::default();
        let mut history = History::new();
        let mut editor = PaletteEditor::new(&mut state, &mut history);

        assert!(matches!(editor.recolor(0, Rgb::BLACK), Err(ChartError::EmptyBuffer)));
        assert!(matches!(editor.delete_merge_nearest(0), Err(ChartError::EmptyBuffer)));
        assert!(matches!(editor.merge(0, 1), Err(ChartError::EmptyBuffer)));
        assert!(matches!(editor.paint(0, 0, 0), Err(ChartError::EmptyBuffer)));
        assert!(matches!(editor.simplify(50), Err(ChartError::EmptyBuffer)));
        assert!(history.is_empty());
    }

    #[test]
    fn test_recolor_sets_override_only() {
        let mut state = three_colors();
        let mut history = History::new();
        let before = cells(&state);

        let outcome = PaletteEditor::new(&mut state, &mut history)
            .recolor(1, Rgb::new(255, 0, 0))
            .unwrap();

        assert_eq!(outcome, EditOutcome::Changed);
        assert_eq!(state.palette.resolve(1), Rgb::new(255, 0, 0));
        assert_eq!(cells(&state), before);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_recolor_unknown_index_is_silent() {
        let mut state = three_colors();
        let mut history = History::new();
        let outcome = PaletteEditor::new(&mut state, &mut history)
            .recolor(9, Rgb::BLACK)
            .unwrap();
        assert_eq!(outcome, EditOutcome::Unchanged);
        assert!(history.is_empty());
    }

    #[test]
    fn test_recolor_then_region_replace_example() {
        let mut state = chart(
            4,
            3,
            vec![0, 0, 2, 2, 0, 1, 2, 0, 1, 0, 2, 1],
            &[Rgb::BLACK, Rgb::new(0, 0, 255), Rgb::WHITE],
        );
        let original = cells(&state);
        let mut history = History::new();
        let mut editor = PaletteEditor::new(&mut state, &mut history);

        let red: Rgb = "#ff0000".parse().unwrap();
        editor.recolor(1, red).unwrap();
        editor.region_replace(0, 0, 2, 3, 0, 1).unwrap();

        let buffer = state.buffer.as_ref().unwrap();
        for y in 0..3 {
            for x in 0..2 {
                assert_eq!(buffer.get(x, y), Some(1));
                assert_eq!(state.palette.resolve(1), red);
            }
            for x in 2..4 {
                assert_eq!(buffer.get(x, y), Some(original[(y * 4 + x) as usize]));
            }
        }
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_delete_merges_into_nearest_and_reindexes() {
        // Index 1 (dark gray) is closest to 0 (black)
        let mut state = chart(
            3,
            1,
            vec![0, 1, 2],
            &[Rgb::BLACK, Rgb::new(40, 40, 40), Rgb::WHITE],
        );
        let mut history = History::new();
        let outcome = PaletteEditor::new(&mut state, &mut history)
            .delete_merge_nearest(1)
            .unwrap();

        assert_eq!(outcome, EditOutcome::Changed);
        assert_eq!(cells(&state), vec![0, 0, 1]);
        assert_eq!(state.palette.indices(), vec![0, 1]);
        assert_eq!(state.palette.resolve(1), Rgb::WHITE);
    }

    #[test]
    fn test_delete_tie_prefers_lowest_index() {
        let mut state = chart(
            3,
            1,
            vec![0, 1, 2],
            &[Rgb::new(0, 0, 0), Rgb::new(10, 0, 0), Rgb::new(20, 0, 0)],
        );
        let mut history = History::new();
        PaletteEditor::new(&mut state, &mut history)
            .delete_merge_nearest(1)
            .unwrap();
        assert_eq!(cells(&state), vec![0, 0, 1]);
    }

    #[test]
    fn test_delete_sole_color_fails() {
        let mut state = chart(2, 1, vec![0, 0], &[Rgb::BLACK]);
        let mut history = History::new();
        let result = PaletteEditor::new(&mut state, &mut history).delete_merge_nearest(0);
        assert!(matches!(result, Err(ChartError::NoMergeTarget(0))));
        assert!(history.is_empty());
        assert_eq!(state.palette.len(), 1);
    }

    #[test]
    fn test_delete_uses_overridden_color() {
        // 2 is recolored near black, so deleting 0 merges into 2
        let mut state = chart(
            3,
            1,
            vec![0, 1, 2],
            &[Rgb::BLACK, Rgb::new(100, 100, 100), Rgb::WHITE],
        );
        state.palette.set_override(2, Rgb::new(5, 5, 5)).unwrap();
        let mut history = History::new();
        PaletteEditor::new(&mut state, &mut history)
            .delete_merge_nearest(0)
            .unwrap();
        // 1 -> 0, 2 -> 1 after compaction
        assert_eq!(cells(&state), vec![1, 0, 1]);
        assert_eq!(state.palette.resolve(1), Rgb::new(5, 5, 5));
    }

    #[test]
    fn test_merge_conserves_counts() {
        let mut state = three_colors();
        let usage = state.buffer.as_ref().unwrap().usage();
        let expected = usage[&0] + usage[&2];
        let mut history = History::new();

        PaletteEditor::new(&mut state, &mut history).merge(0, 2).unwrap();

        // After compaction the old 2 lives at index 1
        let usage = state.buffer.as_ref().unwrap().usage();
        assert_eq!(usage[&1], expected);
        assert_eq!(state.palette.indices(), vec![0, 1]);
        assert_eq!(state.palette.resolve(1), Rgb::WHITE);
    }

    #[test]
    fn test_merge_keeps_unrelated_override() {
        let mut state = three_colors();
        let mut history = History::new();
        let mut editor = PaletteEditor::new(&mut state, &mut history);
        editor.recolor(0, Rgb::new(1, 2, 3)).unwrap();
        editor.merge(1, 2).unwrap();
        assert_eq!(state.palette.resolve(0), Rgb::new(1, 2, 3));
    }

    #[test]
    fn test_merge_same_index_is_noop() {
        let mut state = three_colors();
        let mut history = History::new();
        let outcome = PaletteEditor::new(&mut state, &mut history).merge(1, 1).unwrap();
        assert_eq!(outcome, EditOutcome::Unchanged);
        assert!(history.is_empty());
    }

    #[test]
    fn test_paint() {
        let mut state = three_colors();
        let mut history = History::new();
        let mut editor = PaletteEditor::new(&mut state, &mut history);

        assert_eq!(editor.paint(3, 2, 0).unwrap(), EditOutcome::Changed);
        assert_eq!(editor.paint(30, 2, 0).unwrap(), EditOutcome::Unchanged);
        assert_eq!(editor.paint(0, 0, 7).unwrap(), EditOutcome::Unchanged);
        assert_eq!(state.buffer.as_ref().unwrap().get(3, 2), Some(0));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_region_replace_without_match_is_noop() {
        let mut state = three_colors();
        let mut history = History::new();
        let outcome = PaletteEditor::new(&mut state, &mut history)
            .region_replace(50, 50, 3, 3, 0, 1)
            .unwrap();
        assert_eq!(outcome, EditOutcome::Unchanged);
        assert!(history.is_empty());
    }

    #[test]
    fn test_region_replace_in_place_and_undo() {
        let mut state = three_colors();
        let mut history = History::new();
        let before = cells(&state);
        let outcome = PaletteEditor::new(&mut state, &mut history)
            .region_replace(1, 1, 10, 10, 1, 2)
            .unwrap();
        assert_eq!(outcome, EditOutcome::Changed);
        assert_eq!(cells(&state), vec![0, 0, 1, 2, 0, 2, 2, 2, 0, 0, 2, 2]);
        assert_eq!(history.len(), 1);

        assert!(history.undo(&mut state));
        assert_eq!(cells(&state), before);
    }

    #[test]
    fn test_simplify_full_intensity_leaves_one_color() {
        let mut state = three_colors();
        let mut history = History::new();
        PaletteEditor::new(&mut state, &mut history)
            .simplify(100)
            .unwrap();

        assert_eq!(state.palette.len(), 1);
        assert!(cells(&state).iter().all(|&c| c == 0));
    }

    #[test]
    fn test_simplify_zero_intensity_keeps_distinct_colors() {
        let mut state = three_colors();
        let before = state.clone();
        let mut history = History::new();
        let outcome = PaletteEditor::new(&mut state, &mut history)
            .simplify(0)
            .unwrap();

        assert_eq!(outcome, EditOutcome::Unchanged);
        assert_eq!(state, before);
        assert!(history.is_empty());
    }

    #[test]
    fn test_simplify_groups_near_colors() {
        let mut state = chart(
            4,
            1,
            vec![0, 1, 2, 3],
            &[
                Rgb::new(0, 0, 0),
                Rgb::new(10, 10, 10),
                Rgb::new(250, 250, 250),
                Rgb::new(240, 240, 240),
            ],
        );
        let mut history = History::new();
        // threshold 30, target 1 + 4 * 90 / 100 = 4
        PaletteEditor::new(&mut state, &mut history)
            .simplify(10)
            .unwrap();

        assert_eq!(state.palette.len(), 2);
        assert_eq!(cells(&state), vec![0, 0, 1, 1]);
        assert_eq!(state.palette.resolve(0), Rgb::new(5, 5, 5));
        assert_eq!(state.palette.resolve(1), Rgb::new(245, 245, 245));
    }

    #[test]
    fn test_simplify_forces_group_target() {
        // Far apart colors, threshold 150: target 1 + 3 * 50 / 100 = 2
        let mut state = chart(
            3,
            1,
            vec![0, 1, 2],
            &[Rgb::new(0, 0, 0), Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)],
        );
        let mut history = History::new();
        PaletteEditor::new(&mut state, &mut history)
            .simplify(50)
            .unwrap();
        assert_eq!(state.palette.len(), 2);
    }

    #[test]
    fn test_simplify_carries_overrides() {
        let mut state = chart(
            3,
            1,
            vec![0, 1, 2],
            &[Rgb::new(0, 0, 0), Rgb::new(8, 8, 8), Rgb::WHITE],
        );
        state.palette.set_override(2, Rgb::new(250, 250, 250)).unwrap();
        let mut history = History::new();
        PaletteEditor::new(&mut state, &mut history)
            .simplify(10)
            .unwrap();

        // 0 and 1 grouped; 2 becomes 1 and keeps its override
        assert_eq!(cells(&state), vec![0, 0, 1]);
        assert_eq!(state.palette.overrides().len(), 1);
        assert_eq!(state.palette.resolve(1), Rgb::new(250, 250, 250));
    }

    #[test]
    fn test_smart_intensity_thresholds() {
        let low = PaletteStore::from_colors(&[Rgb::new(100, 100, 100), Rgb::new(120, 120, 120)]);
        assert_eq!(smart_intensity(&low), 8);

        let mid = PaletteStore::from_colors(&[Rgb::new(100, 100, 100), Rgb::new(150, 150, 150)]);
        assert_eq!(smart_intensity(&mid), 20);

        let high = PaletteStore::from_colors(&[Rgb::BLACK, Rgb::WHITE]);
        assert_eq!(smart_intensity(&high), 35);
    }

    #[test]
    fn test_simplify_bw_smart_reports_intensity() {
        let mut state = three_colors();
        let mut history = History::new();
        let (_, intensity) = PaletteEditor::new(&mut state, &mut history)
            .simplify_bw_smart()
            .unwrap();
        assert_eq!(intensity, 35);
    }

    #[test]
    fn test_suggest_clusters() {
        let palette = PaletteStore::from_colors(&[
            Rgb::new(0, 0, 0),
            Rgb::new(250, 250, 250),
            Rgb::new(5, 5, 5),
            Rgb::new(255, 255, 255),
            Rgb::new(255, 0, 0),
        ]);
        let clusters = suggest_clusters(&palette, 30.0);
        assert_eq!(clusters, vec![vec![0, 2], vec![1, 3]]);
    }

    #[test]
    fn test_suggest_clusters_compares_to_seed_only() {
        // 1 is near 0 and 2 is near 1, but 2 is far from the seed 0
        let palette = PaletteStore::from_colors(&[
            Rgb::new(0, 0, 0),
            Rgb::new(0, 8, 0),
            Rgb::new(0, 16, 0),
        ]);
        assert_eq!(suggest_clusters(&palette, 20.0), vec![vec![0, 1]]);
    }

    #[test]
    fn test_palette_report_sorted_by_usage() {
        let state = three_colors();
        let report = palette_report(&state);
        let order: Vec<(u8, usize)> = report.iter().map(|r| (r.index, r.count)).collect();
        assert_eq!(order, vec![(0, 5), (2, 4), (1, 3)]);
        assert_eq!(report[0].hex, "#000000");
        assert!(palette_report(&ChartState::default()).is_empty());
    }

    #[test]
    fn test_undo_after_delete_restores_everything() {
        let mut state = three_colors();
        let before = state.clone();
        let mut history = History::new();
        PaletteEditor::new(&mut state, &mut history)
            .delete_merge_nearest(1)
            .unwrap();
        assert!(history.undo(&mut state));
        assert_eq!(state, before);
    }
}
