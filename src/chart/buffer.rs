//! Index buffer: the chart grid, one palette index per cell.

use std::collections::BTreeMap;

use super::PaletteIndex;

/// Row-major grid of palette indices with fixed dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexBuffer {
    width: u32,
    height: u32,
    cells: Vec<PaletteIndex>,
}

impl IndexBuffer {
    /// Buffer of `width`×`height` cells all set to `fill`.
    ///
    /// Zero dimensions are raised to 1.
    pub fn new(width: u32, height: u32, fill: PaletteIndex) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![fill; width as usize * height as usize],
        }
    }

    /// Wrap existing cells; `None` when the length does not match or a
    /// dimension is zero.
    pub fn from_cells(width: u32, height: u32, cells: Vec<PaletteIndex>) -> Option<Self> {
        if width == 0 || height == 0 || cells.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cells(&self) -> &[PaletteIndex] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [PaletteIndex] {
        &mut self.cells
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Index at `(x, y)`; `None` outside the grid
    pub fn get(&self, x: u32, y: u32) -> Option<PaletteIndex> {
        self.offset(x, y).map(|i| self.cells[i])
    }

    /// Set `(x, y)`; ignored outside the grid. Returns whether a cell changed.
    pub fn set(&mut self, x: u32, y: u32, index: PaletteIndex) -> bool {
        match self.offset(x, y) {
            Some(i) if self.cells[i] != index => {
                self.cells[i] = index;
                true
            }
            _ => false,
        }
    }

    /// Call `f` with a mutable reference to every cell equal to `index`
    pub fn for_each_matching<F>(&mut self, index: PaletteIndex, mut f: F)
    where
        F: FnMut(&mut PaletteIndex),
    {
        for cell in self.cells.iter_mut().filter(|c| **c == index) {
            f(cell);
        }
    }

    /// Rewrite every `from` cell to `to`, returning the number rewritten
    pub fn replace(&mut self, from: PaletteIndex, to: PaletteIndex) -> usize {
        let mut count = 0;
        self.for_each_matching(from, |cell| {
            *cell = to;
            count += 1;
        });
        count
    }

    /// Rewrite matching cells inside the rectangle, clamped to the grid
    pub fn replace_in_rect(
        &mut self,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        from: PaletteIndex,
        to: PaletteIndex,
    ) -> usize {
        let Some((x_end, y_end)) = self.clamp_rect(x, y, w, h) else {
            return 0;
        };
        let mut count = 0;
        for row in y..y_end {
            let start = row as usize * self.width as usize;
            for cell in &mut self.cells[start + x as usize..start + x_end as usize] {
                if *cell == from {
                    *cell = to;
                    count += 1;
                }
            }
        }
        count
    }

    /// Cells holding `index` inside the rectangle, clamped to the grid
    pub fn count_in_rect(&self, x: u32, y: u32, w: u32, h: u32, index: PaletteIndex) -> usize {
        let Some((x_end, y_end)) = self.clamp_rect(x, y, w, h) else {
            return 0;
        };
        (y..y_end)
            .map(|row| {
                let start = row as usize * self.width as usize;
                self.cells[start + x as usize..start + x_end as usize]
                    .iter()
                    .filter(|&&cell| cell == index)
                    .count()
            })
            .sum()
    }

    /// Exclusive end corner of the rectangle inside the grid, `None` when
    /// the origin lies outside
    fn clamp_rect(&self, x: u32, y: u32, w: u32, h: u32) -> Option<(u32, u32)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((
            x.saturating_add(w).min(self.width),
            y.saturating_add(h).min(self.height),
        ))
    }

    /// Apply an old → new mapping; unmapped cells become `fallback`
    pub fn remap(&mut self, mapping: &BTreeMap<PaletteIndex, PaletteIndex>, fallback: PaletteIndex) {
        for cell in &mut self.cells {
            *cell = mapping.get(cell).copied().unwrap_or(fallback);
        }
    }

    /// Cell count per index, ascending by index
    pub fn usage(&self) -> BTreeMap<PaletteIndex, usize> {
        let mut counts = [0usize; 256];
        for &cell in &self.cells {
            counts[cell as usize] += 1;
        }
        counts
            .iter()
            .enumerate()
            .filter(|(_, &n)| n > 0)
            .map(|(i, &n)| (i as PaletteIndex, n))
            .collect()
    }

    /// Rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[PaletteIndex]> {
        self.cells.chunks_exact(self.width as usize)
    }
}
