//! Chart rasterizer.
//!
//! Turns an index buffer, its palette and the display parameters into a
//! chart image:
//!
//! ```text
//!  margin (axis numbers)
//!  ┌──────────────────────────────┐
//!  │   0         5         10     │
//!  │ 0 ▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇   │
//!  │   ▇▇ cells, thin lines  ▇▇   │
//!  │ 5 ▇▇ thick every 10th   ▇▇   │
//!  │   ▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇▇   │
//!  └──────────────────────────────┘ pad
//! ```
//!
//! Rendering is a pure function of its inputs: the same buffer, palette and
//! parameters always give the same pixels.

use tiny_skia::{
    BlendMode, Color, ColorU8, Paint, Pixmap, PixmapPaint, Rect, Transform,
};

use super::glyphs;
use crate::chart::{IndexBuffer, PaletteStore};
use crate::error::RenderError;
use crate::models::DisplayParams;

/// Space left and above the grid for axis numbers
pub const MARGIN: u32 = 50;

/// Space right and below the grid
pub const PAD: u32 = 20;

/// Every n-th column and row gets a number
pub const LABEL_EVERY: u32 = 5;

/// Every n-th grid line is drawn thick
pub const THICK_EVERY: u32 = 10;

const LABEL_BOX_W: u32 = 30;
const LABEL_BOX_H: u32 = 16;

const THIN_ALPHA: u8 = 50;
const THICK_ALPHA: u8 = 200;
const HIGHLIGHT_ALPHA: u8 = 140;
const LABEL_COLOR: (u8, u8, u8) = (0x33, 0x33, 0x33);

/// Largest pixmap the rasterizer allocates (1 GiB of RGBA)
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

/// Pixel geometry of a rendered chart before zoom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub cell_w: u32,
    pub cell_h: u32,
    pub cols: u32,
    pub rows: u32,
    grid_width: u32,
    grid_height: u32,
}

impl GridLayout {
    /// Fails with [`RenderError::UnsupportedDimensions`] when the canvas
    /// would overflow or exceed [`MAX_CANVAS_PIXELS`].
    pub fn new(buffer: &IndexBuffer, display: &DisplayParams) -> Result<Self, RenderError> {
        let cell_w = display.cell_size.max(1);
        let cell_h = display.cell_height();
        let (cols, rows) = (buffer.width(), buffer.height());
        let too_large = || RenderError::UnsupportedDimensions {
            width: cols.saturating_mul(cell_w),
            height: rows.saturating_mul(cell_h),
        };

        let grid_width = cols.checked_mul(cell_w).ok_or_else(too_large)?;
        let grid_height = rows.checked_mul(cell_h).ok_or_else(too_large)?;
        let canvas_width = grid_width.checked_add(MARGIN + PAD).ok_or_else(too_large)?;
        let canvas_height = grid_height.checked_add(MARGIN + PAD).ok_or_else(too_large)?;
        check_pixel_budget(canvas_width, canvas_height)?;

        Ok(Self {
            cell_w,
            cell_h,
            cols,
            rows,
            grid_width,
            grid_height,
        })
    }

    pub fn grid_width(&self) -> u32 {
        self.grid_width
    }

    pub fn grid_height(&self) -> u32 {
        self.grid_height
    }

    pub fn canvas_width(&self) -> u32 {
        MARGIN + self.grid_width + PAD
    }

    pub fn canvas_height(&self) -> u32 {
        MARGIN + self.grid_height + PAD
    }

    /// Row under a vertical position on the unzoomed canvas
    pub fn row_at(&self, y: f64) -> Option<u32> {
        let row = ((y - MARGIN as f64) / self.cell_h as f64).floor();
        (row >= 0.0 && row < self.rows as f64).then_some(row as u32)
    }
}

fn check_pixel_budget(width: u32, height: u32) -> Result<(), RenderError> {
    if width as u64 * height as u64 > MAX_CANVAS_PIXELS {
        return Err(RenderError::UnsupportedDimensions { width, height });
    }
    Ok(())
}

/// Row under a click at `click_y` on a chart shown at `zoom`
pub fn row_at(buffer: &IndexBuffer, display: &DisplayParams, click_y: f64, zoom: f64) -> Option<u32> {
    if !(zoom.is_finite() && zoom > 0.0 && click_y.is_finite()) {
        return None;
    }
    GridLayout::new(buffer, display).ok()?.row_at(click_y / zoom)
}

fn solid_paint(r: u8, g: u8, b: u8, a: u8) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(r, g, b, a));
    paint.anti_alias = false;
    paint
}

fn fill(pixmap: &mut Pixmap, x: i64, y: i64, w: i64, h: i64, paint: &Paint) {
    if let Some(rect) = Rect::from_xywh(x as f32, y as f32, w as f32, h as f32) {
        pixmap.fill_rect(rect, paint, Transform::identity(), None);
    }
}

/// Render the chart.
///
/// Only fails for dimensions that cannot be allocated.
pub fn render_grid(
    buffer: &IndexBuffer,
    palette: &PaletteStore,
    display: &DisplayParams,
) -> Result<Pixmap, RenderError> {
    let layout = GridLayout::new(buffer, display)?;
    let mut canvas = new_pixmap(layout.canvas_width(), layout.canvas_height())?;
    canvas.fill(Color::WHITE);

    if display.show_grid {
        paint_cells(&mut canvas, buffer, palette, &layout);
        let overlay = grid_overlay(&layout, canvas.width(), canvas.height())?;
        canvas.draw_pixmap(
            0,
            0,
            overlay.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        draw_axis_numbers(&mut canvas, &layout);
        if let Some(row) = display.highlighted_row {
            highlight_row(&mut canvas, &layout, row);
        }
    } else {
        let native = native_pixmap(buffer, palette)?;
        let magnified = resample_nearest(&native, layout.grid_width(), layout.grid_height())?;
        canvas.draw_pixmap(
            MARGIN as i32,
            MARGIN as i32,
            magnified.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    apply_zoom(canvas, display.zoom)
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap, RenderError> {
    check_pixel_budget(width, height)?;
    Pixmap::new(width, height).ok_or(RenderError::UnsupportedDimensions { width, height })
}

/// One solid rectangle per cell
fn paint_cells(canvas: &mut Pixmap, buffer: &IndexBuffer, palette: &PaletteStore, layout: &GridLayout) {
    for (y, row) in buffer.rows().enumerate() {
        for (x, &index) in row.iter().enumerate() {
            let c = palette.resolve(index);
            let paint = solid_paint(c.r, c.g, c.b, 255);
            fill(
                canvas,
                (MARGIN + x as u32 * layout.cell_w) as i64,
                (MARGIN + y as u32 * layout.cell_h) as i64,
                layout.cell_w as i64,
                layout.cell_h as i64,
                &paint,
            );
        }
    }
}

/// Transparent layer carrying only the grid lines.
///
/// Lines replace overlay pixels instead of blending, so crossings are not
/// darker than the lines themselves.
fn grid_overlay(layout: &GridLayout, width: u32, height: u32) -> Result<Pixmap, RenderError> {
    let mut overlay = new_pixmap(width, height)?;

    let mut thin = solid_paint(0, 0, 0, THIN_ALPHA);
    thin.blend_mode = BlendMode::Source;
    let mut thick = solid_paint(0, 0, 0, THICK_ALPHA);
    thick.blend_mode = BlendMode::Source;

    let left = MARGIN as i64;
    let top = MARGIN as i64;
    let grid_w = layout.grid_width() as i64;
    let grid_h = layout.grid_height() as i64;

    let is_thick = |i: u32, last: u32| i % THICK_EVERY == 0 || i == last;

    for pass_thick in [false, true] {
        let paint = if pass_thick { &thick } else { &thin };

        for i in 0..=layout.cols {
            if is_thick(i, layout.cols) != pass_thick {
                continue;
            }
            let x = left + (i * layout.cell_w) as i64;
            if pass_thick {
                fill(&mut overlay, x - 1, top - 1, 2, grid_h + 2, paint);
            } else {
                fill(&mut overlay, x, top, 1, grid_h, paint);
            }
        }

        for j in 0..=layout.rows {
            if is_thick(j, layout.rows) != pass_thick {
                continue;
            }
            let y = top + (j * layout.cell_h) as i64;
            if pass_thick {
                fill(&mut overlay, left - 1, y - 1, grid_w + 2, 2, paint);
            } else {
                fill(&mut overlay, left, y, grid_w, 1, paint);
            }
        }
    }

    Ok(overlay)
}

/// Column numbers above every 5th column, row numbers left of every 5th row
fn draw_axis_numbers(canvas: &mut Pixmap, layout: &GridLayout) {
    let (r, g, b) = LABEL_COLOR;
    let paint = solid_paint(r, g, b, 255);

    let label_y = (MARGIN as i32 - LABEL_BOX_H as i32) / 2;
    for col in (0..layout.cols).step_by(LABEL_EVERY as usize) {
        let center = (MARGIN + col * layout.cell_w + layout.cell_w / 2) as i32;
        glyphs::draw_text_centered(
            canvas,
            &col.to_string(),
            center - LABEL_BOX_W as i32 / 2,
            label_y,
            LABEL_BOX_W,
            LABEL_BOX_H,
            &paint,
        );
    }

    let label_x = (MARGIN as i32 - LABEL_BOX_W as i32) / 2;
    for row in (0..layout.rows).step_by(LABEL_EVERY as usize) {
        let center = (MARGIN + row * layout.cell_h + layout.cell_h / 2) as i32;
        glyphs::draw_text_centered(
            canvas,
            &row.to_string(),
            label_x,
            center - LABEL_BOX_H as i32 / 2,
            LABEL_BOX_W,
            LABEL_BOX_H,
            &paint,
        );
    }
}

/// Dim everything above and below the highlighted row across the canvas
fn highlight_row(canvas: &mut Pixmap, layout: &GridLayout, row: u32) {
    if row >= layout.rows {
        return;
    }
    let paint = solid_paint(0, 0, 0, HIGHLIGHT_ALPHA);
    let width = canvas.width() as i64;
    let band_top = (MARGIN + row * layout.cell_h) as i64;
    let band_bottom = band_top + layout.cell_h as i64;

    fill(canvas, 0, 0, width, band_top, &paint);
    fill(
        canvas,
        0,
        band_bottom,
        width,
        canvas.height() as i64 - band_bottom,
        &paint,
    );
}

/// The buffer at one pixel per cell
fn native_pixmap(buffer: &IndexBuffer, palette: &PaletteStore) -> Result<Pixmap, RenderError> {
    let mut pixmap = new_pixmap(buffer.width(), buffer.height())?;
    for (pixel, &index) in pixmap.pixels_mut().iter_mut().zip(buffer.cells()) {
        let c = palette.resolve(index);
        *pixel = ColorU8::from_rgba(c.r, c.g, c.b, 255).premultiply();
    }
    Ok(pixmap)
}

fn apply_zoom(canvas: Pixmap, zoom: f32) -> Result<Pixmap, RenderError> {
    if (zoom - 1.0).abs() <= f32::EPSILON || !zoom.is_finite() || zoom <= 0.0 {
        return Ok(canvas);
    }
    let width = ((canvas.width() as f64 * zoom as f64).floor() as u32).max(1);
    let height = ((canvas.height() as f64 * zoom as f64).floor() as u32).max(1);
    resample_nearest(&canvas, width, height)
}

/// Nearest-neighbor rescale, sampling at destination pixel centers
pub fn resample_nearest(src: &Pixmap, width: u32, height: u32) -> Result<Pixmap, RenderError> {
    let mut dst = new_pixmap(width, height)?;
    let (sw, sh) = (src.width() as u64, src.height() as u64);
    let (dw, dh) = (width as u64, height as u64);
    let src_pixels = src.pixels();
    let dst_pixels = dst.pixels_mut();

    for dy in 0..dh {
        let sy = ((2 * dy + 1) * sh / (2 * dh)).min(sh - 1);
        for dx in 0..dw {
            let sx = ((2 * dx + 1) * sw / (2 * dw)).min(sw - 1);
            dst_pixels[(dy * dw + dx) as usize] = src_pixels[(sy * sw + sx) as usize];
        }
    }
    Ok(dst)
}
