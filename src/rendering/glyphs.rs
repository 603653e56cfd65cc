//! Built-in 3×5 digit font for axis numbers.
//!
//! Charts are rendered without any system fonts so output is identical on
//! every machine.

use tiny_skia::{Paint, Pixmap, Rect, Transform};

/// Glyph rows top to bottom, bit 2 = left column
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b001, 0b001, 0b001], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

/// Pixel scale of every glyph cell
pub const SCALE: u32 = 2;

/// Horizontal gap between glyphs, in unscaled units
const SPACING: u32 = 1;

/// Width and height in pixels of `text` rendered with this font.
///
/// Non-digit characters are skipped.
pub fn text_size(text: &str) -> (u32, u32) {
    let n = text.chars().filter(|c| c.is_ascii_digit()).count() as u32;
    if n == 0 {
        return (0, 0);
    }
    let width = (n * GLYPH_W + (n - 1) * SPACING) * SCALE;
    (width, GLYPH_H * SCALE)
}

/// Draw `text` centered in the box at `(x, y)` of size `w`×`h`.
///
/// The box may extend past the pixmap; pixels outside are clipped.
pub fn draw_text_centered(
    pixmap: &mut Pixmap,
    text: &str,
    x: i32,
    y: i32,
    w: u32,
    h: u32,
    paint: &Paint,
) {
    let (tw, th) = text_size(text);
    let mut cursor_x = x + (w as i32 - tw as i32) / 2;
    let top = y + (h as i32 - th as i32) / 2;

    for c in text.chars() {
        let Some(digit) = c.to_digit(10) else {
            continue;
        };
        let glyph = &DIGITS[digit as usize];
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) == 0 {
                    continue;
                }
                let px = cursor_x + (col * SCALE) as i32;
                let py = top + (row as u32 * SCALE) as i32;
                if let Some(rect) = Rect::from_xywh(px as f32, py as f32, SCALE as f32, SCALE as f32)
                {
                    pixmap.fill_rect(rect, paint, Transform::identity(), None);
                }
            }
        }
        cursor_x += ((GLYPH_W + SPACING) * SCALE) as i32;
    }
}
