//! Dealer watermark stamping
//!
//! Renders text right/bottom-aligned at 50% white over the frame. Glyphs come
//! from an embedded 5x7 bitmap set scaled to the requested size, so no font
//! asset ships with the crate. Characters without a glyph advance the cursor
//! without drawing.

use image::{Rgba, RgbaImage};

/// Margin from the right and bottom edges, in pixels
const MARGIN: u32 = 20;
/// Minimum watermark font size in pixels
const MIN_FONT_PX: f32 = 16.0;
/// Watermark opacity
const OPACITY: f32 = 0.5;
/// Glyph cell height in font units
const GLYPH_H: u32 = 7;
/// Glyph cell width in font units, including one column of spacing
const GLYPH_ADVANCE: u32 = 6;

/// Stamp `text` onto the bottom-right of the image
///
/// When `enabled` is false the input is returned content-equal and untouched.
/// Callers must not rely on buffer identity either way.
#[must_use]
pub fn stamp(image: &RgbaImage, text: &str, enabled: bool) -> RgbaImage {
    let mut out = image.clone();
    if !enabled || text.is_empty() {
        return out;
    }

    let (width, height) = out.dimensions();
    let font_px = (width as f32 / 40.0).max(MIN_FONT_PX);
    let scale = ((font_px / GLYPH_H as f32).round() as u32).max(1);

    let glyph_count = text.chars().count() as u32;
    let text_w = glyph_count * GLYPH_ADVANCE * scale;
    let text_h = GLYPH_H * scale;

    // Right/bottom aligned with the margin; clamp for tiny frames
    let origin_x = (width.saturating_sub(MARGIN).saturating_sub(text_w)) as i64;
    let origin_y = (height.saturating_sub(MARGIN).saturating_sub(text_h)) as i64;

    let mut pen_x = origin_x;
    for ch in text.chars() {
        if let Some(rows) = glyph(ch) {
            draw_glyph(&mut out, pen_x, origin_y, rows, scale);
        }
        pen_x += i64::from(GLYPH_ADVANCE * scale);
    }

    out
}

/// Blend one scaled glyph into the buffer at 50% white
fn draw_glyph(image: &mut RgbaImage, x: i64, y: i64, rows: [u8; 7], scale: u32) {
    let (width, height) = image.dimensions();
    for (row_idx, row) in rows.iter().enumerate() {
        for col in 0..5u32 {
            if row & (0b1_0000 >> col) == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = x + i64::from(col * scale + dx);
                    let py = y + i64::from(row_idx as u32 * scale + dy);
                    if px < 0 || py < 0 || px >= i64::from(width) || py >= i64::from(height) {
                        continue;
                    }
                    let pixel = image.get_pixel_mut(px as u32, py as u32);
                    blend_white(pixel);
                }
            }
        }
    }
}

/// Source-over blend of 50% white onto one pixel
fn blend_white(pixel: &mut Rgba<u8>) {
    for c in &mut pixel.0[..3] {
        *c = (255.0 * OPACITY + f32::from(*c) * (1.0 - OPACITY)).round() as u8;
    }
    let a = f32::from(pixel.0[3]) / 255.0;
    pixel.0[3] = ((OPACITY + a * (1.0 - OPACITY)) * 255.0).round() as u8;
}

/// 5x7 bitmap for a character; rows are 5-bit masks, MSB is the left column
#[allow(clippy::too_many_lines)]
fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        _ => return None,
    };
    Some(rows)
}
