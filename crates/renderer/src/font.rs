//! Label text drawn from the `font8x8` bitmap glyphs with tiny-skia.
//!
//! Each glyph is eight rows of eight bits, least significant bit on the left.
//! Lit bits are filled as squares of `scale` pixels, so text stays crisp at
//! any integer scale and can be rotated with a transform.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};

/// Glyph cell size in font pixels. The cell includes letter spacing.
pub const GLYPH_SIZE: usize = 8;

/// Glyph bitmap for `ch`, `?` if the font has no glyph for it.
fn glyph(ch: char) -> [u8; GLYPH_SIZE] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; GLYPH_SIZE])
}

/// Where the anchor point sits on the text's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Width of `text` in pixels at `scale`.
pub fn text_width(text: &str, scale: f32) -> f32 {
    (text.chars().count() * GLYPH_SIZE) as f32 * scale
}

/// Height of a line of text in pixels at `scale`.
pub fn text_height(scale: f32) -> f32 {
    GLYPH_SIZE as f32 * scale
}

/// Draw `text` with its top edge at `y`, horizontally anchored at `x`.
pub fn draw_text(
    pixmap: &mut Pixmap,
    text: &str,
    x: f32,
    y: f32,
    scale: f32,
    align: Align,
    paint: &Paint,
) {
    let transform = Transform::from_translate(x, y);
    draw_text_transformed(pixmap, text, scale, align, paint, transform);
}

/// Draw `text` reading bottom to top, centered vertically on `y`, with its
/// top edge (left side once rotated) at `x`.
pub fn draw_text_vertical(
    pixmap: &mut Pixmap,
    text: &str,
    x: f32,
    y: f32,
    scale: f32,
    paint: &Paint,
) {
    // Rotate 90 degrees counter-clockwise: (u, v) -> (v, -u)
    let transform = Transform::from_row(0.0, -1.0, 1.0, 0.0, x, y);
    draw_text_transformed(pixmap, text, scale, Align::Center, paint, transform);
}

fn draw_text_transformed(
    pixmap: &mut Pixmap,
    text: &str,
    scale: f32,
    align: Align,
    paint: &Paint,
    transform: Transform,
) {
    let width = text_width(text, scale);
    let start = match align {
        Align::Left => 0.0,
        Align::Center => -width / 2.0,
        Align::Right => -width,
    };

    let mut pb = PathBuilder::new();
    for (i, ch) in text.chars().enumerate() {
        let origin = start + (i * GLYPH_SIZE) as f32 * scale;
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let x = origin + col as f32 * scale;
                if let Some(rect) = Rect::from_xywh(x, row as f32 * scale, scale, scale) {
                    pb.push_rect(rect);
                }
            }
        }
    }

    if let Some(path) = pb.finish() {
        pixmap.fill_path(&path, paint, FillRule::Winding, transform, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(ch: char) -> usize {
        glyph(ch).iter().map(|row| row.count_ones() as usize).sum()
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 2.0), 0.0);
        assert_eq!(text_width("A", 1.0), 8.0);
        assert_eq!(text_width("AB", 2.0), 32.0);
    }

    #[test]
    fn test_missing_glyph_falls_back() {
        assert_eq!(glyph('\u{2082}'), glyph('?'));
        assert_ne!(glyph('a'), glyph('?'));
        assert_ne!(glyph('é'), glyph('?'));
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let mut pixmap = Pixmap::new(40, 20).unwrap();
        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        paint.anti_alias = false;

        draw_text(&mut pixmap, "1", 2.0, 2.0, 2.0, Align::Left, &paint);
        let opaque = pixmap.pixels().iter().filter(|p| p.alpha() == 255).count();
        assert!(lit('1') > 0);
        assert_eq!(opaque, lit('1') * 4);
    }
}
