use std::collections::HashMap;

use glam::Vec2;
use serde::Deserialize;

use super::{Color, Flip, Rect, Surface, TextureHandle};

// ── Glyph ────────────────────────────────────────────────────────────────────

/// Metrics for a single character in the bitmap font atlas.
#[derive(Debug, Clone)]
pub struct Glyph {
    /// Top-left pixel X of the glyph region in the atlas.
    pub x: u32,
    /// Top-left pixel Y of the glyph region in the atlas.
    pub y: u32,
    /// Pixel width of the glyph region.
    pub width: u32,
    /// Pixel height of the glyph region.
    pub height: u32,
    /// Horizontal offset applied when rendering (may be negative).
    pub x_offset: i32,
    /// Vertical offset applied when rendering (may be negative).
    pub y_offset: i32,
    /// How far to advance the cursor after drawing this glyph.
    pub x_advance: u32,
}

// ── Font ─────────────────────────────────────────────────────────────────────

/// A bitmap font: glyph metrics from a JSON descriptor plus a non-owning
/// handle to the atlas texture the metrics refer to.
pub struct Font {
    glyphs: HashMap<char, Glyph>,
    /// Vertical distance between successive baselines in pixels.
    pub line_height: u32,
    /// Atlas texture holding the glyph images.
    pub texture: TextureHandle,
}

impl Font {
    /// Deserialise a `Font` from a JSON descriptor string.
    ///
    /// Returns a `serde_json::Error` if the input is malformed or missing
    /// required fields.
    pub fn from_json(json: &str, texture: TextureHandle) -> Result<Self, serde_json::Error> {
        let raw: RawFont = serde_json::from_str(json)?;

        let glyphs = raw
            .glyphs
            .into_iter()
            .filter_map(|g| {
                // Skip any code-point that isn't a valid Unicode scalar value.
                char::from_u32(g.id).map(|ch| {
                    (ch, Glyph {
                        x: g.x,
                        y: g.y,
                        width: g.width,
                        height: g.height,
                        x_offset: g.x_offset,
                        y_offset: g.y_offset,
                        x_advance: g.x_advance,
                    })
                })
            })
            .collect();

        Ok(Self { glyphs, line_height: raw.line_height, texture })
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    /// Measure a single line of text: total advance width × line height.
    /// Characters without a glyph contribute nothing.
    pub fn measure(&self, text: &str) -> Vec2 {
        let width: u32 = text
            .chars()
            .filter_map(|ch| self.glyphs.get(&ch))
            .map(|g| g.x_advance)
            .sum();
        Vec2::new(width as f32, self.line_height as f32)
    }
}

// ── Drawing ──────────────────────────────────────────────────────────────────

/// Draw a single line of text with its top-left corner at `pos`, one surface
/// draw call per glyph.  Characters absent from the font are silently
/// skipped; no wrapping.
pub fn draw_line(surface: &mut dyn Surface, font: &Font, text: &str, pos: Vec2, color: Color) {
    let mut cursor_x = pos.x;

    for ch in text.chars() {
        let Some(glyph) = font.glyph(ch) else {
            continue;
        };

        let src = Rect::new(glyph.x as i32, glyph.y as i32, glyph.width as i32, glyph.height as i32);
        let dst = Rect::new(
            (cursor_x + glyph.x_offset as f32) as i32,
            (pos.y + glyph.y_offset as f32) as i32,
            glyph.width as i32,
            glyph.height as i32,
        );
        surface.draw(font.texture, Some(src), dst, color, Flip::None);

        cursor_x += glyph.x_advance as f32;
    }
}

/// Draw a single line of text centered on `center`.
pub fn draw_line_centered(
    surface: &mut dyn Surface,
    font: &Font,
    text: &str,
    center: Vec2,
    color: Color,
) {
    let size = font.measure(text);
    draw_line(surface, font, text, center - size * 0.5, color);
}

// ── Raw (JSON-facing) types ───────────────────────────────────────────────────
//
// Character IDs are stored as u32 in JSON (Unicode code points); we convert
// them to `char` when building the public `Font`.

#[derive(Deserialize)]
struct RawGlyph {
    /// Unicode code point (e.g. 65 for 'A').
    id: u32,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    x_offset: i32,
    y_offset: i32,
    x_advance: u32,
}

#[derive(Deserialize)]
struct RawFont {
    line_height: u32,
    glyphs: Vec<RawGlyph>,
}
