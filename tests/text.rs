/// Unit tests for bitmap font loading, measurement, and glyph emission.
/// Text drawing produces plain draw commands, so no GPU is involved.
use glam::Vec2;
use waypost::gfx::text::{draw_line, draw_line_centered, Font};
use waypost::gfx::{Color, Frame, Rect, TextureHandle};

fn atlas() -> TextureHandle {
    TextureHandle { id: 2, width: 128, height: 32 }
}

/// Two glyphs with distinct metrics: a narrow 'i' and a wide 'w'.
fn font() -> Font {
    let doc = serde_json::json!({
        "line_height": 20,
        "glyphs": [
            { "id": 'i' as u32, "x": 0,  "y": 0, "width": 4,  "height": 16,
              "x_offset": 1, "y_offset": 2, "x_advance": 6 },
            { "id": 'w' as u32, "x": 16, "y": 0, "width": 14, "height": 16,
              "x_offset": 0, "y_offset": 2, "x_advance": 15 }
        ]
    });
    Font::from_json(&doc.to_string(), atlas()).unwrap()
}

#[test]
fn measure_sums_advances_over_line_height() {
    let font = font();
    assert_eq!(font.measure("iwi"), Vec2::new(27.0, 20.0));
    assert_eq!(font.measure(""), Vec2::new(0.0, 20.0));
}

#[test]
fn measure_ignores_unknown_characters() {
    let font = font();
    assert_eq!(font.measure("i?w"), font.measure("iw"));
}

#[test]
fn draw_emits_one_command_per_known_glyph() {
    let font = font();
    let mut frame = Frame::new();
    draw_line(&mut frame, &font, "wi?w", Vec2::new(0.0, 0.0), Color::BLACK);
    assert_eq!(frame.commands.len(), 3, "the unknown '?' emits nothing");
    assert!(frame.commands.iter().all(|c| c.texture == atlas()));
}

#[test]
fn draw_advances_the_cursor_and_applies_offsets() {
    let font = font();
    let mut frame = Frame::new();
    draw_line(&mut frame, &font, "wi", Vec2::new(10.0, 5.0), Color::BLACK);

    let w = &frame.commands[0];
    assert_eq!(w.src, Some(Rect::new(16, 0, 14, 16)));
    assert_eq!(w.dst, Rect::new(10, 7, 14, 16), "y_offset pushes the glyph down");

    let i = &frame.commands[1];
    // Cursor advanced by w's x_advance (15), plus i's x_offset (1).
    assert_eq!(i.dst, Rect::new(26, 7, 4, 16));
}

#[test]
fn draw_centered_splits_the_measured_size() {
    let font = font();
    let mut frame = Frame::new();
    // "ii" measures 12×20, so the block's top-left lands at (94, 40).
    draw_line_centered(&mut frame, &font, "ii", Vec2::new(100.0, 50.0), Color::BLACK);
    let first = &frame.commands[0];
    assert_eq!(first.dst.x, 95, "94 + x_offset 1");
    assert_eq!(first.dst.y, 42, "40 + y_offset 2");
}

#[test]
fn malformed_descriptor_is_an_error() {
    assert!(Font::from_json("not json", atlas()).is_err());
    assert!(Font::from_json("{}", atlas()).is_err(), "missing required fields");
}

#[test]
fn glyphs_with_invalid_code_points_are_skipped() {
    let doc = serde_json::json!({
        "line_height": 8,
        "glyphs": [
            { "id": 0xD800u32, "x": 0, "y": 0, "width": 4, "height": 8,
              "x_offset": 0, "y_offset": 0, "x_advance": 4 },
            { "id": 'a' as u32, "x": 4, "y": 0, "width": 4, "height": 8,
              "x_offset": 0, "y_offset": 0, "x_advance": 4 }
        ]
    });
    let font = Font::from_json(&doc.to_string(), atlas()).unwrap();
    assert!(font.glyph('a').is_some());
    assert_eq!(font.measure("a").x, 4.0, "surrogate code point contributed no glyph");
}
