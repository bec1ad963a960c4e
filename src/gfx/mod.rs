// ── Drawing substrate types ──────────────────────────────────────────────────
//
// Game code never talks to the GPU directly.  Everything that appears on
// screen is expressed as a draw call against the `Surface` trait: a texture
// region, a destination rectangle, a tint, and a flip flag.  The per-frame
// `Frame` recorder collects those calls as plain data, which the wgpu
// renderer consumes in one pass at the end of the frame.

pub mod renderer;
pub mod text;

// ── Color ────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const WHITE: Self = Self([1.0, 1.0, 1.0, 1.0]);
    pub const BLACK: Self = Self([0.0, 0.0, 0.0, 1.0]);
    pub const RED: Self = Self([1.0, 0.0, 0.0, 1.0]);
    pub const SKY_BLUE: Self = Self([0.53, 0.81, 0.92, 1.0]);
    pub const TRANSPARENT: Self = Self([0.0, 0.0, 0.0, 0.0]);

    /// Same color with the alpha channel replaced.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self([self.0[0], self.0[1], self.0[2], alpha])
    }
}

// ── Rect ─────────────────────────────────────────────────────────────────────

/// Axis-aligned pixel rectangle, y-down.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.w / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.h / 2
    }
}

// ── Texture handles ──────────────────────────────────────────────────────────

/// Non-owning reference to renderer-owned pixel data.
///
/// Handles are plain values: cheap to copy, safe to stash in game objects,
/// and swappable at any time.  The pixel dimensions ride along so that layout
/// code (atlas lookups, centering) never needs the renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextureHandle {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

// ── Flip ─────────────────────────────────────────────────────────────────────

/// Mirroring applied to the source region when drawing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flip {
    None,
    Horizontal,
}

// ── Surface ──────────────────────────────────────────────────────────────────

/// A target that accepts sprite draw calls.
///
/// `src` selects a pixel region of the texture; `None` means the whole
/// texture.  `dst` is the destination rectangle in screen pixels — the region
/// is stretched to fit it.
pub trait Surface {
    fn draw(&mut self, texture: TextureHandle, src: Option<Rect>, dst: Rect, tint: Color, flip: Flip);
}

// ── Frame ────────────────────────────────────────────────────────────────────

/// One recorded draw call.
#[derive(Clone, Debug)]
pub struct DrawCommand {
    pub texture: TextureHandle,
    pub src: Option<Rect>,
    pub dst: Rect,
    pub tint: Color,
    pub flip: Flip,
}

/// Draw-call recorder for a single frame.  Commands are replayed in
/// submission order, so painter's-algorithm layering falls out of call order.
/// No GPU state — fully testable.
#[derive(Default)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all recorded commands.  Call once per frame before drawing.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Surface for Frame {
    fn draw(&mut self, texture: TextureHandle, src: Option<Rect>, dst: Rect, tint: Color, flip: Flip) {
        self.commands.push(DrawCommand { texture, src, dst, tint, flip });
    }
}
