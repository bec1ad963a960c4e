use glam::Vec2;

use crate::gfx::{Color, Flip, Rect, Surface, TextureHandle};

/// Seconds each animation frame stays on screen (4 fps walk cycle).
const FRAME_SECONDS: f32 = 0.25;

/// Pixel source rectangle of frame `frame` in a sheet laid out as a
/// `h_frames × v_frames` grid of equal cells, counting row-major.
pub fn frame_source(frame: i32, sheet: TextureHandle, h_frames: i32, v_frames: i32) -> Rect {
    let frame_w = sheet.width as i32 / h_frames;
    let frame_h = sheet.height as i32 / v_frames;
    let col = frame % h_frames;
    let row = frame / h_frames;
    Rect::new(col * frame_w, row * frame_h, frame_w, frame_h)
}

/// An animated graphic from a sprite sheet.
///
/// The sheet holds short looping animations as rows of frames; which loop
/// plays is selected with `frame_offset` (e.g. one row per facing
/// direction), and the loop cycles `frames_per_animation` frames from that
/// offset at a fixed rate.
pub struct AnimatedSprite {
    /// The spritesheet to use.
    pub sheet: Option<TextureHandle>,
    /// The offset of the first frame in the active animation.
    pub frame_offset: i32,
    /// The number of frames to show before looping back to the first frame.
    pub frames_per_animation: i32,
    /// Number of frames horizontally in the sprite sheet.
    pub horizontal_frames: i32,
    /// Number of frames vertically in the sprite sheet.
    pub vertical_frames: i32,
    /// The screen position of this object.
    pub position: Vec2,

    current_frame: i32,
    time_since_last_frame: f32,
}

impl AnimatedSprite {
    pub fn new() -> Self {
        Self {
            sheet: None,
            frame_offset: 0,
            frames_per_animation: 4,
            horizontal_frames: 4,
            vertical_frames: 4,
            position: Vec2::ZERO,
            current_frame: 0,
            time_since_last_frame: 0.0,
        }
    }

    /// Frame currently displayed, relative to `frame_offset`.
    pub fn current_frame(&self) -> i32 {
        self.current_frame
    }

    /// Advance the frame clock, cycling to the next frame each period.
    pub fn update(&mut self, dt: f32) {
        self.time_since_last_frame += dt;
        if self.time_since_last_frame > FRAME_SECONDS {
            self.current_frame = (self.current_frame + 1) % self.frames_per_animation;
            self.time_since_last_frame = 0.0;
        }
    }

    /// Draw the current frame at `position`, unscaled.  No-op without a
    /// sheet.
    pub fn draw(&self, surface: &mut dyn Surface) {
        let Some(sheet) = self.sheet else {
            return;
        };
        let src = frame_source(
            self.current_frame + self.frame_offset,
            sheet,
            self.horizontal_frames,
            self.vertical_frames,
        );
        let dst = Rect::new(self.position.x as i32, self.position.y as i32, src.w, src.h);
        surface.draw(sheet, Some(src), dst, Color::WHITE, Flip::None);
    }
}

impl Default for AnimatedSprite {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
