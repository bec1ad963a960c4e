//! The conversation state machine.
//!
//! A `DialogueSystem` is either closed or showing a conversation.  Showing
//! starts with a slide-in: the panel rises from below the viewport while a
//! translucent overlay fades in over the play area.  Advancing past the
//! final part plays the mirror-image slide-out, after which the system
//! closes and releases the part sequence.  Input is ignored while a slide is
//! in progress, which debounces key mashing through the transition.

use std::path::{Path, PathBuf};

use glam::Vec2;

use super::{script, DialoguePart, Direction};
use crate::gfx::text::{self, Font};
use crate::gfx::{Color, Flip, Rect, Surface, TextureHandle};

/// Height of the dialogue panel in pixels; also the slide travel distance.
const VISUAL_AREA_HEIGHT: f32 = 240.0;
/// Duration of the slide-in/slide-out animation in seconds.
const SLIDE_SECONDS: f32 = 0.5;
/// Character graphics travel this multiple of the panel slide, a cheap
/// parallax that makes them arrive after the panel.
const ENTRY_SCALING_FACTOR: f32 = 1.5;
/// The bubble sits this far above the panel's vertical center.
const BUBBLE_VERTICAL_OFFSET: f32 = -80.0;
/// Peak opacity of the play-area overlay.
const SHADE_ALPHA: f32 = 0.5;

// ── Slide animation ──────────────────────────────────────────────────────────

/// Whether the panel is sliding, and in which direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlidePhase {
    /// Settled: panel at rest in its shown position.
    Idle,
    /// Sliding up into view.
    Entering,
    /// Sliding down out of view; closes the system when it completes.
    Exiting,
}

/// Panel offset from its resting position at animation progress `t` (0..=1).
fn slide_at(phase: SlidePhase, t: f32) -> f32 {
    match phase {
        SlidePhase::Idle => 0.0,
        SlidePhase::Entering => VISUAL_AREA_HEIGHT * (1.0 - t),
        SlidePhase::Exiting => VISUAL_AREA_HEIGHT * t,
    }
}

/// Overlay opacity fraction at animation progress `t` (0..=1).  Inverse of
/// the slide: fades in while entering, out while exiting.
fn shade_at(phase: SlidePhase, t: f32) -> f32 {
    match phase {
        SlidePhase::Idle => 1.0,
        SlidePhase::Entering => t,
        SlidePhase::Exiting => 1.0 - t,
    }
}

// ── DialogueSystem ───────────────────────────────────────────────────────────

/// Represents speech (dialogue) in-game.  Encapsulates the visuals and
/// control of one conversation at a time.
pub struct DialogueSystem {
    script_path: PathBuf,

    // Conversation state.
    parts: Vec<DialoguePart>,
    current: usize,

    // Visual state.
    shown: bool,
    phase: SlidePhase,
    progress: f32,
    slide: f32,
    shade: f32,

    /// The game window viewport.
    pub viewport: Rect,
    /// Used for drawing the overlay and other blank areas.
    pub blank: Option<TextureHandle>,
    /// Used for drawing the speech bubble.
    pub bubble: Option<TextureHandle>,
    /// Character graphic shown beside the bubble.
    pub character: Option<TextureHandle>,
}

impl DialogueSystem {
    pub fn new(script_path: impl Into<PathBuf>) -> Self {
        Self {
            script_path: script_path.into(),
            parts: Vec::new(),
            current: 0,
            shown: false,
            phase: SlidePhase::Idle,
            progress: 0.0,
            slide: VISUAL_AREA_HEIGHT,
            shade: 0.0,
            viewport: Rect::new(0, 0, 0, 0),
            blank: None,
            bubble: None,
            character: None,
        }
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    /// Load the conversation script and begin showing it.  No-op if a
    /// conversation is already shown.
    pub fn open(&mut self) {
        if self.shown {
            return;
        }
        let parts = script::load_script(&self.script_path);
        self.open_with(parts);
    }

    /// Begin showing an already-loaded part sequence.  Refuses to open an
    /// empty conversation: there would be nothing to draw or advance past.
    pub fn open_with(&mut self, parts: Vec<DialoguePart>) {
        if self.shown {
            return;
        }
        if parts.is_empty() {
            eprintln!("dialogue: refusing to open an empty conversation");
            return;
        }

        self.parts = parts;
        self.current = 0;
        self.shown = true;
        self.phase = SlidePhase::Entering;
        self.progress = 0.0;
        self.slide = VISUAL_AREA_HEIGHT;
        self.shade = 0.0;
    }

    /// Step to the next part, or trigger the closing slide when the current
    /// part is the last one.  Ignored while closed or mid-slide.
    pub fn advance(&mut self) {
        if !self.shown || self.phase != SlidePhase::Idle {
            return;
        }

        if self.current + 1 < self.parts.len() {
            self.current += 1;
        } else {
            self.phase = SlidePhase::Exiting;
            self.progress = 0.0;
        }
    }

    /// Move the selection up in the current choice part.  Ignored for text
    /// parts, while closed, and mid-slide.
    pub fn navigate_up(&mut self) {
        if let Some(part) = self.interactive_part() {
            part.select_previous();
        }
    }

    /// Move the selection down in the current choice part.  Ignored for
    /// text parts, while closed, and mid-slide.
    pub fn navigate_down(&mut self) {
        if let Some(part) = self.interactive_part() {
            part.select_next();
        }
    }

    fn interactive_part(&mut self) -> Option<&mut DialoguePart> {
        if !self.shown || self.phase != SlidePhase::Idle {
            return None;
        }
        self.parts.get_mut(self.current).filter(|p| p.is_choice())
    }

    /// Advance the slide animation by `dt` seconds.  One reducer step: while
    /// a slide is running it recomputes the interpolated offset and opacity;
    /// when the slide completes it settles, closing the system if the slide
    /// was an exit.
    pub fn update(&mut self, dt: f32) {
        if !self.shown {
            return;
        }

        match self.phase {
            SlidePhase::Idle => {
                self.slide = 0.0;
                self.shade = 1.0;
            }
            phase => {
                self.progress += dt / SLIDE_SECONDS;
                if self.progress < 1.0 {
                    self.slide = slide_at(phase, self.progress);
                    self.shade = shade_at(phase, self.progress);
                } else {
                    self.settle(phase);
                }
            }
        }
    }

    /// Snap the finished slide to its resting extreme.  Finishing an exit
    /// closes the conversation and releases the part sequence.
    fn settle(&mut self, finished: SlidePhase) {
        if finished == SlidePhase::Exiting {
            self.parts = Vec::new();
            self.current = 0;
            self.shown = false;
            self.slide = VISUAL_AREA_HEIGHT;
            self.shade = 0.0;
        } else {
            self.slide = 0.0;
            self.shade = 1.0;
        }
        self.phase = SlidePhase::Idle;
        self.progress = 0.0;
    }

    // ── Drawing ────────────────────────────────────────────────────────────

    /// Draw the conversation overlay: shade, panel, characters, bubble with
    /// the current part's content, and the advance indicator.  No-op while
    /// closed.
    pub fn draw(&self, surface: &mut dyn Surface, font: &Font) {
        if !self.shown {
            return;
        }
        let Some(part) = self.parts.get(self.current) else {
            return;
        };
        let Some(blank) = self.blank else {
            return;
        };

        let viewport = self.viewport;

        // Darken the play area.
        surface.draw(
            blank,
            None,
            viewport,
            Color::BLACK.with_alpha(SHADE_ALPHA * self.shade),
            Flip::None,
        );

        // Base panel anchored to the bottom edge, pushed down by the slide.
        let panel_top = viewport.bottom() as f32 - VISUAL_AREA_HEIGHT + self.slide;
        let panel = Rect::new(
            viewport.x,
            panel_top as i32,
            viewport.w,
            VISUAL_AREA_HEIGHT as i32,
        );
        surface.draw(blank, None, panel, Color::SKY_BLUE, Flip::None);

        // Characters slide further than the panel for a parallax entry.
        let character_top = panel_top + self.slide * ENTRY_SCALING_FACTOR;
        if let Some(character) = self.character {
            self.draw_character(surface, character, -self.slide, character_top, part.left_character);
            let right_x = (viewport.right() - character.width as i32) as f32 + self.slide;
            self.draw_character(surface, character, right_x, character_top, part.right_character);
        }

        self.draw_speech_bubble(surface, font, part, panel_top);
        self.draw_indicator(surface, font);
    }

    /// Draw a character graphic at its native size, facing `direction`.
    fn draw_character(
        &self,
        surface: &mut dyn Surface,
        texture: TextureHandle,
        x: f32,
        top: f32,
        direction: Direction,
    ) {
        if direction == Direction::None {
            return;
        }
        let flip = if direction == Direction::Left { Flip::None } else { Flip::Horizontal };
        let dst = Rect::new(x as i32, top as i32, texture.width as i32, texture.height as i32);
        surface.draw(texture, None, dst, Color::WHITE, flip);
    }

    /// Draw the speech bubble and the current part's content inside it.
    /// Parts with no bubble direction show neither.
    fn draw_speech_bubble(
        &self,
        surface: &mut dyn Surface,
        font: &Font,
        part: &DialoguePart,
        panel_top: f32,
    ) {
        if part.bubble == Direction::None {
            return;
        }
        let Some(bubble) = self.bubble else {
            return;
        };

        let center_y = panel_top + BUBBLE_VERTICAL_OFFSET + VISUAL_AREA_HEIGHT / 2.0;
        let center = Vec2::new(
            self.viewport.center_x() as f32,
            center_y + self.slide * ENTRY_SCALING_FACTOR,
        );

        let flip = if part.bubble == Direction::Left { Flip::None } else { Flip::Horizontal };
        let dst = Rect::new(
            (center.x - bubble.width as f32 / 2.0) as i32,
            (center.y - bubble.height as f32 / 2.0) as i32,
            bubble.width as i32,
            bubble.height as i32,
        );
        surface.draw(bubble, None, dst, Color::WHITE, flip);

        part.draw_content(surface, font, center);
    }

    /// Caption at the bottom center telling the player whether Space steps
    /// or ends the conversation.
    fn draw_indicator(&self, surface: &mut dyn Surface, font: &Font) {
        let Some(blank) = self.blank else {
            return;
        };

        let caption = if self.current + 1 < self.parts.len() { "Next" } else { "End" };
        let size = font.measure(caption);
        let pos = Vec2::new(
            self.viewport.center_x() as f32 - size.x / 2.0,
            self.viewport.bottom() as f32 - size.y,
        );

        let background = Rect::new(pos.x as i32, pos.y as i32, size.x as i32, size.y as i32);
        surface.draw(blank, None, background, Color::WHITE, Flip::None);
        text::draw_line(surface, font, caption, pos, Color::BLACK);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(n: usize) -> Vec<DialoguePart> {
        (0..n)
            .map(|i| {
                DialoguePart::text(Direction::Left, Direction::None, Direction::None, format!("line {i}"))
            })
            .collect()
    }

    fn open_and_settle(system: &mut DialogueSystem, n: usize) {
        system.open_with(parts(n));
        system.update(SLIDE_SECONDS);
    }

    // ── Pure interpolation helpers ────────────────────────────────────────

    #[test]
    fn slide_interpolates_from_hidden_to_rest_while_entering() {
        assert_eq!(slide_at(SlidePhase::Entering, 0.0), VISUAL_AREA_HEIGHT);
        assert_eq!(slide_at(SlidePhase::Entering, 0.5), VISUAL_AREA_HEIGHT / 2.0);
        assert_eq!(slide_at(SlidePhase::Entering, 1.0), 0.0);
    }

    #[test]
    fn slide_is_mirrored_while_exiting() {
        assert_eq!(slide_at(SlidePhase::Exiting, 0.0), 0.0);
        assert_eq!(slide_at(SlidePhase::Exiting, 1.0), VISUAL_AREA_HEIGHT);
    }

    #[test]
    fn shade_is_inverse_of_slide() {
        assert_eq!(shade_at(SlidePhase::Entering, 0.25), 0.25);
        assert_eq!(shade_at(SlidePhase::Exiting, 0.25), 0.75);
        assert_eq!(shade_at(SlidePhase::Idle, 0.0), 1.0);
    }

    // ── open ──────────────────────────────────────────────────────────────

    #[test]
    fn open_enters_the_entering_phase() {
        let mut system = DialogueSystem::new("unused.json");
        system.open_with(parts(2));
        assert!(system.is_shown());
        assert_eq!(system.phase, SlidePhase::Entering);
        assert_eq!(system.progress, 0.0);
        assert_eq!(system.slide, VISUAL_AREA_HEIGHT);
    }

    #[test]
    fn open_refuses_an_empty_sequence() {
        let mut system = DialogueSystem::new("unused.json");
        system.open_with(Vec::new());
        assert!(!system.is_shown());
        system.update(0.1);
        system.advance();
        assert!(!system.is_shown(), "still closed after update/advance");
    }

    #[test]
    fn open_while_shown_keeps_current_conversation() {
        let mut system = DialogueSystem::new("unused.json");
        open_and_settle(&mut system, 2);
        system.advance();
        system.open_with(parts(5));
        assert_eq!(system.current, 1, "second open did not reset the index");
        assert_eq!(system.parts.len(), 2);
    }

    // ── update / settle ───────────────────────────────────────────────────

    #[test]
    fn entering_settles_once_accumulated_dt_reaches_duration() {
        let mut system = DialogueSystem::new("unused.json");
        system.open_with(parts(1));
        // Quarter-duration steps are exact binary fractions, so progress
        // accumulates to precisely 1.0 on the fourth step.
        for _ in 0..4 {
            system.update(SLIDE_SECONDS / 4.0);
        }
        assert_eq!(system.phase, SlidePhase::Idle);
        assert_eq!(system.slide, 0.0);
        assert_eq!(system.shade, 1.0);
        assert!(system.is_shown());
    }

    #[test]
    fn update_interpolates_mid_slide() {
        let mut system = DialogueSystem::new("unused.json");
        system.open_with(parts(1));
        system.update(SLIDE_SECONDS / 2.0);
        assert_eq!(system.phase, SlidePhase::Entering);
        assert_eq!(system.slide, VISUAL_AREA_HEIGHT / 2.0);
        assert_eq!(system.shade, 0.5);
    }

    #[test]
    fn update_while_closed_is_a_no_op() {
        let mut system = DialogueSystem::new("unused.json");
        system.update(10.0);
        assert!(!system.is_shown());
        assert_eq!(system.phase, SlidePhase::Idle);
    }

    // ── advance ───────────────────────────────────────────────────────────

    #[test]
    fn advance_steps_through_parts() {
        let mut system = DialogueSystem::new("unused.json");
        open_and_settle(&mut system, 3);
        assert_eq!(system.current, 0);
        system.advance();
        assert_eq!(system.current, 1);
        system.advance();
        assert_eq!(system.current, 2);
    }

    #[test]
    fn advance_is_ignored_mid_slide() {
        let mut system = DialogueSystem::new("unused.json");
        system.open_with(parts(3));
        system.advance();
        assert_eq!(system.current, 0, "index unchanged while entering");
        system.update(SLIDE_SECONDS / 4.0);
        system.advance();
        assert_eq!(system.current, 0);
    }

    #[test]
    fn advance_on_last_part_triggers_exit_then_close() {
        let mut system = DialogueSystem::new("unused.json");
        open_and_settle(&mut system, 2);
        system.advance();
        system.advance();
        assert_eq!(system.phase, SlidePhase::Exiting);
        assert!(system.is_shown(), "still shown while sliding out");

        system.update(SLIDE_SECONDS);
        assert!(!system.is_shown());
        assert!(system.parts.is_empty(), "part sequence released on close");
        assert_eq!(system.phase, SlidePhase::Idle);
    }

    #[test]
    fn reopening_after_close_starts_from_the_first_part() {
        let mut system = DialogueSystem::new("unused.json");
        open_and_settle(&mut system, 1);
        system.advance();
        system.update(SLIDE_SECONDS);
        assert!(!system.is_shown());

        open_and_settle(&mut system, 2);
        assert!(system.is_shown());
        assert_eq!(system.current, 0);
    }

    // ── navigation ────────────────────────────────────────────────────────

    #[test]
    fn navigation_reaches_the_current_choice_part() {
        let mut system = DialogueSystem::new("unused.json");
        let mut sequence = parts(1);
        sequence.push(DialoguePart::choice(vec!["Yes".into(), "No".into()]));
        system.open_with(sequence);
        system.update(SLIDE_SECONDS);
        system.advance();

        system.navigate_down();
        assert_eq!(system.parts[1].selected(), Some(1));
        system.navigate_up();
        assert_eq!(system.parts[1].selected(), Some(0));
        system.navigate_up();
        assert_eq!(system.parts[1].selected(), Some(1), "wraps to last");
    }

    #[test]
    fn navigation_ignores_text_parts_and_slides() {
        let mut system = DialogueSystem::new("unused.json");
        let sequence = vec![DialoguePart::choice(vec!["a".into(), "b".into()])];
        system.open_with(sequence);
        system.navigate_down();
        assert_eq!(system.parts[0].selected(), Some(0), "ignored while entering");

        system.update(SLIDE_SECONDS);
        system.navigate_down();
        assert_eq!(system.parts[0].selected(), Some(1));
    }
}
