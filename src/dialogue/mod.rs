// ── Dialogue model ───────────────────────────────────────────────────────────
//
// A conversation is an ordered sequence of parts.  A part is either a plain
// line of text or a multiple-choice prompt; all parts carry direction
// metadata deciding which speech-bubble and character graphics apply.

pub mod script;
pub mod system;

use glam::Vec2;

use crate::gfx::text::{self, Font};
use crate::gfx::{Color, Surface};

/// Direction metadata for a speech bubble or character graphic.
/// `None` hides the element entirely for that part.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    None,
    Left,
    Right,
}

impl Direction {
    /// Parse a direction name, case-sensitively.  Anything other than
    /// `"Left"` or `"Right"` is treated as absent.
    pub fn parse(name: &str) -> Self {
        match name {
            "Left" => Direction::Left,
            "Right" => Direction::Right,
            _ => Direction::None,
        }
    }
}

// ── DialoguePart ─────────────────────────────────────────────────────────────

/// The variant-specific payload of a part.
#[derive(Clone, Debug, PartialEq)]
pub enum PartBody {
    /// A single line of conversation text.
    Text { message: String },
    /// A menu of options the player picks from with up/down.
    Choice { options: Vec<String>, selected: usize },
}

/// One unit of a conversation.  Direction fields are fixed at construction;
/// the only mutable state is the selection index of a choice part.
#[derive(Clone, Debug, PartialEq)]
pub struct DialoguePart {
    pub bubble: Direction,
    pub left_character: Direction,
    pub right_character: Direction,
    body: PartBody,
}

impl DialoguePart {
    pub fn text(
        bubble: Direction,
        left_character: Direction,
        right_character: Direction,
        message: impl Into<String>,
    ) -> Self {
        Self {
            bubble,
            left_character,
            right_character,
            body: PartBody::Text { message: message.into() },
        }
    }

    /// A multiple-choice part.  Choices never show a speech bubble and
    /// always present both characters facing inward.
    ///
    /// # Panics
    /// Panics on an empty option list — the loader never produces one, and
    /// selection arithmetic is meaningless without at least one option.
    pub fn choice(options: Vec<String>) -> Self {
        assert!(!options.is_empty(), "choice part requires at least one option");
        Self {
            bubble: Direction::None,
            left_character: Direction::Left,
            right_character: Direction::Right,
            body: PartBody::Choice { options, selected: 0 },
        }
    }

    pub fn body(&self) -> &PartBody {
        &self.body
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.body, PartBody::Choice { .. })
    }

    /// Currently selected option index, if this is a choice part.
    pub fn selected(&self) -> Option<usize> {
        match &self.body {
            PartBody::Choice { selected, .. } => Some(*selected),
            PartBody::Text { .. } => None,
        }
    }

    /// Move the selection up one option, wrapping from the first to the
    /// last.  No-op for text parts.
    pub fn select_previous(&mut self) {
        if let PartBody::Choice { options, selected } = &mut self.body {
            *selected = if *selected > 0 { *selected - 1 } else { options.len() - 1 };
        }
    }

    /// Move the selection down one option, wrapping from the last to the
    /// first.  No-op for text parts.
    pub fn select_next(&mut self) {
        if let PartBody::Choice { options, selected } = &mut self.body {
            *selected = (*selected + 1) % options.len();
        }
    }

    /// Draw this part's content centered on `center` (the middle of the
    /// speech bubble).
    pub fn draw_content(&self, surface: &mut dyn Surface, font: &Font, center: Vec2) {
        match &self.body {
            PartBody::Text { message } => {
                text::draw_line_centered(surface, font, message, center, Color::BLACK);
            }
            PartBody::Choice { options, selected } => {
                // Line height of a reference two-character string, so the
                // block spacing matches what the font actually renders.
                let line_height = font.measure("dp").y;
                // Center the whole block on `center`: the first line sits
                // half the block height above it, plus half a line to land
                // on the line's own center.
                let top = center.y - (line_height * options.len() as f32) / 2.0 + line_height / 2.0;

                for (index, option) in options.iter().enumerate() {
                    let line_center = Vec2::new(center.x, top + line_height * index as f32);
                    let color = if index == *selected { Color::RED } else { Color::BLACK };
                    text::draw_line_centered(surface, font, option, line_center, color);
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
