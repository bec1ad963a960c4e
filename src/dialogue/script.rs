//! Dialogue script loading.
//!
//! A conversation script is a JSON document holding an ordered part list:
//!
//! ```json
//! {
//!   "parts": [
//!     { "message": "Hello!", "character_left": "Right", "bubble": "Left" },
//!     { "type": "Choice", "options": ["Yes", "No"] }
//!   ]
//! }
//! ```
//!
//! A part's `type` defaults to `"Message"`.  Malformed parts are dropped
//! individually; a document that cannot be read at all yields an empty
//! sequence.  Either way the failure is logged and the game carries on.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::{DialoguePart, Direction};

/// Read and parse a conversation script.  Any read or parse failure is
/// logged and produces an empty part sequence.
pub fn load_script(path: &Path) -> Vec<DialoguePart> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("dialogue: could not read {}: {e}", path.display());
            return Vec::new();
        }
    };
    let doc: Value = match serde_json::from_str(&text) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("dialogue: could not parse {}: {e}", path.display());
            return Vec::new();
        }
    };
    parse_script(&doc)
}

/// Build the part sequence from a parsed document, preserving document
/// order.  Dropped parts leave no gaps.
pub fn parse_script(doc: &Value) -> Vec<DialoguePart> {
    let Some(parts) = doc.get("parts").and_then(Value::as_array) else {
        eprintln!("dialogue: document has no part list");
        return Vec::new();
    };
    parts.iter().filter_map(parse_part).collect()
}

fn parse_part(part: &Value) -> Option<DialoguePart> {
    let kind = part.get("type").and_then(Value::as_str).unwrap_or("Message");
    match kind {
        "Choice" => parse_choice_part(part),
        _ => parse_message_part(part),
    }
}

/// A choice part needs a non-empty option list; anything else drops the
/// whole part.  Directions are fixed by [`DialoguePart::choice`].
fn parse_choice_part(part: &Value) -> Option<DialoguePart> {
    let entries = part.get("options")?.as_array()?;
    let options: Vec<String> = entries
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect();

    if options.is_empty() {
        eprintln!("dialogue: dropped choice part with no options");
        return None;
    }
    Some(DialoguePart::choice(options))
}

/// A message part needs its text; directions are optional and default to
/// absent.
fn parse_message_part(part: &Value) -> Option<DialoguePart> {
    let message = part.get("message")?.as_str()?;

    let left = direction_field(part, "character_left");
    let right = direction_field(part, "character_right");
    let bubble = direction_field(part, "bubble");

    Some(DialoguePart::text(bubble, left, right, message))
}

fn direction_field(part: &Value, key: &str) -> Direction {
    part.get(key)
        .and_then(Value::as_str)
        .map_or(Direction::None, Direction::parse)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
