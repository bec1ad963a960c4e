//! Level document loading.
//!
//! A level is a JSON document carrying the grid bounds and two tile layers:
//!
//! ```json
//! {
//!   "left": 36, "top": 36, "width": 8, "height": 8,
//!   "layers": [
//!     { "type": "Below", "tiles": [ { "x": 0, "y": 0, "id": 10 } ] },
//!     { "type": "Above", "tiles": [ { "x": 1, "y": 3, "id": 23 } ] }
//!   ]
//! }
//! ```
//!
//! Loading is forgiving: a document that cannot be read or parsed leaves the
//! grids untouched, missing bounds fall back to defaults, a missing layer
//! contributes no tiles, and malformed tile entries are dropped one by one.
//! Bad content is reported to the log, never to the player.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::TileGrid;

/// Fallback grid bounds when the document omits them.
const DEFAULT_ORIGIN: i32 = 0;
const DEFAULT_EXTENT: i32 = 2;

/// Read and parse a level document, populating the below/above layer pair.
/// Any read or parse failure is logged and leaves both grids unmodified.
pub fn load_level(path: &Path, below: &mut TileGrid, above: &mut TileGrid) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("level: could not read {}: {e}", path.display());
            return;
        }
    };
    let doc: Value = match serde_json::from_str(&text) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("level: could not parse {}: {e}", path.display());
            return;
        }
    };
    parse_level(&doc, below, above);
}

/// Populate both layers from a parsed document.
///
/// Both grids are initialized to the document's bounds (or the defaults)
/// before any tiles are applied, so a document with no usable layer list
/// still yields two initialized-but-empty grids.
pub fn parse_level(doc: &Value, below: &mut TileGrid, above: &mut TileGrid) {
    let left = int_field(doc, "left", DEFAULT_ORIGIN);
    let top = int_field(doc, "top", DEFAULT_ORIGIN);
    let width = int_field(doc, "width", DEFAULT_EXTENT);
    let height = int_field(doc, "height", DEFAULT_EXTENT);

    // A declared-but-degenerate size is bad content, not a coding error:
    // report it and keep the previous grids rather than panicking.
    if width < 1 || height < 1 {
        eprintln!("level: rejected degenerate grid size {width}x{height}");
        return;
    }

    below.initialize(left, top, width, height);
    above.initialize(left, top, width, height);

    let Some(layers) = doc.get("layers").and_then(Value::as_array) else {
        eprintln!("level: document has no layer list");
        return;
    };

    fill_layer(layers, "Below", below);
    fill_layer(layers, "Above", above);
}

/// Apply the first layer whose `type` matches `kind`.  An absent layer adds
/// no tiles and is not an error.
fn fill_layer(layers: &[Value], kind: &str, grid: &mut TileGrid) {
    let Some(layer) = layers
        .iter()
        .find(|l| l.get("type").and_then(Value::as_str) == Some(kind))
    else {
        return;
    };
    let Some(tiles) = layer.get("tiles").and_then(Value::as_array) else {
        return;
    };

    for entry in tiles {
        let x = int_field(entry, "x", -1);
        let y = int_field(entry, "y", -1);
        let id = int_field(entry, "id", -1);
        // Entries with any missing or negative field are silently dropped.
        if x >= 0 && y >= 0 && id >= 0 {
            grid.set_tile(x, y, id);
        }
    }
}

/// Integer field with a fallback for absent or non-numeric values.
fn int_field(value: &Value, key: &str, default: i32) -> i32 {
    value
        .get(key)
        .and_then(Value::as_i64)
        .map_or(default, |v| v as i32)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
