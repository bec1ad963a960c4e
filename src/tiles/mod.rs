// ── Tile system ──────────────────────────────────────────────────────────────
//
// A level layer is a fixed-size grid of tile identifiers indexing into a
// shared tile atlas.  Identifiers are row-major tile counts into the atlas
// image; `BLANK_TILE` marks a cell with no graphic.

pub mod level;

use glam::IVec2;

use crate::gfx::{Color, Flip, Rect, Surface, TextureHandle};

/// Edge length of one tile in pixels.  Fixed for the whole tile system.
pub const TILE_SIZE: i32 = 24;

/// Reserved identifier meaning "no graphic for this cell".
pub const BLANK_TILE: i32 = -1;

// ── Atlas coordinate resolution ──────────────────────────────────────────────

/// Resolve a tile identifier to its top-left pixel position in the atlas,
/// treating the atlas as a row-major grid of `TILE_SIZE` tiles.
///
/// Returns `None` for negative identifiers, an atlas narrower than one tile,
/// or an identifier whose tile rectangle would fall outside the atlas bounds
/// (malformed content must not produce out-of-range source rectangles).
pub fn atlas_source(id: i32, atlas_w: i32, atlas_h: i32) -> Option<(i32, i32)> {
    if id < 0 {
        return None;
    }

    let tiles_per_row = atlas_w / TILE_SIZE;
    if tiles_per_row < 1 {
        return None;
    }

    let row = id / tiles_per_row;
    let col = id - row * tiles_per_row;
    let x = col * TILE_SIZE;
    let y = row * TILE_SIZE;

    if x + TILE_SIZE > atlas_w || y + TILE_SIZE > atlas_h {
        return None;
    }

    Some((x, y))
}

// ── TileGrid ─────────────────────────────────────────────────────────────────

/// One layer of tiles: a W×H identifier grid, a pixel origin, and a
/// non-owning handle to the shared tile atlas.
pub struct TileGrid {
    origin: IVec2,
    width: i32,
    height: i32,
    cells: Vec<i32>,
    /// Shared tile atlas; swappable at any time.
    pub atlas: Option<TextureHandle>,
}

impl TileGrid {
    /// An empty, zero-cell grid.  Use [`TileGrid::initialize`] to allocate.
    pub fn new() -> Self {
        Self { origin: IVec2::ZERO, width: 0, height: 0, cells: Vec::new(), atlas: None }
    }

    /// Allocate a `w × h` grid of blank cells with its top-left pixel corner
    /// at `(x, y)`.  Discards any previous contents.
    ///
    /// # Panics
    /// Panics if `w` or `h` is less than 1 — grid dimensions come from code
    /// or validated content, never raw user input.
    pub fn initialize(&mut self, x: i32, y: i32, w: i32, h: i32) {
        assert!(w >= 1 && h >= 1, "tile grid dimensions must be at least 1x1, got {w}x{h}");
        self.origin = IVec2::new(x, y);
        self.width = w;
        self.height = h;
        self.cells = vec![BLANK_TILE; (w * h) as usize];
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    /// Overwrite one cell.  Out-of-range coordinates are ignored, not an
    /// error — editing tools clip against the grid this way.
    pub fn set_tile(&mut self, x: i32, y: i32, id: i32) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = id;
        }
    }

    /// Identifier at `(x, y)`, or [`BLANK_TILE`] when out of range or the
    /// grid was never initialized.
    pub fn get_tile(&self, x: i32, y: i32) -> i32 {
        self.index(x, y).map_or(BLANK_TILE, |i| self.cells[i])
    }

    /// Draw every non-blank cell as one unscaled, untinted tile.  A missing
    /// atlas or an uninitialized grid draws nothing; cells whose identifier
    /// does not resolve to an in-bounds atlas position are skipped.
    pub fn draw(&self, surface: &mut dyn Surface) {
        let Some(atlas) = self.atlas else {
            return;
        };
        if self.cells.is_empty() {
            return;
        }

        let atlas_w = atlas.width as i32;
        let atlas_h = atlas.height as i32;

        for y in 0..self.height {
            for x in 0..self.width {
                let id = self.cells[(y * self.width + x) as usize];
                if id == BLANK_TILE {
                    continue;
                }
                let Some((src_x, src_y)) = atlas_source(id, atlas_w, atlas_h) else {
                    continue;
                };
                surface.draw(
                    atlas,
                    Some(Rect::new(src_x, src_y, TILE_SIZE, TILE_SIZE)),
                    Rect::new(
                        x * TILE_SIZE + self.origin.x,
                        y * TILE_SIZE + self.origin.y,
                        TILE_SIZE,
                        TILE_SIZE,
                    ),
                    Color::WHITE,
                    Flip::None,
                );
            }
        }
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::Frame;

    fn atlas(w: u32, h: u32) -> TextureHandle {
        TextureHandle { id: 1, width: w, height: h }
    }

    // ── initialize / get / set ────────────────────────────────────────────

    #[test]
    fn initialize_fills_every_cell_with_blank() {
        let mut grid = TileGrid::new();
        grid.initialize(0, 0, 4, 3);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(grid.get_tile(x, y), BLANK_TILE, "cell ({x},{y})");
            }
        }
    }

    #[test]
    #[should_panic(expected = "at least 1x1")]
    fn initialize_rejects_zero_width() {
        TileGrid::new().initialize(0, 0, 0, 3);
    }

    #[test]
    #[should_panic(expected = "at least 1x1")]
    fn initialize_rejects_negative_height() {
        TileGrid::new().initialize(0, 0, 3, -1);
    }

    #[test]
    fn set_then_get_round_trips_in_bounds() {
        let mut grid = TileGrid::new();
        grid.initialize(0, 0, 4, 4);
        grid.set_tile(2, 3, 17);
        assert_eq!(grid.get_tile(2, 3), 17);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut grid = TileGrid::new();
        grid.initialize(0, 0, 2, 2);
        grid.set_tile(-1, 0, 5);
        grid.set_tile(0, -1, 5);
        grid.set_tile(2, 0, 5);
        grid.set_tile(0, 2, 5);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(grid.get_tile(x, y), BLANK_TILE);
            }
        }
    }

    #[test]
    fn get_tile_on_uninitialized_grid_is_blank() {
        let grid = TileGrid::new();
        assert_eq!(grid.get_tile(0, 0), BLANK_TILE);
    }

    #[test]
    fn reinitialize_discards_previous_contents() {
        let mut grid = TileGrid::new();
        grid.initialize(0, 0, 2, 2);
        grid.set_tile(1, 1, 9);
        grid.initialize(0, 0, 3, 3);
        assert_eq!(grid.get_tile(1, 1), BLANK_TILE);
    }

    // ── atlas_source ──────────────────────────────────────────────────────

    #[test]
    fn atlas_source_id_zero_is_origin() {
        assert_eq!(atlas_source(0, 240, 240), Some((0, 0)));
    }

    #[test]
    fn atlas_source_wraps_at_row_end() {
        // 240 px wide atlas holds 10 tiles per row: id 10 starts row 1.
        assert_eq!(atlas_source(10, 240, 240), Some((0, TILE_SIZE)));
        assert_eq!(atlas_source(13, 240, 240), Some((3 * TILE_SIZE, TILE_SIZE)));
    }

    #[test]
    fn atlas_source_rejects_negative_id() {
        assert_eq!(atlas_source(-1, 240, 240), None);
        assert_eq!(atlas_source(BLANK_TILE, 240, 240), None);
    }

    #[test]
    fn atlas_source_rejects_id_below_image_bottom() {
        // 10 tiles per row × 2 rows = ids 0..20 fit; id 20 starts row 2,
        // which lies outside a 48 px tall atlas.
        assert_eq!(atlas_source(20, 240, 48), None);
        assert_eq!(atlas_source(19, 240, 48), Some((9 * TILE_SIZE, TILE_SIZE)));
    }

    #[test]
    fn atlas_source_rejects_atlas_narrower_than_one_tile() {
        assert_eq!(atlas_source(0, TILE_SIZE - 1, 240), None);
    }

    // ── draw ──────────────────────────────────────────────────────────────

    #[test]
    fn draw_without_atlas_records_nothing() {
        let mut grid = TileGrid::new();
        grid.initialize(0, 0, 2, 2);
        grid.set_tile(0, 0, 1);
        let mut frame = Frame::new();
        grid.draw(&mut frame);
        assert!(frame.commands.is_empty());
    }

    #[test]
    fn draw_uninitialized_grid_records_nothing() {
        let mut grid = TileGrid::new();
        grid.atlas = Some(atlas(240, 240));
        let mut frame = Frame::new();
        grid.draw(&mut frame);
        assert!(frame.commands.is_empty());
    }

    #[test]
    fn draw_skips_blank_and_unresolvable_cells() {
        let mut grid = TileGrid::new();
        grid.atlas = Some(atlas(240, 48));
        grid.initialize(0, 0, 3, 1);
        grid.set_tile(0, 0, 5);
        grid.set_tile(1, 0, 999); // beyond the atlas — skipped
        // (2,0) stays blank.
        let mut frame = Frame::new();
        grid.draw(&mut frame);
        assert_eq!(frame.commands.len(), 1);
    }

    #[test]
    fn draw_positions_tiles_from_origin() {
        let mut grid = TileGrid::new();
        grid.atlas = Some(atlas(240, 240));
        grid.initialize(36, 12, 2, 2);
        grid.set_tile(1, 1, 0);
        let mut frame = Frame::new();
        grid.draw(&mut frame);
        let dst = frame.commands[0].dst;
        assert_eq!((dst.x, dst.y), (TILE_SIZE + 36, TILE_SIZE + 12));
        assert_eq!((dst.w, dst.h), (TILE_SIZE, TILE_SIZE));
    }
}
