// ── Overworld ────────────────────────────────────────────────────────────────
//
// A loaded level: two tile layers sharing one atlas.  The below layer is
// ground and scenery under the player; the above layer is canopy, rooftops,
// and anything else that should occlude them.

pub mod object;
pub mod sprite;

use std::path::Path;

use crate::gfx::{Surface, TextureHandle};
use crate::tiles::{level, TileGrid};

pub struct Overworld {
    below: TileGrid,
    above: TileGrid,
}

impl Overworld {
    pub fn new() -> Self {
        Self { below: TileGrid::new(), above: TileGrid::new() }
    }

    /// Point both layers at a (new) tile atlas.
    pub fn set_tileset(&mut self, atlas: TextureHandle) {
        self.below.atlas = Some(atlas);
        self.above.atlas = Some(atlas);
    }

    /// Load a level document into both layers.  Failures are logged and
    /// leave the current level in place.
    pub fn load_level(&mut self, path: &Path) {
        level::load_level(path, &mut self.below, &mut self.above);
    }

    /// Width of the level in tiles.
    pub fn width(&self) -> i32 {
        self.below.width()
    }

    /// Height of the level in tiles.
    pub fn height(&self) -> i32 {
        self.below.height()
    }

    pub fn below(&self) -> &TileGrid {
        &self.below
    }

    pub fn above(&self) -> &TileGrid {
        &self.above
    }

    /// Draw the layer under the player.
    pub fn draw_below(&self, surface: &mut dyn Surface) {
        self.below.draw(surface);
    }

    /// Draw the layer over the player.  Call after drawing overworld
    /// objects so the canopy occludes them.
    pub fn draw_above(&self, surface: &mut dyn Surface) {
        self.above.draw(surface);
    }
}

impl Default for Overworld {
    fn default() -> Self {
        Self::new()
    }
}
