use glam::Vec2;

use crate::tiles::TILE_SIZE;

/// Movement speed in pixels per second: eight tiles a second.
const MOVE_SPEED: f32 = TILE_SIZE as f32 * 8.0;

/// Any object that walks the overworld grid: the player, NPCs, anything
/// that moves cell to cell.
///
/// Movement is discrete on the grid but continuous on screen: a step
/// latches a start/end cell pair and the position lerps between them over
/// a fixed duration.  New steps are only accepted while the object rests
/// exactly on a cell boundary, so input mid-step cannot cut a corner.
pub struct OverworldObject {
    current: Vec2,
    start: Vec2,
    end: Vec2,
    /// Lerp fraction of the step in flight, 0..1.
    movement: f32,
    /// Added to the position when placing the attached sprite.
    pub draw_offset: Vec2,
}

impl OverworldObject {
    pub fn new() -> Self {
        Self {
            current: Vec2::ZERO,
            start: Vec2::ZERO,
            end: Vec2::ZERO,
            movement: 0.0,
            draw_offset: Vec2::ZERO,
        }
    }

    /// Teleport to a pixel position, cancelling any step in flight.
    pub fn place(&mut self, position: Vec2) {
        self.current = position;
        self.start = position;
        self.end = position;
        self.movement = 0.0;
    }

    /// Current pixel position.
    pub fn position(&self) -> Vec2 {
        self.current
    }

    /// Where the attached sprite should be drawn this frame.
    pub fn sprite_position(&self) -> Vec2 {
        self.current + self.draw_offset
    }

    /// Request a one-cell step in the dominant axis of `direction`.
    /// Ignored when `direction` is zero or the object is not resting on a
    /// cell boundary (i.e. a step is already in flight).
    pub fn move_toward(&mut self, direction: Vec2) {
        if direction == Vec2::ZERO {
            return;
        }

        let tile = TILE_SIZE as f32;
        if self.current.x % tile != 0.0 || self.current.y % tile != 0.0 {
            return;
        }

        let step = if direction.x.abs() >= direction.y.abs() {
            Vec2::new(direction.x.signum() * tile, 0.0)
        } else {
            Vec2::new(0.0, direction.y.signum() * tile)
        };

        self.start = self.current;
        self.end = self.current + step;
    }

    /// Advance the step in flight, snapping onto the destination cell when
    /// it completes.
    pub fn update(&mut self, dt: f32) {
        if self.start != self.end && self.movement < 1.0 {
            self.movement += dt * (MOVE_SPEED / TILE_SIZE as f32);
            self.current = self.start.lerp(self.end, self.movement.min(1.0));
        } else {
            self.movement = 0.0;
            self.current = self.end;
            self.start = self.end;
        }
    }
}

impl Default for OverworldObject {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: f32 = TILE_SIZE as f32;

    /// Step duration: one tile at MOVE_SPEED px/s.
    const STEP_SECONDS: f32 = TILE / MOVE_SPEED;

    #[test]
    fn step_completes_after_its_duration() {
        let mut object = OverworldObject::new();
        object.move_toward(Vec2::new(1.0, 0.0));
        object.update(STEP_SECONDS);
        object.update(0.0); // settle frame snaps onto the cell
        assert_eq!(object.position(), Vec2::new(TILE, 0.0));
    }

    #[test]
    fn position_interpolates_mid_step() {
        let mut object = OverworldObject::new();
        object.move_toward(Vec2::new(0.0, 1.0));
        object.update(STEP_SECONDS / 2.0);
        assert_eq!(object.position(), Vec2::new(0.0, TILE / 2.0));
    }

    #[test]
    fn step_requests_mid_flight_are_ignored() {
        let mut object = OverworldObject::new();
        object.move_toward(Vec2::new(1.0, 0.0));
        object.update(STEP_SECONDS / 2.0);
        object.move_toward(Vec2::new(0.0, 1.0));
        object.update(STEP_SECONDS / 2.0);
        object.update(0.0);
        assert_eq!(object.position(), Vec2::new(TILE, 0.0), "second request was dropped");
    }

    #[test]
    fn zero_direction_is_ignored() {
        let mut object = OverworldObject::new();
        object.move_toward(Vec2::ZERO);
        object.update(1.0);
        assert_eq!(object.position(), Vec2::ZERO);
    }

    #[test]
    fn dominant_axis_wins_for_diagonal_input() {
        let mut object = OverworldObject::new();
        object.move_toward(Vec2::new(-0.4, 1.0));
        object.update(STEP_SECONDS);
        object.update(0.0);
        assert_eq!(object.position(), Vec2::new(0.0, TILE), "vertical axis dominates");
    }

    #[test]
    fn place_cancels_a_step_in_flight() {
        let mut object = OverworldObject::new();
        object.move_toward(Vec2::new(1.0, 0.0));
        object.update(STEP_SECONDS / 2.0);
        object.place(Vec2::new(TILE * 3.0, TILE * 2.0));
        object.update(1.0);
        assert_eq!(object.position(), Vec2::new(TILE * 3.0, TILE * 2.0));
    }

    #[test]
    fn sprite_position_applies_draw_offset() {
        let mut object = OverworldObject::new();
        object.draw_offset = Vec2::new(0.0, -8.0);
        object.place(Vec2::new(TILE, TILE));
        assert_eq!(object.sprite_position(), Vec2::new(TILE, TILE - 8.0));
    }
}
