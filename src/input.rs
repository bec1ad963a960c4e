use std::collections::HashSet;

pub use winit::keyboard::KeyCode;

/// Keyboard abstraction layer: snapshot-based edge detection.
///
/// winit delivers key changes as events, but game logic wants to poll.  The
/// shell feeds every key event into [`Keyboard::key_event`]; at the top of
/// each tick [`Keyboard::begin_frame`] snapshots the held set, keeping the
/// previous snapshot around so "just pressed" and "just released" fall out of
/// comparing the two.
#[derive(Debug, Default)]
pub struct Keyboard {
    /// Live held set, updated by events as they arrive.
    held: HashSet<KeyCode>,
    /// Snapshot taken at the top of the current tick.
    current: HashSet<KeyCode>,
    /// Snapshot from the previous tick.
    last: HashSet<KeyCode>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw key transition from the windowing layer.
    pub fn key_event(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
    }

    /// Roll snapshots forward.  Call exactly once at the top of each tick,
    /// before any queries.
    pub fn begin_frame(&mut self) {
        std::mem::swap(&mut self.last, &mut self.current);
        self.current.clone_from(&self.held);
    }

    /// Returns true if a specified key is pressed.
    pub fn is_down(&self, key: KeyCode) -> bool {
        self.current.contains(&key)
    }

    /// Returns true if a specified key is not pressed.
    pub fn is_up(&self, key: KeyCode) -> bool {
        !self.current.contains(&key)
    }

    /// Returns true when a key has changed state from not pressed to pressed
    /// since the previous tick.
    pub fn was_just_pressed(&self, key: KeyCode) -> bool {
        self.current.contains(&key) && !self.last.contains(&key)
    }

    /// Returns true when a key has changed state from pressed to not pressed
    /// since the previous tick.
    pub fn was_just_released(&self, key: KeyCode) -> bool {
        !self.current.contains(&key) && self.last.contains(&key)
    }
}
