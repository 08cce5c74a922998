//! Gesture notifications delivered by the host.

use crate::shapes::ShapeId;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Arrow keys. While any is held, snapping offsets are not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

impl ArrowKey {
    /// Parse a DOM-style key name ("ArrowUp", "ArrowLeft", ...).
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" => Some(ArrowKey::Up),
            "ArrowDown" => Some(ArrowKey::Down),
            "ArrowLeft" => Some(ArrowKey::Left),
            "ArrowRight" => Some(ArrowKey::Right),
            _ => None,
        }
    }
}

/// Gesture event, as recorded by the host or a replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureEvent {
    /// A drag started on the given shapes.
    MoveBegin { selection: Vec<ShapeId> },
    /// The pointer moved by `delta` (scene units) since the previous tick.
    MoveTick { moving: ShapeId, delta: Vec2 },
    MoveEnd,
    /// Key pressed, by DOM key name. Non-arrow keys are ignored.
    KeyDown { key: String },
    KeyUp { key: String },
    /// The host re-laid out the scene; the index is stale.
    LayoutChanged,
    SetEnabled { enabled: bool },
}

/// Arrow keys currently held.
#[derive(Debug, Clone, Default)]
pub struct ArrowKeys {
    pressed: HashSet<ArrowKey>,
}

impl ArrowKeys {
    /// Record a key press. Returns false for non-arrow keys.
    pub fn press(&mut self, name: &str) -> bool {
        match ArrowKey::from_key_name(name) {
            Some(key) => {
                self.pressed.insert(key);
                true
            }
            None => false,
        }
    }

    /// Record a key release. Returns false for non-arrow keys.
    pub fn release(&mut self, name: &str) -> bool {
        match ArrowKey::from_key_name(name) {
            Some(key) => {
                self.pressed.remove(&key);
                true
            }
            None => false,
        }
    }

    /// Check if the user is nudging with the keyboard.
    pub fn any_held(&self) -> bool {
        !self.pressed.is_empty()
    }
}
