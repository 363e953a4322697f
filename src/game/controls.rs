//! Key bindings for the four swimmer actions

use serde::{Deserialize, Serialize};

/// Raw input identifier delivered by the input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "char")]
pub struct Key(pub char);

impl Key {
    /// Key that restarts a race once it is over
    pub const RESTART: Key = Key(' ');
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Self(c.to_ascii_lowercase())
    }
}

/// Arm used for a stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// Logical swimmer action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Stroke(Side),
    Kick,
    Breathe,
}

/// One swimmer's bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlScheme {
    pub stroke_left: Key,
    pub stroke_right: Key,
    pub kick: Key,
    pub breathe: Key,
}

impl ControlScheme {
    /// A/D strokes, S kick, W breathe
    pub const fn wasd() -> Self {
        Self {
            stroke_left: Key('a'),
            stroke_right: Key('d'),
            kick: Key('s'),
            breathe: Key('w'),
        }
    }

    /// J/L strokes, K kick, I breathe
    pub const fn ijkl() -> Self {
        Self {
            stroke_left: Key('j'),
            stroke_right: Key('l'),
            kick: Key('k'),
            breathe: Key('i'),
        }
    }

    /// Action bound to `key`, if any
    pub fn action_for(&self, key: Key) -> Option<Action> {
        if key == self.stroke_left {
            Some(Action::Stroke(Side::Left))
        } else if key == self.stroke_right {
            Some(Action::Stroke(Side::Right))
        } else if key == self.kick {
            Some(Action::Kick)
        } else if key == self.breathe {
            Some(Action::Breathe)
        } else {
            None
        }
    }
}
