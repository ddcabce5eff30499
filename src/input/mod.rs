//! # Input Module
//!
//! Abstract player intents fed to the simulation by a host.
//!
//! Movement is a continuously sampled pair of axes; everything else is an
//! edge-triggered [`Intent`] latched until the next tick drains it.

pub mod commands;

pub use commands::*;

use crate::config::DIAGONAL_SCALE;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One-shot player intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Swing the weapon
    Attack,
    /// Start a dash
    Dash,
    /// Use the stairs
    Interact,
    /// Start a run from the menu, or return to it after death
    Confirm,
    /// Pick an upgrade slot, counted from 1
    Select(u8),
}

/// Held movement input, each axis in `{-1, 0, 1}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAxes {
    pub x: i8,
    pub z: i8,
}

impl MoveAxes {
    /// Creates movement axes, collapsing each value to its sign.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::MoveAxes;
    ///
    /// let axes = MoveAxes::new(5, -1);
    /// assert_eq!((axes.x, axes.z), (1, -1));
    /// ```
    pub fn new(x: i8, z: i8) -> Self {
        Self {
            x: x.signum(),
            z: z.signum(),
        }
    }

    pub fn is_idle(self) -> bool {
        self.x == 0 && self.z == 0
    }

    /// Flat movement vector with diagonals scaled down.
    pub fn to_vector(self) -> Vec3 {
        let scale = if self.x != 0 && self.z != 0 {
            DIAGONAL_SCALE
        } else {
            1.0
        };
        Vec3::new(self.x as f32 * scale, 0.0, self.z as f32 * scale)
    }
}

/// Intents pressed since the previous drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressedIntents {
    intents: Vec<Intent>,
}

impl PressedIntents {
    pub fn contains(&self, intent: Intent) -> bool {
        self.intents.contains(&intent)
    }

    /// The first upgrade slot selected this tick, if any.
    pub fn selection(&self) -> Option<u8> {
        self.intents.iter().find_map(|intent| match intent {
            Intent::Select(slot) => Some(*slot),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}

/// Input state owned by the simulation controller.
///
/// Pressing the same intent twice before a drain latches it once.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub movement: MoveAxes,
    pending: Vec<Intent>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_movement(&mut self, movement: MoveAxes) {
        self.movement = movement;
    }

    /// Latches a one-shot intent until the next drain.
    pub fn press(&mut self, intent: Intent) {
        if !self.pending.contains(&intent) {
            self.pending.push(intent);
        }
    }

    /// Takes every latched intent, leaving the set empty.
    pub fn drain(&mut self) -> PressedIntents {
        PressedIntents {
            intents: std::mem::take(&mut self.pending),
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
