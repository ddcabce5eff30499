//! # Game Module
//!
//! Core simulation: the tile grid, the entity model, combat, enemy AI,
//! floor progression and the fixed-delta tick loop.
//!
//! This module contains the fundamental building blocks of Delve:
//! - Grid walkability and per-axis collision
//! - Player, enemy, projectile and item records
//! - Combat, AI and progression systems operating on [`SimulationState`]
//! - The [`Simulation`] controller and its read-only [`FrameSnapshot`]

pub mod ai;
pub mod autopilot;
pub mod combat;
pub mod entities;
pub mod grid;
pub mod progression;
pub mod simulation;
pub mod snapshot;
pub mod state;

pub use ai::*;
pub use autopilot::*;
pub use combat::*;
pub use entities::*;
pub use grid::*;
pub use progression::*;
pub use simulation::*;
pub use snapshot::*;
pub use state::*;

use serde::{Deserialize, Serialize};

/// Represents a tile coordinate in the dungeon grid.
///
/// # Examples
///
/// ```
/// use delve::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.cardinal_adjacent_positions();
/// assert_eq!(adjacent.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four tiles sharing an edge with this one.
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x, self.y - 1), // N
            Position::new(self.x - 1, self.y), // W
            Position::new(self.x + 1, self.y), // E
            Position::new(self.x, self.y + 1), // S
        ]
    }
}

/// Identifier for entities within one run.
///
/// Ids are handed out sequentially and never reused, so they stay stable
/// while the entity lists are compacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out sequential [`EntityId`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityIdAllocator {
    next: u32,
}

impl EntityIdAllocator {
    /// Creates an allocator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}
