//! # Delve
//!
//! Simulation core of a real-time, top-down dungeon crawler.
//!
//! ## Architecture Overview
//!
//! Delve owns every piece of game state and advances it one fixed-delta tick
//! at a time. Rendering, audio and raw input capture live outside the crate:
//! hosts feed abstract intents in and read a [`FrameSnapshot`] back out.
//!
//! - **Generation**: room-and-corridor floors built from a floor index and a seeded RNG
//! - **Game**: entity model, combat, enemy AI, progression and the tick loop
//! - **Input**: held movement axes plus edge-triggered one-shot intents
//! - **Utils**: flat-plane vector math and tile pathfinding
//!
//! ## Determinism
//!
//! All randomness flows from one `StdRng` owned by the [`SimulationState`].
//! Two simulations built from the same seed and fed the same intents and
//! deltas produce identical floors and identical outcomes.

pub mod config;
pub mod game;
pub mod generation;
pub mod input;
pub mod utils;

// Core module re-exports
pub use config::*;
pub use game::*;
pub use generation::*;
pub use input::*;
pub use utils::*;

// Explicit re-exports for the host-facing surface
pub use game::{
    Autopilot, Behavior, DashState, Enemy, EnemyKind, EnemyState, EntityId, ExploredSet,
    FrameSnapshot, GameEvent, GamePhase, GameStatistics, Item, ItemKind, Light, Player, Position,
    Projectile, Simulation, SimulationState, Stairs, TickOutcome, TileGrid, TileType, Upgrade,
};

pub use generation::{Dungeon, GenerationConfig, Generator, Room, RoomCorridorGenerator};

/// Core error type for the Delve simulation.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Simulation state is invalid
    #[error("Invalid simulation state: {0}")]
    InvalidState(String),

    /// Intent or command cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Configuration values are unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
