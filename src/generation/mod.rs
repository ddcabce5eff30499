//! # Generation Module
//!
//! Procedural content generation for dungeon floors, their items and their
//! enemy encounters.
//!
//! Every generator draws from a caller-supplied `StdRng`, so a floor is fully
//! determined by the floor index and the RNG state it was generated from.

pub mod dungeon;
pub mod encounters;
pub mod items;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;

use crate::config::{DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, TILE_SIZE};
use crate::game::{Position, TileGrid};
use crate::{DelveError, DelveResult};
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

/// Configuration for floor generation.
///
/// Controls the grid dimensions, room sizes and spacing, and how many
/// rooms each floor aims for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Grid width in tiles
    pub width: u32,
    /// Grid height in tiles
    pub height: u32,
    /// World units per tile edge
    pub tile_size: f32,
    /// Minimum room edge length
    pub min_room_size: u32,
    /// Maximum room edge length
    pub max_room_size: u32,
    /// Tiles kept clear between rooms and the grid edge
    pub edge_margin: u32,
    /// Tiles kept clear between any two rooms
    pub room_spacing: u32,
    /// Room target on floor 0; each floor adds one
    pub base_room_count: u32,
    /// Upper bound on the room target
    pub max_room_count: u32,
    /// Placement attempts per targeted room
    pub attempts_per_room: u32,
    /// Edge length of the room forced in when placement yields nothing
    pub fallback_room_size: u32,
}

impl GenerationConfig {
    /// Creates the reference configuration: a 42×42 grid of 2-unit tiles.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new();
    /// assert_eq!(config.target_room_count(1), 7);
    /// assert_eq!(config.target_room_count(9), 12);
    /// ```
    pub fn new() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            tile_size: TILE_SIZE,
            min_room_size: 5,
            max_room_size: 9,
            edge_margin: 2,
            room_spacing: 2,
            base_room_count: 6,
            max_room_count: 12,
            attempts_per_room: 6,
            fallback_room_size: 7,
        }
    }

    /// Creates a configuration for testing with a smaller grid.
    pub fn for_testing() -> Self {
        Self {
            width: 24,
            height: 24,
            max_room_count: 4,
            ..Self::new()
        }
    }

    /// Number of rooms a floor tries to place.
    pub fn target_room_count(&self, floor: u32) -> u32 {
        self.max_room_count
            .min(self.base_room_count.saturating_add(floor))
    }

    /// Total placement attempts for a floor.
    pub fn placement_attempts(&self, floor: u32) -> u32 {
        self.target_room_count(floor) * self.attempts_per_room
    }

    /// Checks that rooms of every permitted size fit inside the margins.
    pub fn validate(&self) -> DelveResult<()> {
        if self.tile_size <= 0.0 {
            return Err(DelveError::Config("tile_size must be positive".to_string()));
        }
        if self.min_room_size < 3 || self.min_room_size > self.max_room_size {
            return Err(DelveError::Config(format!(
                "room size range {}..={} is invalid",
                self.min_room_size, self.max_room_size
            )));
        }
        let needed = self.max_room_size + 2 * self.edge_margin;
        if self.width < needed || self.height < needed {
            return Err(DelveError::Config(format!(
                "grid {}x{} cannot hold a {}-tile room with margin {}",
                self.width, self.height, self.max_room_size, self.edge_margin
            )));
        }
        if self.fallback_room_size < 3 || self.fallback_room_size + 2 > self.width.min(self.height)
        {
            return Err(DelveError::Config(format!(
                "fallback room size {} does not fit the grid",
                self.fallback_room_size
            )));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Represents a rectangular room in the dungeon.
///
/// The whole rectangle is floor. Rooms outlive generation: floor assembly
/// uses them to place the player, the stairs, items and enemies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Index of this room in placement order; room 0 is the spawn room
    pub id: u32,
    /// Top-left corner of the room
    pub top_left: Position,
    /// Width of the room in tiles
    pub width: u32,
    /// Height of the room in tiles
    pub height: u32,
}

impl Room {
    /// Creates a new room with the given parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Room, Position};
    ///
    /// let room = Room::new(1, Position::new(5, 5), 9, 6);
    /// assert_eq!(room.center(), Position::new(9, 8));
    /// ```
    pub fn new(id: u32, top_left: Position, width: u32, height: u32) -> Self {
        Self {
            id,
            top_left,
            width,
            height,
        }
    }

    /// Gets the bottom-right corner of the room.
    pub fn bottom_right(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 - 1,
            self.top_left.y + self.height as i32 - 1,
        )
    }

    /// Gets the center tile of the room.
    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x + self.width as i32 / 2,
            self.top_left.y + self.height as i32 / 2,
        )
    }

    /// Checks if a position is inside this room.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.top_left.x
            && pos.y >= self.top_left.y
            && pos.x < self.top_left.x + self.width as i32
            && pos.y < self.top_left.y + self.height as i32
    }

    /// Checks if this room comes within `spacing` tiles of another room.
    ///
    /// Rooms separated by exactly `spacing` clear tiles do not overlap.
    pub fn overlaps_with_spacing(&self, other: &Room, spacing: u32) -> bool {
        let s = spacing as i32;
        self.top_left.x < other.top_left.x + other.width as i32 + s
            && self.top_left.x + self.width as i32 + s > other.top_left.x
            && self.top_left.y < other.top_left.y + other.height as i32 + s
            && self.top_left.y + self.height as i32 + s > other.top_left.y
    }

    /// Range of x coordinates one tile in from the room's edge.
    pub fn inner_x_range(&self) -> std::ops::RangeInclusive<i32> {
        (self.top_left.x + 1)..=(self.top_left.x + self.width as i32 - 2)
    }

    /// Range of y coordinates one tile in from the room's edge.
    pub fn inner_y_range(&self) -> std::ops::RangeInclusive<i32> {
        (self.top_left.y + 1)..=(self.top_left.y + self.height as i32 - 2)
    }

    /// Picks a uniformly random tile one step in from the room's edge.
    pub fn random_inner_tile(&self, rng: &mut StdRng) -> Position {
        let x = rng.gen_range(self.inner_x_range());
        let y = rng.gen_range(self.inner_y_range());
        Position::new(x, y)
    }

    /// Picks a random tile on a random side of the room's rectangle.
    pub fn random_edge_tile(&self, rng: &mut StdRng) -> Position {
        let bottom_right = self.bottom_right();
        match rng.gen_range(0..4) {
            0 => Position::new(self.top_left.x, rng.gen_range(self.top_left.y..=bottom_right.y)),
            1 => Position::new(bottom_right.x, rng.gen_range(self.top_left.y..=bottom_right.y)),
            2 => Position::new(rng.gen_range(self.top_left.x..=bottom_right.x), self.top_left.y),
            _ => Position::new(rng.gen_range(self.top_left.x..=bottom_right.x), bottom_right.y),
        }
    }

    /// Gets all positions within this room.
    pub fn all_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();

        for y in self.top_left.y..(self.top_left.y + self.height as i32) {
            for x in self.top_left.x..(self.top_left.x + self.width as i32) {
                positions.push(Position::new(x, y));
            }
        }

        positions
    }
}

/// A generated floor: its tile grid and the rooms carved into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dungeon {
    pub grid: TileGrid,
    /// Rooms in placement order; never empty for a validated dungeon
    pub rooms: Vec<Room>,
}

impl Dungeon {
    /// The room the player starts in.
    pub fn spawn_room(&self) -> DelveResult<&Room> {
        self.rooms
            .first()
            .ok_or_else(|| DelveError::InvalidState("Dungeon has no rooms".to_string()))
    }

    /// Index of the room farthest (Manhattan, between centers) from the spawn room.
    ///
    /// Scans rooms `1..n` and keeps the first strictly farther room; with a
    /// single room the spawn room itself is returned.
    pub fn farthest_room_index(&self) -> usize {
        let Some(spawn) = self.rooms.first() else {
            return 0;
        };
        let spawn_center = spawn.center();

        let mut best = self.rooms.len() - 1;
        let mut best_distance = 0;
        for (index, room) in self.rooms.iter().enumerate().skip(1) {
            let distance = room.center().manhattan_distance(spawn_center);
            if distance > best_distance {
                best_distance = distance;
                best = index;
            }
        }
        best
    }
}

/// Trait for procedural generators.
///
/// All generation systems implement this trait, giving floor assembly one
/// consistent way to build and check content.
pub trait Generator<T> {
    /// Generates content for the given floor index.
    fn generate(&self, config: &GenerationConfig, floor: u32, rng: &mut StdRng) -> DelveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use crate::game::TileType;
    use crate::utils::navigation;
    use rand::SeedableRng;

    /// Creates a seeded random number generator.
    pub fn create_rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    /// Validates that a dungeon has rooms, floor, and a single connected floor region.
    pub fn validate_dungeon(dungeon: &Dungeon) -> DelveResult<()> {
        let spawn = dungeon.spawn_room()?;

        let floor_count = dungeon.grid.count(TileType::Floor);
        if floor_count == 0 {
            return Err(DelveError::GenerationFailed(
                "Dungeon has no floor tiles".to_string(),
            ));
        }

        let reachable = navigation::reachable_from(&dungeon.grid, spawn.center());
        if reachable.len() != floor_count {
            return Err(DelveError::GenerationFailed(format!(
                "{} of {} floor tiles are unreachable from the spawn room",
                floor_count - reachable.len(),
                floor_count
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new();
        assert_eq!(config.width, 42);
        assert_eq!(config.height, 42);
        assert!(config.min_room_size <= config.max_room_size);
        assert!(config.validate().is_ok());
        assert!(GenerationConfig::for_testing().validate().is_ok());
    }

    #[test]
    fn test_target_room_count_caps_at_twelve() {
        let config = GenerationConfig::new();
        assert_eq!(config.target_room_count(1), 7);
        assert_eq!(config.target_room_count(6), 12);
        assert_eq!(config.target_room_count(40), 12);
        assert_eq!(config.placement_attempts(1), 42);
    }

    #[test]
    fn test_config_rejects_grid_too_small() {
        let config = GenerationConfig {
            width: 10,
            ..GenerationConfig::new()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_room_geometry() {
        let room = Room::new(1, Position::new(5, 5), 9, 6);

        assert_eq!(room.bottom_right(), Position::new(13, 10));
        assert_eq!(room.center(), Position::new(9, 8));

        assert!(room.contains(Position::new(5, 5)));
        assert!(room.contains(Position::new(13, 10)));
        assert!(!room.contains(Position::new(14, 10)));
        assert!(!room.contains(Position::new(4, 5)));

        assert_eq!(room.inner_x_range(), 6..=12);
        assert_eq!(room.inner_y_range(), 6..=9);
    }

    #[test]
    fn test_room_overlap_with_spacing() {
        let room1 = Room::new(0, Position::new(2, 2), 5, 5);
        // Occupies x 2..=6; a room starting at x=9 leaves exactly two clear columns
        let room2 = Room::new(1, Position::new(9, 2), 5, 5);
        let room3 = Room::new(2, Position::new(8, 2), 5, 5);

        assert!(!room1.overlaps_with_spacing(&room2, 2));
        assert!(!room2.overlaps_with_spacing(&room1, 2));
        assert!(room1.overlaps_with_spacing(&room3, 2));
        assert!(!room1.overlaps_with_spacing(&room3, 0));
    }

    #[test]
    fn test_room_positions_cover_rectangle() {
        let room = Room::new(0, Position::new(3, 4), 5, 6);
        let positions: HashSet<_> = room.all_positions().into_iter().collect();
        assert_eq!(positions.len(), 30);
        assert!(positions.iter().all(|&p| room.contains(p)));
    }

    #[test]
    fn test_farthest_room_prefers_first_on_ties() {
        let grid = TileGrid::new(42, 42, 2.0);
        let dungeon = Dungeon {
            grid,
            rooms: vec![
                Room::new(0, Position::new(2, 2), 5, 5),
                Room::new(1, Position::new(20, 2), 5, 5),
                Room::new(2, Position::new(2, 20), 5, 5),
                Room::new(3, Position::new(10, 2), 5, 5),
            ],
        };
        assert_eq!(dungeon.farthest_room_index(), 1);
    }

    #[test]
    fn test_farthest_room_single_room_is_spawn() {
        let dungeon = Dungeon {
            grid: TileGrid::new(20, 20, 2.0),
            rooms: vec![Room::new(0, Position::new(2, 2), 5, 5)],
        };
        assert_eq!(dungeon.farthest_room_index(), 0);
    }

    #[test]
    fn test_validate_rejects_disconnected_floor() {
        let mut grid = TileGrid::new(20, 20, 2.0);
        let room = Room::new(0, Position::new(2, 2), 5, 5);
        for pos in room.all_positions() {
            grid.set(pos, crate::TileType::Floor);
        }
        grid.set(Position::new(15, 15), crate::TileType::Floor);

        let dungeon = Dungeon {
            grid,
            rooms: vec![room],
        };
        assert!(matches!(
            utils::validate_dungeon(&dungeon),
            Err(DelveError::GenerationFailed(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_room_list() {
        let dungeon = Dungeon {
            grid: TileGrid::new(20, 20, 2.0),
            rooms: Vec::new(),
        };
        assert!(utils::validate_dungeon(&dungeon).is_err());
    }
}
