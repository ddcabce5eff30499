//! # Dungeon Generation
//!
//! Room-and-corridor floor layouts.
//!
//! Rooms are placed by rejection sampling, chained together with L-shaped
//! corridors in placement order, and the corridors are then thickened to
//! roughly two tiles. Because every room is linked to its predecessor, every
//! floor tile is reachable from room 0, the spawn room.

use crate::generation::utils;
use crate::{
    DelveResult, Dungeon, GenerationConfig, Generator, Position, Room, TileGrid, TileType,
};
use log::{debug, warn};
use rand::{rngs::StdRng, Rng};

/// Primary floor generator.
///
/// This generator creates floors by:
/// 1. Placing up to `min(12, 6 + floor)` rooms with spacing-aware rejection sampling
/// 2. Connecting consecutive rooms with L-shaped corridors (x first, then y)
/// 3. Widening single-tile corridors
/// 4. Falling back to one centered room if placement produced nothing
#[derive(Debug, Clone)]
pub struct RoomCorridorGenerator {
    /// Whether to run the corridor-widening pass
    pub widen_corridors: bool,
    /// Whether to verify full connectivity after generation
    pub ensure_connectivity: bool,
}

impl RoomCorridorGenerator {
    /// Creates a new dungeon generator with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{GenerationConfig, Generator, RoomCorridorGenerator};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let generator = RoomCorridorGenerator::new();
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let dungeon = generator.generate(&GenerationConfig::new(), 1, &mut rng).unwrap();
    /// assert!(!dungeon.rooms.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            widen_corridors: true,
            ensure_connectivity: true,
        }
    }

    /// Places rooms by rejection sampling, stamping each accepted room as floor.
    fn place_rooms(
        &self,
        grid: &mut TileGrid,
        config: &GenerationConfig,
        floor: u32,
        rng: &mut StdRng,
    ) -> Vec<Room> {
        let target = config.target_room_count(floor) as usize;
        let mut rooms: Vec<Room> = Vec::with_capacity(target);

        for _ in 0..config.placement_attempts(floor) {
            if rooms.len() >= target {
                break;
            }

            let candidate = self.generate_room_candidate(grid, config, rng, rooms.len() as u32);
            if rooms
                .iter()
                .any(|existing| candidate.overlaps_with_spacing(existing, config.room_spacing))
            {
                continue;
            }

            self.carve_room(grid, &candidate);
            rooms.push(candidate);
        }

        rooms
    }

    /// Generates a candidate room with a random size and margin-respecting position.
    fn generate_room_candidate(
        &self,
        grid: &TileGrid,
        config: &GenerationConfig,
        rng: &mut StdRng,
        room_id: u32,
    ) -> Room {
        let width = rng.gen_range(config.min_room_size..=config.max_room_size);
        let height = rng.gen_range(config.min_room_size..=config.max_room_size);

        let margin = config.edge_margin as i32;
        let x = rng.gen_range(margin..=(grid.width as i32 - width as i32 - margin));
        let y = rng.gen_range(margin..=(grid.height as i32 - height as i32 - margin));

        Room::new(room_id, Position::new(x, y), width, height)
    }

    /// Builds the room forced in when placement yields no rooms at all.
    fn fallback_room(&self, grid: &TileGrid, config: &GenerationConfig) -> Room {
        let size = config.fallback_room_size;
        let x = (grid.width as i32 - size as i32) / 2;
        let y = (grid.height as i32 - size as i32) / 2;
        Room::new(0, Position::new(x, y), size, size)
    }

    /// Carves out a room in the grid by setting its whole rectangle to floor.
    fn carve_room(&self, grid: &mut TileGrid, room: &Room) {
        for pos in room.all_positions() {
            grid.set(pos, TileType::Floor);
        }
    }

    /// Chains rooms together in placement order.
    fn connect_rooms(&self, grid: &mut TileGrid, rooms: &[Room]) {
        for pair in rooms.windows(2) {
            self.carve_l_corridor(grid, pair[0].center(), pair[1].center());
        }
    }

    /// Carves an L-shaped corridor: step x toward the target, then y.
    fn carve_l_corridor(&self, grid: &mut TileGrid, start: Position, end: Position) {
        let mut cursor = start;

        while cursor.x != end.x {
            grid.set(cursor, TileType::Floor);
            cursor.x += (end.x - cursor.x).signum();
        }
        while cursor.y != end.y {
            grid.set(cursor, TileType::Floor);
            cursor.y += (end.y - cursor.y).signum();
        }
        grid.set(cursor, TileType::Floor);
    }

    /// Thickens one-tile corridors.
    ///
    /// Reads a snapshot so that freshly widened cells do not cascade: a wall
    /// cell below/right of a snapshot floor cell becomes floor when the
    /// snapshot cell on the opposite side of that floor cell is also floor.
    fn widen_passages(&self, grid: &mut TileGrid) {
        let snapshot = grid.clone();

        for y in 1..(grid.height as i32 - 1) {
            for x in 1..(grid.width as i32 - 1) {
                if !snapshot.is_floor(Position::new(x, y)) {
                    continue;
                }

                let below = Position::new(x, y + 1);
                if grid.get(below) == Some(TileType::Wall)
                    && snapshot.is_floor(Position::new(x, y - 1))
                {
                    grid.set(below, TileType::Floor);
                }

                let right = Position::new(x + 1, y);
                if grid.get(right) == Some(TileType::Wall)
                    && snapshot.is_floor(Position::new(x - 1, y))
                {
                    grid.set(right, TileType::Floor);
                }
            }
        }
    }
}

impl Generator<Dungeon> for RoomCorridorGenerator {
    fn generate(
        &self,
        config: &GenerationConfig,
        floor: u32,
        rng: &mut StdRng,
    ) -> DelveResult<Dungeon> {
        config.validate()?;

        // Create empty grid (all walls)
        let mut grid = TileGrid::new(config.width, config.height, config.tile_size);

        let mut rooms = self.place_rooms(&mut grid, config, floor, rng);
        if rooms.is_empty() {
            warn!("Room placement failed on floor {floor}; forcing a fallback room");
            let room = self.fallback_room(&grid, config);
            self.carve_room(&mut grid, &room);
            rooms.push(room);
        }

        self.connect_rooms(&mut grid, &rooms);

        if self.widen_corridors {
            self.widen_passages(&mut grid);
        }

        let dungeon = Dungeon { grid, rooms };
        self.validate(&dungeon, config)?;

        debug!(
            "Generated floor {floor}: {} of {} rooms, {} floor tiles",
            dungeon.rooms.len(),
            config.target_room_count(floor),
            dungeon.grid.count(TileType::Floor)
        );

        Ok(dungeon)
    }

    fn validate(&self, dungeon: &Dungeon, _config: &GenerationConfig) -> DelveResult<()> {
        if self.ensure_connectivity {
            utils::validate_dungeon(dungeon)
        } else {
            dungeon.spawn_room().map(|_| ())
        }
    }

    fn generator_type(&self) -> &'static str {
        "RoomCorridorGenerator"
    }
}

impl Default for RoomCorridorGenerator {
    fn default() -> Self {
        Self::new()
    }
}
