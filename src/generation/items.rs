//! # Item Generation
//!
//! Placement of the stairs, the key, healing potions and decorative torches.

use crate::{DelveError, DelveResult, Dungeon, GenerationConfig, Generator, Position};
use rand::{rngs::StdRng, Rng};

/// Where a floor's fixtures and pickups go, in tile coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemLayout {
    pub stairs_room: usize,
    pub stairs_tile: Position,
    pub key_room: usize,
    pub key_tile: Position,
    pub potion_tiles: Vec<Position>,
    pub torch_tiles: Vec<Position>,
}

/// Lays out the stairs, key, potions and torches of a floor.
///
/// Stairs go to the center of the room farthest from spawn. The key sits at
/// the center of a random non-spawn room and may share the stairs room.
pub struct ItemGenerator<'a> {
    dungeon: &'a Dungeon,
}

impl<'a> ItemGenerator<'a> {
    pub fn new(dungeon: &'a Dungeon) -> Self {
        Self { dungeon }
    }

    fn key_room(&self, rng: &mut StdRng) -> usize {
        match self.dungeon.rooms.len() {
            0 | 1 => 0,
            2 => 1,
            n => rng.gen_range(1..n),
        }
    }

    /// Any room other than spawn, or spawn itself on a single-room floor.
    fn potion_room(&self, rng: &mut StdRng) -> usize {
        match self.dungeon.rooms.len() {
            0 | 1 => 0,
            n => rng.gen_range(1..n),
        }
    }
}

impl Generator<ItemLayout> for ItemGenerator<'_> {
    fn generate(
        &self,
        config: &GenerationConfig,
        _floor: u32,
        rng: &mut StdRng,
    ) -> DelveResult<ItemLayout> {
        let rooms = &self.dungeon.rooms;
        self.dungeon.spawn_room()?;

        let stairs_room = self.dungeon.farthest_room_index();
        let key_room = self.key_room(rng);

        let potion_count = rng.gen_range(1..=2);
        let potion_tiles = (0..potion_count)
            .map(|_| {
                let room = self.potion_room(rng);
                rooms[room].random_inner_tile(rng)
            })
            .collect();

        let mut torch_tiles = Vec::new();
        for room in rooms {
            for _ in 0..rng.gen_range(1..=2) {
                torch_tiles.push(room.random_edge_tile(rng));
            }
        }

        let layout = ItemLayout {
            stairs_room,
            stairs_tile: rooms[stairs_room].center(),
            key_room,
            key_tile: rooms[key_room].center(),
            potion_tiles,
            torch_tiles,
        };
        self.validate(&layout, config)?;
        Ok(layout)
    }

    fn validate(&self, layout: &ItemLayout, _config: &GenerationConfig) -> DelveResult<()> {
        let grid = &self.dungeon.grid;
        let pickups = [layout.stairs_tile, layout.key_tile];
        for tile in pickups.iter().chain(&layout.potion_tiles) {
            if !grid.is_floor(*tile) {
                return Err(DelveError::GenerationFailed(format!(
                    "item placed on non-floor tile ({}, {})",
                    tile.x, tile.y
                )));
            }
        }
        if self.dungeon.rooms.len() > 1 && layout.key_room == 0 {
            return Err(DelveError::GenerationFailed(
                "key placed in the spawn room".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "ItemGenerator"
    }
}
