//! # Grid & Collision
//!
//! The per-floor tile grid, world↔tile conversion, walkability queries with
//! per-axis wall sliding, and the explored (fog-of-war) set.

use crate::Position;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Wall,
    Floor,
}

impl TileType {
    /// Whether entities may stand on this tile.
    pub fn is_walkable(self) -> bool {
        matches!(self, TileType::Floor)
    }
}

/// Fixed-size 2D tile grid, row-major.
///
/// Out-of-bounds reads behave like walls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    pub width: u32,
    pub height: u32,
    /// World units per tile edge
    pub tile_size: f32,
    tiles: Vec<TileType>,
}

impl TileGrid {
    /// Creates a grid filled with walls.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{TileGrid, TileType, Position};
    ///
    /// let grid = TileGrid::new(42, 42, 2.0);
    /// assert_eq!(grid.get(Position::new(3, 3)), Some(TileType::Wall));
    /// assert_eq!(grid.get(Position::new(42, 0)), None);
    /// ```
    pub fn new(width: u32, height: u32, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
            tiles: vec![TileType::Wall; (width * height) as usize],
        }
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.is_valid_position(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Checks if a tile coordinate lies inside the grid.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Gets the tile at a position.
    pub fn get(&self, pos: Position) -> Option<TileType> {
        self.index(pos).map(|i| self.tiles[i])
    }

    /// Sets the tile at a position. Returns false when out of bounds.
    pub fn set(&mut self, pos: Position, tile: TileType) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.tiles[i] = tile;
                true
            }
            None => false,
        }
    }

    /// Whether a tile coordinate is an in-bounds floor tile.
    pub fn is_floor(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(TileType::is_walkable)
    }

    /// Counts tiles of one type.
    pub fn count(&self, tile: TileType) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// Iterates over every position and its tile, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Position, TileType)> + '_ {
        let width = self.width as usize;
        self.tiles.iter().enumerate().map(move |(i, &tile)| {
            (
                Position::new((i % width) as i32, (i / width) as i32),
                tile,
            )
        })
    }

    /// Converts world coordinates to the nearest tile.
    pub fn world_to_tile(&self, world_x: f32, world_z: f32) -> Position {
        Position::new(
            (world_x / self.tile_size).round() as i32,
            (world_z / self.tile_size).round() as i32,
        )
    }

    /// World-space position of a tile's center, on the ground plane.
    pub fn tile_to_world(&self, pos: Position) -> Vec3 {
        Vec3::new(
            pos.x as f32 * self.tile_size,
            0.0,
            pos.y as f32 * self.tile_size,
        )
    }

    /// Whether a world coordinate lies on a floor tile.
    pub fn is_walkable(&self, world_x: f32, world_z: f32) -> bool {
        self.is_floor(self.world_to_tile(world_x, world_z))
    }

    /// Moves `from` by the flat `delta`, resolving each axis independently.
    ///
    /// The x step is accepted if `(from.x + dx, from.z)` is walkable and the
    /// z step if `(from.x, from.z + dz)` is; blocked axes are dropped, which
    /// slides the mover along walls.
    pub fn slide(&self, from: Vec3, delta: Vec3) -> Vec3 {
        let mut to = from;
        let new_x = from.x + delta.x;
        let new_z = from.z + delta.z;
        if self.is_walkable(new_x, from.z) {
            to.x = new_x;
        }
        if self.is_walkable(from.x, new_z) {
            to.z = new_z;
        }
        to
    }
}

/// Tiles the player has been near on the current floor.
///
/// Monotonic within a floor; reset wholesale on floor transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploredSet {
    pub width: u32,
    pub height: u32,
    cells: Vec<bool>,
}

impl ExploredSet {
    /// Creates an all-unexplored set.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; (width * height) as usize],
        }
    }

    /// Creates an all-unexplored set matching a grid.
    pub fn for_grid(grid: &TileGrid) -> Self {
        Self::new(grid.width, grid.height)
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
        {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Whether a tile has been explored.
    pub fn is_explored(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|i| self.cells[i])
    }

    /// Marks every in-bounds tile in the square of `radius` around `center`.
    pub fn mark_around(&mut self, center: Position, radius: i32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if let Some(i) = self.index(Position::new(center.x + dx, center.y + dy)) {
                    self.cells[i] = true;
                }
            }
        }
    }

    /// Number of explored tiles.
    pub fn explored_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}
