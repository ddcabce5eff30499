//! # Tile Navigation
//!
//! Reachability and shortest paths over walkable tiles, built on the
//! `pathfinding` crate. Both use 4-connectivity.

use crate::game::{Position, TileGrid};
use pathfinding::prelude::{astar, bfs_reach};
use std::collections::HashSet;

/// Walkable cardinal neighbours of a tile.
pub fn walkable_neighbours(grid: &TileGrid, pos: Position) -> Vec<Position> {
    pos.cardinal_adjacent_positions()
        .into_iter()
        .filter(|&p| grid.is_floor(p))
        .collect()
}

/// All floor tiles reachable from `start`, including `start` itself.
///
/// Returns an empty set when `start` is not a floor tile.
pub fn reachable_from(grid: &TileGrid, start: Position) -> HashSet<Position> {
    if !grid.is_floor(start) {
        return HashSet::new();
    }
    bfs_reach(start, |&p| walkable_neighbours(grid, p)).collect()
}

/// Shortest 4-connected path between two floor tiles, both endpoints included.
pub fn find_path(grid: &TileGrid, start: Position, goal: Position) -> Option<Vec<Position>> {
    if !grid.is_floor(start) || !grid.is_floor(goal) {
        return None;
    }
    astar(
        &start,
        |&p| {
            walkable_neighbours(grid, p)
                .into_iter()
                .map(|n| (n, 1u32))
                .collect::<Vec<_>>()
        },
        |&p| p.manhattan_distance(goal),
        |&p| p == goal,
    )
    .map(|(path, _cost)| path)
}
