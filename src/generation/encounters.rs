//! # Encounter Generation
//!
//! Floor-scaled enemy spawns for every room except the spawn room.

use crate::config::EnemyTuning;
use crate::game::ai::Behavior;
use crate::utils::math::DEFAULT_FACING;
use crate::{
    DelveError, DelveResult, Dungeon, Enemy, EnemyKind, EnemyState, EntityId, GenerationConfig,
    Generator, Position,
};
use glam::Vec3;
use rand::{rngs::StdRng, Rng};

use EnemyKind::{Patient, Ranged, Rusher};

const SHALLOW_TABLE: [EnemyKind; 4] = [Rusher, Rusher, Rusher, Patient];
const MIDDLE_TABLE: [EnemyKind; 5] = [Rusher, Rusher, Patient, Patient, Ranged];
const DEEP_TABLE: [EnemyKind; 5] = [Rusher, Patient, Patient, Ranged, Ranged];

/// Kinds an enemy is drawn from, uniformly, on a given floor.
pub fn spawn_table(floor: u32) -> &'static [EnemyKind] {
    match floor {
        0..=2 => &SHALLOW_TABLE,
        3..=4 => &MIDDLE_TABLE,
        _ => &DEEP_TABLE,
    }
}

/// Combat stats for one enemy kind on one floor, derived from its
/// [`EnemyProfile`](crate::EnemyProfile).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub hp: i32,
    pub speed: f32,
    pub damage: i32,
    pub attack_range: f32,
    pub radius: f32,
}

impl EnemyStats {
    /// # Examples
    ///
    /// ```
    /// use delve::{EnemyKind, EnemyStats, EnemyTuning};
    ///
    /// let stats = EnemyStats::for_floor(EnemyKind::Patient, 3, &EnemyTuning::default());
    /// assert_eq!(stats.hp, 84);
    /// assert_eq!(stats.damage, 18);
    /// ```
    pub fn for_floor(kind: EnemyKind, floor: u32, tuning: &EnemyTuning) -> Self {
        let profile = tuning.profile(kind);
        let f = floor as i32;
        Self {
            hp: profile.base_hp + profile.hp_per_floor * f,
            speed: profile.speed,
            damage: profile.base_damage + profile.damage_per_floor * f,
            attack_range: profile.attack_range,
            radius: profile.radius,
        }
    }
}

/// A planned enemy placement, turned into an [`Enemy`] once it has an id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub room: usize,
    pub tile: Position,
    pub position: Vec3,
    pub floor: u32,
}

impl EnemySpawn {
    pub fn into_enemy(self, id: EntityId, tuning: &EnemyTuning) -> Enemy {
        let stats = EnemyStats::for_floor(self.kind, self.floor, tuning);
        Enemy {
            id,
            behavior: Behavior::for_kind(self.kind, tuning),
            position: self.position,
            facing: DEFAULT_FACING,
            hp: stats.hp,
            max_hp: stats.hp,
            radius: stats.radius,
            speed: stats.speed,
            damage: stats.damage,
            attack_range: stats.attack_range,
            attack_cooldown: 0.0,
            knockback: Vec3::ZERO,
            state: EnemyState::Idle,
            hurt_timer: 0.0,
            seen_player: false,
        }
    }
}

/// Generates the enemy population of a floor.
pub struct EncounterGenerator<'a> {
    dungeon: &'a Dungeon,
}

impl<'a> EncounterGenerator<'a> {
    pub fn new(dungeon: &'a Dungeon) -> Self {
        Self { dungeon }
    }

    /// Base enemy count per room on a floor.
    pub fn base_count(floor: u32) -> u32 {
        2 + floor
    }
}

impl Generator<Vec<EnemySpawn>> for EncounterGenerator<'_> {
    fn generate(
        &self,
        config: &GenerationConfig,
        floor: u32,
        rng: &mut StdRng,
    ) -> DelveResult<Vec<EnemySpawn>> {
        let base = Self::base_count(floor);
        let table = spawn_table(floor);
        let mut spawns = Vec::new();

        for (index, room) in self.dungeon.rooms.iter().enumerate().skip(1) {
            let count = rng.gen_range(base.saturating_sub(1).max(1)..=base + 1);
            for _ in 0..count {
                let kind = table[rng.gen_range(0..table.len())];
                let tile = room.random_inner_tile(rng);
                spawns.push(EnemySpawn {
                    kind,
                    room: index,
                    tile,
                    position: self.dungeon.grid.tile_to_world(tile),
                    floor,
                });
            }
        }

        self.validate(&spawns, config)?;
        Ok(spawns)
    }

    fn validate(&self, spawns: &Vec<EnemySpawn>, _config: &GenerationConfig) -> DelveResult<()> {
        for spawn in spawns {
            if spawn.room == 0 {
                return Err(DelveError::GenerationFailed(
                    "enemy placed in the spawn room".to_string(),
                ));
            }
            let in_room = self
                .dungeon
                .rooms
                .get(spawn.room)
                .is_some_and(|room| room.contains(spawn.tile));
            if !in_room {
                return Err(DelveError::GenerationFailed(format!(
                    "enemy placed outside room {}",
                    spawn.room
                )));
            }
            if !self.dungeon.grid.is_floor(spawn.tile) {
                return Err(DelveError::GenerationFailed(format!(
                    "enemy placed on non-floor tile ({}, {})",
                    spawn.tile.x, spawn.tile.y
                )));
            }
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "EncounterGenerator"
    }
}
