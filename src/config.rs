//! # Configuration
//!
//! Reference tuning constants and the serde-backed [`SimulationConfig`] that
//! groups every tunable the simulation reads.
//!
//! Every field has a default, so a JSON override file only needs to name the
//! values it changes:
//!
//! ```
//! use delve::SimulationConfig;
//!
//! let config = SimulationConfig::from_json_str(r#"{ "player": { "speed": 12.0 } }"#).unwrap();
//! assert_eq!(config.player.speed, 12.0);
//! assert_eq!(config.player.attack_range, 2.8);
//! ```

use crate::{DelveError, DelveResult, EnemyKind, GenerationConfig};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::Path;

/// World units per tile edge.
pub const TILE_SIZE: f32 = 2.0;

/// Default dungeon width in tiles.
pub const DEFAULT_GRID_WIDTH: u32 = 42;

/// Default dungeon height in tiles.
pub const DEFAULT_GRID_HEIGHT: u32 = 42;

/// Frame deltas above this many seconds are dropped.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Default player starting health.
pub const DEFAULT_PLAYER_HEALTH: i32 = 100;

/// Default player base damage.
pub const DEFAULT_PLAYER_DAMAGE: i32 = 22;

/// Scale applied to a movement input with both axes set.
pub const DIAGONAL_SCALE: f32 = 0.707;

/// Flat vectors shorter than this are treated as zero.
pub const DEGENERATE_LENGTH: f32 = 0.001;

/// Complete tuning for one simulation instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Floor generation parameters
    pub generation: GenerationConfig,
    /// Player movement and melee parameters
    pub player: PlayerTuning,
    /// Damage, invincibility and impact-feel parameters
    pub combat: CombatTuning,
    /// Enemy perception and ranged-attack parameters
    pub enemies: EnemyTuning,
    /// Pickup, stairs and message parameters
    pub progression: ProgressionTuning,
    /// Frame deltas above this are skipped entirely
    pub max_frame_delta: f32,
    /// Half-width (in tiles) of the square revealed around the player
    pub explore_radius: i32,
}

/// Player movement, dash and melee tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_hp: i32,
    pub damage: i32,
    pub speed: f32,
    pub attack_range: f32,
    /// Total melee arc in radians
    pub attack_arc: f32,
    pub attack_cooldown: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    pub dash_speed: f32,
}

/// Combat tuning shared by player and enemies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub knockback: f32,
    /// Per-tick geometric knockback decay
    pub knockback_decay: f32,
    /// Knockback speeds at or below this stop integrating
    pub knockback_halt: f32,
    pub hurt_duration: f32,
    pub damage_invincibility: f32,
    pub dash_invincibility: f32,
    pub hit_pause: f32,
    /// Inclusive bounds of the random melee damage offset
    pub damage_roll: (i32, i32),
    pub hit_shake: f32,
    pub damage_shake: f32,
    pub shake_decay: f32,
    pub shake_floor: f32,
}

/// Enemy perception and ranged-attack tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub detection_radius: f32,
    pub rusher_strike_interval: f32,
    pub patient_strike_interval: f32,
    pub ranged_retreat_distance: f32,
    pub ranged_approach_distance: f32,
    pub ranged_fire_range: f32,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
    pub projectile_hit_radius: f32,
    /// Height above the enemy's feet that projectiles spawn at
    pub projectile_spawn_height: f32,
    /// Height above the player's feet that projectiles aim at
    pub projectile_aim_height: f32,
    pub rusher: EnemyProfile,
    pub patient: EnemyProfile,
    pub ranged: EnemyProfile,
}

/// Base stats of one enemy kind.
///
/// Health and damage grow by a fixed amount per floor. An override must
/// name every field of the profile it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyProfile {
    pub base_hp: i32,
    pub hp_per_floor: i32,
    pub base_damage: i32,
    pub damage_per_floor: i32,
    pub speed: f32,
    /// Contact reach for melee kinds, nominal reach for ranged ones
    pub attack_range: f32,
    pub radius: f32,
}

impl EnemyTuning {
    /// The stat profile for `kind`.
    pub fn profile(&self, kind: EnemyKind) -> &EnemyProfile {
        match kind {
            EnemyKind::Rusher => &self.rusher,
            EnemyKind::Patient => &self.patient,
            EnemyKind::Ranged => &self.ranged,
        }
    }
}

/// Floor progression tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionTuning {
    pub pickup_radius: f32,
    pub stairs_radius: f32,
    pub potion_base_heal: i32,
    pub potion_heal_per_floor: i32,
    /// Extra seconds a message stays visible while fading out
    pub message_fade: f32,
    pub upgrade_offer_size: usize,
}

impl SimulationConfig {
    /// Parses a (possibly partial) JSON override on top of the defaults.
    pub fn from_json_str(json: &str) -> DelveResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> DelveResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Serializes the configuration as pretty JSON.
    pub fn to_json(&self) -> DelveResult<String> {
        serde_json::to_string_pretty(self).map_err(DelveError::from)
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> DelveResult<()> {
        if self.max_frame_delta <= 0.0 {
            return Err(DelveError::Config(
                "max_frame_delta must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.combat.knockback_decay) {
            return Err(DelveError::Config(
                "knockback_decay must be in [0, 1)".to_string(),
            ));
        }
        if self.combat.damage_roll.0 > self.combat.damage_roll.1 {
            return Err(DelveError::Config(format!(
                "damage_roll lower bound {} exceeds upper bound {}",
                self.combat.damage_roll.0, self.combat.damage_roll.1
            )));
        }
        for (kind, profile) in [
            ("rusher", &self.enemies.rusher),
            ("patient", &self.enemies.patient),
            ("ranged", &self.enemies.ranged),
        ] {
            if profile.base_hp <= 0 || profile.speed <= 0.0 || profile.radius <= 0.0 {
                return Err(DelveError::Config(format!(
                    "{kind} profile needs positive base_hp, speed and radius"
                )));
            }
        }
        if self.progression.upgrade_offer_size == 0 {
            return Err(DelveError::Config(
                "upgrade_offer_size must be at least 1".to_string(),
            ));
        }
        self.generation.validate()
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            player: PlayerTuning::default(),
            combat: CombatTuning::default(),
            enemies: EnemyTuning::default(),
            progression: ProgressionTuning::default(),
            max_frame_delta: MAX_FRAME_DELTA,
            explore_radius: 6,
        }
    }
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_hp: DEFAULT_PLAYER_HEALTH,
            damage: DEFAULT_PLAYER_DAMAGE,
            speed: 9.0,
            attack_range: 2.8,
            attack_arc: PI * 0.7,
            attack_cooldown: 0.35,
            dash_duration: 0.18,
            dash_cooldown: 0.55,
            dash_speed: 28.0,
        }
    }
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            knockback: 8.0,
            knockback_decay: 0.85,
            knockback_halt: 0.5,
            hurt_duration: 0.2,
            damage_invincibility: 0.6,
            dash_invincibility: 0.1,
            hit_pause: 0.04,
            damage_roll: (-2, 3),
            hit_shake: 0.4,
            damage_shake: 1.0,
            shake_decay: 0.85,
            shake_floor: 0.03,
        }
    }
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            detection_radius: 12.0,
            rusher_strike_interval: 1.0,
            patient_strike_interval: 0.8,
            ranged_retreat_distance: 5.0,
            ranged_approach_distance: 14.0,
            ranged_fire_range: 15.0,
            projectile_speed: 10.0,
            projectile_lifetime: 4.0,
            projectile_hit_radius: 1.0,
            projectile_spawn_height: 1.3,
            projectile_aim_height: 0.8,
            rusher: EnemyProfile {
                base_hp: 40,
                hp_per_floor: 5,
                base_damage: 8,
                damage_per_floor: 2,
                speed: 3.5,
                attack_range: 1.5,
                radius: 0.6,
            },
            patient: EnemyProfile {
                base_hp: 60,
                hp_per_floor: 8,
                base_damage: 12,
                damage_per_floor: 2,
                speed: 5.0,
                attack_range: 2.2,
                radius: 0.6,
            },
            ranged: EnemyProfile {
                base_hp: 50,
                hp_per_floor: 6,
                base_damage: 18,
                damage_per_floor: 3,
                speed: 2.5,
                attack_range: 12.0,
                radius: 0.5,
            },
        }
    }
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self {
            pickup_radius: 1.5,
            stairs_radius: 2.5,
            potion_base_heal: 30,
            potion_heal_per_floor: 5,
            message_fade: 0.5,
            upgrade_offer_size: 3,
        }
    }
}
