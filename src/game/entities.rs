//! # Entity Model
//!
//! Plain data records for everything that lives on a floor. Behavior is
//! applied to them by the combat, AI and progression systems; floor assembly
//! constructs and places them.

use crate::config::PlayerTuning;
use crate::game::ai::Behavior;
use crate::utils::math::DEFAULT_FACING;
use crate::{EntityId, Position};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Dash bookkeeping for the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashState {
    /// Seconds of dash left; the dash is active while positive
    pub remaining: f32,
    /// Seconds until another dash may start
    pub cooldown: f32,
    /// Flat unit direction of the current dash
    pub direction: Vec3,
}

impl DashState {
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }
}

impl Default for DashState {
    fn default() -> Self {
        Self {
            remaining: 0.0,
            cooldown: 0.0,
            direction: DEFAULT_FACING,
        }
    }
}

/// The player character.
///
/// Stats persist across floors; position and timers reset on each floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec3,
    /// Flat unit facing direction
    pub facing: Vec3,
    pub hp: i32,
    pub max_hp: i32,
    pub damage: i32,
    pub speed_multiplier: f32,
    pub attack_speed_multiplier: f32,
    /// Fraction of dealt damage returned as health
    pub lifesteal: f32,
    pub attack_cooldown: f32,
    pub dash: DashState,
    pub invincibility: f32,
    pub has_key: bool,
}

impl Player {
    /// Creates a fresh player from the tuning's starting stats.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Player, PlayerTuning};
    ///
    /// let player = Player::new(&PlayerTuning::default());
    /// assert_eq!(player.hp, 100);
    /// assert!(!player.is_invincible());
    /// ```
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            position: Vec3::ZERO,
            facing: DEFAULT_FACING,
            hp: tuning.max_hp,
            max_hp: tuning.max_hp,
            damage: tuning.damage,
            speed_multiplier: 1.0,
            attack_speed_multiplier: 1.0,
            lifesteal: 0.0,
            attack_cooldown: 0.0,
            dash: DashState::default(),
            invincibility: 0.0,
            has_key: false,
        }
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility > 0.0
    }

    /// Heals up to `max_hp` and returns the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let restored = amount.clamp(0, self.max_hp - self.hp);
        self.hp += restored;
        restored
    }

    /// Moves the player to a new floor's spawn and clears per-floor state.
    pub fn enter_floor(&mut self, spawn: Vec3) {
        self.position = spawn;
        self.attack_cooldown = 0.0;
        self.dash = DashState {
            direction: self.dash.direction,
            ..DashState::default()
        };
        self.invincibility = 0.0;
        self.has_key = false;
    }
}

/// Enemy archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Slow melee chaser with a long strike interval
    Rusher,
    /// Fast melee chaser with a short strike interval
    Patient,
    /// Keeps its distance and fires projectiles
    Ranged,
}

impl EnemyKind {
    /// Score awarded for a kill.
    pub fn score_value(self) -> u32 {
        match self {
            EnemyKind::Rusher => 25,
            EnemyKind::Patient => 50,
            EnemyKind::Ranged => 75,
        }
    }
}

/// Enemy behavior state.
///
/// Attacking is not a persistent state: strikes and shots are cooldown-gated
/// events that happen while chasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    Idle,
    Chasing,
    /// Staggered by a hit; no movement or attack decisions
    Hurt,
}

/// A hostile creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub behavior: Behavior,
    pub position: Vec3,
    /// Flat unit direction the enemy faces
    pub facing: Vec3,
    pub hp: i32,
    pub max_hp: i32,
    pub radius: f32,
    pub speed: f32,
    pub damage: i32,
    pub attack_range: f32,
    /// Seconds until the next contact strike; ticks down every frame
    pub attack_cooldown: f32,
    pub knockback: Vec3,
    pub state: EnemyState,
    pub hurt_timer: f32,
    /// Sticky: once set the enemy never returns to idle
    pub seen_player: bool,
}

impl Enemy {
    pub fn kind(&self) -> EnemyKind {
        self.behavior.kind()
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }
}

/// A ranged enemy's shot in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds until the projectile fizzles
    pub lifetime: f32,
    pub damage: i32,
}

/// Item kinds found on a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Potion,
    Key,
}

/// A pickup lying on a floor tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: EntityId,
    pub kind: ItemKind,
    pub tile: Position,
    pub position: Vec3,
}

/// A decorative light source. No gameplay effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub tile: Position,
    pub position: Vec3,
}

/// The floor exit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stairs {
    /// Index of the room holding the stairs
    pub room: usize,
    pub tile: Position,
    pub position: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_heal_clamps_to_max() {
        let mut player = Player::new(&PlayerTuning::default());
        player.hp = 90;
        assert_eq!(player.heal(30), 10);
        assert_eq!(player.hp, 100);
        assert_eq!(player.heal(5), 0);
        assert_eq!(player.heal(-5), 0);
    }

    #[test]
    fn test_player_enter_floor_resets_timers_keeps_stats() {
        let mut player = Player::new(&PlayerTuning::default());
        player.damage = 26;
        player.hp = 40;
        player.has_key = true;
        player.invincibility = 0.5;
        player.attack_cooldown = 0.2;
        player.dash.remaining = 0.1;
        player.dash.cooldown = 0.3;

        player.enter_floor(Vec3::new(10.0, 0.0, 12.0));

        assert_eq!(player.position, Vec3::new(10.0, 0.0, 12.0));
        assert_eq!(player.damage, 26);
        assert_eq!(player.hp, 40);
        assert!(!player.has_key);
        assert!(!player.is_invincible());
        assert!(!player.dash.is_active());
        assert_eq!(player.dash.cooldown, 0.0);
        assert_eq!(player.attack_cooldown, 0.0);
    }

    #[test]
    fn test_enemy_kind_scores() {
        assert_eq!(EnemyKind::Rusher.score_value(), 25);
        assert_eq!(EnemyKind::Patient.score_value(), 50);
        assert_eq!(EnemyKind::Ranged.score_value(), 75);
    }
}
