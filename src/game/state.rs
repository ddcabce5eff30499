//! # Simulation State
//!
//! The single owner of every piece of mutable game data.
//!
//! Component systems (combat, AI, progression) are free functions that take
//! `&mut SimulationState`; there is no ambient global state. Entity lists are
//! rebuilt wholesale on every floor transition.

use crate::config::SimulationConfig;
use crate::game::progression::Upgrade;
use crate::generation::utils::create_rng;
use crate::{
    DelveResult, Dungeon, Enemy, EnemyKind, EntityId, EntityIdAllocator, ExploredSet, Item,
    ItemKind, Light, Player, Projectile, Stairs, TileGrid,
};
use glam::Vec3;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Top-level game phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen; waiting for Confirm
    #[default]
    Menu,
    Playing,
    /// Run over; Confirm returns to the menu
    Dead,
    /// Stairs taken; waiting for an upgrade selection
    ChoosingUpgrade,
}

/// Discrete happenings a host drains each frame to drive presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerDamaged {
        amount: i32,
        hp: i32,
    },
    PlayerHealed {
        amount: i32,
        hp: i32,
    },
    EnemyDamaged {
        id: EntityId,
        kind: EnemyKind,
        amount: i32,
        position: Vec3,
    },
    EnemyKilled {
        id: EntityId,
        kind: EnemyKind,
        score: u32,
        position: Vec3,
    },
    ProjectileFired {
        id: EntityId,
        source: EntityId,
        position: Vec3,
    },
    ItemPickedUp {
        id: EntityId,
        kind: ItemKind,
    },
    KeyAcquired,
    DashStarted {
        direction: Vec3,
    },
    FloorEntered {
        floor: u32,
    },
    UpgradeApplied {
        upgrade: Upgrade,
    },
    PlayerDied {
        floor: u32,
        score: u32,
        kills: u32,
    },
}

/// Run statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Ticks that ran game logic (skipped and paused ticks excluded)
    pub ticks_simulated: u64,
    pub enemies_killed: u32,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub items_collected: u32,
    pub projectiles_fired: u32,
    pub upgrades_taken: u32,
    pub deepest_floor: u32,
}

impl GameStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates statistics based on a game event.
    pub fn update_from_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::PlayerDamaged { amount, .. } => {
                self.damage_taken += (*amount).max(0) as u64;
            }
            GameEvent::EnemyDamaged { amount, .. } => {
                self.damage_dealt += (*amount).max(0) as u64;
            }
            GameEvent::EnemyKilled { .. } => {
                self.enemies_killed += 1;
            }
            GameEvent::ProjectileFired { .. } => {
                self.projectiles_fired += 1;
            }
            GameEvent::ItemPickedUp { .. } => {
                self.items_collected += 1;
            }
            GameEvent::UpgradeApplied { .. } => {
                self.upgrades_taken += 1;
            }
            GameEvent::FloorEntered { floor } => {
                self.deepest_floor = self.deepest_floor.max(*floor);
            }
            _ => {}
        }
    }
}

/// The transient message line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    /// Seconds left including the fade-out
    pub remaining: f32,
    /// Length of the fade-out at the end of `remaining`
    pub fade: f32,
}

impl Message {
    /// Opacity in `[0, 1]`: fully opaque until the fade starts.
    pub fn opacity(&self) -> f32 {
        if self.fade <= 0.0 {
            return if self.remaining > 0.0 { 1.0 } else { 0.0 };
        }
        (self.remaining / self.fade).clamp(0.0, 1.0)
    }
}

/// All mutable simulation data for one run.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub config: SimulationConfig,
    pub rng: StdRng,
    pub seed: u64,
    pub phase: GamePhase,
    /// Current floor, counted from 1; 0 before the first run starts
    pub floor: u32,
    pub score: u32,
    pub kills: u32,
    pub dungeon: Dungeon,
    pub explored: ExploredSet,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub items: Vec<Item>,
    pub lights: Vec<Light>,
    pub stairs: Option<Stairs>,
    pub upgrade_offer: Vec<Upgrade>,
    /// Seconds of remaining hit-pause; no game logic runs while positive
    pub hit_pause: f32,
    /// Camera shake magnitude hint for the renderer
    pub shake: f32,
    pub message: Option<Message>,
    pub events: Vec<GameEvent>,
    pub ids: EntityIdAllocator,
    pub statistics: GameStatistics,
}

impl SimulationState {
    /// Creates a state sitting at the menu.
    ///
    /// The config is validated up front; the RNG is seeded from `seed` and is
    /// the only source of randomness for the run.
    pub fn new(config: SimulationConfig, seed: u64) -> DelveResult<Self> {
        config.validate()?;
        let generation = &config.generation;
        let grid = TileGrid::new(generation.width, generation.height, generation.tile_size);
        let explored = ExploredSet::for_grid(&grid);
        let player = Player::new(&config.player);

        Ok(Self {
            rng: create_rng(seed),
            seed,
            phase: GamePhase::Menu,
            floor: 0,
            score: 0,
            kills: 0,
            dungeon: Dungeon {
                grid,
                rooms: Vec::new(),
            },
            explored,
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            items: Vec::new(),
            lights: Vec::new(),
            stairs: None,
            upgrade_offer: Vec::new(),
            hit_pause: 0.0,
            shake: 0.0,
            message: None,
            events: Vec::new(),
            ids: EntityIdAllocator::new(),
            statistics: GameStatistics::new(),
            config,
        })
    }

    pub fn grid(&self) -> &TileGrid {
        &self.dungeon.grid
    }

    /// Records an event for the host and folds it into the statistics.
    pub fn push_event(&mut self, event: GameEvent) {
        self.statistics.update_from_event(&event);
        self.events.push(event);
    }

    /// Takes every pending event.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Replaces the message line.
    pub fn show_message(&mut self, text: impl Into<String>, duration: f32) {
        let fade = self.config.progression.message_fade;
        self.message = Some(Message {
            text: text.into(),
            remaining: duration + fade,
            fade,
        });
    }

    /// Whether a message is still on screen, fading or not.
    pub fn message_visible(&self) -> bool {
        self.message.as_ref().is_some_and(|m| m.remaining > 0.0)
    }

    /// Counts the message down and clears it once fully faded.
    pub fn update_message(&mut self, dt: f32) {
        if let Some(message) = &mut self.message {
            message.remaining -= dt;
            if message.remaining <= 0.0 {
                self.message = None;
            }
        }
    }

    /// Decays the camera shake hint, snapping it to zero when negligible.
    pub fn update_shake(&mut self) {
        let combat = &self.config.combat;
        if self.shake > combat.shake_floor {
            self.shake *= combat.shake_decay;
        } else {
            self.shake = 0.0;
        }
    }

    /// Marks the tiles around the player as explored.
    pub fn explore_around_player(&mut self) {
        let tile = self
            .dungeon
            .grid
            .world_to_tile(self.player.position.x, self.player.position.z);
        self.explored.mark_around(tile, self.config.explore_radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_starts_at_menu() {
        let state = SimulationState::new(SimulationConfig::default(), 7).unwrap();
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.floor, 0);
        assert!(state.enemies.is_empty());
        assert!(state.dungeon.rooms.is_empty());
        assert_eq!(state.grid().width, 42);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimulationConfig::default();
        config.max_frame_delta = 0.0;
        assert!(SimulationState::new(config, 1).is_err());
    }

    #[test]
    fn test_message_lifetime_includes_fade() {
        let mut state = SimulationState::new(SimulationConfig::default(), 7).unwrap();
        state.show_message("KEY ACQUIRED", 1.5);
        state.update_message(1.6);
        assert!(state.message_visible());
        let opacity = state.message.as_ref().map(Message::opacity).unwrap();
        assert!(opacity > 0.0 && opacity < 1.0);

        state.update_message(0.5);
        assert!(!state.message_visible());
        assert!(state.message.is_none());
    }

    #[test]
    fn test_shake_decays_then_snaps() {
        let mut state = SimulationState::new(SimulationConfig::default(), 7).unwrap();
        state.shake = 1.0;
        state.update_shake();
        assert!((state.shake - 0.85).abs() < 1e-6);

        state.shake = 0.03;
        state.update_shake();
        assert_eq!(state.shake, 0.0);
    }

    #[test]
    fn test_events_feed_statistics_and_drain() {
        let mut state = SimulationState::new(SimulationConfig::default(), 7).unwrap();
        state.push_event(GameEvent::PlayerDamaged { amount: 22, hp: 78 });
        state.push_event(GameEvent::FloorEntered { floor: 3 });
        state.push_event(GameEvent::FloorEntered { floor: 2 });

        assert_eq!(state.statistics.damage_taken, 22);
        assert_eq!(state.statistics.deepest_floor, 3);
        assert_eq!(state.take_events().len(), 3);
        assert!(state.take_events().is_empty());
    }
}
