//! # Simulation Loop
//!
//! The [`Simulation`] controller owns the [`SimulationState`] and the input
//! latch, and advances both one tick at a time.
//!
//! A Playing tick runs in a fixed order: player movement and dash,
//! exploration, the player's attack, invincibility, camera shake, enemies,
//! projectiles, item pickups and finally the stairs.

use crate::config::SimulationConfig;
use crate::game::ai::{update_enemies, update_projectiles};
use crate::game::combat::player_attack;
use crate::game::progression::{check_items, check_stairs, choose_upgrade, start_game};
use crate::game::snapshot::FrameSnapshot;
use crate::game::state::{GameEvent, GamePhase, SimulationState};
use crate::input::{InputState, Intent, MoveAxes, PressedIntents};
use crate::utils::math::{flat_length, flat_normalize};
use crate::{DelveError, DelveResult};
use log::{info, trace, warn};

/// What a call to [`Simulation::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The delta was out of range; nothing ran and no input was consumed
    Skipped,
    /// A hit-pause swallowed the tick; input stays latched
    Paused,
    /// Game logic ran and the latched intents were consumed
    Advanced,
}

/// Fixed-delta simulation controller.
///
/// # Examples
///
/// ```
/// use delve::{GamePhase, Intent, Simulation, SimulationConfig};
///
/// let mut sim = Simulation::new(SimulationConfig::default(), 1234).unwrap();
/// sim.press(Intent::Confirm);
/// sim.tick(1.0 / 60.0).unwrap();
/// assert_eq!(sim.state().phase, GamePhase::Playing);
/// assert_eq!(sim.state().floor, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    state: SimulationState,
    input: InputState,
}

impl Simulation {
    pub fn new(config: SimulationConfig, seed: u64) -> DelveResult<Self> {
        Ok(Self {
            state: SimulationState::new(config, seed)?,
            input: InputState::new(),
        })
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Mutable access for hosts and tests that stage scenarios.
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    /// Sets the held movement axes.
    pub fn set_movement(&mut self, x: i8, z: i8) {
        self.input.set_movement(MoveAxes::new(x, z));
    }

    /// Latches a one-shot intent for the next advancing tick.
    pub fn press(&mut self, intent: Intent) {
        self.input.press(intent);
    }

    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot::capture(&self.state)
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.state.take_events()
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Errors only when a new floor cannot be generated; an invalid upgrade
    /// selection is logged and ignored.
    pub fn tick(&mut self, dt: f32) -> DelveResult<TickOutcome> {
        let state = &mut self.state;
        if !(0.0..=state.config.max_frame_delta).contains(&dt) {
            trace!("Skipping tick with delta {dt}");
            return Ok(TickOutcome::Skipped);
        }

        state.update_message(dt);
        if state.hit_pause > 0.0 {
            state.hit_pause -= dt;
            return Ok(TickOutcome::Paused);
        }

        let pressed = self.input.drain();
        state.statistics.ticks_simulated += 1;

        match state.phase {
            GamePhase::Menu => {
                if pressed.contains(Intent::Confirm) {
                    start_game(state)?;
                }
            }
            GamePhase::Playing => update_playing(state, self.input.movement, &pressed, dt),
            GamePhase::Dead => {
                if pressed.contains(Intent::Confirm) {
                    info!("Returning to menu");
                    state.phase = GamePhase::Menu;
                }
            }
            GamePhase::ChoosingUpgrade => {
                if let Some(slot) = pressed.selection() {
                    let chosen = match (slot as usize).checked_sub(1) {
                        Some(index) => choose_upgrade(state, index).map(|_| ()),
                        None => Err(DelveError::InvalidAction(
                            "upgrade slots start at 1".to_string(),
                        )),
                    };
                    match chosen {
                        Ok(()) => {}
                        Err(DelveError::InvalidAction(reason)) => {
                            warn!("Ignoring upgrade selection {slot}: {reason}");
                        }
                        Err(err) => return Err(err),
                    }
                }
            }
        }

        Ok(TickOutcome::Advanced)
    }
}

/// One Playing tick. Stops early once the phase changes.
fn update_playing(
    state: &mut SimulationState,
    movement: MoveAxes,
    pressed: &PressedIntents,
    dt: f32,
) {
    move_player(state, movement, pressed.contains(Intent::Dash), dt);
    state.explore_around_player();

    state.player.attack_cooldown -= dt;
    if pressed.contains(Intent::Attack) && state.player.attack_cooldown <= 0.0 {
        player_attack(state);
    }

    if state.player.invincibility > 0.0 {
        state.player.invincibility -= dt;
    }
    state.update_shake();

    update_enemies(state, dt);
    if state.phase != GamePhase::Playing {
        return;
    }
    update_projectiles(state, dt);
    if state.phase != GamePhase::Playing {
        return;
    }
    check_items(state);
    check_stairs(state, pressed.contains(Intent::Interact));
}

/// Walks or dashes the player with per-axis wall sliding.
fn move_player(state: &mut SimulationState, movement: MoveAxes, dash_pressed: bool, dt: f32) {
    let tuning = &state.config.player;
    let player = &mut state.player;
    let mut direction = movement.to_vector();

    player.dash.cooldown -= dt;
    if dash_pressed
        && player.dash.cooldown <= 0.0
        && (!movement.is_idle() || flat_length(player.facing) > 0.1)
    {
        player.dash.remaining = tuning.dash_duration;
        player.dash.cooldown = tuning.dash_cooldown;
        player.dash.direction = if movement.is_idle() {
            flat_normalize(player.facing)
        } else {
            flat_normalize(direction)
        };
        let event = GameEvent::DashStarted {
            direction: player.dash.direction,
        };
        state.push_event(event);
    }

    let tuning = &state.config.player;
    let player = &mut state.player;
    let speed = if player.dash.is_active() {
        player.dash.remaining -= dt;
        direction = player.dash.direction;
        player.invincibility = player
            .invincibility
            .max(state.config.combat.dash_invincibility);
        tuning.dash_speed
    } else {
        tuning.speed * player.speed_multiplier
    };

    if direction.x == 0.0 && direction.z == 0.0 {
        return;
    }
    player.position = state
        .dungeon
        .grid
        .slide(player.position, direction * speed * dt);
    if !player.dash.is_active() {
        player.facing = flat_normalize(direction);
    }
}
