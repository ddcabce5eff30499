//! # Autopilot
//!
//! A scripted stand-in for a human player, used by the headless runner and
//! by soak tests. Each tick it looks at the state and produces the intents a
//! player would: confirm through menus, fight whatever is in reach, then walk
//! to the key and on to the stairs.

use crate::game::combat::in_melee_reach;
use crate::game::simulation::Simulation;
use crate::game::state::{GamePhase, SimulationState};
use crate::input::{Intent, MoveAxes};
use crate::utils::math::flat_length;
use crate::utils::navigation::find_path;
use crate::{ItemKind, Position};
use glam::Vec3;
use log::debug;

/// World units within which a steering axis counts as lined up.
const STEER_DEADZONE: f32 = 0.25;

/// Inputs chosen for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutopilotInput {
    pub movement: MoveAxes,
    pub intents: Vec<Intent>,
}

/// Path-following player bot.
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Whether the bot is currently driving
    pub enabled: bool,
    /// Remaining tiles of the current route, next tile first
    pub current_path: Vec<Position>,
    /// Tile the current route leads to
    pub target: Option<Position>,
    /// Upgrade slot picked at every stairs, counted from 1
    pub preferred_slot: u8,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new()
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self {
            enabled: true,
            current_path: Vec::new(),
            target: None,
            preferred_slot: 1,
        }
    }

    /// Toggles the bot, dropping any route when it turns off.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.current_path.clear();
            self.target = None;
        }
        self.enabled
    }

    /// Chooses this tick's inputs and feeds them to `sim`.
    pub fn drive(&mut self, sim: &mut Simulation) {
        let input = self.plan(sim.state());
        sim.set_movement(input.movement.x, input.movement.z);
        for intent in input.intents {
            sim.press(intent);
        }
    }

    /// Chooses inputs for the current state without touching it.
    pub fn plan(&mut self, state: &SimulationState) -> AutopilotInput {
        if !self.enabled {
            return AutopilotInput::default();
        }

        match state.phase {
            GamePhase::Menu | GamePhase::Dead => {
                self.current_path.clear();
                self.target = None;
                AutopilotInput {
                    movement: MoveAxes::default(),
                    intents: vec![Intent::Confirm],
                }
            }
            GamePhase::ChoosingUpgrade => AutopilotInput {
                movement: MoveAxes::default(),
                intents: vec![Intent::Select(self.preferred_slot)],
            },
            GamePhase::Playing => self.plan_playing(state),
        }
    }

    fn plan_playing(&mut self, state: &SimulationState) -> AutopilotInput {
        if let Some(input) = self.plan_fight(state) {
            return input;
        }

        let player = &state.player;
        let mut intents = Vec::new();
        let goal = if player.has_key {
            let stairs = state.stairs.map(|s| (s.tile, s.position));
            if let Some((_, position)) = stairs {
                if flat_length(position - player.position) < state.config.progression.stairs_radius
                {
                    intents.push(Intent::Interact);
                }
            }
            stairs.map(|(tile, _)| tile)
        } else {
            state
                .items
                .iter()
                .find(|item| item.kind == ItemKind::Key)
                .map(|item| item.tile)
        };

        let movement = match goal {
            Some(goal) => self.follow_route(state, goal),
            None => MoveAxes::default(),
        };
        AutopilotInput { movement, intents }
    }

    /// Swings at the closest enemy in reach, turning to face it first.
    fn plan_fight(&self, state: &SimulationState) -> Option<AutopilotInput> {
        let player = &state.player;
        let tuning = &state.config.player;
        let closest = state
            .enemies
            .iter()
            .map(|enemy| (flat_length(enemy.position - player.position), enemy))
            .filter(|(distance, _)| *distance < tuning.attack_range)
            .min_by(|a, b| a.0.total_cmp(&b.0))?
            .1;

        let facing_it = in_melee_reach(
            player.position,
            player.facing,
            closest.position,
            tuning.attack_range,
            tuning.attack_arc,
        );
        if !facing_it {
            return Some(AutopilotInput {
                movement: steer(player.position, closest.position),
                intents: Vec::new(),
            });
        }

        let intents = if player.attack_cooldown <= 0.0 {
            vec![Intent::Attack]
        } else {
            Vec::new()
        };
        Some(AutopilotInput {
            movement: MoveAxes::default(),
            intents,
        })
    }

    /// Steers toward the next tile of a route to `goal`, re-planning when
    /// the goal changes or the player strays off the route.
    fn follow_route(&mut self, state: &SimulationState, goal: Position) -> MoveAxes {
        let grid = state.grid();
        let player_position = state.player.position;
        let here = grid.world_to_tile(player_position.x, player_position.z);

        if let Some(index) = self.current_path.iter().position(|&p| p == here) {
            self.current_path.drain(..=index);
        }

        let off_route = self
            .current_path
            .first()
            .is_some_and(|&next| next.manhattan_distance(here) > 1);
        if self.target != Some(goal) || off_route || (self.current_path.is_empty() && here != goal)
        {
            self.target = Some(goal);
            self.current_path = find_path(grid, here, goal)
                .map(|path| path.into_iter().skip(1).collect())
                .unwrap_or_default();
            debug!(
                "Autopilot routed {} tiles to ({}, {})",
                self.current_path.len(),
                goal.x,
                goal.y
            );
        }

        let waypoint = self.current_path.first().copied().unwrap_or(goal);
        steer(player_position, grid.tile_to_world(waypoint))
    }
}

/// Movement axes that head from `from` toward `to` on the flat plane.
fn steer(from: Vec3, to: Vec3) -> MoveAxes {
    let axis = |delta: f32| {
        if delta > STEER_DEADZONE {
            1
        } else if delta < -STEER_DEADZONE {
            -1
        } else {
            0
        }
    };
    MoveAxes::new(axis(to.x - from.x), axis(to.z - from.z))
}
