//! # Progression
//!
//! Floor assembly, item pickups, the key-gated stairs and the upgrade offer
//! between floors.

use crate::game::state::{GameEvent, GamePhase, GameStatistics, SimulationState};
use crate::generation::{EncounterGenerator, EnemySpawn, ItemGenerator, ItemLayout};
use crate::utils::math::flat_length;
use crate::{
    DelveError, DelveResult, Dungeon, EntityId, ExploredSet, Generator, Item, ItemKind, Light,
    Player, RoomCorridorGenerator, Stairs,
};
use log::{debug, info};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persistent stat upgrades offered at the stairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Upgrade {
    SharpBlade,
    IronSkin,
    SwiftFeet,
    LongReach,
    Vampiric,
    SecondWind,
}

impl Upgrade {
    /// The full catalog, in display order.
    pub const ALL: [Upgrade; 6] = [
        Upgrade::SharpBlade,
        Upgrade::IronSkin,
        Upgrade::SwiftFeet,
        Upgrade::LongReach,
        Upgrade::Vampiric,
        Upgrade::SecondWind,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Upgrade::SharpBlade => "SHARP BLADE",
            Upgrade::IronSkin => "IRON SKIN",
            Upgrade::SwiftFeet => "SWIFT FEET",
            Upgrade::LongReach => "LONG REACH",
            Upgrade::Vampiric => "VAMPIRIC",
            Upgrade::SecondWind => "SECOND WIND",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Upgrade::SharpBlade => "+20% Damage",
            Upgrade::IronSkin => "+30 Max HP",
            Upgrade::SwiftFeet => "+15% Speed",
            Upgrade::LongReach => "+25% Attack Speed",
            Upgrade::Vampiric => "+8% Lifesteal",
            Upgrade::SecondWind => "Full Heal",
        }
    }

    /// Applies the upgrade to the player's persistent stats.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Player, PlayerTuning, Upgrade};
    ///
    /// let mut player = Player::new(&PlayerTuning::default());
    /// Upgrade::SharpBlade.apply(&mut player);
    /// assert_eq!(player.damage, 26);
    /// ```
    pub fn apply(self, player: &mut Player) {
        match self {
            Upgrade::SharpBlade => player.damage = (player.damage as f32 * 1.2) as i32,
            Upgrade::IronSkin => {
                player.max_hp += 30;
                player.hp = (player.hp + 30).min(player.max_hp);
            }
            Upgrade::SwiftFeet => player.speed_multiplier *= 1.15,
            Upgrade::LongReach => player.attack_speed_multiplier *= 1.25,
            Upgrade::Vampiric => player.lifesteal += 0.08,
            Upgrade::SecondWind => player.hp = player.max_hp,
        }
    }
}

impl fmt::Display for Upgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.description())
    }
}

/// Shuffles the catalog and keeps the first `size` upgrades.
pub fn roll_upgrade_offer(rng: &mut impl rand::Rng, size: usize) -> Vec<Upgrade> {
    let mut pool = Upgrade::ALL.to_vec();
    pool.shuffle(rng);
    pool.truncate(size);
    pool
}

/// Starts a fresh run on floor 1 with default player stats.
pub fn start_game(state: &mut SimulationState) -> DelveResult<()> {
    state.floor = 1;
    state.score = 0;
    state.kills = 0;
    state.player = Player::new(&state.config.player);
    state.statistics = GameStatistics::new();
    info!("Starting a new run (seed {})", state.seed);
    assemble_floor(state)
}

/// A generated floor that has not been installed yet.
struct FloorPlan {
    dungeon: Dungeon,
    layout: ItemLayout,
    spawns: Vec<EnemySpawn>,
}

/// Generates `floor` without touching anything but the RNG.
///
/// The RNG is drawn in a fixed order (rooms, key, potions, torches,
/// enemies) so a seed reproduces the whole floor.
fn plan_floor(state: &mut SimulationState, floor: u32) -> DelveResult<FloorPlan> {
    let generation = &state.config.generation;
    let dungeon = RoomCorridorGenerator::new().generate(generation, floor, &mut state.rng)?;
    let layout = ItemGenerator::new(&dungeon).generate(generation, floor, &mut state.rng)?;
    let spawns = EncounterGenerator::new(&dungeon).generate(generation, floor, &mut state.rng)?;
    dungeon.spawn_room()?;
    Ok(FloorPlan {
        dungeon,
        layout,
        spawns,
    })
}

/// Builds the current floor and drops the player into it.
///
/// Every per-floor list is replaced, never appended to. Nothing changes
/// when generation fails.
pub fn assemble_floor(state: &mut SimulationState) -> DelveResult<()> {
    let plan = plan_floor(state, state.floor)?;
    install_floor(state, plan);
    Ok(())
}

fn install_floor(state: &mut SimulationState, plan: FloorPlan) {
    let FloorPlan {
        dungeon,
        layout,
        spawns,
    } = plan;
    let floor = state.floor;

    state.enemies.clear();
    state.projectiles.clear();
    state.items.clear();
    state.upgrade_offer.clear();
    state.hit_pause = 0.0;

    let grid = &dungeon.grid;
    let spawn_tile = dungeon.rooms[0].center();
    state.player.enter_floor(grid.tile_to_world(spawn_tile));

    state.stairs = Some(Stairs {
        room: layout.stairs_room,
        tile: layout.stairs_tile,
        position: grid.tile_to_world(layout.stairs_tile),
    });

    let key = Item {
        id: state.ids.allocate(),
        kind: ItemKind::Key,
        tile: layout.key_tile,
        position: grid.tile_to_world(layout.key_tile),
    };
    state.items.push(key);
    for &tile in &layout.potion_tiles {
        state.items.push(Item {
            id: state.ids.allocate(),
            kind: ItemKind::Potion,
            tile,
            position: grid.tile_to_world(tile),
        });
    }

    state.lights = layout
        .torch_tiles
        .iter()
        .map(|&tile| Light {
            tile,
            position: grid.tile_to_world(tile),
        })
        .collect();

    for spawn in spawns {
        let enemy = spawn.into_enemy(state.ids.allocate(), &state.config.enemies);
        state.enemies.push(enemy);
    }

    info!(
        "Floor {floor}: {} rooms, {} enemies, {} items, stairs in room {}, key in room {}",
        dungeon.rooms.len(),
        state.enemies.len(),
        state.items.len(),
        layout.stairs_room,
        layout.key_room
    );

    state.explored = ExploredSet::for_grid(&dungeon.grid);
    state.dungeon = dungeon;
    state.explore_around_player();

    state.phase = GamePhase::Playing;
    state.show_message(format!("FLOOR {floor}"), 1.5);
    state.push_event(GameEvent::FloorEntered { floor });
}

/// Picks up every item within reach of the player.
///
/// Returns the number of items collected; with nothing in reach the item
/// list is left untouched.
pub fn check_items(state: &mut SimulationState) -> usize {
    let radius = state.config.progression.pickup_radius;
    let player_position = state.player.position;
    let collected: Vec<(EntityId, ItemKind)> = state
        .items
        .iter()
        .filter(|item| flat_length(item.position - player_position) < radius)
        .map(|item| (item.id, item.kind))
        .collect();

    if collected.is_empty() {
        return 0;
    }
    state
        .items
        .retain(|item| !collected.iter().any(|(id, _)| *id == item.id));

    for &(id, kind) in &collected {
        match kind {
            ItemKind::Potion => {
                let tuning = &state.config.progression;
                let heal =
                    tuning.potion_base_heal + tuning.potion_heal_per_floor * state.floor as i32;
                let healed = state.player.heal(heal);
                debug!("Potion restored {healed} HP");
                state.show_message(format!("+{healed} HP"), 1.0);
                state.push_event(GameEvent::PlayerHealed {
                    amount: healed,
                    hp: state.player.hp,
                });
            }
            ItemKind::Key => {
                state.player.has_key = true;
                debug!("Key acquired on floor {}", state.floor);
                state.show_message("KEY ACQUIRED", 1.5);
                state.push_event(GameEvent::KeyAcquired);
            }
        }
        state.push_event(GameEvent::ItemPickedUp { id, kind });
    }
    collected.len()
}

/// Handles the player standing at the stairs.
///
/// Without the key a reminder is shown (only when no other message is up);
/// with the key an Interact opens the upgrade offer.
pub fn check_stairs(state: &mut SimulationState, interact: bool) {
    let Some(stairs) = state.stairs else {
        return;
    };
    if flat_length(stairs.position - state.player.position) >= state.config.progression.stairs_radius
    {
        return;
    }

    if !state.player.has_key {
        if !state.message_visible() {
            state.show_message("FIND THE KEY", 1.0);
        }
    } else if interact {
        let size = state.config.progression.upgrade_offer_size;
        state.upgrade_offer = roll_upgrade_offer(&mut state.rng, size);
        state.phase = GamePhase::ChoosingUpgrade;
        debug!(
            "Stairs taken on floor {}; offering {:?}",
            state.floor, state.upgrade_offer
        );
    }
}

/// Applies the offered upgrade in `slot` (counted from 0) and descends.
///
/// A slot outside the offer is an [`DelveError::InvalidAction`]. Either
/// error leaves the offer open and the current floor in place.
pub fn choose_upgrade(state: &mut SimulationState, slot: usize) -> DelveResult<Upgrade> {
    if state.phase != GamePhase::ChoosingUpgrade {
        return Err(DelveError::InvalidAction(
            "no upgrade is on offer".to_string(),
        ));
    }
    let upgrade = *state.upgrade_offer.get(slot).ok_or_else(|| {
        DelveError::InvalidAction(format!(
            "upgrade slot {} is outside an offer of {}",
            slot + 1,
            state.upgrade_offer.len()
        ))
    })?;

    let plan = plan_floor(state, state.floor + 1)?;

    upgrade.apply(&mut state.player);
    info!("Upgrade chosen: {upgrade}");
    state.push_event(GameEvent::UpgradeApplied { upgrade });

    state.floor += 1;
    install_floor(state, plan);
    Ok(upgrade)
}
