//! Read-only per-frame view of the simulation for renderers and tooling.

use crate::game::state::{GamePhase, SimulationState};
use crate::{EnemyKind, EnemyState, EntityId, ExploredSet, ItemKind, Light, TileGrid, Upgrade};
use glam::Vec3;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub position: Vec3,
    pub facing: Vec3,
    pub hp: i32,
    pub max_hp: i32,
    pub damage: i32,
    pub speed_multiplier: f32,
    pub attack_speed_multiplier: f32,
    pub lifesteal: f32,
    pub has_key: bool,
    pub invincible: bool,
    pub dashing: bool,
    /// Seconds until the next swing, clamped at zero
    pub attack_cooldown: f32,
    pub dash_cooldown: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub position: Vec3,
    pub facing: Vec3,
    pub hp: i32,
    pub max_hp: i32,
    pub state: EnemyState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub id: EntityId,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub id: EntityId,
    pub kind: ItemKind,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    pub text: String,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeChoice {
    /// 1-based selection slot
    pub slot: u8,
    pub upgrade: Upgrade,
    pub name: &'static str,
    pub description: &'static str,
}

/// Everything a renderer needs to draw one frame.
///
/// Borrows the grid and the explored set instead of cloning them.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot<'a> {
    pub phase: GamePhase,
    pub floor: u32,
    pub score: u32,
    pub kills: u32,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub items: Vec<ItemView>,
    pub lights: &'a [Light],
    pub stairs: Option<Vec3>,
    pub grid: &'a TileGrid,
    pub explored: &'a ExploredSet,
    pub message: Option<MessageView>,
    pub shake: f32,
    pub upgrade_offer: Vec<UpgradeChoice>,
}

impl<'a> FrameSnapshot<'a> {
    pub fn capture(state: &'a SimulationState) -> Self {
        let player = &state.player;
        Self {
            phase: state.phase,
            floor: state.floor,
            score: state.score,
            kills: state.kills,
            player: PlayerView {
                position: player.position,
                facing: player.facing,
                hp: player.hp,
                max_hp: player.max_hp,
                damage: player.damage,
                speed_multiplier: player.speed_multiplier,
                attack_speed_multiplier: player.attack_speed_multiplier,
                lifesteal: player.lifesteal,
                has_key: player.has_key,
                invincible: player.is_invincible(),
                dashing: player.dash.is_active(),
                attack_cooldown: player.attack_cooldown.max(0.0),
                dash_cooldown: player.dash.cooldown.max(0.0),
            },
            enemies: state
                .enemies
                .iter()
                .map(|enemy| EnemyView {
                    id: enemy.id,
                    kind: enemy.kind(),
                    position: enemy.position,
                    facing: enemy.facing,
                    hp: enemy.hp,
                    max_hp: enemy.max_hp,
                    state: enemy.state,
                })
                .collect(),
            projectiles: state
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    id: p.id,
                    position: p.position,
                })
                .collect(),
            items: state
                .items
                .iter()
                .map(|item| ItemView {
                    id: item.id,
                    kind: item.kind,
                    position: item.position,
                })
                .collect(),
            lights: &state.lights,
            stairs: state.stairs.map(|stairs| stairs.position),
            grid: &state.dungeon.grid,
            explored: &state.explored,
            message: state
                .message
                .as_ref()
                .filter(|_| state.message_visible())
                .map(|message| MessageView {
                    text: message.text.clone(),
                    opacity: message.opacity(),
                }),
            shake: state.shake,
            upgrade_offer: state
                .upgrade_offer
                .iter()
                .zip(1u8..)
                .map(|(&upgrade, slot)| UpgradeChoice {
                    slot,
                    upgrade,
                    name: upgrade.name(),
                    description: upgrade.description(),
                })
                .collect(),
        }
    }

    /// Serializes the frame for external tooling.
    pub fn to_json(&self) -> crate::DelveResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimulationConfig;

    #[test]
    fn test_menu_snapshot_is_empty() {
        let state = SimulationState::new(SimulationConfig::default(), 3).unwrap();
        let frame = FrameSnapshot::capture(&state);
        assert_eq!(frame.phase, GamePhase::Menu);
        assert_eq!(frame.floor, 0);
        assert!(frame.enemies.is_empty());
        assert!(frame.stairs.is_none());
        assert!(frame.message.is_none());
    }

    #[test]
    fn test_snapshot_mirrors_floor() {
        let mut state = SimulationState::new(SimulationConfig::default(), 3).unwrap();
        crate::start_game(&mut state).unwrap();
        let frame = FrameSnapshot::capture(&state);

        assert_eq!(frame.phase, GamePhase::Playing);
        assert_eq!(frame.enemies.len(), state.enemies.len());
        assert_eq!(frame.items.len(), state.items.len());
        assert_eq!(frame.stairs, state.stairs.map(|s| s.position));
        assert_eq!(frame.player.hp, 100);
        assert_eq!(
            frame.message.as_ref().map(|m| m.text.as_str()),
            Some("FLOOR 1")
        );
        assert!(frame.explored.explored_count() > 0);
    }

    #[test]
    fn test_upgrade_slots_are_one_based() {
        let mut state = SimulationState::new(SimulationConfig::default(), 3).unwrap();
        state.upgrade_offer = vec![Upgrade::IronSkin, Upgrade::Vampiric];
        let frame = FrameSnapshot::capture(&state);
        assert_eq!(frame.upgrade_offer[0].slot, 1);
        assert_eq!(frame.upgrade_offer[1].upgrade, Upgrade::Vampiric);
        assert_eq!(frame.upgrade_offer[1].name, Upgrade::Vampiric.name());
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = SimulationState::new(SimulationConfig::default(), 3).unwrap();
        let json = FrameSnapshot::capture(&state).to_json().unwrap();
        assert!(json.contains("\"phase\":\"Menu\""));
    }
}
