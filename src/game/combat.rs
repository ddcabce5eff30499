//! # Combat & Damage
//!
//! Melee arc resolution, knockback, lifesteal, kill accounting and damage
//! to the player.

use crate::config::CombatTuning;
use crate::game::state::{GameEvent, GamePhase, SimulationState};
use crate::utils::math::{flat, flat_length, flat_normalize, heading_difference};
use crate::{Enemy, EnemyState, TileGrid};
use glam::Vec3;
use log::{debug, info};
use rand::Rng;

/// Whether `target` lies inside a melee swing from `origin`.
///
/// Both boundaries are exclusive: a target exactly `range` away, or exactly
/// half the arc off the facing, is missed.
///
/// # Examples
///
/// ```
/// use delve::in_melee_reach;
/// use glam::Vec3;
/// use std::f32::consts::PI;
///
/// let facing = Vec3::new(0.0, 0.0, -1.0);
/// assert!(in_melee_reach(Vec3::ZERO, facing, Vec3::new(0.0, 0.0, -2.0), 2.8, PI * 0.7));
/// assert!(!in_melee_reach(Vec3::ZERO, facing, Vec3::new(0.0, 0.0, 2.0), 2.8, PI * 0.7));
/// ```
pub fn in_melee_reach(origin: Vec3, facing: Vec3, target: Vec3, range: f32, arc: f32) -> bool {
    let offset = flat(target - origin);
    if flat_length(offset) >= range {
        return false;
    }
    heading_difference(facing, offset) < arc / 2.0
}

/// Health returned by lifesteal for one hit, truncated toward zero.
pub fn lifesteal_amount(damage: i32, fraction: f32) -> i32 {
    (damage as f32 * fraction) as i32
}

/// Swings the player's weapon at every enemy in reach.
///
/// Resets the attack cooldown, rolls damage per enemy hit, applies knockback
/// and stagger, heals through lifesteal and removes killed enemies. Any hit
/// starts a hit-pause and a camera shake. Returns the number of enemies hit.
pub fn player_attack(state: &mut SimulationState) -> usize {
    let tuning = &state.config.player;
    let combat = &state.config.combat;
    let player = &mut state.player;

    player.attack_cooldown = tuning.attack_cooldown / player.attack_speed_multiplier;

    let (low, high) = combat.damage_roll;
    let mut hits = 0;
    let mut events = Vec::new();

    for enemy in state.enemies.iter_mut() {
        if !in_melee_reach(
            player.position,
            player.facing,
            enemy.position,
            tuning.attack_range,
            tuning.attack_arc,
        ) {
            continue;
        }

        let damage = player.damage + state.rng.gen_range(low..=high);
        enemy.hp -= damage;
        enemy.knockback = flat_normalize(enemy.position - player.position) * combat.knockback;
        enemy.state = EnemyState::Hurt;
        enemy.hurt_timer = combat.hurt_duration;
        hits += 1;
        events.push(GameEvent::EnemyDamaged {
            id: enemy.id,
            kind: enemy.kind(),
            amount: damage,
            position: enemy.position,
        });

        if player.lifesteal > 0.0 {
            let healed = player.heal(lifesteal_amount(damage, player.lifesteal));
            if healed > 0 {
                events.push(GameEvent::PlayerHealed {
                    amount: healed,
                    hp: player.hp,
                });
            }
        }

        if enemy.is_dead() {
            let kind = enemy.kind();
            state.score += kind.score_value();
            state.kills += 1;
            debug!("Enemy {} ({kind:?}) killed", enemy.id);
            events.push(GameEvent::EnemyKilled {
                id: enemy.id,
                kind,
                score: kind.score_value(),
                position: enemy.position,
            });
        }
    }

    state.enemies.retain(|enemy| !enemy.is_dead());

    if hits > 0 {
        state.shake = combat.hit_shake;
        state.hit_pause = combat.hit_pause;
    }
    for event in events {
        state.push_event(event);
    }
    hits
}

/// Applies damage to the player unless they are invincible.
///
/// Returns whether the damage landed. Damage that drops health to zero ends
/// the run.
pub fn damage_player(state: &mut SimulationState, amount: i32) -> bool {
    let player = &mut state.player;
    if player.is_invincible() {
        return false;
    }

    player.hp = (player.hp - amount).max(0);
    player.invincibility = state.config.combat.damage_invincibility;
    let hp = player.hp;
    state.shake = state.config.combat.damage_shake;
    state.push_event(GameEvent::PlayerDamaged { amount, hp });

    if hp == 0 {
        state.phase = GamePhase::Dead;
        info!(
            "Player died on floor {} with score {} and {} kills",
            state.floor, state.score, state.kills
        );
        state.push_event(GameEvent::PlayerDied {
            floor: state.floor,
            score: state.score,
            kills: state.kills,
        });
    }
    true
}

/// Slides an enemy along its knockback velocity and decays it.
///
/// Velocities at or below the halt threshold are left untouched.
pub fn integrate_knockback(enemy: &mut Enemy, grid: &TileGrid, combat: &CombatTuning, dt: f32) {
    if flat_length(enemy.knockback) <= combat.knockback_halt {
        return;
    }
    enemy.position = grid.slide(enemy.position, enemy.knockback * dt);
    enemy.knockback *= combat.knockback_decay;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Behavior, EnemyKind, EnemyTuning, EntityId, Position, SimulationConfig, TileType,
    };
    use std::f32::consts::PI;

    fn enemy_at(position: Vec3) -> Enemy {
        Enemy {
            id: EntityId(1),
            behavior: Behavior::for_kind(EnemyKind::Rusher, &EnemyTuning::default()),
            position,
            facing: Vec3::new(0.0, 0.0, -1.0),
            hp: 45,
            max_hp: 45,
            radius: 0.6,
            speed: 3.5,
            damage: 10,
            attack_range: 1.5,
            attack_cooldown: 0.0,
            knockback: Vec3::ZERO,
            state: EnemyState::Chasing,
            hurt_timer: 0.0,
            seen_player: true,
        }
    }

    /// A state with the player at the origin facing -z and the given enemies.
    fn arena(enemies: Vec<Enemy>) -> SimulationState {
        let mut state = SimulationState::new(SimulationConfig::default(), 77).unwrap();
        state.phase = GamePhase::Playing;
        state.player.position = Vec3::ZERO;
        state.player.facing = Vec3::new(0.0, 0.0, -1.0);
        state.enemies = enemies;
        state
    }

    fn with_id(mut enemy: Enemy, id: u32) -> Enemy {
        enemy.id = EntityId(id);
        enemy
    }

    fn open_grid() -> TileGrid {
        let mut grid = TileGrid::new(20, 20, 2.0);
        for y in 1..19 {
            for x in 1..19 {
                grid.set(Position::new(x, y), TileType::Floor);
            }
        }
        grid
    }

    #[test]
    fn test_melee_range_boundary_is_exclusive() {
        let facing = Vec3::new(0.0, 0.0, -1.0);
        assert!(!in_melee_reach(
            Vec3::ZERO,
            facing,
            Vec3::new(0.0, 0.0, -2.5),
            2.5,
            PI * 0.7
        ));
        assert!(in_melee_reach(
            Vec3::ZERO,
            facing,
            Vec3::new(0.0, 0.0, -2.49),
            2.5,
            PI * 0.7
        ));
    }

    #[test]
    fn test_melee_arc_boundary_is_exclusive() {
        let facing = Vec3::new(0.0, 0.0, -1.0);
        // Target exactly 90 degrees off the facing with a 180 degree arc
        assert!(!in_melee_reach(
            Vec3::ZERO,
            facing,
            Vec3::new(-2.0, 0.0, 0.0),
            2.8,
            PI
        ));
        assert!(in_melee_reach(
            Vec3::ZERO,
            facing,
            Vec3::new(-2.0, 0.0, -0.1),
            2.8,
            PI
        ));
    }

    #[test]
    fn test_melee_ignores_height() {
        let facing = Vec3::new(0.0, 0.0, -1.0);
        assert!(in_melee_reach(
            Vec3::ZERO,
            facing,
            Vec3::new(0.0, 50.0, -1.0),
            2.8,
            PI * 0.7
        ));
    }

    #[test]
    fn test_lifesteal_truncates() {
        assert_eq!(lifesteal_amount(22, 0.08), 1);
        assert_eq!(lifesteal_amount(12, 0.08), 0);
        assert_eq!(lifesteal_amount(25, 0.16), 4);
    }

    #[test]
    fn test_knockback_decays_geometrically() {
        let grid = open_grid();
        let combat = CombatTuning::default();
        let mut enemy = enemy_at(Vec3::new(18.0, 0.0, 18.0));
        enemy.knockback = Vec3::new(8.0, 0.0, 0.0);

        for n in 1..=5 {
            integrate_knockback(&mut enemy, &grid, &combat, 1.0 / 60.0);
            let expected = 8.0 * 0.85_f32.powi(n);
            assert!((enemy.knockback.length() - expected).abs() < 1e-4);
        }
        assert!(enemy.position.x > 18.0);
    }

    #[test]
    fn test_knockback_halts_below_threshold() {
        let grid = open_grid();
        let combat = CombatTuning::default();
        let start = Vec3::new(18.0, 0.0, 18.0);
        let mut enemy = enemy_at(start);
        enemy.knockback = Vec3::new(0.4, 0.0, 0.0);

        integrate_knockback(&mut enemy, &grid, &combat, 1.0 / 60.0);
        assert_eq!(enemy.knockback, Vec3::new(0.4, 0.0, 0.0));
        assert_eq!(enemy.position, start);
    }

    #[test]
    fn test_knockback_blocked_by_wall() {
        let grid = open_grid();
        let combat = CombatTuning::default();
        let start = Vec3::new(2.0, 0.0, 10.0);
        let mut enemy = enemy_at(start);
        enemy.knockback = Vec3::new(-200.0, 0.0, 0.0);

        integrate_knockback(&mut enemy, &grid, &combat, 0.1);
        assert_eq!(enemy.position, start);
        assert!(enemy.knockback.x > -200.0);
    }

    #[test]
    fn test_attack_hits_enemy_in_front() {
        let mut state = arena(vec![enemy_at(Vec3::new(0.0, 0.0, -1.0))]);

        assert_eq!(player_attack(&mut state), 1);
        let enemy = &state.enemies[0];
        assert!((20..=25).contains(&enemy.hp), "hp {}", enemy.hp);
        assert_eq!(enemy.knockback, Vec3::new(0.0, 0.0, -8.0));
        assert_eq!(enemy.state, EnemyState::Hurt);
        assert!((enemy.hurt_timer - 0.2).abs() < 1e-6);
        assert!((state.hit_pause - 0.04).abs() < 1e-6);
        assert!((state.shake - 0.4).abs() < 1e-6);
        assert!((state.player.attack_cooldown - 0.35).abs() < 1e-6);

        let events = state.take_events();
        assert!(matches!(
            events.as_slice(),
            [GameEvent::EnemyDamaged { id: EntityId(1), amount, .. }] if (20..=25).contains(amount)
        ));
    }

    #[test]
    fn test_attack_misses_enemy_behind() {
        let mut state = arena(vec![enemy_at(Vec3::new(0.0, 0.0, 1.0))]);
        state.player.attack_cooldown = -0.1;

        assert_eq!(player_attack(&mut state), 0);
        let enemy = &state.enemies[0];
        assert_eq!(enemy.hp, 45);
        assert_eq!(enemy.state, EnemyState::Chasing);
        assert_eq!(enemy.knockback, Vec3::ZERO);
        assert_eq!(state.hit_pause, 0.0);
        assert_eq!(state.shake, 0.0);
        assert!((state.player.attack_cooldown - 0.35).abs() < 1e-6);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_attack_knocks_back_away_from_player() {
        let mut state = arena(vec![enemy_at(Vec3::new(1.0, 0.0, -1.0))]);
        player_attack(&mut state);

        let knockback = state.enemies[0].knockback;
        let expected = Vec3::new(1.0, 0.0, -1.0).normalize() * 8.0;
        assert!((knockback - expected).length() < 1e-5);
        assert_eq!(knockback.y, 0.0);
    }

    #[test]
    fn test_attack_hits_every_enemy_in_the_arc() {
        let mut state = arena(vec![
            with_id(enemy_at(Vec3::new(-0.8, 0.0, -1.5)), 1),
            with_id(enemy_at(Vec3::new(0.8, 0.0, -1.5)), 2),
            with_id(enemy_at(Vec3::new(0.0, 0.0, 1.5)), 3),
        ]);

        assert_eq!(player_attack(&mut state), 2);
        let hurt: Vec<EntityId> = state
            .enemies
            .iter()
            .filter(|enemy| enemy.state == EnemyState::Hurt)
            .map(|enemy| enemy.id)
            .collect();
        assert_eq!(hurt, vec![EntityId(1), EntityId(2)]);
    }

    #[test]
    fn test_killing_blow_scores_and_removes() {
        let mut rusher = with_id(enemy_at(Vec3::new(0.0, 0.0, -1.0)), 1);
        rusher.hp = 1;
        let mut patient = with_id(enemy_at(Vec3::new(0.5, 0.0, -1.0)), 2);
        patient.behavior = Behavior::for_kind(EnemyKind::Patient, &EnemyTuning::default());
        patient.hp = 1;
        let mut ranged = with_id(enemy_at(Vec3::new(-0.5, 0.0, -1.0)), 3);
        ranged.behavior = Behavior::for_kind(EnemyKind::Ranged, &EnemyTuning::default());
        ranged.hp = 1;
        let survivor = with_id(enemy_at(Vec3::new(0.0, 0.0, 2.0)), 4);
        let mut state = arena(vec![rusher, patient, ranged, survivor]);

        assert_eq!(player_attack(&mut state), 3);
        assert_eq!(state.score, 25 + 50 + 75);
        assert_eq!(state.kills, 3);
        assert_eq!(state.statistics.enemies_killed, 3);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].id, EntityId(4));

        let killed: Vec<(EntityId, u32)> = state
            .take_events()
            .into_iter()
            .filter_map(|event| match event {
                GameEvent::EnemyKilled { id, score, .. } => Some((id, score)),
                _ => None,
            })
            .collect();
        assert_eq!(
            killed,
            vec![(EntityId(1), 25), (EntityId(2), 50), (EntityId(3), 75)]
        );
    }

    #[test]
    fn test_lifesteal_heals_on_hit() {
        let mut state = arena(vec![enemy_at(Vec3::new(0.0, 0.0, -1.0))]);
        state.player.hp = 50;
        state.player.lifesteal = 0.5;

        player_attack(&mut state);
        let dealt = 45 - state.enemies[0].hp;
        assert_eq!(state.player.hp, 50 + dealt / 2);
        assert!(state
            .take_events()
            .iter()
            .any(|event| matches!(
                event,
                GameEvent::PlayerHealed { hp, .. } if *hp == 50 + dealt / 2
            )));
    }

    #[test]
    fn test_lifesteal_needs_a_hit() {
        let mut state = arena(vec![enemy_at(Vec3::new(0.0, 0.0, 1.0))]);
        state.player.hp = 50;
        state.player.lifesteal = 0.5;

        player_attack(&mut state);
        assert_eq!(state.player.hp, 50);
    }
}
