//! # Enemy AI
//!
//! Per-kind decision making and the per-tick enemy and projectile updates.
//!
//! Every enemy carries a [`Behavior`]. Each tick the shared update runs the
//! parts common to all kinds (cooldowns, knockback, stagger, detection,
//! facing) and then asks the behavior for a [`Decision`]: an optional
//! movement direction and an optional attack. Attacks are collected and
//! resolved against the player after every enemy has moved.

use crate::config::{CombatTuning, EnemyTuning};
use crate::game::combat::{damage_player, integrate_knockback};
use crate::game::state::{GameEvent, SimulationState};
use crate::utils::math::{flat, flat_length, flat_normalize, normalize_or_zero};
use crate::{Enemy, EnemyKind, EnemyState, EntityId, Projectile, TileGrid};
use glam::Vec3;
use log::trace;
use serde::{Deserialize, Serialize};

/// Seconds before a freshly spawned ranged enemy may fire.
pub const RANGED_FIRST_SHOT_DELAY: f32 = 2.0;

/// Contact attacker that closes in and strikes on a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeleeBehavior {
    /// Cooldown applied after each strike
    pub strike_interval: f32,
}

/// Caster that holds a stand-off band and fires projectiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangedBehavior {
    /// Seconds until the next shot may fire
    pub shot_timer: f32,
}

/// Closed set of enemy behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Rusher(MeleeBehavior),
    Patient(MeleeBehavior),
    Ranged(RangedBehavior),
}

/// Everything a behavior may look at when deciding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub position: Vec3,
    pub player_position: Vec3,
    /// Flat vector from the enemy to the player
    pub to_player: Vec3,
    /// Flat distance to the player
    pub distance: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
    pub damage: i32,
}

/// Per-tick inputs shared by every enemy.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub dt: f32,
    pub floor: u32,
    pub tuning: &'a EnemyTuning,
}

/// An attack an enemy commits to this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyAction {
    /// Contact damage; the attacker's cooldown resets to `cooldown`
    Strike { damage: i32, cooldown: f32 },
    /// Launch a projectile
    Fire {
        origin: Vec3,
        velocity: Vec3,
        damage: i32,
    },
}

/// Outcome of one behavior decision.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Decision {
    /// Flat unit direction to walk in at the enemy's speed
    pub movement: Option<Vec3>,
    pub action: Option<EnemyAction>,
}

impl Behavior {
    /// Fresh behavior for a newly spawned enemy of `kind`.
    pub fn for_kind(kind: EnemyKind, tuning: &EnemyTuning) -> Self {
        match kind {
            EnemyKind::Rusher => Behavior::Rusher(MeleeBehavior {
                strike_interval: tuning.rusher_strike_interval,
            }),
            EnemyKind::Patient => Behavior::Patient(MeleeBehavior {
                strike_interval: tuning.patient_strike_interval,
            }),
            EnemyKind::Ranged => Behavior::Ranged(RangedBehavior {
                shot_timer: RANGED_FIRST_SHOT_DELAY,
            }),
        }
    }

    pub fn kind(&self) -> EnemyKind {
        match self {
            Behavior::Rusher(_) => EnemyKind::Rusher,
            Behavior::Patient(_) => EnemyKind::Patient,
            Behavior::Ranged(_) => EnemyKind::Ranged,
        }
    }

    /// Chooses movement and attack for an enemy that has seen the player.
    pub fn decide(&mut self, perception: &Perception, ctx: &DecisionContext) -> Decision {
        match self {
            Behavior::Rusher(melee) | Behavior::Patient(melee) => melee.decide(perception),
            Behavior::Ranged(ranged) => ranged.decide(perception, ctx),
        }
    }
}

impl MeleeBehavior {
    fn decide(&self, perception: &Perception) -> Decision {
        if perception.distance > perception.attack_range {
            Decision {
                movement: Some(flat_normalize(perception.to_player)),
                action: None,
            }
        } else if perception.attack_cooldown <= 0.0 {
            Decision {
                movement: None,
                action: Some(EnemyAction::Strike {
                    damage: perception.damage,
                    cooldown: self.strike_interval,
                }),
            }
        } else {
            Decision::default()
        }
    }
}

impl RangedBehavior {
    /// Delay between shots on a given floor.
    ///
    /// ```
    /// use delve::game::ai::RangedBehavior;
    ///
    /// assert!((RangedBehavior::reload_time(1) - 2.4).abs() < 1e-6);
    /// assert_eq!(RangedBehavior::reload_time(20), 1.2);
    /// ```
    pub fn reload_time(floor: u32) -> f32 {
        (2.5 - floor as f32 * 0.1).max(1.2)
    }

    fn decide(&mut self, perception: &Perception, ctx: &DecisionContext) -> Decision {
        let tuning = ctx.tuning;
        let movement = if perception.distance < tuning.ranged_retreat_distance {
            Some(flat_normalize(-perception.to_player))
        } else if perception.distance > tuning.ranged_approach_distance {
            Some(flat_normalize(perception.to_player))
        } else {
            None
        };

        self.shot_timer -= ctx.dt;
        let action = if self.shot_timer <= 0.0 && perception.distance < tuning.ranged_fire_range {
            let origin = perception.position + Vec3::Y * tuning.projectile_spawn_height;
            let target = perception.player_position + Vec3::Y * tuning.projectile_aim_height;
            self.shot_timer = Self::reload_time(ctx.floor);
            Some(EnemyAction::Fire {
                origin,
                velocity: normalize_or_zero(target - origin) * tuning.projectile_speed,
                damage: perception.damage,
            })
        } else {
            None
        };

        Decision { movement, action }
    }
}

/// Runs one enemy's tick and returns the attack it commits to, if any.
fn step_enemy(
    enemy: &mut Enemy,
    grid: &TileGrid,
    player_position: Vec3,
    combat: &CombatTuning,
    ctx: &DecisionContext,
) -> Option<EnemyAction> {
    enemy.attack_cooldown -= ctx.dt;
    integrate_knockback(enemy, grid, combat, ctx.dt);

    if enemy.state == EnemyState::Hurt {
        enemy.hurt_timer -= ctx.dt;
        if enemy.hurt_timer <= 0.0 {
            enemy.state = EnemyState::Chasing;
        }
        return None;
    }

    let to_player = flat(player_position - enemy.position);
    let distance = flat_length(to_player);
    if distance < ctx.tuning.detection_radius {
        enemy.seen_player = true;
    }
    if !enemy.seen_player {
        return None;
    }

    enemy.facing = flat_normalize(to_player);

    let perception = Perception {
        position: enemy.position,
        player_position,
        to_player,
        distance,
        attack_range: enemy.attack_range,
        attack_cooldown: enemy.attack_cooldown,
        damage: enemy.damage,
    };
    let decision = enemy.behavior.decide(&perception, ctx);

    if let Some(direction) = decision.movement {
        enemy.position = grid.slide(enemy.position, direction * enemy.speed * ctx.dt);
    }
    if let Some(EnemyAction::Strike { cooldown, .. }) = decision.action {
        enemy.attack_cooldown = cooldown;
    }
    enemy.state = EnemyState::Chasing;

    decision.action
}

/// Advances every enemy one tick and resolves their attacks in list order.
pub fn update_enemies(state: &mut SimulationState, dt: f32) {
    let player_position = state.player.position;
    let mut actions: Vec<(EntityId, EnemyAction)> = Vec::new();

    let ctx = DecisionContext {
        dt,
        floor: state.floor,
        tuning: &state.config.enemies,
    };
    for enemy in state.enemies.iter_mut() {
        if let Some(action) = step_enemy(
            enemy,
            &state.dungeon.grid,
            player_position,
            &state.config.combat,
            &ctx,
        ) {
            actions.push((enemy.id, action));
        }
    }

    for (source, action) in actions {
        match action {
            EnemyAction::Strike { damage, .. } => {
                trace!("Enemy {source} strikes for {damage}");
                damage_player(state, damage);
            }
            EnemyAction::Fire {
                origin,
                velocity,
                damage,
            } => {
                let id = state.ids.allocate();
                state.projectiles.push(Projectile {
                    id,
                    position: origin,
                    velocity,
                    lifetime: state.config.enemies.projectile_lifetime,
                    damage,
                });
                state.push_event(GameEvent::ProjectileFired {
                    id,
                    source,
                    position: origin,
                });
            }
        }
    }
}

/// Advances projectiles and removes the ones that hit, struck a wall or expired.
pub fn update_projectiles(state: &mut SimulationState, dt: f32) {
    let hit_radius = state.config.enemies.projectile_hit_radius;
    let mut spent: Vec<EntityId> = Vec::new();

    for index in 0..state.projectiles.len() {
        let projectile = &mut state.projectiles[index];
        projectile.lifetime -= dt;
        projectile.position += projectile.velocity * dt;
        let (id, position, lifetime, damage) = (
            projectile.id,
            projectile.position,
            projectile.lifetime,
            projectile.damage,
        );

        if flat_length(position - state.player.position) < hit_radius
            && !state.player.is_invincible()
        {
            damage_player(state, damage);
            spent.push(id);
        } else if !state.dungeon.grid.is_walkable(position.x, position.z) || lifetime <= 0.0 {
            spent.push(id);
        }
    }

    if !spent.is_empty() {
        state.projectiles.retain(|p| !spent.contains(&p.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::GamePhase;
    use crate::{EnemySpawn, Position, SimulationConfig, TileType};

    const DT: f32 = 1.0 / 60.0;

    /// A Playing state on an open 20x20 floor with the player at its center.
    fn arena() -> SimulationState {
        let mut state = SimulationState::new(SimulationConfig::default(), 5).unwrap();
        let mut grid = TileGrid::new(20, 20, 2.0);
        for y in 1..19 {
            for x in 1..19 {
                grid.set(Position::new(x, y), TileType::Floor);
            }
        }
        state.dungeon.grid = grid;
        state.phase = GamePhase::Playing;
        state.floor = 1;
        state.player.position = Vec3::new(20.0, 0.0, 20.0);
        state
    }

    fn rusher(state: &mut SimulationState, position: Vec3) -> Enemy {
        let spawn = EnemySpawn {
            kind: EnemyKind::Rusher,
            room: 1,
            tile: state.grid().world_to_tile(position.x, position.z),
            position,
            floor: 1,
        };
        let id = state.ids.allocate();
        spawn.into_enemy(id, &state.config.enemies)
    }

    fn projectile(state: &mut SimulationState, position: Vec3, velocity: Vec3) -> Projectile {
        Projectile {
            id: state.ids.allocate(),
            position,
            velocity,
            lifetime: 4.0,
            damage: 15,
        }
    }

    fn perception(distance: f32, attack_cooldown: f32) -> Perception {
        Perception {
            position: Vec3::ZERO,
            player_position: Vec3::new(0.0, 0.0, -distance),
            to_player: Vec3::new(0.0, 0.0, -distance),
            distance,
            attack_range: 1.5,
            attack_cooldown,
            damage: 10,
        }
    }

    #[test]
    fn test_melee_chases_when_out_of_range() {
        let tuning = EnemyTuning::default();
        let ctx = DecisionContext {
            dt: 0.016,
            floor: 1,
            tuning: &tuning,
        };
        let mut behavior = Behavior::for_kind(EnemyKind::Rusher, &tuning);

        let decision = behavior.decide(&perception(5.0, 0.0), &ctx);
        assert_eq!(decision.movement, Some(Vec3::new(0.0, 0.0, -1.0)));
        assert!(decision.action.is_none());
    }

    #[test]
    fn test_melee_strikes_only_off_cooldown() {
        let tuning = EnemyTuning::default();
        let ctx = DecisionContext {
            dt: 0.016,
            floor: 1,
            tuning: &tuning,
        };
        let mut behavior = Behavior::for_kind(EnemyKind::Patient, &tuning);

        let decision = behavior.decide(&perception(1.0, 0.0), &ctx);
        assert_eq!(
            decision.action,
            Some(EnemyAction::Strike {
                damage: 10,
                cooldown: 0.8
            })
        );
        assert!(decision.movement.is_none());

        let decision = behavior.decide(&perception(1.0, 0.3), &ctx);
        assert_eq!(decision, Decision::default());
    }

    #[test]
    fn test_ranged_keeps_stand_off_band() {
        let tuning = EnemyTuning::default();
        let ctx = DecisionContext {
            dt: 0.016,
            floor: 1,
            tuning: &tuning,
        };
        let mut behavior = Behavior::for_kind(EnemyKind::Ranged, &tuning);

        let close = behavior.decide(&perception(3.0, 0.0), &ctx);
        assert_eq!(close.movement, Some(Vec3::new(0.0, 0.0, 1.0)));

        let band = behavior.decide(&perception(9.0, 0.0), &ctx);
        assert!(band.movement.is_none());

        let far = behavior.decide(&perception(20.0, 0.0), &ctx);
        assert_eq!(far.movement, Some(Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_ranged_fires_when_timer_elapses_in_range() {
        let tuning = EnemyTuning::default();
        let ctx = DecisionContext {
            dt: 0.5,
            floor: 3,
            tuning: &tuning,
        };
        let mut behavior = Behavior::Ranged(RangedBehavior { shot_timer: 0.4 });

        let decision = behavior.decide(&perception(9.0, 0.0), &ctx);
        match decision.action {
            Some(EnemyAction::Fire {
                origin,
                velocity,
                damage,
            }) => {
                assert_eq!(origin, Vec3::new(0.0, 1.3, 0.0));
                assert!((velocity.length() - 10.0).abs() < 1e-4);
                assert!(velocity.z < 0.0 && velocity.y < 0.0);
                assert_eq!(damage, 10);
            }
            other => panic!("expected a shot, got {other:?}"),
        }
        assert_eq!(
            behavior,
            Behavior::Ranged(RangedBehavior {
                shot_timer: RangedBehavior::reload_time(3)
            })
        );
    }

    #[test]
    fn test_ranged_holds_fire_out_of_range() {
        let tuning = EnemyTuning::default();
        let ctx = DecisionContext {
            dt: 0.5,
            floor: 1,
            tuning: &tuning,
        };
        let mut behavior = Behavior::Ranged(RangedBehavior { shot_timer: 0.1 });

        let decision = behavior.decide(&perception(16.0, 0.0), &ctx);
        assert!(decision.action.is_none());
        match behavior {
            Behavior::Ranged(ranged) => assert!((ranged.shot_timer + 0.4).abs() < 1e-6),
            other => panic!("unexpected behavior {other:?}"),
        }
    }

    #[test]
    fn test_behavior_kind_round_trip() {
        let tuning = EnemyTuning::default();
        for kind in [EnemyKind::Rusher, EnemyKind::Patient, EnemyKind::Ranged] {
            assert_eq!(Behavior::for_kind(kind, &tuning).kind(), kind);
        }
    }

    #[test]
    fn test_rusher_in_reach_strikes_player() {
        let mut state = arena();
        let mut enemy = rusher(&mut state, Vec3::new(20.0, 0.0, 21.0));
        enemy.damage = 22;
        state.enemies.push(enemy);

        update_enemies(&mut state, DT);

        assert_eq!(state.player.hp, 78);
        assert!((state.player.invincibility - 0.6).abs() < 1e-6);
        let enemy = &state.enemies[0];
        assert!(enemy.seen_player);
        assert_eq!(enemy.state, EnemyState::Chasing);
        assert!((enemy.attack_cooldown - 1.0).abs() < 1e-6);
        assert_eq!(enemy.facing, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(
            state.take_events(),
            vec![GameEvent::PlayerDamaged { amount: 22, hp: 78 }]
        );

        // Still cooling down, and the player is invincible anyway
        update_enemies(&mut state, DT);
        assert_eq!(state.player.hp, 78);
    }

    #[test]
    fn test_hurt_enemy_neither_moves_nor_strikes() {
        let mut state = arena();
        let mut close = rusher(&mut state, Vec3::new(20.0, 0.0, 21.0));
        let mut far = rusher(&mut state, Vec3::new(20.0, 0.0, 25.0));
        for enemy in [&mut close, &mut far] {
            enemy.state = EnemyState::Hurt;
            enemy.hurt_timer = 0.2;
            enemy.seen_player = true;
        }
        let starts = [close.position, far.position];
        state.enemies = vec![close, far];

        update_enemies(&mut state, 0.15);
        assert_eq!(state.player.hp, 100);
        for (enemy, start) in state.enemies.iter().zip(starts) {
            assert_eq!(enemy.state, EnemyState::Hurt);
            assert_eq!(enemy.position, start);
        }

        // The stagger runs out on this tick; acting resumes on the next one
        update_enemies(&mut state, 0.15);
        assert_eq!(state.player.hp, 100);
        for (enemy, start) in state.enemies.iter().zip(starts) {
            assert_eq!(enemy.state, EnemyState::Chasing);
            assert_eq!(enemy.position, start);
        }

        update_enemies(&mut state, DT);
        assert_eq!(state.player.hp, 90);
        assert!(state.enemies[1].position.z < starts[1].z);
    }

    #[test]
    fn test_seen_player_is_sticky() {
        let mut state = arena();
        let mut hunter = rusher(&mut state, Vec3::new(20.0, 0.0, 35.0));
        hunter.seen_player = true;
        let idle = rusher(&mut state, Vec3::new(35.0, 0.0, 20.0));
        state.enemies = vec![hunter, idle];

        update_enemies(&mut state, DT);

        let hunter = &state.enemies[0];
        assert!(hunter.seen_player);
        assert_eq!(hunter.state, EnemyState::Chasing);
        assert!(hunter.position.z < 35.0);

        let idle = &state.enemies[1];
        assert!(!idle.seen_player);
        assert_eq!(idle.state, EnemyState::Idle);
        assert_eq!(idle.position, Vec3::new(35.0, 0.0, 20.0));
    }

    #[test]
    fn test_detection_survives_player_leaving_radius() {
        let mut state = arena();
        let enemy = rusher(&mut state, Vec3::new(20.0, 0.0, 28.0));
        state.enemies.push(enemy);

        update_enemies(&mut state, DT);
        assert!(state.enemies[0].seen_player);

        state.player.position = Vec3::new(4.0, 0.0, 4.0);
        let before = state.enemies[0].position;
        update_enemies(&mut state, DT);
        assert!(state.enemies[0].seen_player);
        assert_ne!(state.enemies[0].position, before);
    }

    #[test]
    fn test_ranged_enemy_fires_projectile() {
        let mut state = arena();
        let mut caster = rusher(&mut state, Vec3::new(20.0, 0.0, 29.0));
        caster.behavior = Behavior::Ranged(RangedBehavior { shot_timer: 0.0 });
        let source = caster.id;
        state.enemies.push(caster);

        update_enemies(&mut state, DT);

        assert_eq!(state.projectiles.len(), 1);
        let shot = &state.projectiles[0];
        assert_eq!(shot.position, Vec3::new(20.0, 1.3, 29.0));
        assert!(shot.velocity.z < 0.0);
        assert!((shot.lifetime - 4.0).abs() < 1e-6);
        assert!(matches!(
            state.take_events().as_slice(),
            [GameEvent::ProjectileFired { source: s, .. }] if *s == source
        ));
        assert_eq!(state.statistics.projectiles_fired, 1);
    }

    #[test]
    fn test_projectile_destroyed_by_wall() {
        let mut state = arena();
        let into_wall = projectile(
            &mut state,
            Vec3::new(36.5, 1.3, 20.0),
            Vec3::new(10.0, 0.0, 0.0),
        );
        let in_flight = projectile(
            &mut state,
            Vec3::new(10.0, 1.3, 10.0),
            Vec3::new(0.0, 0.0, 1.0),
        );
        let survivor = in_flight.id;
        state.projectiles = vec![into_wall, in_flight];

        update_projectiles(&mut state, 0.1);

        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].id, survivor);
        assert_eq!(state.player.hp, 100);
    }

    #[test]
    fn test_projectile_expires() {
        let mut state = arena();
        let mut fading = projectile(&mut state, Vec3::new(10.0, 1.3, 10.0), Vec3::ZERO);
        fading.lifetime = 0.01;
        let mut lasting = projectile(&mut state, Vec3::new(12.0, 1.3, 10.0), Vec3::ZERO);
        lasting.lifetime = 1.0;
        let survivor = lasting.id;
        state.projectiles = vec![fading, lasting];

        update_projectiles(&mut state, DT);

        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].id, survivor);
        assert!((state.projectiles[0].lifetime - (1.0 - DT)).abs() < 1e-6);
    }

    #[test]
    fn test_projectile_passes_invincible_player() {
        let mut state = arena();
        state.player.invincibility = 0.5;
        let shot = projectile(&mut state, Vec3::new(20.0, 1.3, 20.5), Vec3::ZERO);
        state.projectiles.push(shot);

        update_projectiles(&mut state, DT);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.player.hp, 100);

        state.player.invincibility = 0.0;
        update_projectiles(&mut state, DT);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.player.hp, 85);
    }
}
