//! Frame collision resolution
//!
//! Runs once per tick after all movement. Every damage application funnels
//! through the owning entity's `take_damage` so inactive entities can never
//! score or hurt anything twice.

use glam::Vec2;

use super::alien::handle_alien_death;
use super::boss::{damage_boss, Boss, BOSS_HEIGHT};
use super::entities::ExplosionSize;
use super::geom::{circles_overlap, Hitbox, Rect};
use super::state::GameState;
use crate::consts::*;

/// Damage used to guarantee destruction on body contact
const OVERKILL_DAMAGE: f32 = 1000.0;

/// The laser's damage column: from the muzzle straight up to the top edge
fn laser_column(state: &GameState) -> Rect {
    let muzzle = state.ship.muzzle();
    Rect::new(muzzle.x - LASER_WIDTH / 2.0, 0.0, LASER_WIDTH, muzzle.y)
}

pub fn resolve_collisions(state: &mut GameState, dt_ms: f32) {
    let dt = dt_ms / 1000.0;

    projectiles_vs_aliens(state);
    if state.laser_firing {
        laser_vs_aliens(state, dt);
    }
    player_vs_aliens(state, dt);
    player_vs_alien_projectiles(state);

    // Boss interactions run with the boss detached so the resolver can
    // borrow the rest of the state freely.
    if let Some(mut boss) = state.boss.take() {
        projectiles_vs_boss(state, &mut boss);
        if state.laser_firing {
            laser_vs_boss(state, &mut boss, dt);
        }
        boss_contact_vs_player(state, &boss);
        state.boss = Some(boss);
    }
}

/// Rule 1: each player projectile consumes itself on its first alien hit
fn projectiles_vs_aliens(state: &mut GameState) {
    for pi in 0..state.projectiles.len() {
        if !state.projectiles[pi].active {
            continue;
        }
        let bounds = state.projectiles[pi].bounds();
        let center = bounds.center();
        let radius = bounds.width.max(bounds.height) / 2.0;
        let damage = state.projectiles[pi].damage;

        for ai in 0..state.aliens.len() {
            let alien = &mut state.aliens[ai];
            if !alien.active {
                continue;
            }
            if circles_overlap(center, radius, alien.pos, alien.collision_radius) {
                state.projectiles[pi].active = false;
                if state.aliens[ai].take_damage(damage) {
                    handle_alien_death(state, ai);
                }
                break;
            }
        }
    }
}

/// Rule 2: the beam damages everything inside its column, scaled by dt
fn laser_vs_aliens(state: &mut GameState, dt: f32) {
    let column = laser_column(state);
    for ai in 0..state.aliens.len() {
        if !state.aliens[ai].active {
            continue;
        }
        if column.overlaps(&state.aliens[ai].bounds())
            && state.aliens[ai].take_damage(LASER_DPS * dt)
        {
            handle_alien_death(state, ai);
        }
    }
}

/// Rules 3 and 5a: alien bodies against the hull or the shield bubble
fn player_vs_aliens(state: &mut GameState, dt: f32) {
    let ship_center = state.ship.center();
    let ship_bounds = state.ship.bounds();
    let shielded = state.ship.shield_active();
    let shield_radius = state.ship.shield_radius();

    for ai in 0..state.aliens.len() {
        let alien = &state.aliens[ai];
        if !alien.active {
            continue;
        }

        if shielded {
            // The shield grinds aliens down without an instant kill
            if circles_overlap(ship_center, shield_radius, alien.pos, alien.collision_radius)
                && state.aliens[ai].take_damage(SHIELD_CONTACT_DPS * dt)
            {
                handle_alien_death(state, ai);
            }
        } else if circles_overlap(
            ship_bounds.center(),
            ship_bounds.width.min(ship_bounds.height) / 2.0,
            alien.pos,
            alien.collision_radius,
        ) {
            let contact_damage = alien.collision_damage;
            state.damage_player(contact_damage);
            // Ramming is fatal for the alien regardless of its health
            if state.aliens[ai].take_damage(OVERKILL_DAMAGE) {
                handle_alien_death(state, ai);
            }
        }
    }
}

/// Rules 4 and 5b: enemy shots against the hull or the shield bubble
fn player_vs_alien_projectiles(state: &mut GameState) {
    let ship_center = state.ship.center();
    let ship_bounds = state.ship.bounds();
    let shielded = state.ship.shield_active();
    let shield_radius = state.ship.shield_radius();
    let mut sparks: Vec<Vec2> = Vec::new();
    let mut damage_taken = 0.0;
    let mut hits = 0u32;

    for proj in &mut state.alien_projectiles {
        if !proj.active {
            continue;
        }
        if shielded {
            if circles_overlap(ship_center, shield_radius, proj.pos, proj.width / 2.0) {
                proj.active = false;
                sparks.push(proj.pos);
            }
        } else if proj.bounds().overlaps(&ship_bounds) {
            proj.active = false;
            damage_taken += proj.damage;
            hits += 1;
        }
    }

    for pos in sparks {
        state.spawn_explosion(pos, 12.0, ExplosionSize::Small);
    }
    // One damage application per hit keeps the invincibility rules exact
    for _ in 0..hits {
        let per_hit = damage_taken / hits as f32;
        state.damage_player(per_hit);
    }
}

/// Rule 6a: player projectiles route through the boss damage model
fn projectiles_vs_boss(state: &mut GameState, boss: &mut Boss) {
    let bounds = boss.bounds();
    let mut impacts: Vec<(Vec2, f32)> = Vec::new();
    for proj in &mut state.projectiles {
        if proj.active && proj.bounds().overlaps(&bounds) {
            proj.active = false;
            impacts.push((proj.bounds().center(), proj.damage));
        }
    }
    for (hit, damage) in impacts {
        damage_boss(boss, state, damage, hit);
    }
}

/// Rule 6b: the laser column against the boss hull
fn laser_vs_boss(state: &mut GameState, boss: &mut Boss, dt: f32) {
    let column = laser_column(state);
    let bounds = boss.bounds();
    if column.overlaps(&bounds) {
        // The beam strikes the underside of the hull
        let hit = Vec2::new(
            column.center().x.clamp(bounds.x, bounds.x + bounds.width),
            boss.pos.y + BOSS_HEIGHT / 2.0 - 1.0,
        );
        damage_boss(boss, state, LASER_DPS * dt, hit);
    }
}

/// Rule 6c: ramming the boss hull
fn boss_contact_vs_player(state: &mut GameState, boss: &Boss) {
    if boss.defeated || state.ship.shield_active() {
        return;
    }
    if boss.bounds().overlaps(&state.ship.bounds()) {
        state.damage_player(BOSS_COLLISION_DAMAGE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::alien::{Alien, AlienParams, MovementPattern};
    use crate::sim::boss::BOSS_TARGET_Y;
    use crate::sim::entities::{AlienProjectile, Projectile, WeaponKind};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn test_alien(x: f32, y: f32, health: f32) -> Alien {
        let mut rng = Pcg32::seed_from_u64(77);
        let params = AlienParams {
            health,
            speed_y: 80.0,
            shoot_cooldown_ms: 2600.0,
            pattern: MovementPattern::Straight,
            speed_factor: 1.0,
            size_multiplier: 1.0,
            homing_shots: false,
            collision_damage_boost: 0.0,
        };
        Alien::spawn(x, y, &params, &mut rng)
    }

    #[test]
    fn test_projectile_kills_alien_and_is_consumed() {
        let mut state = GameState::new(31);
        let alien = test_alien(400.0, 300.0, 1.0);
        let expected_score = alien.score_value();
        state.aliens.push(alien);
        state
            .projectiles
            .push(Projectile::new(Vec2::new(400.0, 300.0), WeaponKind::Standard, 0.0));

        resolve_collisions(&mut state, 16.0);
        assert!(!state.projectiles[0].active);
        assert!(!state.aliens[0].active);
        assert_eq!(state.score, expected_score);
    }

    #[test]
    fn test_projectile_hits_at_most_one_alien() {
        let mut state = GameState::new(31);
        state.aliens.push(test_alien(400.0, 300.0, 1.0));
        state.aliens.push(test_alien(405.0, 305.0, 1.0));
        state
            .projectiles
            .push(Projectile::new(Vec2::new(400.0, 300.0), WeaponKind::Standard, 0.0));

        resolve_collisions(&mut state, 16.0);
        let dead = state.aliens.iter().filter(|a| !a.active).count();
        assert_eq!(dead, 1);
    }

    #[test]
    fn test_body_contact_damages_player_and_destroys_alien() {
        let mut state = GameState::new(31);
        let center = state.ship.center();
        let mut alien = test_alien(center.x, center.y, 50.0);
        alien.pos = center;
        state.aliens.push(alien);

        resolve_collisions(&mut state, 16.0);
        assert_eq!(state.ship.health, SHIP_MAX_HEALTH - ALIEN_COLLISION_DAMAGE);
        assert!(!state.aliens[0].active);
    }

    #[test]
    fn test_alien_projectile_consumed_on_hit() {
        let mut state = GameState::new(31);
        let center = state.ship.center();
        let mut proj = AlienProjectile::mine(center, 8.0, f32::MAX);
        proj.life_timer_ms = None;
        state.alien_projectiles.push(proj);

        resolve_collisions(&mut state, 16.0);
        assert!(!state.alien_projectiles[0].active);
        assert_eq!(
            state.ship.health,
            SHIP_MAX_HEALTH - ALIEN_PROJECTILE_DAMAGE
        );
    }

    #[test]
    fn test_shield_destroys_shots_without_damage() {
        let mut state = GameState::new(31);
        state.ship.shield_ms = 5000.0;
        let center = state.ship.center();
        let mut proj = AlienProjectile::mine(center + Vec2::new(10.0, 0.0), 8.0, f32::MAX);
        proj.life_timer_ms = None;
        state.alien_projectiles.push(proj);

        resolve_collisions(&mut state, 16.0);
        assert!(!state.alien_projectiles[0].active);
        assert_eq!(state.ship.health, SHIP_MAX_HEALTH);
        // Spark effect spawned
        assert!(!state.explosions.is_empty());
    }

    #[test]
    fn test_shield_grinds_aliens_gradually() {
        let mut state = GameState::new(31);
        state.ship.shield_ms = 5000.0;
        let center = state.ship.center();
        let mut alien = test_alien(center.x, center.y, 5.0);
        alien.pos = center + Vec2::new(20.0, 0.0);
        state.aliens.push(alien);

        resolve_collisions(&mut state, 100.0);
        // 25 dmg/s over 100 ms = 2.5: hurt but alive
        assert!(state.aliens[0].active);
        assert!(state.aliens[0].health < 5.0);
        assert_eq!(state.ship.health, SHIP_MAX_HEALTH);

        resolve_collisions(&mut state, 200.0);
        assert!(!state.aliens[0].active);
    }

    #[test]
    fn test_laser_damages_aliens_over_time() {
        let mut state = GameState::new(31);
        state.laser_firing = true;
        let muzzle = state.ship.muzzle();
        let mut alien = test_alien(muzzle.x, 200.0, 3.0);
        alien.pos.x = muzzle.x;
        state.aliens.push(alien);

        resolve_collisions(&mut state, 100.0);
        // 15 dmg/s over 100 ms = 1.5
        assert!((state.aliens[0].health - 1.5).abs() < 0.001);
    }

    #[test]
    fn test_projectile_routes_through_boss_shield() {
        let mut state = GameState::new(31);
        let mut boss = Boss::new();
        boss.pos = Vec2::new(400.0, BOSS_TARGET_Y);
        boss.entering = false;
        boss.invulnerable = false;
        state.boss = Some(boss);
        state
            .projectiles
            .push(Projectile::new(Vec2::new(400.0, BOSS_TARGET_Y), WeaponKind::Heavy, 0.0));

        resolve_collisions(&mut state, 16.0);
        let boss = state.boss.as_ref().unwrap();
        assert!(!state.projectiles[0].active);
        assert_eq!(boss.shield.health, 150.0 - 2.5);
        assert_eq!(boss.health, boss.max_health);
    }

    #[test]
    fn test_boss_contact_damage() {
        let mut state = GameState::new(31);
        let mut boss = Boss::new();
        boss.pos = state.ship.center();
        boss.entering = false;
        boss.invulnerable = false;
        state.boss = Some(boss);

        resolve_collisions(&mut state, 16.0);
        assert_eq!(state.ship.health, SHIP_MAX_HEALTH - BOSS_COLLISION_DAMAGE);
    }

    #[test]
    fn test_inactive_projectile_never_damages() {
        let mut state = GameState::new(31);
        state.aliens.push(test_alien(400.0, 300.0, 1.0));
        let mut proj = Projectile::new(Vec2::new(400.0, 300.0), WeaponKind::Standard, 0.0);
        proj.active = false;
        state.projectiles.push(proj);

        resolve_collisions(&mut state, 16.0);
        assert!(state.aliens[0].active);
        assert_eq!(state.score, 0);
    }
}
