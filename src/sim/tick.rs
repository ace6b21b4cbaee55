//! Per-frame simulation step
//!
//! `tick` drives every subsystem in a fixed order so a frame is always
//! resolved the same way: timers, boss, player, projectiles, aliens,
//! pickups, effects, then collisions and finally the wave director.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::alien::update_aliens;
use super::boss::update_boss;
use super::collision::resolve_collisions;
use super::crystal::update_crystals;
use super::entities::{Projectile, WeaponKind};
use super::geom::Hitbox;
use super::state::{GameEvent, GameState};
use super::waves::update_director;
use crate::consts::*;

/// Player intent for one frame, already mapped from raw input by the host
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub move_up: bool,
    pub move_down: bool,
    pub firing: bool,
    /// Edge-triggered pause toggle
    pub toggle_pause: bool,
}

/// Advance the simulation by `dt_ms` (clamped to [`MAX_DELTA_MS`])
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    if input.toggle_pause && !state.game_over {
        state.paused = !state.paused;
    }
    if state.paused || state.game_over {
        return;
    }

    let dt_ms = dt_ms.clamp(0.0, MAX_DELTA_MS);
    let dt = dt_ms / 1000.0;
    state.elapsed_ms += dt_ms as f64;

    state.global_alien_fire_cooldown_ms =
        (state.global_alien_fire_cooldown_ms - dt_ms).max(0.0);

    if let Some(remaining) = state.victory_countdown_ms {
        let remaining = remaining - dt_ms;
        if remaining <= 0.0 {
            state.victory_countdown_ms = None;
            state.victory = true;
            state.game_over = true;
            state.push_event(GameEvent::GameOver { victory: true });
            return;
        }
        state.victory_countdown_ms = Some(remaining);
    }

    if let Some(mut boss) = state.boss.take() {
        update_boss(&mut boss, state, dt_ms);
        state.boss = Some(boss);
    }

    update_player(state, input, dt_ms, dt);

    for proj in &mut state.projectiles {
        proj.update(dt_ms);
    }
    update_alien_projectiles(state, dt_ms);

    update_aliens(state, dt_ms);
    update_power_ups(state, dt_ms);

    state.explosions.retain_mut(|e| e.update(dt_ms));
    update_crystals(state, dt_ms);

    resolve_collisions(state, dt_ms);

    update_director(state, dt_ms);

    // Drop consumed entities after resolution so nothing is skipped
    state.projectiles.retain(|p| p.active);
    state.alien_projectiles.retain(|p| p.active);
    state.aliens.retain(|a| a.active);
    state.power_ups.retain(|p| p.active);
}

fn update_player(state: &mut GameState, input: &TickInput, dt_ms: f32, dt: f32) {
    state.tick_player_timers(dt_ms);

    let mut dir = Vec2::ZERO;
    if input.move_left {
        dir.x -= 1.0;
    }
    if input.move_right {
        dir.x += 1.0;
    }
    if input.move_up {
        dir.y -= 1.0;
    }
    if input.move_down {
        dir.y += 1.0;
    }
    if dir != Vec2::ZERO {
        if dir.x != 0.0 && dir.y != 0.0 {
            dir *= std::f32::consts::FRAC_1_SQRT_2;
        }
        state.ship.pos += dir * SHIP_SPEED * dt;
        state.ship.pos.x = state.ship.pos.x.clamp(0.0, FIELD_WIDTH - SHIP_WIDTH);
        state.ship.pos.y = state.ship.pos.y.clamp(0.0, FIELD_HEIGHT - SHIP_HEIGHT);
    }

    // The laser is a continuous column; everything else fires on a cooldown
    let was_lasing = state.laser_firing;
    state.laser_firing = input.firing && state.ship.weapon == WeaponKind::Laser;
    if state.laser_firing && !was_lasing {
        state.push_event(GameEvent::WeaponFired(WeaponKind::Laser));
    }

    if input.firing
        && state.ship.weapon != WeaponKind::Laser
        && state.ship.fire_cooldown_ms <= 0.0
    {
        fire_weapon(state);
    }
}

fn fire_weapon(state: &mut GameState) {
    let ship = &state.ship;
    let weapon = ship.weapon;
    let nose = Vec2::new(ship.pos.x + SHIP_WIDTH / 2.0, ship.pos.y + 10.0);

    match weapon {
        WeaponKind::Standard => {
            // Twin cannons at the wingtips
            state.projectiles.push(Projectile::new(
                Vec2::new(ship.pos.x + 8.0, nose.y),
                weapon,
                0.0,
            ));
            state.projectiles.push(Projectile::new(
                Vec2::new(ship.pos.x + SHIP_WIDTH - 8.0 - 6.0, nose.y),
                weapon,
                0.0,
            ));
        }
        WeaponKind::Spread => {
            for angle in [-0.4, -0.2, 0.0, 0.2, 0.4] {
                state
                    .projectiles
                    .push(Projectile::new(nose - Vec2::new(3.0, 0.0), weapon, angle));
            }
        }
        WeaponKind::Rapid => {
            state
                .projectiles
                .push(Projectile::new(nose - Vec2::new(2.0, 0.0), weapon, 0.0));
        }
        WeaponKind::Heavy => {
            state.projectiles.push(Projectile::new(
                nose - Vec2::new(5.0, 5.0),
                weapon,
                0.0,
            ));
        }
        WeaponKind::Laser => return,
    }

    state.ship.fire_cooldown_ms = weapon.fire_interval_ms();
    state.push_event(GameEvent::WeaponFired(weapon));
}

fn update_alien_projectiles(state: &mut GameState, dt_ms: f32) {
    let target = Some(state.ship.center());
    let mut detonations: Vec<Vec2> = Vec::new();

    for proj in &mut state.alien_projectiles {
        if proj.update(dt_ms, target) {
            detonations.push(proj.pos);
        }
    }

    for pos in detonations {
        state.spawn_explosion(pos, 60.0, super::entities::ExplosionSize::Medium);
        let burst = super::entities::AlienProjectile::detonation_burst(pos, &mut state.rng);
        state.alien_projectiles.extend(burst);
    }
}

fn update_power_ups(state: &mut GameState, dt_ms: f32) {
    let ship_bounds = state.ship.bounds();
    let mut collected = Vec::new();

    for power_up in &mut state.power_ups {
        if !power_up.active {
            continue;
        }
        power_up.update(dt_ms);
        if power_up.active && power_up.bounds().overlaps(&ship_bounds) {
            power_up.active = false;
            collected.push(power_up.kind);
        }
    }

    for kind in collected {
        state.apply_power_up(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::{PowerUp, PowerUpKind};
    use crate::sim::waves::WaveDirector;

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut state = GameState::new(41);
        tick(&mut state, &idle(), 5000.0);
        assert_eq!(state.elapsed_ms, MAX_DELTA_MS as f64);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut state = GameState::new(41);
        let input = TickInput {
            toggle_pause: true,
            ..idle()
        };
        tick(&mut state, &input, 16.0);
        assert!(state.paused);
        assert_eq!(state.elapsed_ms, 0.0);

        tick(&mut state, &idle(), 16.0);
        assert_eq!(state.elapsed_ms, 0.0);

        tick(&mut state, &input, 16.0);
        assert!(!state.paused);
    }

    #[test]
    fn test_movement_clamped_to_field() {
        let mut state = GameState::new(41);
        let input = TickInput {
            move_left: true,
            ..idle()
        };
        for _ in 0..200 {
            tick(&mut state, &input, 50.0);
        }
        assert_eq!(state.ship.pos.x, 0.0);
    }

    #[test]
    fn test_diagonal_speed_matches_axis_speed() {
        let mut state = GameState::new(41);
        let start = state.ship.pos;
        let input = TickInput {
            move_left: true,
            move_up: true,
            ..idle()
        };
        tick(&mut state, &input, 100.0);
        let moved = (state.ship.pos - start).length();
        assert!((moved - SHIP_SPEED * 0.1).abs() < 0.1);
    }

    #[test]
    fn test_standard_weapon_fires_a_pair_on_cooldown() {
        let mut state = GameState::new(41);
        let input = TickInput {
            firing: true,
            ..idle()
        };
        tick(&mut state, &input, 16.0);
        assert_eq!(state.projectiles.len(), 2);
        assert!(state
            .events
            .contains(&GameEvent::WeaponFired(WeaponKind::Standard)));

        // Cooldown blocks the next frame
        state.drain_events();
        tick(&mut state, &input, 16.0);
        assert_eq!(state.projectiles.len(), 2);
        assert!(!state
            .events
            .contains(&GameEvent::WeaponFired(WeaponKind::Standard)));
    }

    #[test]
    fn test_spread_fires_five_angles() {
        let mut state = GameState::new(41);
        state.ship.weapon = WeaponKind::Spread;
        let input = TickInput {
            firing: true,
            ..idle()
        };
        tick(&mut state, &input, 16.0);
        assert_eq!(state.projectiles.len(), 5);
        let angles: Vec<f32> = state.projectiles.iter().map(|p| p.angle).collect();
        assert!(angles.contains(&0.0));
        assert!(angles.contains(&0.4));
        assert!(angles.contains(&-0.4));
    }

    #[test]
    fn test_laser_sets_beam_flag_without_projectiles() {
        let mut state = GameState::new(41);
        state.ship.weapon = WeaponKind::Laser;
        let input = TickInput {
            firing: true,
            ..idle()
        };
        tick(&mut state, &input, 16.0);
        assert!(state.laser_firing);
        assert!(state.projectiles.is_empty());
        assert!(state
            .events
            .contains(&GameEvent::WeaponFired(WeaponKind::Laser)));

        tick(&mut state, &idle(), 16.0);
        assert!(!state.laser_firing);
    }

    #[test]
    fn test_power_up_pickup_applies_effect() {
        let mut state = GameState::new(41);
        state.director = WaveDirector::BossPhase;
        let mut rng: rand_pcg::Pcg32 = rand::SeedableRng::seed_from_u64(1);
        let mut power_up = PowerUp::new(state.ship.center(), PowerUpKind::Shield, &mut rng);
        power_up.pos = state.ship.pos;
        state.power_ups.push(power_up);

        tick(&mut state, &idle(), 16.0);
        assert!(state.ship.shield_active());
        assert!(state
            .events
            .contains(&GameEvent::PowerUpCollected(PowerUpKind::Shield)));
        assert!(state.power_ups.is_empty());
    }

    #[test]
    fn test_victory_countdown_ends_the_run() {
        let mut state = GameState::new(41);
        state.director = WaveDirector::BossPhase;
        state.victory_countdown_ms = Some(30.0);
        tick(&mut state, &idle(), 16.0);
        assert!(!state.game_over);
        tick(&mut state, &idle(), 16.0);
        assert!(state.game_over);
        assert!(state.victory);
        assert!(state
            .events
            .contains(&GameEvent::GameOver { victory: true }));
    }

    #[test]
    fn test_invincibility_keeps_health_constant() {
        let mut state = GameState::new(41);
        state.director = WaveDirector::BossPhase;
        state.ship.hit_invincibility_ms = 5000.0;
        // Park a hostile shot on the hull every frame
        for _ in 0..20 {
            let mut proj =
                crate::sim::entities::AlienProjectile::mine(state.ship.center(), 8.0, f32::MAX);
            proj.life_timer_ms = None;
            state.alien_projectiles.push(proj);
            tick(&mut state, &idle(), 16.0);
        }
        assert_eq!(state.ship.health, SHIP_MAX_HEALTH);
        assert_eq!(state.lives, STARTING_LIVES);
    }

    #[test]
    fn test_game_over_halts_ticking() {
        let mut state = GameState::new(41);
        state.game_over = true;
        tick(&mut state, &idle(), 16.0);
        assert_eq!(state.elapsed_ms, 0.0);
    }
}
