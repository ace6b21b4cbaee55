//! Alien entities: movement patterns, fleet separation, shooting and death

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::crystal;
use super::entities::{AlienProjectile, ExplosionSize, PowerUp};
use super::geom::{Hitbox, Rect};
use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Fleet fire-rate tuning. The pacing of the whole game hangs off these,
/// keep them together so balancing passes touch one place.
pub const GLOBAL_FIRE_COOLDOWN_MIN_MS: f32 = 50.0;
pub const GLOBAL_FIRE_COOLDOWN_JITTER_MS: f32 = 50.0;
/// Live alien shots allowed at once: max(floor, cap * ratio) + level / 2
pub const VOLLEY_BUDGET_RATIO: f32 = 0.4;
pub const VOLLEY_BUDGET_FLOOR: usize = 2;
/// Re-roll window after a blocked shot attempt
pub const BLOCKED_SHOT_RETRY_MIN_MS: f32 = 80.0;
pub const BLOCKED_SHOT_RETRY_JITTER_MS: f32 = 120.0;

/// How an alien descends through the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementPattern {
    /// Straight down
    Straight,
    /// Horizontal sine around the spawn column
    Sine,
    /// Fast horizontal sweep, bouncing off the field edges
    ZigZag,
    /// Shallow sweep, bouncing like zigzag
    Diagonal,
    /// Closes horizontally on the player; never shoots, rams instead
    Seeking,
}

/// Spawn-time parameters, already scaled for the current wave repeat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlienParams {
    pub health: f32,
    pub speed_y: f32,
    pub shoot_cooldown_ms: f32,
    pub pattern: MovementPattern,
    pub speed_factor: f32,
    pub size_multiplier: f32,
    /// Fires homing shots instead of plain ones
    pub homing_shots: bool,
    /// Extra ram damage on top of the base collision damage
    pub collision_damage_boost: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alien {
    /// Center position
    pub pos: Vec2,
    /// Spawn column, anchor for the sine pattern
    pub start_x: f32,
    pub size: f32,
    pub collision_radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub speed_y: f32,
    pub pattern: MovementPattern,
    pub sine_amplitude: f32,
    pub sine_frequency: f32,
    pub sine_phase: f32,
    pub zigzag_speed_x: f32,
    pub zigzag_dir: f32,
    pub diagonal_dir: f32,
    /// Time until this alien next tries to fire (ms)
    pub shoot_timer_ms: f32,
    pub shoot_cooldown_ms: f32,
    pub homing_shots: bool,
    pub collision_damage: f32,
    pub active: bool,
}

impl Alien {
    pub fn spawn(x: f32, y: f32, params: &AlienParams, rng: &mut Pcg32) -> Self {
        let size = (25.0 + rng.random_range(0.0..15.0)) * params.size_multiplier;
        let cd = params.shoot_cooldown_ms;
        Self {
            pos: Vec2::new(x, y),
            start_x: x,
            size,
            collision_radius: size * 0.8,
            health: params.health,
            max_health: params.health,
            speed_y: params.speed_y,
            pattern: params.pattern,
            sine_amplitude: (15.0 + rng.random_range(0.0..35.0)) * (size / 30.0),
            sine_frequency: (0.012 + rng.random_range(0.0..0.02)) * params.speed_factor,
            sine_phase: rng.random_range(0.0..std::f32::consts::TAU),
            zigzag_speed_x: params.speed_factor * (70.0 + rng.random_range(0.0..110.0)),
            zigzag_dir: if rng.random::<bool>() { 1.0 } else { -1.0 },
            diagonal_dir: if rng.random::<bool>() { 1.0 } else { -1.0 },
            // First shot comes somewhere in [cd/2, 1.5cd)
            shoot_timer_ms: cd / 2.0 + rng.random_range(0.0..cd),
            shoot_cooldown_ms: cd,
            homing_shots: params.homing_shots,
            collision_damage: ALIEN_COLLISION_DAMAGE + params.collision_damage_boost,
            active: true,
        }
    }

    /// Score awarded for destroying this alien
    pub fn score_value(&self) -> u64 {
        let base = (self.size * 2.0 + self.max_health * 5.0).floor() as u64;
        if self.pattern == MovementPattern::Seeking {
            base / 2
        } else {
            base
        }
    }

    pub fn explosion_size(&self) -> ExplosionSize {
        if self.size > 45.0 {
            ExplosionSize::Large
        } else if self.size > 30.0 {
            ExplosionSize::Medium
        } else {
            ExplosionSize::Small
        }
    }

    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.active {
            return false;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            self.active = false;
            return true;
        }
        false
    }
}

impl Hitbox for Alien {
    fn bounds(&self) -> Rect {
        Rect::centered(self.pos, self.collision_radius * 2.0, self.collision_radius * 2.0)
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Move, separate and fire the whole fleet for one tick
pub fn update_aliens(state: &mut GameState, dt_ms: f32) {
    let dt = dt_ms / 1000.0;
    let player_center = state.ship.center();

    // Snapshot for the separation test; using pre-move positions keeps the
    // pass order-independent.
    let neighbors: Vec<(Vec2, f32)> = state
        .aliens
        .iter()
        .filter(|a| a.active)
        .map(|a| (a.pos, a.collision_radius))
        .collect();

    let cap = state.director.current_fleet_cap();
    let max_volley = cap.map_or(3, |c| {
        VOLLEY_BUDGET_FLOOR.max((c as f32 * VOLLEY_BUDGET_RATIO) as usize)
    }) + (state.level / 2) as usize;

    for i in 0..state.aliens.len() {
        let alien = &mut state.aliens[i];
        if !alien.active {
            continue;
        }
        if !alien.pos.is_finite() {
            log::warn!("deactivating alien with non-finite position");
            alien.active = false;
            continue;
        }

        let mut potential = alien.pos;
        potential.y += alien.speed_y * dt;

        if alien.pattern == MovementPattern::Seeking {
            let dx = player_center.x - alien.pos.x;
            potential.x += dx.signum() * dx.abs().min(alien.speed_y * 0.5) * dt;
        } else {
            let mut horizontal = true;
            match alien.pattern {
                MovementPattern::Sine => {
                    alien.sine_phase += alien.sine_frequency * 50.0 * dt;
                    potential.x = alien.start_x + alien.sine_phase.sin() * alien.sine_amplitude;
                }
                MovementPattern::ZigZag => {
                    potential.x += alien.zigzag_speed_x * alien.zigzag_dir * dt;
                }
                MovementPattern::Diagonal => {
                    potential.x += alien.zigzag_speed_x * alien.diagonal_dir * 0.7 * dt;
                }
                _ => horizontal = false,
            }

            if horizontal {
                for &(other_pos, other_radius) in &neighbors {
                    if other_pos == alien.pos {
                        continue;
                    }
                    let delta = potential - other_pos;
                    let min_dist =
                        alien.collision_radius + other_radius + ALIEN_SEPARATION_BUFFER;
                    if delta.length_squared() < min_dist * min_dist
                        && delta.x.abs() > alien.speed_y * dt * 1.1
                    {
                        // Hold the column, keep descending
                        potential.x = alien.pos.x;
                        break;
                    }
                }
            }
        }

        alien.pos = potential;

        // Edge bounce for the sweeping patterns
        if matches!(
            alien.pattern,
            MovementPattern::ZigZag | MovementPattern::Diagonal
        ) {
            let margin = alien.size * 1.2;
            if (alien.pos.x > FIELD_WIDTH - margin && alien.zigzag_dir > 0.0)
                || (alien.pos.x < margin && alien.zigzag_dir < 0.0)
            {
                alien.zigzag_dir = -alien.zigzag_dir;
                if alien.pattern == MovementPattern::Diagonal {
                    alien.diagonal_dir = -alien.diagonal_dir;
                }
                alien.pos.x += alien.zigzag_speed_x * alien.zigzag_dir * dt * 0.5;
            }
        }
        alien.pos.x = alien.pos.x.clamp(alien.size, FIELD_WIDTH - alien.size);

        if alien.pos.y > FIELD_HEIGHT + alien.size * 2.0 {
            alien.active = false;
            continue;
        }

        // Shooting: seekers never shoot, everyone else waits on their own
        // cooldown, the fleet-wide cooldown and the live-projectile budget.
        if alien.pattern == MovementPattern::Seeking {
            continue;
        }
        alien.shoot_timer_ms -= dt_ms;
        if alien.shoot_timer_ms > 0.0 {
            continue;
        }
        let (pos, size, homing, cooldown) = (
            alien.pos,
            alien.size,
            alien.homing_shots,
            alien.shoot_cooldown_ms,
        );

        let on_screen = pos.y > -size && pos.y < FIELD_HEIGHT - 50.0;
        let live_shots = state.alien_projectiles.iter().filter(|p| p.active).count();
        if state.global_alien_fire_cooldown_ms <= 0.0 && live_shots < max_volley && on_screen {
            let origin = Vec2::new(pos.x, pos.y + size * 0.5);
            let speed = 160.0 + state.level as f32 * 5.0;
            let shot_size = (size * (0.15 + state.rng.random_range(0.0..0.1))).clamp(3.0, 8.0);
            let tracking = if homing {
                0.1 + state.rng.random_range(0.0..0.15)
            } else {
                0.0
            };
            let jitter = state.rng.random_range(-0.15..0.15);
            state.aliens[i].shoot_timer_ms = cooldown * (1.0 + jitter);
            state.global_alien_fire_cooldown_ms = GLOBAL_FIRE_COOLDOWN_MIN_MS
                + state.rng.random_range(0.0..GLOBAL_FIRE_COOLDOWN_JITTER_MS);
            let projectile =
                AlienProjectile::new(origin, speed, shot_size, tracking, state.level, &mut state.rng);
            state.alien_projectiles.push(projectile);
            state.push_event(GameEvent::AlienFired);
        } else {
            // Blocked this tick, retry shortly
            state.aliens[i].shoot_timer_ms = BLOCKED_SHOT_RETRY_MIN_MS
                + state.rng.random_range(0.0..BLOCKED_SHOT_RETRY_JITTER_MS);
        }
    }
}

/// Death consequences for alien `idx`: score, explosion, drop rolls.
/// The caller has already driven health to zero.
pub fn handle_alien_death(state: &mut GameState, idx: usize) {
    let (pos, size, max_health, seeker, score, explosion) = {
        let a = &state.aliens[idx];
        (
            a.pos,
            a.size,
            a.max_health,
            a.pattern == MovementPattern::Seeking,
            a.score_value(),
            a.explosion_size(),
        )
    };

    state.add_score(score);
    state.spawn_explosion(pos, size * 1.2, explosion);

    if !seeker
        && state.power_ups.iter().filter(|p| p.active).count() < MAX_POWERUPS
        && state.rng.random::<f32>() < POWERUP_DROP_CHANCE
    {
        let kind = PowerUp::roll_kind(&mut state.rng);
        let power_up = PowerUp::new(pos, kind, &mut state.rng);
        state.power_ups.push(power_up);
    }

    let power = size * max_health;
    crystal::spawn_drops(state, pos, power);
}
