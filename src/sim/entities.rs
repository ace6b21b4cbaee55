//! Projectiles, power-ups and explosion effects

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geom::{Hitbox, Rect};
use crate::consts::*;

/// Player weapon kinds; also tags the projectiles they fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeaponKind {
    #[default]
    Standard,
    Spread,
    Rapid,
    Heavy,
    /// Continuous beam - fires no discrete projectiles
    Laser,
}

impl WeaponKind {
    pub fn name(&self) -> &'static str {
        match self {
            WeaponKind::Standard => "Standard",
            WeaponKind::Spread => "Spread",
            WeaponKind::Rapid => "Rapid",
            WeaponKind::Heavy => "Heavy",
            WeaponKind::Laser => "Laser",
        }
    }

    /// Delay until the next shot after firing this weapon (ms)
    pub fn fire_interval_ms(&self) -> f32 {
        match self {
            WeaponKind::Standard => SHIP_FIRE_INTERVAL_MS,
            WeaponKind::Spread => SHIP_FIRE_INTERVAL_MS + 100.0,
            WeaponKind::Rapid => (SHIP_FIRE_INTERVAL_MS - 90.0).max(40.0),
            WeaponKind::Heavy => SHIP_FIRE_INTERVAL_MS + 150.0,
            WeaponKind::Laser => 0.0,
        }
    }
}

/// A player projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub damage: f32,
    pub kind: WeaponKind,
    /// Launch angle from straight up (only spread shots use a non-zero one)
    pub angle: f32,
    pub active: bool,
}

impl Projectile {
    pub fn new(pos: Vec2, kind: WeaponKind, angle: f32) -> Self {
        let (width, height, speed, damage) = match kind {
            WeaponKind::Spread => (5.0, 12.0, 540.0, 1.0),
            WeaponKind::Rapid => (4.0, 12.0, 720.0, 0.75),
            WeaponKind::Heavy => (10.0, 20.0, 420.0, 2.5),
            _ => (6.0, 16.0, 600.0, 1.0),
        };
        Self {
            pos,
            width,
            height,
            speed,
            damage,
            kind,
            angle,
            active: true,
        }
    }

    pub fn update(&mut self, dt_ms: f32) {
        if !self.active {
            return;
        }
        let dist = self.speed * dt_ms / 1000.0;
        if self.kind == WeaponKind::Spread {
            self.pos.x += self.angle.sin() * dist;
            self.pos.y -= self.angle.cos() * dist;
        } else {
            self.pos.y -= dist;
        }
        if self.pos.y < -self.height || self.pos.x < -self.width || self.pos.x > FIELD_WIDTH {
            self.active = false;
        }
    }
}

impl Hitbox for Projectile {
    fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// An enemy projectile. Plain shots fall straight, homing shots bend their
/// velocity toward the player with a bounded turn rate, and mines sit still
/// until their life timer expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlienProjectile {
    pub pos: Vec2,
    /// Velocity components (px/s); homing recomputes these from the speed
    pub vel: Vec2,
    /// Total speed preserved while the heading turns
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    pub damage: f32,
    /// Strength of the pull toward the player (0 = none)
    pub tracking_factor: f32,
    pub turn_speed: f32,
    /// Remaining life (ms) for mines; None for regular shots
    pub life_timer_ms: Option<f32>,
    pub active: bool,
}

impl AlienProjectile {
    /// `tracking` is the raw tracking strength before level scaling
    pub fn new(pos: Vec2, speed: f32, size: f32, tracking: f32, level: u32, rng: &mut Pcg32) -> Self {
        let speed = speed + rng.random_range(0.0..90.0);
        Self {
            pos,
            vel: Vec2::new(0.0, speed),
            speed,
            width: size,
            height: size * 1.5,
            damage: ALIEN_PROJECTILE_DAMAGE,
            tracking_factor: tracking * 0.002 * (level.min(5) as f32),
            turn_speed: 100.0 + rng.random_range(0.0..50.0),
            life_timer_ms: None,
            active: true,
        }
    }

    /// A stationary proximity mine that detonates after `life_ms`
    pub fn mine(pos: Vec2, size: f32, life_ms: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            speed: 0.0,
            width: size,
            height: size * 1.5,
            damage: ALIEN_PROJECTILE_DAMAGE,
            tracking_factor: 0.0,
            turn_speed: 0.0,
            life_timer_ms: Some(life_ms),
            active: true,
        }
    }

    /// Override the heading (used by boss fan/radial/cross-fire patterns)
    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.speed = vel.length();
        self.vel = vel;
        self
    }

    /// Advance one tick. Returns `true` if a mine's timer expired this tick;
    /// the caller spawns the radial burst.
    pub fn update(&mut self, dt_ms: f32, target: Option<Vec2>) -> bool {
        if !self.active {
            return false;
        }
        let dt = dt_ms / 1000.0;

        if self.tracking_factor > 0.0 {
            if let Some(target) = target {
                let to_target = target - self.pos;
                let desired = to_target.y.atan2(to_target.x);
                let current = self.vel.y.atan2(self.vel.x);

                let mut diff = desired - current;
                while diff <= -std::f32::consts::PI {
                    diff += std::f32::consts::TAU;
                }
                while diff > std::f32::consts::PI {
                    diff -= std::f32::consts::TAU;
                }

                // Bounded turn toward the target, speed preserved
                let max_turn = self.turn_speed * self.tracking_factor * dt;
                let heading = current + diff.abs().min(max_turn) * diff.signum();
                self.vel = Vec2::new(heading.cos(), heading.sin()) * self.speed;
            }
        }

        self.pos += self.vel * dt;

        if let Some(timer) = &mut self.life_timer_ms {
            *timer -= dt_ms;
            if *timer <= 0.0 {
                self.active = false;
                return true;
            }
        }

        if self.pos.y > FIELD_HEIGHT + self.height
            || self.pos.y < -self.height
            || self.pos.x < -self.width
            || self.pos.x > FIELD_WIDTH + self.width
        {
            self.active = false;
        }
        false
    }

    /// The 8-way burst a mine detonates into
    pub fn detonation_burst(pos: Vec2, rng: &mut Pcg32) -> Vec<AlienProjectile> {
        let count = 8;
        (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * std::f32::consts::TAU;
                let speed = 180.0 + rng.random_range(0.0..60.0);
                let size = 6.0 + rng.random_range(0.0..2.0);
                let mut proj = AlienProjectile::mine(pos, size, f32::MAX);
                proj.life_timer_ms = None;
                proj.speed = speed;
                proj.vel = Vec2::new(angle.cos(), angle.sin()) * speed;
                proj
            })
            .collect()
    }
}

impl Hitbox for AlienProjectile {
    fn bounds(&self) -> Rect {
        Rect::centered(self.pos, self.width, self.height)
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Power-up kinds: four alternative weapons, a timed shield, and a repair kit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Weapon(WeaponKind),
    Shield,
    Repair,
}

/// A drifting pickup dropped by a destroyed alien
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    pub kind: PowerUpKind,
    pub speed: f32,
    pub active: bool,
}

pub const POWERUP_SIZE: f32 = 28.0;

impl PowerUp {
    pub fn new(pos: Vec2, kind: PowerUpKind, rng: &mut Pcg32) -> Self {
        Self {
            pos,
            kind,
            speed: 110.0 + rng.random_range(0.0..40.0),
            active: true,
        }
    }

    /// Roll the drop distribution: 55% weapon, 30% shield, 15% repair
    pub fn roll_kind(rng: &mut Pcg32) -> PowerUpKind {
        let roll: f32 = rng.random();
        if roll < 0.55 {
            let weapon = match rng.random_range(0..4u8) {
                0 => WeaponKind::Spread,
                1 => WeaponKind::Rapid,
                2 => WeaponKind::Heavy,
                _ => WeaponKind::Laser,
            };
            PowerUpKind::Weapon(weapon)
        } else if roll < 0.85 {
            PowerUpKind::Shield
        } else {
            PowerUpKind::Repair
        }
    }

    pub fn update(&mut self, dt_ms: f32) {
        if !self.active {
            return;
        }
        self.pos.y += self.speed * dt_ms / 1000.0;
        if self.pos.y > FIELD_HEIGHT + POWERUP_SIZE {
            self.active = false;
        }
    }
}

impl Hitbox for PowerUp {
    fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, POWERUP_SIZE, POWERUP_SIZE)
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Explosion size tiers (drives particle counts and the audio cue)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionSize {
    Small,
    Medium,
    Large,
}

/// One debris particle of an explosion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionParticle {
    pub offset: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub size: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub life: f32,
    pub decay: f32,
}

/// Purely cosmetic explosion. Consumed by the renderer; never affects
/// gameplay state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub base_size: f32,
    pub size_category: ExplosionSize,
    pub life: f32,
    pub particles: Vec<ExplosionParticle>,
    pub active: bool,
}

impl Explosion {
    pub fn new(pos: Vec2, base_size: f32, size_category: ExplosionSize, rng: &mut Pcg32) -> Self {
        let (multiplier, particle_size, particle_speed) = match size_category {
            ExplosionSize::Small => (1.0, base_size / 12.0, 3.5),
            ExplosionSize::Medium => (2.0, base_size / 10.0, 4.5),
            ExplosionSize::Large => (3.5, base_size / 8.0, 5.5),
        };
        let count = (20.0 * multiplier + rng.random_range(0.0..12.0 * multiplier)) as usize;
        let particles = (0..count)
            .map(|_| ExplosionParticle {
                offset: Vec2::new(
                    rng.random_range(-0.5..0.5) * base_size * 0.1,
                    rng.random_range(-0.5..0.5) * base_size * 0.1,
                ),
                angle: rng.random_range(0.0..std::f32::consts::TAU),
                speed: rng.random_range(0.6..1.6) * particle_speed,
                size: rng.random_range(0.6..1.6) * particle_size,
                rotation: rng.random_range(0.0..std::f32::consts::TAU),
                rotation_speed: rng.random_range(-0.075..0.075),
                life: 1.0 + rng.random_range(0.0..0.6),
                decay: 0.01 + rng.random_range(0.0..0.015),
            })
            .collect();
        Self {
            pos,
            base_size,
            size_category,
            life: 1.0,
            particles,
            active: true,
        }
    }

    /// Advance and report whether the effect is still alive
    pub fn update(&mut self, dt_ms: f32) -> bool {
        if !self.active {
            return false;
        }
        // Particle timings were tuned against 60fps frames
        let dt_frames = dt_ms / (1000.0 / 60.0);
        self.life -= 0.015 * dt_frames;

        self.particles.retain_mut(|p| {
            p.life -= p.decay * dt_frames;
            if p.life <= 0.0 {
                return false;
            }
            let step = p.speed * p.life.max(0.1) * dt_frames;
            p.offset += Vec2::new(p.angle.cos(), p.angle.sin()) * step;
            p.rotation += p.rotation_speed * dt_frames;
            p.speed *= 1.0 - (0.03 + p.decay) * dt_frames;
            p.size = (p.size - p.decay * 20.0 * dt_frames).max(0.0);
            true
        });

        if self.life <= 0.0 && self.particles.is_empty() {
            self.active = false;
        }
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_projectile_moves_up_and_culls() {
        let mut p = Projectile::new(Vec2::new(100.0, 100.0), WeaponKind::Standard, 0.0);
        p.update(100.0);
        assert!(p.pos.y < 100.0);
        assert_eq!(p.pos.x, 100.0);

        let mut p = Projectile::new(Vec2::new(100.0, 5.0), WeaponKind::Standard, 0.0);
        p.update(100.0);
        assert!(!p.active);
    }

    #[test]
    fn test_spread_projectile_drifts_sideways() {
        let mut p = Projectile::new(Vec2::new(100.0, 400.0), WeaponKind::Spread, 0.4);
        p.update(50.0);
        assert!(p.pos.x > 100.0);
        assert!(p.pos.y < 400.0);
    }

    #[test]
    fn test_homing_bends_toward_target() {
        let mut rng = rng();
        let mut p = AlienProjectile::new(Vec2::new(400.0, 100.0), 180.0, 5.0, 0.2, 3, &mut rng);
        assert!(p.tracking_factor > 0.0);
        // Target far down-left; two seconds of tracking must produce a
        // material leftward component, not float noise.
        for _ in 0..120 {
            p.update(16.0, Some(Vec2::new(100.0, 800.0)));
        }
        assert!(p.vel.x < -30.0, "vel.x = {}", p.vel.x);
        // Speed magnitude is preserved by the turn
        assert!((p.vel.length() - p.speed).abs() < 1.0);
    }

    #[test]
    fn test_homing_straight_at_target_keeps_heading() {
        let mut rng = rng();
        let mut p = AlienProjectile::new(Vec2::new(400.0, 100.0), 180.0, 5.0, 0.2, 3, &mut rng);
        // Target directly below; there is nothing to correct, so no
        // sideways velocity may appear.
        for _ in 0..60 {
            p.update(16.0, Some(Vec2::new(400.0, 800.0)));
        }
        assert!(p.vel.x.abs() < 0.01, "vel.x = {}", p.vel.x);
        assert!((p.vel.y - p.speed).abs() < 0.01);
    }

    #[test]
    fn test_homing_turn_rate_is_bounded() {
        let mut rng = rng();
        let mut p = AlienProjectile::new(Vec2::new(400.0, 100.0), 180.0, 5.0, 0.2, 3, &mut rng);
        let before = p.vel.y.atan2(p.vel.x);
        // Target hard to the left, a quarter turn away from the heading
        p.update(16.0, Some(Vec2::new(0.0, 100.0)));
        let after = p.vel.y.atan2(p.vel.x);

        let max_turn = p.turn_speed * p.tracking_factor * 0.016;
        assert!((after - before).abs() <= max_turn + 1e-4);
        // And it actually turned, in the direction of the target
        assert!((after - before).abs() > max_turn * 0.5);
        assert!(p.vel.x < 0.0);
    }

    #[test]
    fn test_mine_detonates_after_lifetime() {
        let mut p = AlienProjectile::mine(Vec2::new(300.0, 300.0), 14.0, 500.0);
        assert!(!p.update(400.0, None));
        assert!(p.active);
        assert!(p.update(150.0, None));
        assert!(!p.active);
    }

    #[test]
    fn test_detonation_burst_covers_all_directions() {
        let mut rng = rng();
        let burst = AlienProjectile::detonation_burst(Vec2::new(200.0, 200.0), &mut rng);
        assert_eq!(burst.len(), 8);
        assert!(burst.iter().any(|p| p.vel.x > 0.0));
        assert!(burst.iter().any(|p| p.vel.x < 0.0));
        assert!(burst.iter().any(|p| p.vel.y > 0.0));
        assert!(burst.iter().any(|p| p.vel.y < 0.0));
        assert!(burst.iter().all(|p| p.life_timer_ms.is_none()));
    }

    #[test]
    fn test_powerup_drop_distribution_is_complete() {
        let mut rng = rng();
        for _ in 0..200 {
            // Just ensure every roll maps to a valid kind without panicking
            let _ = PowerUp::roll_kind(&mut rng);
        }
    }

    #[test]
    fn test_explosion_burns_out() {
        let mut rng = rng();
        let mut e = Explosion::new(Vec2::new(100.0, 100.0), 40.0, ExplosionSize::Small, &mut rng);
        let mut guard = 0;
        while e.update(32.0) {
            guard += 1;
            assert!(guard < 1000, "explosion never expired");
        }
        assert!(!e.active);
    }
}
