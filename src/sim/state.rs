//! Game state and the player ship
//!
//! `GameState` is the single context object threaded through every
//! subsystem. Nothing in the simulation reads globals.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::alien::Alien;
use super::boss::Boss;
use super::crystal::Crystal;
use super::entities::{
    AlienProjectile, Explosion, ExplosionSize, PowerUp, PowerUpKind, Projectile, WeaponKind,
};
use super::geom::{Hitbox, Rect};
use super::waves::WaveDirector;
use crate::consts::*;

/// Notifications the simulation emits for the host to turn into sound and
/// DOM updates. Drained once per frame; purely fire-and-forget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WeaponFired(WeaponKind),
    Explosion(ExplosionSize),
    AlienFired,
    PowerUpCollected(PowerUpKind),
    CrystalCollected { tier: u8, value: u64 },
    ShieldUp,
    ShieldDown,
    PlayerHit,
    LifeLost,
    WaveStarted { index: usize, name: &'static str },
    BossWarning,
    BossSpawned,
    BossPhase(u8),
    BossShieldDown,
    BossShieldRestored,
    BossComponentDestroyed,
    BossDefeated,
    GameOver { victory: bool },
}

/// What `Spaceship::take_damage` did with the hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Shield or invincibility swallowed it
    Ignored,
    Survived,
    /// Health reached zero
    Depleted,
}

/// The player ship. Position is the top-left corner of its hull rect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spaceship {
    pub pos: Vec2,
    pub health: f32,
    pub weapon: WeaponKind,
    /// Time until the next shot may fire (ms)
    pub fire_cooldown_ms: f32,
    /// Post-hit mercy window (ms remaining)
    pub hit_invincibility_ms: f32,
    /// Longer mercy window after losing a life (ms remaining)
    pub life_loss_invincibility_ms: f32,
    /// Shield power-up time remaining (ms)
    pub shield_ms: f32,
}

impl Default for Spaceship {
    fn default() -> Self {
        Self {
            pos: Vec2::new(
                FIELD_WIDTH / 2.0 - SHIP_WIDTH / 2.0,
                FIELD_HEIGHT - SHIP_HEIGHT - 30.0,
            ),
            health: SHIP_MAX_HEALTH,
            weapon: WeaponKind::Standard,
            fire_cooldown_ms: 0.0,
            hit_invincibility_ms: 0.0,
            life_loss_invincibility_ms: 0.0,
            shield_ms: 0.0,
        }
    }
}

impl Spaceship {
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(SHIP_WIDTH / 2.0, SHIP_HEIGHT / 2.0)
    }

    /// Where new shots and the laser beam originate
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x + SHIP_WIDTH / 2.0, self.pos.y)
    }

    pub fn shield_active(&self) -> bool {
        self.shield_ms > 0.0
    }

    pub fn shield_radius(&self) -> f32 {
        SHIP_WIDTH * 0.8
    }

    pub fn is_invincible(&self) -> bool {
        self.shield_active()
            || self.hit_invincibility_ms > 0.0
            || self.life_loss_invincibility_ms > 0.0
    }

    /// Blink while a mercy window runs (renderer hint only)
    pub fn is_visible(&self) -> bool {
        let t = self.hit_invincibility_ms.max(self.life_loss_invincibility_ms);
        if t <= 0.0 {
            return true;
        }
        (t / 100.0) as u32 % 2 == 0
    }

    /// Apply damage unless a shield or mercy window is running. All player
    /// damage goes through here.
    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.is_invincible() {
            return DamageOutcome::Ignored;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            DamageOutcome::Depleted
        } else {
            self.hit_invincibility_ms = HIT_INVINCIBILITY_MS;
            DamageOutcome::Survived
        }
    }

    /// Refill after losing a life; weapon resets to standard
    fn respawn(&mut self) {
        self.health = SHIP_MAX_HEALTH;
        self.weapon = WeaponKind::Standard;
        self.shield_ms = 0.0;
        self.hit_invincibility_ms = 0.0;
        self.life_loss_invincibility_ms = LIFE_LOSS_INVINCIBILITY_MS;
    }
}

impl Hitbox for Spaceship {
    fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, SHIP_WIDTH, SHIP_HEIGHT)
    }

    fn is_active(&self) -> bool {
        true
    }
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed (the rng itself is rebuilt from this on deserialize)
    pub seed: u64,
    #[serde(skip, default = "default_rng")]
    pub rng: Pcg32,

    pub ship: Spaceship,
    pub lives: u8,
    pub score: u64,
    /// Crystals banked this run
    pub gems: u32,
    /// Current wave number, 1-based (drives homing/difficulty scaling)
    pub level: u32,

    pub director: WaveDirector,
    /// Shared cooldown keeping the whole alien fleet from volleying at once
    pub global_alien_fire_cooldown_ms: f32,

    pub projectiles: Vec<Projectile>,
    pub alien_projectiles: Vec<AlienProjectile>,
    pub aliens: Vec<Alien>,
    pub power_ups: Vec<PowerUp>,
    pub crystals: Vec<Crystal>,
    pub explosions: Vec<Explosion>,
    pub boss: Option<Boss>,

    /// True on frames where the laser beam is live (renderer + resolver)
    pub laser_firing: bool,

    pub paused: bool,
    pub game_over: bool,
    pub victory: bool,
    /// Countdown from boss defeat to the victory screen
    pub victory_countdown_ms: Option<f32>,
    /// Total simulated time this run (ms)
    pub elapsed_ms: f64,

    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            ship: Spaceship::default(),
            lives: STARTING_LIVES,
            score: 0,
            gems: 0,
            level: 1,
            director: WaveDirector::default(),
            global_alien_fire_cooldown_ms: 0.0,
            projectiles: Vec::new(),
            alien_projectiles: Vec::new(),
            aliens: Vec::new(),
            power_ups: Vec::new(),
            crystals: Vec::new(),
            explosions: Vec::new(),
            boss: None,
            laser_firing: false,
            paused: false,
            game_over: false,
            victory: false,
            victory_countdown_ms: None,
            elapsed_ms: 0.0,
            events: Vec::new(),
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand the frame's events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_score(&mut self, points: u64) {
        self.score += points;
    }

    /// Damage the player, handling life loss and game over
    pub fn damage_player(&mut self, amount: f32) {
        match self.ship.take_damage(amount) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Survived => self.push_event(GameEvent::PlayerHit),
            DamageOutcome::Depleted => self.lose_life(),
        }
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        let at = self.ship.center();
        self.spawn_explosion(at, SHIP_WIDTH, ExplosionSize::Large);
        if self.lives == 0 {
            self.game_over = true;
            self.push_event(GameEvent::GameOver { victory: false });
        } else {
            self.ship.respawn();
            self.push_event(GameEvent::LifeLost);
        }
    }

    pub fn spawn_explosion(&mut self, pos: Vec2, base_size: f32, size: ExplosionSize) {
        self.explosions
            .push(Explosion::new(pos, base_size, size, &mut self.rng));
        self.push_event(GameEvent::Explosion(size));
    }

    /// Tick the player's clocks; emits ShieldDown when the shield expires
    pub fn tick_player_timers(&mut self, dt_ms: f32) {
        let ship = &mut self.ship;
        ship.fire_cooldown_ms = (ship.fire_cooldown_ms - dt_ms).max(0.0);
        ship.hit_invincibility_ms = (ship.hit_invincibility_ms - dt_ms).max(0.0);
        ship.life_loss_invincibility_ms = (ship.life_loss_invincibility_ms - dt_ms).max(0.0);
        if ship.shield_ms > 0.0 {
            ship.shield_ms -= dt_ms;
            if ship.shield_ms <= 0.0 {
                ship.shield_ms = 0.0;
                self.push_event(GameEvent::ShieldDown);
            }
        }
    }

    /// Apply a collected power-up to the ship
    pub fn apply_power_up(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::Weapon(weapon) => {
                if self.ship.weapon == weapon {
                    // Duplicate weapon converts to points
                    self.add_score(250);
                } else {
                    self.ship.weapon = weapon;
                }
            }
            PowerUpKind::Shield => {
                self.ship.shield_ms = SHIELD_DURATION_MS;
                self.push_event(GameEvent::ShieldUp);
            }
            PowerUpKind::Repair => {
                self.ship.health = (self.ship.health + 4.0).min(SHIP_MAX_HEALTH);
            }
        }
        self.push_event(GameEvent::PowerUpCollected(kind));
    }
}
