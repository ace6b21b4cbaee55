//! Nethex Assault - a wave-based 2D space shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, waves, boss)
//! - `audio`: Procedural Web Audio sound effects
//! - `ui`: DOM readout pushes (score/health/wave/boss bar)
//! - `settings`: Player preferences
//! - `highscores`: Local leaderboard

pub mod audio;
pub mod highscores;
pub mod settings;
pub mod sim;
pub mod ui;

pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Logical playfield dimensions (pixels)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 900.0;

    /// Upper bound on per-frame delta time (ms) to avoid catch-up jumps
    /// after tab suspension
    pub const MAX_DELTA_MS: f32 = 100.0;

    /// Player ship
    pub const SHIP_WIDTH: f32 = 50.0;
    pub const SHIP_HEIGHT: f32 = 60.0;
    pub const SHIP_SPEED: f32 = 260.0;
    pub const SHIP_MAX_HEALTH: f32 = 10.0;
    pub const SHIP_FIRE_INTERVAL_MS: f32 = 145.0;
    pub const STARTING_LIVES: u8 = 3;
    pub const HIT_INVINCIBILITY_MS: f32 = 1100.0;
    pub const LIFE_LOSS_INVINCIBILITY_MS: f32 = 2500.0;
    pub const SHIELD_DURATION_MS: f32 = 8500.0;

    /// Enemy damage values
    pub const ALIEN_PROJECTILE_DAMAGE: f32 = 1.0;
    pub const ALIEN_COLLISION_DAMAGE: f32 = 3.0;
    /// Ramming the boss hull hurts considerably more than a regular alien
    pub const BOSS_COLLISION_DAMAGE: f32 = ALIEN_COLLISION_DAMAGE * 3.0;

    /// Continuous beam weapon
    pub const LASER_DPS: f32 = 15.0;
    pub const LASER_WIDTH: f32 = 12.0;
    /// Damage per second dealt by the player shield to overlapping aliens
    pub const SHIELD_CONTACT_DPS: f32 = 25.0;

    /// Chance an alien death drops a power-up
    pub const POWERUP_DROP_CHANCE: f32 = 0.18;
    /// Maximum concurrent power-ups on screen
    pub const MAX_POWERUPS: usize = 4;

    /// Minimum horizontal clearance kept between aliens (pixels)
    pub const ALIEN_SEPARATION_BUFFER: f32 = 7.0;
    /// Radius within which crystals are pulled toward the ship
    pub const CRYSTAL_ATTRACTION_RADIUS: f32 = 150.0;
}
