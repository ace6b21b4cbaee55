//! The end boss: component targeting, shield, phases and attack patterns
//!
//! The boss owns every timer it needs. Multi-step attacks live in a queue of
//! scheduled volleys on the boss itself, so defeating it cancels everything
//! still pending, and the defeat explosion cascade is a timer list driven
//! from the same update.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entities::{AlienProjectile, ExplosionSize};
use super::geom::{Hitbox, Rect};
use super::state::{GameEvent, GameState};
use crate::consts::*;

pub const BOSS_WIDTH: f32 = 200.0;
pub const BOSS_HEIGHT: f32 = 240.0;
/// Hover line the boss settles on after its entrance
pub const BOSS_TARGET_Y: f32 = 150.0;
pub const BOSS_ENTRANCE_SPEED: f32 = 40.0;
pub const BOSS_MAX_HEALTH: f32 = 500.0;
/// Health ratios that trigger phase 1, 2 and 3
pub const PHASE_THRESHOLDS: [f32; 3] = [0.7, 0.4, 0.15];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentKind {
    Core,
    LeftWing,
    RightWing,
    FrontCannon,
    LeftEngine,
    RightEngine,
}

/// A destructible section of the hull. Offsets are boss-local, centered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossComponent {
    pub kind: ComponentKind,
    pub offset: Vec2,
    pub width: f32,
    pub height: f32,
    pub health: f32,
    pub max_health: f32,
    /// Hits on this section are scaled by this
    pub damage_multiplier: f32,
    pub active: bool,
}

impl BossComponent {
    fn new(
        kind: ComponentKind,
        offset: Vec2,
        width: f32,
        height: f32,
        max_health: f32,
        damage_multiplier: f32,
    ) -> Self {
        Self {
            kind,
            offset,
            width,
            height,
            health: max_health,
            max_health,
            damage_multiplier,
            active: true,
        }
    }

    fn contains_local(&self, local: Vec2) -> bool {
        local.x >= self.offset.x - self.width / 2.0
            && local.x <= self.offset.x + self.width / 2.0
            && local.y >= self.offset.y - self.height / 2.0
            && local.y <= self.offset.y + self.height / 2.0
    }
}

/// Energy shield; absorbs everything while it holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossShield {
    pub active: bool,
    pub health: f32,
    pub max_health: f32,
    /// Regen speed in hp per ms
    pub regen_rate: f32,
    pub regen_timer_ms: f32,
    pub regen_cooldown_ms: f32,
    pub regen_active: bool,
}

impl Default for BossShield {
    fn default() -> Self {
        Self {
            active: true,
            health: 150.0,
            max_health: 150.0,
            regen_rate: 0.1,
            regen_timer_ms: 0.0,
            regen_cooldown_ms: 5000.0,
            regen_active: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MovePattern {
    Idle,
    Sine,
    /// Slide toward an x position, then fall back to sine
    Target(f32),
    /// Pick random targets on a timer
    Random,
}

/// Death beam lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BeamState {
    Inactive,
    /// Telegraph before firing; the column position is locked in
    Warning { remaining_ms: f32, x: f32 },
    Firing { remaining_ms: f32, x: f32 },
}

pub const BEAM_WIDTH: f32 = 40.0;
pub const BEAM_DURATION_MS: f32 = 1200.0;
pub const BEAM_DPS: f32 = 4.0;

/// One pending step of a multi-step attack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledVolley {
    pub delay_ms: f32,
    pub kind: VolleyKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VolleyKind {
    WaveRing { wave_num: u32 },
    TargetedShot { shot_num: u32 },
    BulletHellBurst { burst_num: u32, total: u32 },
    CrossFireRow { row_num: u32, base_y: f32, row_height: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    /// Center position
    pub pos: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub entering: bool,
    pub invulnerable: bool,
    pub defeated: bool,
    pub phase: u8,
    /// Scales the boss's outgoing projectile damage
    pub damage_multiplier: f32,
    pub move_speed: f32,
    pub move_pattern: MovePattern,
    pub move_timer_ms: f32,
    pub horizontal_phase: f32,
    pub horizontal_frequency: f32,
    pub horizontal_amplitude: f32,
    /// Time until the next attack pick (ms)
    pub attack_timer_ms: f32,
    pub components: Vec<BossComponent>,
    pub shield: BossShield,
    pub beam: BeamState,
    pub volleys: Vec<ScheduledVolley>,
    /// Remaining delays of the defeat explosion cascade
    pub defeat_explosion_timers: Vec<f32>,
}

impl Boss {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(FIELD_WIDTH / 2.0, -BOSS_HEIGHT),
            health: BOSS_MAX_HEALTH,
            max_health: BOSS_MAX_HEALTH,
            entering: true,
            invulnerable: true,
            defeated: false,
            phase: 0,
            damage_multiplier: 1.0,
            move_speed: 70.0,
            move_pattern: MovePattern::Idle,
            move_timer_ms: 0.0,
            horizontal_phase: 0.0,
            horizontal_frequency: 0.0004,
            horizontal_amplitude: FIELD_WIDTH * 0.35,
            attack_timer_ms: 1000.0,
            components: vec![
                BossComponent::new(ComponentKind::Core, Vec2::new(0.0, 0.0), 60.0, 60.0, 200.0, 0.5),
                BossComponent::new(ComponentKind::LeftWing, Vec2::new(-70.0, 20.0), 80.0, 40.0, 100.0, 1.2),
                BossComponent::new(ComponentKind::RightWing, Vec2::new(70.0, 20.0), 80.0, 40.0, 100.0, 1.2),
                BossComponent::new(ComponentKind::FrontCannon, Vec2::new(0.0, -60.0), 40.0, 60.0, 80.0, 1.5),
                BossComponent::new(ComponentKind::LeftEngine, Vec2::new(-50.0, 70.0), 30.0, 50.0, 60.0, 1.0),
                BossComponent::new(ComponentKind::RightEngine, Vec2::new(50.0, 70.0), 30.0, 50.0, 60.0, 1.0),
            ],
            shield: BossShield::default(),
            beam: BeamState::Inactive,
            volleys: Vec::new(),
            defeat_explosion_timers: Vec::new(),
        }
    }

    pub fn component(&self, kind: ComponentKind) -> Option<&BossComponent> {
        self.components.iter().find(|c| c.kind == kind)
    }

    fn component_active(&self, kind: ComponentKind) -> bool {
        self.component(kind).is_some_and(|c| c.active)
    }

    fn has_wing(&self) -> bool {
        self.component_active(ComponentKind::LeftWing)
            || self.component_active(ComponentKind::RightWing)
    }

    /// Where the cannon muzzle sits, falling back to center when destroyed
    fn cannon_muzzle(&self, drop: f32) -> Vec2 {
        if self.component_active(ComponentKind::FrontCannon) {
            self.pos + Vec2::new(0.0, -60.0 + drop)
        } else {
            self.pos + Vec2::new(0.0, drop)
        }
    }

    pub fn shield_up(&self) -> bool {
        self.shield.active && self.shield.health > 0.0
    }

    /// Aggregate health never exceeds what the surviving sections support
    fn clamp_total_health(&mut self) {
        let (hp, max): (f32, f32) = self
            .components
            .iter()
            .fold((0.0, 0.0), |(h, m), c| (h + c.health.max(0.0), m + c.max_health));
        let ceiling = self.max_health * (0.6 + 0.4 * hp / max);
        self.health = self.health.min(ceiling);
    }

    /// Phase the current health ratio calls for
    fn phase_for_ratio(ratio: f32) -> u8 {
        PHASE_THRESHOLDS.iter().filter(|&&t| ratio <= t).count() as u8
    }
}

impl Default for Boss {
    fn default() -> Self {
        Self::new()
    }
}

impl Hitbox for Boss {
    fn bounds(&self) -> Rect {
        Rect::centered(self.pos, BOSS_WIDTH, BOSS_HEIGHT)
    }

    fn is_active(&self) -> bool {
        !self.defeated
    }
}

/// Apply a hit at `hit` (world space). Returns false if the boss cannot be
/// damaged right now.
pub fn damage_boss(boss: &mut Boss, state: &mut GameState, amount: f32, hit: Vec2) -> bool {
    if boss.entering || boss.invulnerable || boss.defeated {
        return false;
    }

    if boss.shield_up() {
        boss.shield.health -= amount;
        boss.shield.regen_timer_ms = boss.shield.regen_cooldown_ms;
        boss.shield.regen_active = false;
        if boss.shield.health <= 0.0 {
            boss.shield.active = false;
            boss.shield.health = 0.0;
            state.spawn_explosion(boss.pos, BOSS_WIDTH * 0.6, ExplosionSize::Medium);
            state.push_event(GameEvent::BossShieldDown);
        }
        return true;
    }

    let local = hit - boss.pos;
    let component_idx = boss
        .components
        .iter()
        .position(|c| c.active && c.contains_local(local));

    if let Some(idx) = component_idx {
        let comp = &mut boss.components[idx];
        comp.health -= amount * comp.damage_multiplier;
        if comp.health <= 0.0 {
            comp.health = 0.0;
            comp.active = false;
            let kind = comp.kind;
            let at = boss.pos + comp.offset;
            let size = comp.width * 1.5;
            state.spawn_explosion(at, size, ExplosionSize::Medium);
            state.push_event(GameEvent::BossComponentDestroyed);
            match kind {
                ComponentKind::LeftEngine | ComponentKind::RightEngine => {
                    boss.move_speed = (boss.move_speed - 25.0).max(20.0);
                    state.add_score(2500);
                }
                ComponentKind::FrontCannon => {
                    boss.damage_multiplier = (boss.damage_multiplier - 0.3).max(0.5);
                    state.add_score(5000);
                }
                ComponentKind::LeftWing | ComponentKind::RightWing => {
                    state.add_score(3500);
                }
                ComponentKind::Core => {
                    boss.health -= boss.max_health * 0.2;
                    state.add_score(10000);
                }
            }
        }
        boss.clamp_total_health();
    } else {
        boss.health -= amount;
    }

    check_phase_change(boss, state);

    if boss.health <= 0.0 && !boss.defeated {
        boss.health = 0.0;
        defeat_boss(boss, state);
    }
    true
}

fn check_phase_change(boss: &mut Boss, state: &mut GameState) {
    let ratio = boss.health / boss.max_health;
    let should = Boss::phase_for_ratio(ratio);
    if should <= boss.phase {
        return;
    }

    while boss.phase < should {
        boss.phase += 1;
        boss.damage_multiplier += 0.3;
        boss.move_speed += 20.0;
        state.push_event(GameEvent::BossPhase(boss.phase));
    }
    state.spawn_explosion(boss.pos, BOSS_WIDTH * 0.7, ExplosionSize::Large);

    // Late phases bring the shield back at partial strength
    if boss.phase >= 2 && !boss.shield.active {
        boss.shield.active = true;
        boss.shield.health = boss.shield.max_health * 0.6;
        boss.shield.regen_rate = 0.2;
        state.push_event(GameEvent::BossShieldRestored);
    }
}

fn defeat_boss(boss: &mut Boss, state: &mut GameState) {
    boss.defeated = true;
    boss.volleys.clear();
    boss.beam = BeamState::Inactive;
    boss.defeat_explosion_timers = (0..10).map(|i| i as f32 * 200.0).collect();
    state.add_score(100000);
    state.push_event(GameEvent::BossDefeated);
    state.victory_countdown_ms = Some(5000.0);
    log::info!("boss defeated");
}

/// Advance the boss one tick. `boss` is detached from `state` while this
/// runs so both sides can be borrowed freely.
pub fn update_boss(boss: &mut Boss, state: &mut GameState, dt_ms: f32) {
    let dt = dt_ms / 1000.0;

    if boss.entering {
        boss.pos.y += BOSS_ENTRANCE_SPEED * dt;
        if boss.pos.y >= BOSS_TARGET_Y {
            boss.pos.y = BOSS_TARGET_Y;
            boss.entering = false;
            boss.invulnerable = false;
            boss.move_pattern = MovePattern::Sine;
            boss.horizontal_phase = 0.0;
        }
        return;
    }

    if boss.defeated {
        update_defeat_cascade(boss, state, dt_ms);
        return;
    }

    update_shield(boss, state, dt_ms);
    update_movement(boss, state, dt_ms);
    update_beam(boss, state, dt_ms);
    update_volleys(boss, state, dt_ms);

    // New attack picks wait for the beam telegraph to resolve
    if matches!(boss.beam, BeamState::Warning { .. }) {
        return;
    }
    boss.attack_timer_ms -= dt_ms;
    if boss.attack_timer_ms <= 0.0 && !state.game_over {
        let attack = pick_attack(boss, state);
        execute_attack(boss, state, attack);
        boss.attack_timer_ms =
            3000.0 - boss.phase as f32 * 500.0 + state.rng.random_range(0.0..1000.0);
    }
}

fn update_defeat_cascade(boss: &mut Boss, state: &mut GameState, dt_ms: f32) {
    let mut due = 0;
    for timer in &mut boss.defeat_explosion_timers {
        *timer -= dt_ms;
        if *timer <= 0.0 {
            due += 1;
        }
    }
    boss.defeat_explosion_timers.retain(|t| *t > 0.0);
    for _ in 0..due {
        let offset = Vec2::new(
            state.rng.random_range(-0.5..0.5) * BOSS_WIDTH,
            state.rng.random_range(-0.5..0.5) * BOSS_HEIGHT,
        );
        let size = 50.0 + state.rng.random_range(0.0..50.0);
        let tier = if state.rng.random::<bool>() {
            ExplosionSize::Medium
        } else {
            ExplosionSize::Large
        };
        state.spawn_explosion(boss.pos + offset, size, tier);
    }
}

fn update_shield(boss: &mut Boss, state: &mut GameState, dt_ms: f32) {
    let shield = &mut boss.shield;
    if !shield.active {
        // Depleted shields come back in the late phases, charging from zero
        if boss.phase >= 2 {
            shield.regen_timer_ms -= dt_ms;
            if shield.regen_timer_ms <= 0.0 && !shield.regen_active {
                shield.regen_active = true;
                shield.health = 0.0;
                shield.active = true;
                state.push_event(GameEvent::BossShieldRestored);
            }
        }
    } else if shield.regen_active {
        let rate = if boss.phase >= 3 { 0.3 } else { shield.regen_rate };
        shield.health = (shield.health + rate * dt_ms).min(shield.max_health);
        if shield.health >= shield.max_health {
            shield.regen_active = false;
        }
    }
}

fn update_movement(boss: &mut Boss, state: &mut GameState, dt_ms: f32) {
    let dt = dt_ms / 1000.0;

    // Per-phase movement aggression
    match boss.phase {
        1 => {
            if boss.move_pattern == MovePattern::Sine {
                boss.horizontal_frequency = 0.0005;
                boss.horizontal_amplitude = FIELD_WIDTH * 0.4;
            }
        }
        2 => {
            if state.rng.random::<f32>() < 0.005 {
                boss.move_pattern = MovePattern::Random;
                boss.move_timer_ms = 0.0;
            }
        }
        3 => {
            if boss.move_pattern == MovePattern::Sine {
                boss.horizontal_frequency = 0.0007;
                boss.horizontal_amplitude = FIELD_WIDTH * 0.45;
            }
            if state.rng.random::<f32>() < 0.01 {
                boss.move_pattern = MovePattern::Target(state.ship.center().x);
            }
        }
        _ => {}
    }

    match boss.move_pattern {
        MovePattern::Idle => {}
        MovePattern::Sine => {
            boss.horizontal_phase += boss.horizontal_frequency * dt_ms;
            boss.pos.x =
                FIELD_WIDTH / 2.0 + boss.horizontal_phase.sin() * boss.horizontal_amplitude;
        }
        MovePattern::Target(target_x) => {
            let dx = target_x - boss.pos.x;
            if dx.abs() > 5.0 {
                boss.pos.x += dx.signum() * boss.move_speed * dt;
            } else {
                boss.move_pattern = MovePattern::Sine;
            }
        }
        MovePattern::Random => {
            boss.move_timer_ms -= dt_ms;
            if boss.move_timer_ms <= 0.0 {
                let target =
                    state.rng.random_range(BOSS_WIDTH / 4.0..FIELD_WIDTH - BOSS_WIDTH / 2.0);
                boss.move_pattern = MovePattern::Target(target);
                boss.move_timer_ms = 3000.0 + state.rng.random_range(0.0..2000.0);
            }
        }
    }

    boss.pos.x = boss.pos.x.clamp(BOSS_WIDTH / 2.0, FIELD_WIDTH - BOSS_WIDTH / 2.0);
}

fn update_beam(boss: &mut Boss, state: &mut GameState, dt_ms: f32) {
    match boss.beam {
        BeamState::Inactive => {}
        BeamState::Warning { remaining_ms, x } => {
            let remaining_ms = remaining_ms - dt_ms;
            if remaining_ms <= 0.0 {
                boss.beam = BeamState::Firing {
                    remaining_ms: BEAM_DURATION_MS,
                    x,
                };
                state.push_event(GameEvent::AlienFired);
            } else {
                boss.beam = BeamState::Warning { remaining_ms, x };
            }
        }
        BeamState::Firing { remaining_ms, x } => {
            let remaining_ms = remaining_ms - dt_ms;
            // Continuous damage while the column overlaps the ship
            let column = Rect::new(x - BEAM_WIDTH / 2.0, boss.pos.y, BEAM_WIDTH, FIELD_HEIGHT);
            if column.overlaps(&state.ship.bounds()) {
                state.damage_player(BEAM_DPS * boss.damage_multiplier * dt_ms / 1000.0);
            }
            boss.beam = if remaining_ms <= 0.0 {
                BeamState::Inactive
            } else {
                BeamState::Firing { remaining_ms, x }
            };
        }
    }
}

fn update_volleys(boss: &mut Boss, state: &mut GameState, dt_ms: f32) {
    for volley in &mut boss.volleys {
        volley.delay_ms -= dt_ms;
    }
    let due: Vec<VolleyKind> = {
        let mut due = Vec::new();
        boss.volleys.retain(|v| {
            if v.delay_ms <= 0.0 {
                due.push(v.kind.clone());
                false
            } else {
                true
            }
        });
        due
    };
    for kind in due {
        match kind {
            VolleyKind::WaveRing { wave_num } => fire_wave_ring(boss, state, wave_num),
            VolleyKind::TargetedShot { shot_num } => fire_targeted_shot(boss, state, shot_num),
            VolleyKind::BulletHellBurst { burst_num, total } => {
                fire_bullet_hell_burst(boss, state, burst_num, total)
            }
            VolleyKind::CrossFireRow {
                row_num,
                base_y,
                row_height,
            } => fire_cross_fire_row(boss, state, row_num, base_y, row_height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttackKind {
    SpreadShot,
    WaveFire,
    TargetedVolley,
    MineField,
    BulletHell,
    CrossFire,
    DeathBeam,
}

fn pick_attack(boss: &Boss, state: &mut GameState) -> AttackKind {
    let mut pool = vec![AttackKind::SpreadShot, AttackKind::WaveFire];
    if boss.phase >= 1 {
        pool.push(AttackKind::TargetedVolley);
        pool.push(AttackKind::MineField);
    }
    if boss.phase >= 2 {
        pool.push(AttackKind::BulletHell);
        pool.push(AttackKind::CrossFire);
    }
    if boss.phase >= 3 {
        pool.push(AttackKind::DeathBeam);
        pool.push(AttackKind::BulletHell);
    }
    // Destroyed components take their attacks with them
    if !boss.component_active(ComponentKind::FrontCannon) {
        pool.retain(|a| *a != AttackKind::DeathBeam && *a != AttackKind::SpreadShot);
    }
    if !boss.has_wing() {
        pool.retain(|a| *a != AttackKind::BulletHell);
    }
    if pool.is_empty() {
        return AttackKind::WaveFire;
    }
    let pick = state.rng.random_range(0..pool.len());
    pool[pick]
}

fn execute_attack(boss: &mut Boss, state: &mut GameState, attack: AttackKind) {
    let phase = boss.phase as u32;
    match attack {
        AttackKind::SpreadShot => fire_spread_fan(boss, state),
        AttackKind::WaveFire => {
            let waves = 3 + phase.min(2);
            fire_wave_ring(boss, state, 0);
            for wave in 1..waves {
                boss.volleys.push(ScheduledVolley {
                    delay_ms: wave as f32 * 300.0,
                    kind: VolleyKind::WaveRing { wave_num: wave },
                });
            }
        }
        AttackKind::TargetedVolley => {
            let shots = 3 + phase;
            fire_targeted_shot(boss, state, 0);
            for shot in 1..shots {
                boss.volleys.push(ScheduledVolley {
                    delay_ms: shot as f32 * 200.0,
                    kind: VolleyKind::TargetedShot { shot_num: shot },
                });
            }
        }
        AttackKind::MineField => lay_mine_field(boss, state),
        AttackKind::BulletHell => {
            let total = 5 + phase;
            fire_bullet_hell_burst(boss, state, 0, total);
            for burst in 1..total {
                boss.volleys.push(ScheduledVolley {
                    delay_ms: burst as f32 * 200.0,
                    kind: VolleyKind::BulletHellBurst {
                        burst_num: burst,
                        total,
                    },
                });
            }
        }
        AttackKind::CrossFire => {
            let rows = 3 + phase.min(2);
            let base_y = boss.pos.y + 80.0;
            let row_height = (FIELD_HEIGHT - base_y) / (rows as f32 + 1.0);
            fire_cross_fire_row(boss, state, 0, base_y, row_height);
            for row in 1..rows {
                boss.volleys.push(ScheduledVolley {
                    delay_ms: row as f32 * 200.0,
                    kind: VolleyKind::CrossFireRow {
                        row_num: row,
                        base_y,
                        row_height,
                    },
                });
            }
        }
        AttackKind::DeathBeam => {
            let x = boss.cannon_muzzle(0.0).x;
            boss.beam = BeamState::Warning {
                remaining_ms: 2000.0 - boss.phase as f32 * 300.0,
                x,
            };
        }
    }
}

fn boss_projectile(
    state: &mut GameState,
    origin: Vec2,
    size: f32,
    vel: Vec2,
    tracking: f32,
) -> AlienProjectile {
    AlienProjectile::new(origin, vel.length(), size, tracking, state.level, &mut state.rng)
        .with_velocity(vel)
}

fn fire_spread_fan(boss: &mut Boss, state: &mut GameState) {
    let shots = 7 + boss.phase as u32 * 2;
    let spread = std::f32::consts::PI * 0.6;
    let start = std::f32::consts::FRAC_PI_2 - spread / 2.0;
    let origin = boss.cannon_muzzle(30.0);

    for i in 0..shots {
        let angle = start + (i as f32 / (shots - 1) as f32) * spread;
        let speed = 160.0 + state.rng.random_range(0.0..40.0);
        let size = 7.0 + state.rng.random_range(0.0..3.0);
        let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
        let proj = boss_projectile(state, origin, size, vel, 0.0);
        state.alien_projectiles.push(proj);
    }
    state.push_event(GameEvent::AlienFired);
}

fn fire_wave_ring(boss: &mut Boss, state: &mut GameState, wave_num: u32) {
    let shots = 8 + boss.phase as u32 * 2;
    let left_wing = boss.component_active(ComponentKind::LeftWing);
    let right_wing = boss.component_active(ComponentKind::RightWing);

    for i in 0..shots {
        let angle = i as f32 / shots as f32 * std::f32::consts::TAU;
        let speed_mod = 1.0 + (angle * 2.0).sin() * 0.2;
        let speed = (140.0 + wave_num as f32 * 20.0) * speed_mod;
        let size = 5.0 + state.rng.random_range(0.0..3.0);

        let origin = if left_wing && i < shots / 3 {
            boss.pos + Vec2::new(-70.0, 20.0)
        } else if right_wing && i >= 2 * shots / 3 {
            boss.pos + Vec2::new(70.0, 20.0)
        } else {
            boss.pos + Vec2::new(0.0, 30.0)
        };

        let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
        let proj = boss_projectile(state, origin, size, vel, 0.0);
        state.alien_projectiles.push(proj);
    }
    state.push_event(GameEvent::AlienFired);
}

fn fire_targeted_shot(boss: &mut Boss, state: &mut GameState, shot_num: u32) {
    let origin = boss.cannon_muzzle(20.0);
    let target = state.ship.center();
    let to_target = target - origin;
    let angle = to_target.y.atan2(to_target.x);

    let speed = 210.0 + shot_num as f32 * 20.0;
    let tracking = (0.3 + boss.phase as f32 * 0.15 + shot_num as f32 * 0.05) * 100.0;
    let size = 8.0 + state.rng.random_range(0.0..4.0);
    let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
    let proj = boss_projectile(state, origin, size, vel, tracking);
    state.alien_projectiles.push(proj);
    state.push_event(GameEvent::AlienFired);
}

fn lay_mine_field(boss: &mut Boss, state: &mut GameState) {
    let mines = 4 + boss.phase as u32 * 2;
    let field_width = FIELD_WIDTH * 0.7;
    let field_top = boss.pos.y + 100.0;
    let field_bottom = FIELD_HEIGHT * 0.7;

    for _ in 0..mines {
        let x = (FIELD_WIDTH - field_width) / 2.0 + state.rng.random_range(0.0..field_width);
        let y = field_top + state.rng.random_range(0.0..(field_bottom - field_top).max(1.0));
        let size = 12.0 + state.rng.random_range(0.0..6.0);
        let life = 5000.0 + state.rng.random_range(0.0..2000.0);
        state
            .alien_projectiles
            .push(AlienProjectile::mine(Vec2::new(x, y), size, life));
    }
    state.push_event(GameEvent::AlienFired);
}

fn fire_bullet_hell_burst(boss: &mut Boss, state: &mut GameState, burst_num: u32, total: u32) {
    let shots = 6 + boss.phase as u32;
    let angle_offset = burst_num as f32 / total as f32 * std::f32::consts::PI;

    for i in 0..shots {
        let angle = angle_offset + i as f32 / shots as f32 * std::f32::consts::TAU;
        let speed = 160.0 + state.rng.random_range(0.0..40.0);
        let size = 5.0 + state.rng.random_range(0.0..2.0);
        let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
        let proj = boss_projectile(state, boss.pos, size, vel, 0.0);
        state.alien_projectiles.push(proj);
    }
    state.push_event(GameEvent::AlienFired);
}

fn fire_cross_fire_row(
    boss: &mut Boss,
    state: &mut GameState,
    row_num: u32,
    base_y: f32,
    row_height: f32,
) {
    let y = base_y + row_num as f32 * row_height;
    let direction = if row_num % 2 == 0 { 1.0 } else { -1.0 };
    let shots = 10 + boss.phase as u32 * 2;
    let spacing = FIELD_WIDTH / shots as f32;

    for i in 0..shots {
        let x = if direction > 0.0 {
            i as f32 * spacing
        } else {
            FIELD_WIDTH - i as f32 * spacing
        };
        let speed = 140.0 + state.rng.random_range(0.0..30.0);
        let size = 5.0 + state.rng.random_range(0.0..3.0);
        let vel = Vec2::new(direction * speed * 0.4, speed * 0.6);
        let proj = boss_projectile(state, Vec2::new(x, y), size, vel, 0.0);
        state.alien_projectiles.push(proj);
    }
    state.push_event(GameEvent::AlienFired);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn battle_ready() -> Boss {
        let mut boss = Boss::new();
        boss.pos = Vec2::new(FIELD_WIDTH / 2.0, BOSS_TARGET_Y);
        boss.entering = false;
        boss.invulnerable = false;
        boss
    }

    #[test]
    fn test_entrance_blocks_damage() {
        let mut state = GameState::new(21);
        let mut boss = Boss::new();
        let at = boss.pos;
        assert!(!damage_boss(&mut boss, &mut state, 50.0, at));
        assert_eq!(boss.health, BOSS_MAX_HEALTH);
    }

    #[test]
    fn test_shield_absorbs_and_drops_on_third_hit() {
        let mut state = GameState::new(21);
        let mut boss = battle_ready();

        let at = boss.pos;
        assert!(damage_boss(&mut boss, &mut state, 50.0, at));
        assert!(damage_boss(&mut boss, &mut state, 50.0, at));
        assert!(boss.shield_up());
        assert_eq!(boss.health, BOSS_MAX_HEALTH);

        assert!(damage_boss(&mut boss, &mut state, 50.0, at));
        assert!(!boss.shield_up());
        assert_eq!(boss.health, BOSS_MAX_HEALTH);
        assert!(state.events.contains(&GameEvent::BossShieldDown));
    }

    #[test]
    fn test_component_hit_uses_its_multiplier() {
        let mut state = GameState::new(21);
        let mut boss = battle_ready();
        boss.shield.active = false;

        // The front cannon sits at local (0, -60) and takes 1.5x
        let hit = boss.pos + Vec2::new(0.0, -60.0);
        damage_boss(&mut boss, &mut state, 10.0, hit);
        let cannon = boss.component(ComponentKind::FrontCannon).unwrap();
        assert_eq!(cannon.health, 80.0 - 15.0);
    }

    #[test]
    fn test_cannon_destruction_softens_attacks_and_scores() {
        let mut state = GameState::new(21);
        let mut boss = battle_ready();
        boss.shield.active = false;

        let hit = boss.pos + Vec2::new(0.0, -60.0);
        damage_boss(&mut boss, &mut state, 1000.0, hit);
        assert!(!boss.component_active(ComponentKind::FrontCannon));
        assert_eq!(boss.damage_multiplier, 0.7);
        assert_eq!(state.score, 5000);
        assert!(state.events.contains(&GameEvent::BossComponentDestroyed));
    }

    #[test]
    fn test_health_clamped_to_component_formula() {
        let mut state = GameState::new(21);
        let mut boss = battle_ready();
        boss.shield.active = false;

        // Destroy both wings at a point away from other components
        let left_wing = boss.pos + Vec2::new(-70.0, 20.0);
        let right_wing = boss.pos + Vec2::new(70.0, 20.0);
        damage_boss(&mut boss, &mut state, 1000.0, left_wing);
        damage_boss(&mut boss, &mut state, 1000.0, right_wing);

        let (hp, max): (f32, f32) = boss
            .components
            .iter()
            .fold((0.0, 0.0), |(h, m), c| (h + c.health, m + c.max_health));
        let ceiling = boss.max_health * (0.6 + 0.4 * hp / max);
        assert!(boss.health <= ceiling + 0.001);
    }

    #[test]
    fn test_phase_advances_monotonically() {
        let mut state = GameState::new(21);
        let mut boss = battle_ready();
        boss.shield.active = false;

        boss.health = boss.max_health * 0.65;
        check_phase_change(&mut boss, &mut state);
        assert_eq!(boss.phase, 1);

        boss.health = boss.max_health * 0.1;
        check_phase_change(&mut boss, &mut state);
        assert_eq!(boss.phase, 3);

        // Healing back up never reverts the phase
        boss.health = boss.max_health * 0.9;
        check_phase_change(&mut boss, &mut state);
        assert_eq!(boss.phase, 3);
    }

    #[test]
    fn test_phase_two_rearms_a_broken_shield() {
        let mut state = GameState::new(21);
        let mut boss = battle_ready();
        boss.shield.active = false;
        boss.shield.health = 0.0;

        boss.health = boss.max_health * 0.35;
        check_phase_change(&mut boss, &mut state);
        assert_eq!(boss.phase, 2);
        assert!(boss.shield.active);
        assert_eq!(boss.shield.health, boss.shield.max_health * 0.6);
    }

    #[test]
    fn test_defeat_cancels_pending_volleys_and_schedules_cascade() {
        let mut state = GameState::new(21);
        let mut boss = battle_ready();
        boss.shield.active = false;
        boss.volleys.push(ScheduledVolley {
            delay_ms: 100.0,
            kind: VolleyKind::WaveRing { wave_num: 1 },
        });
        boss.beam = BeamState::Firing {
            remaining_ms: 500.0,
            x: boss.pos.x,
        };

        boss.health = 1.0;
        let hull_edge = boss.pos + Vec2::new(95.0, -110.0);
        damage_boss(&mut boss, &mut state, 10.0, hull_edge);
        assert!(boss.defeated);
        assert!(boss.volleys.is_empty());
        assert_eq!(boss.beam, BeamState::Inactive);
        assert_eq!(boss.defeat_explosion_timers.len(), 10);
        assert_eq!(state.victory_countdown_ms, Some(5000.0));
        assert!(state.events.contains(&GameEvent::BossDefeated));

        // Cascade produces no projectiles and drains over time
        let shots_before = state.alien_projectiles.len();
        for _ in 0..40 {
            update_boss(&mut boss, &mut state, 100.0);
        }
        assert!(boss.defeat_explosion_timers.is_empty());
        assert_eq!(state.alien_projectiles.len(), shots_before);
        assert!(!state.explosions.is_empty());
    }

    #[test]
    fn test_entrance_descends_to_hover_line() {
        let mut state = GameState::new(21);
        let mut boss = Boss::new();
        for _ in 0..200 {
            update_boss(&mut boss, &mut state, 100.0);
        }
        assert!(!boss.entering);
        assert!(!boss.invulnerable);
        assert_eq!(boss.pos.y, BOSS_TARGET_Y);
        assert_eq!(boss.move_pattern, MovePattern::Sine);
    }

    #[test]
    fn test_wave_fire_schedules_future_rings() {
        let mut state = GameState::new(21);
        let mut boss = battle_ready();
        execute_attack(&mut boss, &mut state, AttackKind::WaveFire);
        // First ring fires immediately, the rest are queued
        assert!(!state.alien_projectiles.is_empty());
        assert_eq!(boss.volleys.len(), 2);

        let count_after_first = state.alien_projectiles.len();
        update_volleys(&mut boss, &mut state, 301.0);
        assert!(state.alien_projectiles.len() > count_after_first);
        assert_eq!(boss.volleys.len(), 1);
    }

    #[test]
    fn test_beam_telegraph_then_fires_and_expires() {
        let mut state = GameState::new(21);
        let mut boss = battle_ready();
        boss.phase = 3;
        execute_attack(&mut boss, &mut state, AttackKind::DeathBeam);
        assert!(matches!(boss.beam, BeamState::Warning { .. }));

        // Warning runs 2000 - 300*3 = 1100 ms
        update_beam(&mut boss, &mut state, 1101.0);
        assert!(matches!(boss.beam, BeamState::Firing { .. }));

        update_beam(&mut boss, &mut state, BEAM_DURATION_MS + 1.0);
        assert_eq!(boss.beam, BeamState::Inactive);
    }

    #[test]
    fn test_beam_damages_overlapping_player() {
        let mut state = GameState::new(21);
        let mut boss = battle_ready();
        let ship_x = state.ship.center().x;
        boss.beam = BeamState::Firing {
            remaining_ms: 1000.0,
            x: ship_x,
        };
        update_beam(&mut boss, &mut state, 500.0);
        assert!(state.ship.health < SHIP_MAX_HEALTH);
    }

    #[test]
    fn test_attack_pool_respects_destroyed_components() {
        let mut state = GameState::new(21);
        let mut boss = battle_ready();
        boss.phase = 3;
        for comp in &mut boss.components {
            if matches!(
                comp.kind,
                ComponentKind::FrontCannon | ComponentKind::LeftWing | ComponentKind::RightWing
            ) {
                comp.active = false;
            }
        }
        for _ in 0..50 {
            let attack = pick_attack(&boss, &mut state);
            assert_ne!(attack, AttackKind::DeathBeam);
            assert_ne!(attack, AttackKind::SpreadShot);
            assert_ne!(attack, AttackKind::BulletHell);
        }
    }
}
