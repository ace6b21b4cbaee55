//! Wave table and the spawn director
//!
//! Four scripted waves, each a timed window that spawns from a fixed set of
//! alien archetypes, followed by a breather. After the last breather the
//! director issues the boss warning, waits for the field to clear, and
//! spawns the boss exactly once.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::alien::{Alien, AlienParams, MovementPattern};
use super::boss::Boss;
use super::state::{GameEvent, GameState};
use crate::consts::FIELD_WIDTH;

/// One scripted wave
#[derive(Debug, Clone)]
pub struct WaveDescriptor {
    pub name: &'static str,
    /// How long the spawn window stays open (ms)
    pub duration_ms: f32,
    pub spawn_interval_ms: f32,
    /// Concurrent active aliens never exceed this
    pub fleet_cap: u32,
    /// Breather after the window closes (ms)
    pub pause_after_ms: f32,
    pub archetypes: &'static [AlienParams],
}

pub const WAVES: [WaveDescriptor; 4] = [
    WaveDescriptor {
        name: "Nethex Scouts",
        duration_ms: 35000.0,
        spawn_interval_ms: 1600.0,
        fleet_cap: 11,
        pause_after_ms: 3500.0,
        archetypes: &[
            // scout
            AlienParams {
                health: 1.0,
                speed_y: 80.0,
                shoot_cooldown_ms: 2600.0,
                pattern: MovementPattern::Straight,
                speed_factor: 0.95,
                size_multiplier: 1.0,
                homing_shots: false,
                collision_damage_boost: 0.0,
            },
            // scout_sine
            AlienParams {
                health: 1.2,
                speed_y: 70.0,
                shoot_cooldown_ms: 2800.0,
                pattern: MovementPattern::Sine,
                speed_factor: 0.95,
                size_multiplier: 1.0,
                homing_shots: false,
                collision_damage_boost: 0.0,
            },
        ],
    },
    WaveDescriptor {
        name: "Assault Squadrons",
        duration_ms: 50000.0,
        spawn_interval_ms: 1300.0,
        fleet_cap: 15,
        pause_after_ms: 4500.0,
        archetypes: &[
            // fighter
            AlienParams {
                health: 3.0,
                speed_y: 95.0,
                shoot_cooldown_ms: 1900.0,
                pattern: MovementPattern::ZigZag,
                speed_factor: 1.0,
                size_multiplier: 1.0,
                homing_shots: false,
                collision_damage_boost: 0.0,
            },
            // scout_sine, toughened
            AlienParams {
                health: 2.0,
                speed_y: 80.0,
                shoot_cooldown_ms: 2200.0,
                pattern: MovementPattern::Sine,
                speed_factor: 1.0,
                size_multiplier: 1.0,
                homing_shots: false,
                collision_damage_boost: 0.0,
            },
        ],
    },
    WaveDescriptor {
        name: "Heavy Bombers",
        duration_ms: 65000.0,
        spawn_interval_ms: 1100.0,
        fleet_cap: 17,
        pause_after_ms: 5500.0,
        archetypes: &[
            // bomber
            AlienParams {
                health: 7.0,
                speed_y: 65.0,
                shoot_cooldown_ms: 1600.0,
                pattern: MovementPattern::Straight,
                speed_factor: 1.1,
                size_multiplier: 1.2,
                homing_shots: false,
                collision_damage_boost: 0.0,
            },
            // fighter_elite
            AlienParams {
                health: 4.0,
                speed_y: 105.0,
                shoot_cooldown_ms: 1700.0,
                pattern: MovementPattern::Diagonal,
                speed_factor: 1.1,
                size_multiplier: 1.0,
                homing_shots: true,
                collision_damage_boost: 0.0,
            },
        ],
    },
    WaveDescriptor {
        name: "Elite Guard",
        duration_ms: 50000.0,
        spawn_interval_ms: 800.0,
        fleet_cap: 14,
        pause_after_ms: 7000.0,
        archetypes: &[
            // elite_guardian
            AlienParams {
                health: 6.0,
                speed_y: 125.0,
                shoot_cooldown_ms: 1300.0,
                pattern: MovementPattern::Sine,
                speed_factor: 1.2,
                size_multiplier: 1.0,
                homing_shots: true,
                collision_damage_boost: 0.0,
            },
            // kamikaze
            AlienParams {
                health: 1.5,
                speed_y: 200.0,
                shoot_cooldown_ms: 99999.0,
                pattern: MovementPattern::Seeking,
                speed_factor: 1.5,
                size_multiplier: 1.0,
                homing_shots: false,
                collision_damage_boost: 6.0,
            },
        ],
    },
];

/// Delay before the very first wave (ms)
pub const FIRST_WAVE_COUNTDOWN_MS: f32 = 500.0;
/// Delay before the first spawn of each wave (ms)
pub const FIRST_SPAWN_DELAY_MS: f32 = 500.0;

/// Spawn director state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WaveDirector {
    /// Breather before wave `next_index` (or before the boss warning when
    /// past the table)
    Paused { next_index: usize, countdown_ms: f32 },
    Active {
        index: usize,
        time_left_ms: f32,
        spawn_timer_ms: f32,
    },
    /// Warning issued; boss enters once the field is clear
    AwaitingBoss,
    BossPhase,
}

impl Default for WaveDirector {
    fn default() -> Self {
        WaveDirector::Paused {
            next_index: 0,
            countdown_ms: FIRST_WAVE_COUNTDOWN_MS,
        }
    }
}

impl WaveDirector {
    /// Fleet cap of the active wave, if one is running
    pub fn current_fleet_cap(&self) -> Option<u32> {
        match self {
            WaveDirector::Active { index, .. } => Some(WAVES[*index].fleet_cap),
            _ => None,
        }
    }
}

/// Later repeats of the table get tougher per wave index
fn scaled_params(base: &AlienParams, wave_index: usize) -> AlienParams {
    let i = wave_index as f32;
    AlienParams {
        health: base.health * (1.0 + 0.1 * i),
        speed_y: base.speed_y * (1.0 + 0.08 * i),
        shoot_cooldown_ms: (base.shoot_cooldown_ms * (1.0 - 0.09 * i)).max(400.0),
        ..base.clone()
    }
}

/// Advance the director one tick
pub fn update_director(state: &mut GameState, dt_ms: f32) {
    match state.director {
        WaveDirector::Paused {
            next_index,
            countdown_ms,
        } => {
            let countdown_ms = countdown_ms - dt_ms;
            if countdown_ms > 0.0 {
                state.director = WaveDirector::Paused {
                    next_index,
                    countdown_ms,
                };
            } else if next_index >= WAVES.len() {
                log::info!("all waves completed, boss incoming");
                state.push_event(GameEvent::BossWarning);
                state.director = WaveDirector::AwaitingBoss;
            } else {
                let wave = &WAVES[next_index];
                log::info!("wave {} started: {}", next_index + 1, wave.name);
                state.level = next_index as u32 + 1;
                state.push_event(GameEvent::WaveStarted {
                    index: next_index,
                    name: wave.name,
                });
                state.director = WaveDirector::Active {
                    index: next_index,
                    time_left_ms: wave.duration_ms,
                    spawn_timer_ms: FIRST_SPAWN_DELAY_MS,
                };
            }
        }
        WaveDirector::Active {
            index,
            time_left_ms,
            spawn_timer_ms,
        } => {
            let wave = &WAVES[index];
            let time_left_ms = time_left_ms - dt_ms;
            // The window closes on schedule no matter what is still alive
            if time_left_ms <= 0.0 {
                state.director = WaveDirector::Paused {
                    next_index: index + 1,
                    countdown_ms: wave.pause_after_ms,
                };
                return;
            }

            let mut spawn_timer_ms = spawn_timer_ms - dt_ms;
            if spawn_timer_ms <= 0.0 {
                let active = state.aliens.iter().filter(|a| a.active).count();
                if active < wave.fleet_cap as usize {
                    spawn_alien(state, index);
                }
                spawn_timer_ms = wave.spawn_interval_ms
                    * (0.85 + state.rng.random::<f32>() * 0.25);
            }
            state.director = WaveDirector::Active {
                index,
                time_left_ms,
                spawn_timer_ms,
            };
        }
        WaveDirector::AwaitingBoss => {
            let field_clear = !state.aliens.iter().any(|a| a.active);
            if field_clear && state.boss.is_none() {
                log::info!("boss spawned");
                state.boss = Some(Boss::new());
                state.push_event(GameEvent::BossSpawned);
                state.director = WaveDirector::BossPhase;
            }
        }
        WaveDirector::BossPhase => {}
    }
}

fn spawn_alien(state: &mut GameState, wave_index: usize) {
    let wave = &WAVES[wave_index];
    let pick = state.rng.random_range(0..wave.archetypes.len());
    let params = scaled_params(&wave.archetypes[pick], wave_index);
    let margin = 40.0;
    let x = state.rng.random_range(margin..FIELD_WIDTH - margin);
    let size_hint = 40.0 * params.size_multiplier;
    let alien = Alien::spawn(x, -size_hint, &params, &mut state.rng);
    state.aliens.push(alien);
}
