//! Property tests for the simulation core

use glam::Vec2;
use proptest::prelude::*;

use nethex_assault::consts::MAX_DELTA_MS;
use nethex_assault::sim::boss::{damage_boss, Boss};
use nethex_assault::sim::state::DamageOutcome;
use nethex_assault::sim::waves::{WaveDirector, WAVES};
use nethex_assault::sim::{tick, GameState, TickInput};

/// A boss that can actually be hurt: entrance finished, shield down
fn vulnerable_boss() -> Boss {
    let mut boss = Boss::new();
    boss.entering = false;
    boss.invulnerable = false;
    boss.shield.active = false;
    boss.shield.health = 0.0;
    boss
}

/// The ceiling `clamp_total_health` enforces, recomputed from the outside
fn health_ceiling(boss: &Boss) -> f32 {
    let (hp, max) = boss
        .components
        .iter()
        .fold((0.0f32, 0.0f32), |(h, m), c| {
            (h + c.health.max(0.0), m + c.max_health)
        });
    boss.max_health * (0.6 + 0.4 * hp / max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Destroying sections caps the hull no matter where the hits land
    #[test]
    fn boss_health_respects_component_ceiling(
        hits in prop::collection::vec((-100.0f32..100.0, -120.0f32..120.0, 1.0f32..60.0), 1..80)
    ) {
        let mut state = GameState::new(42);
        let mut boss = vulnerable_boss();

        for (dx, dy, amount) in hits {
            let hit = boss.pos + Vec2::new(dx, dy);
            damage_boss(&mut boss, &mut state, amount, hit);
            if boss.defeated {
                break;
            }
            prop_assert!(boss.health <= health_ceiling(&boss) + 1e-3);
        }
    }

    /// Phases only ever advance, and never past the last threshold
    #[test]
    fn boss_phase_is_monotonic(
        amounts in prop::collection::vec(1.0f32..40.0, 1..120)
    ) {
        let mut state = GameState::new(42);
        let mut boss = vulnerable_boss();
        let mut last_phase = boss.phase;

        for amount in amounts {
            // Hit the core region so damage always lands somewhere
            let hit = boss.pos;
            damage_boss(&mut boss, &mut state, amount, hit);
            prop_assert!(boss.phase >= last_phase);
            prop_assert!(boss.phase <= 3);
            last_phase = boss.phase;
            if boss.defeated {
                break;
            }
        }
    }

    /// Mercy invincibility swallows any hit without touching health
    #[test]
    fn invincible_ship_takes_no_damage(amount in 0.1f32..1000.0) {
        let mut state = GameState::new(42);
        state.ship.hit_invincibility_ms = 500.0;
        let before = state.ship.health;

        let outcome = state.ship.take_damage(amount);
        prop_assert_eq!(outcome, DamageOutcome::Ignored);
        prop_assert_eq!(state.ship.health, before);
    }

    /// A single tick never advances the clock past the frame clamp
    #[test]
    fn tick_clamps_runaway_deltas(dt in -1000.0f32..100_000.0) {
        let mut state = GameState::new(42);
        let input = TickInput::default();
        let before = state.elapsed_ms;

        tick(&mut state, &input, dt);

        let advanced = state.elapsed_ms - before;
        prop_assert!(advanced >= 0.0);
        prop_assert!(advanced <= f64::from(MAX_DELTA_MS) + 1e-6);
    }
}

proptest! {
    // Whole-run simulations are expensive, keep the case count low
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// The spawn director never exceeds the active wave's fleet cap
    #[test]
    fn fleet_never_exceeds_wave_cap(seed in 0u64..u64::MAX) {
        let mut state = GameState::new(seed);
        let input = TickInput::default();
        let dt_ms = 1000.0 / 60.0;

        // Roughly 40 simulated seconds, comfortably into wave one and two
        for _ in 0..2400 {
            tick(&mut state, &input, dt_ms);
            state.drain_events();

            if let WaveDirector::Active { index, .. } = state.director {
                let cap = WAVES[index].fleet_cap as usize;
                let live = state.aliens.iter().filter(|a| a.active).count();
                prop_assert!(
                    live <= cap,
                    "wave {} holds {} aliens over cap {}",
                    index,
                    live,
                    cap
                );
            }
        }
    }
}
