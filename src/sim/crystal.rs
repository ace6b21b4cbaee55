//! Collectible currency crystals
//!
//! Destroyed aliens drop tiered crystals. They fall slowly, get pulled in
//! magnetically once the ship is close, and bank score plus a gem on pickup.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geom::{circles_overlap, Hitbox, Rect};
use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Crystal tiers, lowest to highest value
pub const CRYSTAL_VALUES: [u64; 4] = [100, 250, 500, 1000];
pub const CRYSTAL_SIZES: [f32; 4] = [15.0, 20.0, 25.0, 30.0];
pub const CRYSTAL_FALL_SPEEDS: [f32; 4] = [90.0, 80.0, 70.0, 60.0];

/// Magnet pull acceleration and terminal speed (px/s², px/s)
const ATTRACTION_ACCEL: f32 = 2000.0;
const ATTRACTION_MAX_SPEED: f32 = 500.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crystal {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Tier index 0..=3
    pub tier: u8,
    pub active: bool,
}

impl Crystal {
    pub fn new(pos: Vec2, tier: u8, rng: &mut Pcg32) -> Self {
        let tier = tier.min(3);
        let fall = CRYSTAL_FALL_SPEEDS[tier as usize] + rng.random_range(0.0..20.0);
        Self {
            pos: pos + Vec2::new(rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0)),
            vel: Vec2::new(0.0, fall),
            tier,
            active: true,
        }
    }

    pub fn value(&self) -> u64 {
        CRYSTAL_VALUES[self.tier as usize]
    }

    pub fn size(&self) -> f32 {
        CRYSTAL_SIZES[self.tier as usize]
    }
}

impl Hitbox for Crystal {
    fn bounds(&self) -> Rect {
        Rect::centered(self.pos, self.size(), self.size())
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Roll the drop table for a destroyed alien. `power` is size × max health;
/// tougher aliens drop richer combinations.
pub fn spawn_drops(state: &mut GameState, pos: Vec2, power: f32) {
    let roll: f32 = state.rng.random();
    let tiers: &[u8] = if power < 50.0 {
        if roll < 0.3 {
            &[0]
        } else {
            &[]
        }
    } else if power < 100.0 {
        if roll < 0.4 {
            &[0]
        } else if roll < 0.5 {
            &[1]
        } else {
            &[]
        }
    } else if power < 200.0 {
        if roll < 0.4 {
            &[0]
        } else if roll < 0.6 {
            &[1]
        } else if roll < 0.7 {
            &[0, 0]
        } else {
            &[]
        }
    } else if roll < 0.2 {
        &[1]
    } else if roll < 0.4 {
        &[0, 1]
    } else if roll < 0.6 {
        &[2]
    } else if roll < 0.9 {
        &[1, 1]
    } else {
        &[3]
    };

    for &tier in tiers {
        let crystal = Crystal::new(pos, tier, &mut state.rng);
        state.crystals.push(crystal);
    }
}

/// Fall, magnet pull and pickup for every live crystal
pub fn update_crystals(state: &mut GameState, dt_ms: f32) {
    let dt = dt_ms / 1000.0;
    let ship_center = state.ship.center();
    let ship_radius = SHIP_WIDTH / 2.0;
    let mut collected: Vec<(u8, u64)> = Vec::new();

    for crystal in &mut state.crystals {
        if !crystal.active {
            continue;
        }
        if !crystal.pos.is_finite() {
            log::warn!("deactivating crystal with non-finite position");
            crystal.active = false;
            continue;
        }

        let to_ship = ship_center - crystal.pos;
        let dist = to_ship.length();
        if dist < CRYSTAL_ATTRACTION_RADIUS && dist > f32::EPSILON {
            // Pull harder the closer it gets
            let strength = 1.0 - dist / CRYSTAL_ATTRACTION_RADIUS;
            crystal.vel += to_ship / dist * ATTRACTION_ACCEL * strength * dt;
            let speed = crystal.vel.length();
            if speed > ATTRACTION_MAX_SPEED {
                crystal.vel *= ATTRACTION_MAX_SPEED / speed;
            }
        }

        crystal.pos += crystal.vel * dt;

        if circles_overlap(crystal.pos, crystal.size() / 2.0, ship_center, ship_radius) {
            crystal.active = false;
            collected.push((crystal.tier, crystal.value()));
            continue;
        }

        if crystal.pos.y > FIELD_HEIGHT + crystal.size() {
            crystal.active = false;
        }
    }

    for (tier, value) in collected {
        state.add_score(value);
        state.gems += 1;
        state.push_event(GameEvent::CrystalCollected { tier, value });
    }

    state.crystals.retain(|c| c.active);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_tier_three_is_worth_1000() {
        let mut rng = Pcg32::seed_from_u64(3);
        let c = Crystal::new(Vec2::new(100.0, 100.0), 3, &mut rng);
        assert_eq!(c.value(), 1000);
        assert_eq!(c.size(), 30.0);
    }

    #[test]
    fn test_pickup_exactly_once() {
        let mut state = GameState::new(5);
        let ship_center = state.ship.center();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut crystal = Crystal::new(ship_center, 3, &mut rng);
        crystal.pos = ship_center;
        state.crystals.push(crystal);

        update_crystals(&mut state, 16.0);
        assert_eq!(state.score, 1000);
        assert_eq!(state.gems, 1);
        assert!(state.crystals.is_empty());

        // A second pass must not double-bank
        update_crystals(&mut state, 16.0);
        assert_eq!(state.score, 1000);
        assert_eq!(state.gems, 1);
    }

    #[test]
    fn test_magnet_pulls_inside_radius_only() {
        let mut state = GameState::new(5);
        let ship_center = state.ship.center();
        let mut rng = Pcg32::seed_from_u64(3);

        let mut near = Crystal::new(Vec2::ZERO, 0, &mut rng);
        near.pos = ship_center + Vec2::new(-100.0, 0.0);
        near.vel = Vec2::ZERO;
        let mut far = Crystal::new(Vec2::ZERO, 0, &mut rng);
        far.pos = ship_center + Vec2::new(-400.0, 0.0);
        far.vel = Vec2::ZERO;
        state.crystals.push(near);
        state.crystals.push(far);

        update_crystals(&mut state, 16.0);
        // The near crystal gained velocity toward the ship
        assert!(state.crystals[0].vel.x > 0.0);
        assert_eq!(state.crystals[1].vel.x, 0.0);
    }

    #[test]
    fn test_magnet_speed_is_capped() {
        let mut state = GameState::new(5);
        let ship_center = state.ship.center();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut crystal = Crystal::new(Vec2::ZERO, 0, &mut rng);
        crystal.pos = ship_center + Vec2::new(0.0, -120.0);
        state.crystals.push(crystal);

        for _ in 0..60 {
            update_crystals(&mut state, 16.0);
            if state.crystals.is_empty() {
                break;
            }
            assert!(state.crystals[0].vel.length() <= ATTRACTION_MAX_SPEED + 0.01);
        }
    }

    #[test]
    fn test_drop_table_low_power_drops_at_most_one_small() {
        let mut state = GameState::new(5);
        for _ in 0..100 {
            state.crystals.clear();
            spawn_drops(&mut state, Vec2::new(200.0, 200.0), 30.0);
            assert!(state.crystals.len() <= 1);
            for c in &state.crystals {
                assert_eq!(c.tier, 0);
            }
        }
    }

    #[test]
    fn test_drop_table_high_power_can_drop_pairs() {
        let mut state = GameState::new(5);
        let mut saw_pair = false;
        for _ in 0..200 {
            state.crystals.clear();
            spawn_drops(&mut state, Vec2::new(200.0, 200.0), 400.0);
            assert!(state.crystals.len() <= 2);
            if state.crystals.len() == 2 {
                saw_pair = true;
            }
        }
        assert!(saw_pair);
    }
}
