//! Deterministic game simulation
//!
//! Pure logic with no platform dependencies. The host builds a
//! [`GameState`], feeds it a [`TickInput`] plus a frame delta every
//! animation frame, and drains [`GameEvent`]s afterwards for audio and UI.
//! All randomness comes from the seeded RNG owned by the state.

pub mod alien;
pub mod boss;
pub mod collision;
pub mod crystal;
pub mod entities;
pub mod geom;
pub mod state;
pub mod tick;
pub mod waves;

pub use state::{GameEvent, GameState, Spaceship};
pub use tick::{tick, TickInput};
