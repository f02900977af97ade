//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable envelope order (by id)
//! - No rendering or platform dependencies

pub mod layout;
pub mod rig;
pub mod state;
pub mod tick;

pub use layout::{grid_size, slot_origin};
pub use rig::apply_rig;
pub use state::{
    Envelope, GameEvent, GamePhase, GameState, Prize, RngState, Timings, PRIZE_TIERS,
};
pub use tick::{tick, TickInput};
