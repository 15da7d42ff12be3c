//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed and inputs it replays
//! identically:
//! - One step per `tick()`, no internal clock
//! - Seeded (or injected) RNG only
//! - Stable iteration order (by bike index)
//! - No rendering or platform dependencies

pub mod ai;
pub mod engine;
pub mod flood;
pub mod grid;
pub mod safety;
pub mod state;

pub use ai::choose_direction;
pub use engine::{DEFAULT_SEED, Engine};
pub use flood::FloodFill;
pub use grid::Occupancy;
pub use safety::{has_exit, is_safe};
pub use state::{
    Bike, BikeSpawn, DRAW_CODE, Direction, GameEvent, GamePhase, GameView,
    PLAYER_ELIMINATED_CODE, Winner,
};
