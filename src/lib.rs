//! Light Cycles - a grid arena game of trails and flood-fill opponents
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, AI, tick engine)
//! - `tuning`: Difficulty tiers and AI balance
//! - `settings`: Match configuration loaded from JSON
//! - `tally`: Outcome mapping and session totals

pub mod settings;
pub mod sim;
pub mod tally;
pub mod tuning;

pub use settings::{MatchSettings, SettingsError};
pub use sim::{Engine, GamePhase, Winner};
pub use tally::{MatchTally, Outcome};
pub use tuning::Difficulty;

/// Game loop constants for hosts
pub mod consts {
    /// Simulation steps per second
    pub const TICK_HZ: f32 = 15.0;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_HZ;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Safety cap on ticks per game for headless runs
    pub const MAX_GAME_TICKS: u64 = 20_000;
}
