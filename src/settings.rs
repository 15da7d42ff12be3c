//! Match settings
//!
//! Grid, difficulty, seed and bike layout for a match, stored as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{BikeSpawn, Direction};
use crate::tuning::Difficulty;

/// Default display colours, player first
pub const BIKE_COLORS: [&str; 4] = ["#00e5ff", "#ff6a00", "#b6ff00", "#ff2bd6"];

/// Problems loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("grid size must be at least 1")]
    EmptyGrid,
    #[error("at least one bike is required")]
    NoBikes,
    #[error("bike {index} spawns at ({x}, {y}), outside the {size}x{size} grid")]
    SpawnOutOfBounds { index: usize, x: i32, y: i32, size: u32 },
    #[error("bikes {first} and {second} share a spawn cell")]
    DuplicateSpawn { first: usize, second: usize },
}

/// Settings for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SettingsFile")]
pub struct MatchSettings {
    pub grid_size: u32,
    pub difficulty: Difficulty,
    /// Seed for the AI random source
    pub seed: u64,
    /// Let the AI drive the player bike too
    pub autopilot: bool,
    /// Games played by the demo runner
    pub rounds: u32,
    /// Spawn layout, player first
    pub bikes: Vec<BikeSpawn>,
}

/// On-disk form: any field may be left out
#[derive(Deserialize)]
struct SettingsFile {
    grid_size: Option<u32>,
    difficulty: Option<Difficulty>,
    seed: Option<u64>,
    autopilot: Option<bool>,
    rounds: Option<u32>,
    bikes: Option<Vec<BikeSpawn>>,
}

impl From<SettingsFile> for MatchSettings {
    /// Missing fields come from the default match; a missing layout is the
    /// standard one-opponent layout for the file's grid size.
    fn from(file: SettingsFile) -> Self {
        let defaults = Self::default();
        let grid_size = file.grid_size.unwrap_or(defaults.grid_size);
        let difficulty = file.difficulty.unwrap_or(defaults.difficulty);
        let bikes = file
            .bikes
            .unwrap_or_else(|| Self::standard(grid_size, 1, difficulty).bikes);
        Self {
            grid_size,
            difficulty,
            seed: file.seed.unwrap_or(defaults.seed),
            autopilot: file.autopilot.unwrap_or(defaults.autopilot),
            rounds: file.rounds.unwrap_or(defaults.rounds),
            bikes,
        }
    }
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self::standard(40, 1, Difficulty::Medium)
    }
}

impl MatchSettings {
    /// Symmetric layout for up to three opponents.
    ///
    /// Player starts bottom-centre heading up, then top-centre heading down,
    /// left-middle heading right and right-middle heading left.
    pub fn standard(grid_size: u32, opponents: usize, difficulty: Difficulty) -> Self {
        let size = grid_size as i32;
        let mid = size / 2;
        let inset = (size / 8).max(1).min((size - 1).max(0));
        let layout = [
            (mid, size - 1 - inset, Direction::Up),
            (mid, inset, Direction::Down),
            (inset, mid, Direction::Right),
            (size - 1 - inset, mid, Direction::Left),
        ];
        let bikes = layout
            .iter()
            .zip(BIKE_COLORS)
            .take(opponents.min(3) + 1)
            .map(|(&(x, y, dir), color)| BikeSpawn::new(x, y, dir, color))
            .collect();

        Self {
            grid_size,
            difficulty,
            seed: 0,
            autopilot: false,
            rounds: 1,
            bikes,
        }
    }

    /// Check the layout fits the grid
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.grid_size == 0 {
            return Err(SettingsError::EmptyGrid);
        }
        if self.bikes.is_empty() {
            return Err(SettingsError::NoBikes);
        }
        let size = self.grid_size as i32;
        for (index, spawn) in self.bikes.iter().enumerate() {
            if spawn.x < 0 || spawn.y < 0 || spawn.x >= size || spawn.y >= size {
                return Err(SettingsError::SpawnOutOfBounds {
                    index,
                    x: spawn.x,
                    y: spawn.y,
                    size: self.grid_size,
                });
            }
            if let Some(first) = self.bikes[..index].iter().position(|s| s.cell() == spawn.cell()) {
                return Err(SettingsError::DuplicateSpawn { first, second: index });
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}
