//! Difficulty tiers and the AI balance table
//!
//! Every per-tier number lives in [`Difficulty::tuning`], so adding a tier is a
//! compile error until each knob has a value.

use serde::{Deserialize, Serialize};

/// AI strength selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Insane,
}

/// AI knobs for one difficulty tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Flood-fill budget per candidate direction
    pub flood_limit: usize,
    /// Chance to skip evaluation and keep going straight
    pub straight_bias: f64,
    /// Multiplier for moves that close in on the player's projected position
    pub target_bonus: Option<f32>,
    /// Multiplier for moves that keep a wall or trail alongside
    pub wall_hug_bonus: Option<f32>,
}

/// Bonus for keeping the current heading
pub const CONTINUITY_BONUS: f32 = 1.15;
/// Current heading is kept unless it scores below this share of the best
pub const HYSTERESIS_RATIO: f32 = 0.7;
/// Player targeting only kicks in within this Manhattan distance
pub const TARGET_RANGE: i32 = 20;
/// How many cells ahead of the player the AI aims
pub const TARGET_LEAD: i32 = 5;

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Insane,
    ];

    /// Map an integer AI level (0 = easy) onto a tier, clamping out-of-range values
    pub fn from_level(level: i32) -> Self {
        match level {
            i32::MIN..=0 => Difficulty::Easy,
            1 => Difficulty::Medium,
            2 => Difficulty::Hard,
            _ => Difficulty::Insane,
        }
    }

    pub fn level(&self) -> i32 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
            Difficulty::Insane => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Insane => "Insane",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "normal" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "insane" => Some(Difficulty::Insane),
            other => other.parse::<i32>().ok().map(Self::from_level),
        }
    }

    pub fn tuning(&self) -> Tuning {
        match self {
            Difficulty::Easy => Tuning {
                flood_limit: 60,
                straight_bias: 0.3,
                target_bonus: None,
                wall_hug_bonus: None,
            },
            Difficulty::Medium => Tuning {
                flood_limit: 150,
                straight_bias: 0.0,
                target_bonus: None,
                wall_hug_bonus: None,
            },
            Difficulty::Hard => Tuning {
                flood_limit: 400,
                straight_bias: 0.0,
                target_bonus: Some(1.12),
                wall_hug_bonus: Some(1.08),
            },
            Difficulty::Insane => Tuning {
                flood_limit: 900,
                straight_bias: 0.0,
                target_bonus: Some(1.25),
                wall_hug_bonus: Some(1.08),
            },
        }
    }
}
