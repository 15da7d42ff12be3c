//! Session tally
//!
//! Maps engine results onto host outcomes and keeps a running record of the
//! session's games. In memory only.

use serde::{Deserialize, Serialize};

use crate::sim::Winner;
use crate::tuning::Difficulty;

/// Number of longest games remembered
pub const MAX_LONGEST_GAMES: usize = 10;

/// Result of a game from the player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Player,
    Ai,
    Draw,
}

impl Outcome {
    pub fn from_winner(winner: Winner) -> Self {
        match winner {
            Winner::Bike(0) => Outcome::Player,
            Winner::Bike(_) | Winner::PlayerEliminated => Outcome::Ai,
            Winner::Draw => Outcome::Draw,
        }
    }

    /// Same mapping from the raw integer code
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Outcome::Player,
            -1 => Outcome::Draw,
            _ => Outcome::Ai,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Player => "player",
            Outcome::Ai => "ai",
            Outcome::Draw => "draw",
        }
    }
}

/// A finished game worth remembering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Ticks the game lasted
    pub ticks: u64,
    pub outcome: Outcome,
    pub difficulty: Difficulty,
}

/// Running totals for a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchTally {
    pub player_wins: u32,
    pub ai_wins: u32,
    pub draws: u32,
    /// Longest games first
    pub longest: Vec<GameRecord>,
}

impl MatchTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn games(&self) -> u32 {
        self.player_wins + self.ai_wins + self.draws
    }

    /// Whether a game of this length makes the longest-games list
    pub fn qualifies(&self, ticks: u64) -> bool {
        if ticks == 0 {
            return false;
        }
        if self.longest.len() < MAX_LONGEST_GAMES {
            return true;
        }
        self.longest.last().map(|r| ticks > r.ticks).unwrap_or(true)
    }

    /// Count a finished game. Returns its rank among the longest games (1-indexed).
    pub fn record(&mut self, winner: Winner, ticks: u64, difficulty: Difficulty) -> Option<usize> {
        let outcome = Outcome::from_winner(winner);
        match outcome {
            Outcome::Player => self.player_wins += 1,
            Outcome::Ai => self.ai_wins += 1,
            Outcome::Draw => self.draws += 1,
        }

        if !self.qualifies(ticks) {
            return None;
        }
        let record = GameRecord {
            ticks,
            outcome,
            difficulty,
        };
        let rank = match self.longest.iter().position(|r| ticks > r.ticks) {
            Some(i) => {
                self.longest.insert(i, record);
                i + 1
            }
            None => {
                self.longest.push(record);
                self.longest.len()
            }
        };
        self.longest.truncate(MAX_LONGEST_GAMES);
        Some(rank)
    }

    /// Share of games the player won
    pub fn win_rate(&self) -> f32 {
        match self.games() {
            0 => 0.0,
            games => self.player_wins as f32 / games as f32,
        }
    }
}
