use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Highest shirt number that still belongs to the starting XV.
pub const LAST_STARTER_SHIRT: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionGroup {
    Forwards,
    Backs,
}

impl PositionGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            PositionGroup::Forwards => "Forwards",
            PositionGroup::Backs => "Backs",
        }
    }

    /// Best guess for a player we could not find in the rating table.
    /// Front row through number eight plus replacements 16-20 are pack players.
    pub fn from_shirt_number(shirt_number: u32) -> Self {
        match shirt_number {
            1..=8 | 16..=20 => PositionGroup::Forwards,
            _ => PositionGroup::Backs,
        }
    }
}

impl fmt::Display for PositionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PositionGroup {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "forwards" | "forward" => Ok(PositionGroup::Forwards),
            "backs" | "back" => Ok(PositionGroup::Backs),
            other => Err(format!("unknown position group {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub country: String,
    pub position_group: PositionGroup,
    pub skill: f64,
    #[serde(default)]
    pub shirt_number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineupEntry {
    pub shirt_number: u32,
    pub player_name: String,
    pub is_starting: bool,
}

impl LineupEntry {
    pub fn new(shirt_number: u32, player_name: impl Into<String>) -> Self {
        Self {
            shirt_number,
            player_name: player_name.into(),
            is_starting: shirt_number <= LAST_STARTER_SHIRT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlayer {
    pub country: String,
    pub name: String,
    pub position_group: PositionGroup,
    pub skill: f64,
    pub starting: bool,
    /// Absent only when the squad came from a file without a shirt column.
    pub shirt_number: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamTacticalProfile {
    pub total_score: f64,
    pub pack_score_starters: f64,
    pub pack_score_bench: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionBreakdown {
    pub tactical_margin: f64,
    pub elo_margin: f64,
    pub pack_diff: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchPrediction {
    pub home: String,
    pub away: String,
    /// Home minus away, in points.
    pub margin: f64,
    pub win_probability_home: f64,
    pub debug: PredictionBreakdown,
}

impl MatchPrediction {
    pub fn win_probability_away(&self) -> f64 {
        1.0 - self.win_probability_home
    }

    pub fn predicted_winner(&self) -> &str {
        if self.margin > 0.0 { &self.home } else { &self.away }
    }

    pub fn winner_probability(&self) -> f64 {
        if self.margin > 0.0 {
            self.win_probability_home
        } else {
            self.win_probability_away()
        }
    }
}
