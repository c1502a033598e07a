use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A played fixture with its final score and the team sheet it was played with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalMatch {
    pub home: String,
    pub away: String,
    pub home_score: i32,
    pub away_score: i32,
    pub match_file: String,
}

impl HistoricalMatch {
    pub fn new(home: &str, away: &str, home_score: i32, away_score: i32) -> Self {
        Self {
            home: home.to_string(),
            away: away.to_string(),
            home_score,
            away_score,
            match_file: format!("{home}-{away}.xlsx"),
        }
    }

    /// Home minus away.
    pub fn actual_margin(&self) -> f64 {
        f64::from(self.home_score - self.away_score)
    }
}

/// Rounds one and two of the championship.
pub fn default_results() -> Vec<HistoricalMatch> {
    vec![
        HistoricalMatch::new("France", "Ireland", 36, 14),
        HistoricalMatch::new("Italy", "Scotland", 18, 15),
        HistoricalMatch::new("England", "Wales", 48, 7),
        HistoricalMatch::new("Scotland", "England", 31, 20),
        HistoricalMatch::new("Wales", "France", 12, 54),
        HistoricalMatch::new("Ireland", "Italy", 20, 13),
    ]
}

/// Loads a JSON array of [`HistoricalMatch`]. A missing `match_file` is not
/// allowed; every result must point at its team sheet.
pub fn load_results(path: &Path) -> Result<Vec<HistoricalMatch>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read historical results {}", path.display()))?;
    let rows = serde_json::from_str::<Vec<HistoricalMatch>>(&raw)
        .with_context(|| format!("parse historical results {}", path.display()))?;
    Ok(rows)
}
