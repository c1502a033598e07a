use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;

pub const DEFAULT_RATING: f64 = 75.0;

// World Rugby ranking points at the start of the championship.
static WORLD_RUGBY_RATINGS: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    [
        ("Ireland", 87.97),
        ("France", 87.24),
        ("England", 89.41),
        ("Scotland", 80.22),
        ("Italy", 78.98),
        ("Wales", 74.23),
    ]
    .into_iter()
    .map(|(team, rating)| (team.to_string(), rating))
    .collect()
});

/// Static long-run strength per team, keyed by the exact team name.
#[derive(Debug, Clone)]
pub struct HistoricalRatings {
    ratings: HashMap<String, f64>,
    default_rating: f64,
}

impl Default for HistoricalRatings {
    fn default() -> Self {
        Self {
            ratings: WORLD_RUGBY_RATINGS.clone(),
            default_rating: DEFAULT_RATING,
        }
    }
}

impl HistoricalRatings {
    pub fn new(ratings: HashMap<String, f64>) -> Self {
        Self {
            ratings,
            default_rating: DEFAULT_RATING,
        }
    }

    /// Table with no listed teams; every lookup yields the default.
    pub fn empty() -> Self {
        Self::new(HashMap::new())
    }

    pub fn rating(&self, team: &str) -> f64 {
        self.ratings
            .get(team)
            .copied()
            .unwrap_or(self.default_rating)
    }

    pub fn is_listed(&self, team: &str) -> bool {
        self.ratings.contains_key(team)
    }
}

/// Loads a `{"Team": rating}` JSON object. Teams absent from the file still
/// rate [`DEFAULT_RATING`].
pub fn load_ratings(path: &Path) -> Result<HistoricalRatings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read historical ratings {}", path.display()))?;
    let ratings = serde_json::from_str::<HashMap<String, f64>>(&raw)
        .with_context(|| format!("parse historical ratings {}", path.display()))?;
    Ok(HistoricalRatings::new(ratings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlisted_team_gets_default() {
        let table = HistoricalRatings::default();
        assert_eq!(table.rating("England"), 89.41);
        assert_eq!(table.rating("Georgia"), DEFAULT_RATING);
        assert!(!table.is_listed("georgia"));
        assert!(table.is_listed("England"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = HistoricalRatings::default();
        assert_eq!(table.rating("wales"), DEFAULT_RATING);
    }
}
