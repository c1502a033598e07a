use std::path::Path;

use log::{debug, warn};
use serde::Deserialize;

use crate::csv_input;
use crate::error::Result;
use crate::types::{PlayerRecord, PositionGroup};

/// Skill assigned to unmatched players of a team we know nothing about.
pub const DEFAULT_FALLBACK_SKILL: f64 = 70.0;
const FALLBACK_QUANTILE: f64 = 0.25;

/// Read-only player rating table in file order.
#[derive(Debug, Clone, Default)]
pub struct RatingTable {
    records: Vec<PlayerRecord>,
    skipped_rows: usize,
}

#[derive(Debug, Deserialize)]
struct RawRatingRow {
    name: Option<String>,
    country: Option<String>,
    position_group: Option<String>,
    skill: Option<String>,
    #[serde(default)]
    shirt_number: Option<String>,
}

impl RatingTable {
    pub fn from_records(records: Vec<PlayerRecord>) -> Self {
        Self {
            records,
            skipped_rows: 0,
        }
    }

    pub fn records(&self) -> &[PlayerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows dropped at load time because a required field was blank or unparseable.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Records of one team, compared case-insensitively, in table order.
    pub fn team_records<'a>(
        &'a self,
        team: &str,
    ) -> impl Iterator<Item = &'a PlayerRecord> + use<'a> {
        let team_norm = team.trim().to_lowercase();
        self.records
            .iter()
            .filter(move |r| r.country.trim().to_lowercase() == team_norm)
    }

    /// Finds the record for `player_name` within `team`.
    ///
    /// An exact match on the normalized name always wins. Otherwise the first
    /// record (in table order) whose name contains the query, or is contained
    /// by it, is returned. This catches middle names and shortened forms.
    pub fn resolve(&self, player_name: &str, team: &str) -> Option<&PlayerRecord> {
        let query = normalize_name(player_name);
        if query.is_empty() {
            return None;
        }

        if let Some(found) = self
            .team_records(team)
            .find(|r| normalize_name(&r.name) == query)
        {
            return Some(found);
        }

        let partial = self.team_records(team).find(|r| {
            let candidate = normalize_name(&r.name);
            !candidate.is_empty() && (query.contains(&candidate) || candidate.contains(&query))
        });
        if let Some(found) = partial {
            debug!("partial name match {player_name:?} -> {:?} ({team})", found.name);
        }
        partial
    }

    /// Imputed skill for players of `team` missing from the table: the 25th
    /// percentile of the team's ratings, or [`DEFAULT_FALLBACK_SKILL`].
    pub fn fallback_skill(&self, team: &str) -> f64 {
        let skills: Vec<f64> = self.team_records(team).map(|r| r.skill).collect();
        quantile(&skills, FALLBACK_QUANTILE).unwrap_or(DEFAULT_FALLBACK_SKILL)
    }
}

/// Lower-cases and trims. Accents are kept as-is.
pub fn normalize_name(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Linear-interpolated quantile over the order statistics.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Loads the rating CSV (`name,country,position_group,skill[,shirt_number]`).
pub fn load_rating_table(path: &Path) -> Result<RatingTable> {
    let content = csv_input::read_text(path)?;
    let table = parse_rating_table(&content)?;
    if table.skipped_rows > 0 {
        warn!(
            "{}: skipped {} malformed rating rows",
            path.display(),
            table.skipped_rows
        );
    }
    debug!("loaded {} rated players from {}", table.len(), path.display());
    Ok(table)
}

pub fn parse_rating_table(content: &str) -> Result<RatingTable> {
    let mut reader = csv_input::reader_for(content);
    let mut records = Vec::new();
    let mut skipped_rows = 0usize;

    for row in reader.deserialize::<RawRatingRow>() {
        let Ok(row) = row else {
            skipped_rows += 1;
            continue;
        };
        match record_from_row(row) {
            Some(record) => records.push(record),
            None => skipped_rows += 1,
        }
    }

    Ok(RatingTable {
        records,
        skipped_rows,
    })
}

fn record_from_row(row: RawRatingRow) -> Option<PlayerRecord> {
    let name = row.name.filter(|s| !s.trim().is_empty())?;
    let country = row.country.filter(|s| !s.trim().is_empty())?;
    let position_group = row.position_group?.parse::<PositionGroup>().ok()?;
    let skill = row.skill?.trim().parse::<f64>().ok().filter(|s| s.is_finite())?;
    let shirt_number = row
        .shirt_number
        .and_then(|s| parse_shirt_number(&s))
        .filter(|n| (1..=23).contains(n));
    Some(PlayerRecord {
        name: name.trim().to_string(),
        country: country.trim().to_string(),
        position_group,
        skill,
        shirt_number,
    })
}

/// Accepts `"9"` and spreadsheet-style `"9.0"`.
pub fn parse_shirt_number(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 {
        Some(f as u32)
    } else {
        None
    }
}
