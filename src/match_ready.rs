use std::path::Path;

use serde::Serialize;

use crate::csv_input;
use crate::error::{PredictError, Result};
use crate::player_ratings::parse_shirt_number;
use crate::types::{PositionGroup, ResolvedPlayer};

const REQUIRED_COLUMNS: [&str; 5] = ["country", "name", "position_group", "skill", "starting"];
const SHIRT_COLUMN: &str = "shirt_number";

/// Resolved squads for a single fixture, as written by `prepare_match`.
#[derive(Debug, Clone, Default)]
pub struct MatchReadySquads {
    pub players: Vec<ResolvedPlayer>,
    /// Distinct teams in order of first appearance.
    pub teams: Vec<String>,
    pub has_shirt_numbers: bool,
    pub skipped_rows: usize,
}

#[derive(Debug, Serialize)]
struct SquadRow<'a> {
    country: &'a str,
    name: &'a str,
    position_group: &'static str,
    skill: f64,
    starting: u8,
    shirt_number: Option<u32>,
}

pub fn write_match_ready_csv(path: &Path, players: &[ResolvedPlayer]) -> anyhow::Result<()> {
    use anyhow::Context;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("create squad file {}", path.display()))?;
    for p in players {
        writer
            .serialize(SquadRow {
                country: &p.country,
                name: &p.name,
                position_group: p.position_group.as_str(),
                skill: p.skill,
                starting: u8::from(p.starting),
                shirt_number: p.shirt_number,
            })
            .context("write squad row")?;
    }
    writer.flush().context("flush squad file")?;
    Ok(())
}

pub fn load_match_ready_csv(path: &Path) -> Result<MatchReadySquads> {
    let content = csv_input::read_text(path)?;
    parse_match_ready(path, &content)
}

fn parse_match_ready(path: &Path, content: &str) -> Result<MatchReadySquads> {
    let mut reader = csv_input::reader_for(content);
    let headers = reader.headers()?.clone();

    let mut idx = [0usize; 5];
    for (slot, column) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = csv_input::column_index(&headers, column).ok_or_else(|| {
            PredictError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            }
        })?;
    }
    let [country_col, name_col, group_col, skill_col, starting_col] = idx;
    let shirt_col = csv_input::column_index(&headers, SHIRT_COLUMN);

    let mut out = MatchReadySquads {
        has_shirt_numbers: shirt_col.is_some(),
        ..MatchReadySquads::default()
    };

    for record in reader.records() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        let country = field(country_col);
        let parsed = (|| {
            let position_group = field(group_col).parse::<PositionGroup>().ok()?;
            let skill = field(skill_col).parse::<f64>().ok()?;
            let starting = parse_flag(field(starting_col))?;
            Some((position_group, skill, starting))
        })();
        let Some((position_group, skill, starting)) = parsed.filter(|_| !country.is_empty()) else {
            out.skipped_rows += 1;
            continue;
        };

        if !out.teams.iter().any(|t| t == country) {
            out.teams.push(country.to_string());
        }
        out.players.push(ResolvedPlayer {
            country: country.to_string(),
            name: field(name_col).to_string(),
            position_group,
            skill,
            starting,
            shirt_number: shirt_col.and_then(|c| parse_shirt_number(field(c))),
        });
    }

    if out.players.is_empty() {
        return Err(PredictError::invalid_file(path, "no squad rows"));
    }
    Ok(out)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Some(true),
        "0" | "0.0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shirt_column_is_optional() {
        let raw = "country,name,position_group,skill,starting\n\
                   England,Maro Itoje,Forwards,90,1\n\
                   Wales,Jac Morgan,Forwards,85,1\n\
                   England,Ben Earl,Forwards,84,0\n";
        let squads = parse_match_ready(Path::new("match_ready_squads.csv"), raw).unwrap();
        assert!(!squads.has_shirt_numbers);
        assert_eq!(squads.teams, vec!["England".to_string(), "Wales".to_string()]);
        assert_eq!(squads.players.len(), 3);
        assert!(!squads.players[2].starting);
        assert!(squads.players[0].shirt_number.is_none());
    }

    #[test]
    fn bad_rows_are_counted_not_fatal() {
        let raw = "country,name,position_group,skill,starting,shirt_number\n\
                   France,Antoine Dupont,Backs,95,1,9\n\
                   France,Broken,Backs,n/a,1,10\n";
        let squads = parse_match_ready(Path::new("x.csv"), raw).unwrap();
        assert_eq!(squads.players.len(), 1);
        assert_eq!(squads.skipped_rows, 1);
        assert_eq!(squads.players[0].shirt_number, Some(9));
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let raw = "country,name,skill,starting\nFrance,A,90,1\n";
        assert!(matches!(
            parse_match_ready(Path::new("x.csv"), raw),
            Err(PredictError::MissingColumn { column, .. }) if column == "position_group"
        ));
    }
}
