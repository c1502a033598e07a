use std::collections::HashMap;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use log::debug;

use crate::csv_input;
use crate::error::{PredictError, Result};
use crate::player_ratings::parse_shirt_number;
use crate::types::LineupEntry;

pub const NUMBER_COLUMN: &str = "Number";
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

static EMPTY_CELL: Cell = Cell::Empty;

/// One jersey row of a team sheet: the shirt number and whoever wears it on
/// each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineupRow {
    pub shirt_number: u32,
    pub team1_player: Option<String>,
    pub team2_player: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Team1,
    Team2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchLineup {
    pub team1: String,
    pub team2: String,
    pub rows: Vec<LineupRow>,
    /// Rows dropped because the jersey number was blank or not an integer.
    pub skipped_rows: usize,
}

impl MatchLineup {
    pub fn new(team1: impl Into<String>, team2: impl Into<String>, rows: Vec<LineupRow>) -> Self {
        Self {
            team1: team1.into(),
            team2: team2.into(),
            rows,
            skipped_rows: 0,
        }
    }

    pub fn team(&self, side: Side) -> &str {
        match side {
            Side::Team1 => &self.team1,
            Side::Team2 => &self.team2,
        }
    }

    /// Jersey slots filled for one side, in file order.
    pub fn entries(&self, side: Side) -> Vec<LineupEntry> {
        self.rows
            .iter()
            .filter_map(|row| {
                let name = match side {
                    Side::Team1 => row.team1_player.as_deref(),
                    Side::Team2 => row.team2_player.as_deref(),
                }?;
                Some(LineupEntry::new(row.shirt_number, name))
            })
            .collect()
    }
}

/// Where the calibrator gets the team sheet for a historical match.
pub trait LineupProvider: Sync {
    fn lineup(&self, match_file: &str) -> Result<MatchLineup>;
}

/// Reads `data_dir/<match_file>` on every call.
#[derive(Debug, Clone)]
pub struct FileLineups {
    data_dir: PathBuf,
}

impl FileLineups {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

impl LineupProvider for FileLineups {
    fn lineup(&self, match_file: &str) -> Result<MatchLineup> {
        load_lineup(&self.data_dir.join(match_file))
    }
}

/// Pre-built lineups keyed by match file name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLineups {
    lineups: HashMap<String, MatchLineup>,
}

impl InMemoryLineups {
    pub fn insert(&mut self, match_file: impl Into<String>, lineup: MatchLineup) {
        self.lineups.insert(match_file.into(), lineup);
    }
}

impl LineupProvider for InMemoryLineups {
    fn lineup(&self, match_file: &str) -> Result<MatchLineup> {
        self.lineups
            .get(match_file)
            .cloned()
            .ok_or_else(|| PredictError::invalid_file(match_file, "match file not found"))
    }
}

/// Splits `France-Ireland.xlsx` into `("France", "Ireland")`.
pub fn teams_from_filename(path: &Path) -> Result<(String, String)> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let parts: Vec<&str> = stem.split('-').collect();
    match parts.as_slice() {
        [home, away] if !home.trim().is_empty() && !away.trim().is_empty() => {
            Ok((home.trim().to_string(), away.trim().to_string()))
        }
        _ => Err(PredictError::InvalidFileName {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }),
    }
}

pub fn load_lineup(path: &Path) -> Result<MatchLineup> {
    load_lineup_with_teams(path, None)
}

/// Loads a team sheet laid out as `[team1 names, Number, team2 names]`.
/// Team names come from `teams` when given, otherwise from the file name.
pub fn load_lineup_with_teams(path: &Path, teams: Option<(String, String)>) -> Result<MatchLineup> {
    if !path.exists() {
        return Err(PredictError::invalid_file(path, "match file not found"));
    }
    let (team1, team2) = match teams {
        Some(t) => t,
        None => teams_from_filename(path)?,
    };

    let grid = if is_spreadsheet(path) {
        read_spreadsheet_grid(path)?
    } else {
        read_csv_grid(path)?
    };
    let (rows, skipped_rows) = parse_grid(path, &grid)?;
    debug!(
        "{}: {} jersey rows, {} skipped",
        path.display(),
        rows.len(),
        skipped_rows
    );

    Ok(MatchLineup {
        team1,
        team2,
        rows,
        skipped_rows,
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    fn shirt_number(&self) -> Option<u32> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => parse_shirt_number(s),
            Cell::Number(n) if n.is_finite() && *n >= 0.0 => Some(n.trunc() as u32),
            Cell::Number(_) => None,
        }
    }

    fn player_name(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Cell::Number(n) => Some(n.to_string()),
        }
    }

    fn header(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        })
}

fn read_spreadsheet_grid(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let spreadsheet_err = |reason: String| PredictError::Spreadsheet {
        path: path.to_path_buf(),
        reason,
    };
    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_err(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_err("workbook has no sheets".to_string()))?
        .map_err(|e| spreadsheet_err(e.to_string()))?;

    Ok(range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => Cell::Empty,
                    Data::String(s) => Cell::Text(s.clone()),
                    Data::Float(f) => Cell::Number(*f),
                    Data::Int(i) => Cell::Number(*i as f64),
                    other => Cell::Text(other.to_string()),
                })
                .collect()
        })
        .collect())
}

fn read_csv_grid(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let content = csv_input::read_text(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(csv_input::sniff_delimiter(&content))
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(grid)
}

fn parse_grid(path: &Path, grid: &[Vec<Cell>]) -> Result<(Vec<LineupRow>, usize)> {
    let Some((header, body)) = grid.split_first() else {
        return Err(PredictError::invalid_file(path, "file is empty"));
    };
    let headers: Vec<String> = header.iter().map(Cell::header).collect();
    let number_col = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(NUMBER_COLUMN))
        .ok_or_else(|| PredictError::MissingColumn {
            path: path.to_path_buf(),
            column: NUMBER_COLUMN.to_string(),
        })?;
    if headers.len() < 3 {
        return Err(PredictError::invalid_file(
            path,
            format!(
                "expected at least 3 columns (Team1, Number, Team2), got {}",
                headers.len()
            ),
        ));
    }
    let (team1_col, team2_col) = (0usize, 2usize);

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for raw in body {
        let cell = |idx: usize| raw.get(idx).unwrap_or(&EMPTY_CELL);
        if raw.iter().all(|c| *c == Cell::Empty) {
            continue;
        }
        let Some(shirt_number) = cell(number_col).shirt_number() else {
            skipped += 1;
            continue;
        };
        rows.push(LineupRow {
            shirt_number,
            team1_player: cell(team1_col).player_name(),
            team2_player: cell(team2_col).player_name(),
        });
    }
    Ok((rows, skipped))
}
