use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PredictError>;

#[derive(Debug, Error)]
pub enum PredictError {
    /// One or both teams ended up with zero resolved players.
    #[error("missing squad data for {}", .teams.join(" and "))]
    MissingTeamData { teams: Vec<String> },

    #[error("invalid match file {}: {reason}", .path.display())]
    InvalidMatchFile { path: PathBuf, reason: String },

    #[error("invalid match file name {name:?}: expected Team1-Team2.<ext>")]
    InvalidFileName { name: String },

    #[error("column {column:?} not found in {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error on {}: {reason}", .path.display())]
    Spreadsheet { path: PathBuf, reason: String },

    #[error("historical match {match_file} failed: {reason}")]
    TrialFailure { match_file: String, reason: String },

    #[error("no parameter combination could be evaluated successfully")]
    NoSuccessfulTrial,
}

impl PredictError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidMatchFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PredictError;

    #[test]
    fn missing_team_message_names_every_team() {
        let err = PredictError::MissingTeamData {
            teams: vec!["Italy".to_string(), "Wales".to_string()],
        };
        assert_eq!(err.to_string(), "missing squad data for Italy and Wales");
    }
}
