use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use env_logger::Env;
use log::{info, warn};

use crate::elo::{self, HistoricalRatings};
use crate::model_params::{self, ParameterSet};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_RATINGS_FILE: &str = "six_nations_squads_FINAL.csv";

/// File locations shared by the binaries. Environment first, then
/// command-line overrides via [`CliArgs`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub ratings_file: PathBuf,
    pub params_path: Option<PathBuf>,
    pub elo_path: Option<PathBuf>,
    pub results_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from(DEFAULT_DATA_DIR);
        Self {
            ratings_file: data_dir.join(DEFAULT_RATINGS_FILE),
            data_dir,
            params_path: None,
            elo_path: None,
            results_path: None,
        }
    }
}

impl AppConfig {
    /// Loads `.env.local` then `.env` (neither is required) and reads the
    /// `RUGBY_*` variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(opt_env)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup("RUGBY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let ratings_file = lookup("RUGBY_RATINGS_FILE")
            .map(|name| resolve_in(&data_dir, &name))
            .unwrap_or_else(|| data_dir.join(DEFAULT_RATINGS_FILE));
        Self {
            ratings_file,
            params_path: lookup("RUGBY_PARAMS_PATH").map(PathBuf::from),
            elo_path: lookup("RUGBY_ELO_PATH").map(PathBuf::from),
            results_path: lookup("RUGBY_RESULTS_PATH").map(PathBuf::from),
            data_dir,
        }
    }

    /// Applies `--data-dir`, `--ratings`, `--params`, `--elo` and `--results`.
    pub fn with_args(mut self, args: &CliArgs) -> Self {
        if let Some(dir) = args.path("--data-dir") {
            self.data_dir = dir;
        }
        if let Some(ratings) = args.path("--ratings") {
            self.ratings_file = ratings;
        }
        if let Some(p) = args.path("--params") {
            self.params_path = Some(p);
        }
        if let Some(p) = args.path("--elo") {
            self.elo_path = Some(p);
        }
        if let Some(p) = args.path("--results") {
            self.results_path = Some(p);
        }
        self
    }

    /// Configured parameters, or the defaults when no file is set.
    pub fn load_params(&self) -> Result<ParameterSet> {
        let params = match &self.params_path {
            Some(path) => {
                let params = model_params::load_params(path)
                    .with_context(|| format!("load parameters from {}", path.display()))?;
                info!("using parameters from {}", path.display());
                params
            }
            None => ParameterSet::default(),
        };
        for warning in params.weight_warnings() {
            warn!("{warning}");
        }
        Ok(params)
    }

    pub fn load_ratings(&self) -> Result<HistoricalRatings> {
        match &self.elo_path {
            Some(path) => elo::load_ratings(path),
            None => Ok(HistoricalRatings::default()),
        }
    }
}

fn resolve_in(dir: &Path, name: &str) -> PathBuf {
    let path = PathBuf::from(name);
    if path.is_absolute() || path.components().count() > 1 {
        path
    } else {
        dir.join(path)
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}

/// Hand-rolled flag lookup supporting `--name value` and `--name=value`.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    args: Vec<String>,
}

impl CliArgs {
    pub fn from_env() -> Self {
        Self::new(env::args().skip(1))
    }

    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn value(&self, name: &str) -> Option<String> {
        let prefix = format!("{name}=");
        for (idx, arg) in self.args.iter().enumerate() {
            if let Some(raw) = arg.strip_prefix(&prefix) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
            if arg == name
                && let Some(next) = self.args.get(idx + 1)
                && !next.trim().is_empty()
                && !next.starts_with("--")
            {
                return Some(next.trim().to_string());
            }
        }
        None
    }

    pub fn path(&self, name: &str) -> Option<PathBuf> {
        self.value(name).map(PathBuf::from)
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(|v| v.parse::<f64>().ok())
    }

    /// Comma-separated numbers, e.g. `--home-adv 0,1,2`.
    pub fn f64_list(&self, name: &str) -> Option<Vec<f64>> {
        let raw = self.value(name)?;
        let values: Vec<f64> = raw
            .split(',')
            .filter_map(|part| part.trim().parse::<f64>().ok())
            .collect();
        if values.is_empty() { None } else { Some(values) }
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.args.iter().any(|arg| arg == name)
    }
}

/// `info` by default, `debug` with `verbose`; `RUST_LOG` wins over both.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}
