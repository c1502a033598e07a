use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Tunable knobs for squad aggregation and the hybrid margin model.
///
/// `ParameterSet::default()` is the shared baseline. Anything that needs a
/// variation (the grid search, a `--params` file) works on its own copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    pub home_advantage: f64,
    pub std_dev: f64,

    pub weight_model_tactical: f64,
    pub weight_model_elo: f64,

    pub weight_pack: f64,
    pub weight_control: f64,
    pub weight_strike: f64,

    pub weight_starters: f64,
    pub weight_bench: f64,

    pub tactical_scaling_factor: f64,
    pub elo_scaling: f64,
    pub mismatch_threshold: f64,
    pub mismatch_bonus: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            home_advantage: 2.0,
            std_dev: 13.5,
            weight_model_tactical: 0.65,
            weight_model_elo: 0.35,
            weight_pack: 0.40,
            weight_control: 0.35,
            weight_strike: 0.25,
            weight_starters: 0.80,
            weight_bench: 0.20,
            tactical_scaling_factor: 0.85,
            elo_scaling: 0.7,
            mismatch_threshold: 4.0,
            mismatch_bonus: 5.0,
        }
    }
}

impl ParameterSet {
    /// Copy with the two calibrated axes replaced; the ELO weight is the
    /// complement of the tactical weight.
    pub fn with_fusion(&self, tactical_weight: f64, home_advantage: f64) -> Self {
        Self {
            weight_model_tactical: tactical_weight,
            weight_model_elo: 1.0 - tactical_weight,
            home_advantage,
            ..*self
        }
    }

    /// Rejects values that make the win probability undefined.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.std_dev.is_finite() && self.std_dev > 0.0,
            "std_dev must be a positive number, got {}",
            self.std_dev
        );
        let fields = [
            ("home_advantage", self.home_advantage),
            ("weight_model_tactical", self.weight_model_tactical),
            ("weight_model_elo", self.weight_model_elo),
            ("tactical_scaling_factor", self.tactical_scaling_factor),
            ("elo_scaling", self.elo_scaling),
            ("mismatch_threshold", self.mismatch_threshold),
            ("mismatch_bonus", self.mismatch_bonus),
        ];
        for (name, value) in fields {
            ensure!(value.is_finite(), "{name} must be finite, got {value}");
        }
        Ok(())
    }

    /// Weight groups that are conventionally normalized but drift from 1.0.
    /// These are reported, never rejected.
    pub fn weight_warnings(&self) -> Vec<String> {
        let mut out = Vec::new();
        let checks = [
            (
                "unit weights (pack + control + strike)",
                self.weight_pack + self.weight_control + self.weight_strike,
            ),
            (
                "squad weights (starters + bench)",
                self.weight_starters + self.weight_bench,
            ),
            (
                "model weights (tactical + elo)",
                self.weight_model_tactical + self.weight_model_elo,
            ),
        ];
        for (label, sum) in checks {
            if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                out.push(format!("{label} sum to {sum:.3}, not 1.0"));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ParameterFile {
    #[serde(default)]
    generated_at: Option<String>,
    #[serde(default)]
    source: Option<String>,
    params: ParameterSet,
}

/// Reads either a bare `ParameterSet` object or the wrapped form written by
/// [`save_params`]. Missing fields fall back to the defaults.
pub fn load_params(path: &Path) -> Result<ParameterSet> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read parameter file {}", path.display()))?;
    let params = match serde_json::from_str::<ParameterFile>(&raw) {
        Ok(file) => file.params,
        Err(_) => serde_json::from_str::<ParameterSet>(&raw)
            .with_context(|| format!("parse parameter file {}", path.display()))?,
    };
    params
        .validate()
        .with_context(|| format!("invalid parameter file {}", path.display()))?;
    Ok(params)
}

pub fn save_params(path: &Path, params: &ParameterSet, source: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        let _ = fs::create_dir_all(parent);
    }
    let file = ParameterFile {
        generated_at: Some(chrono::Utc::now().to_rfc3339()),
        source: Some(source.to_string()),
        params: *params,
    };
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(&file).context("serialize parameter set")?;
    fs::write(&tmp, json).context("write parameter set")?;
    fs::rename(&tmp, path).context("swap parameter set")?;
    Ok(())
}
