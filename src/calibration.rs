use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::elo::HistoricalRatings;
use crate::error::{PredictError, Result};
use crate::historical_results::HistoricalMatch;
use crate::lineup::LineupProvider;
use crate::model_params::ParameterSet;
use crate::player_ratings::RatingTable;
use crate::squad_builder;
use crate::types::MatchPrediction;
use crate::win_prob;

/// Predicted margins this close to zero count as calling a drawn match.
pub const DRAW_TOLERANCE: f64 = 3.0;
const PROGRESS_EVERY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub samples: usize,
    pub rmse: f64,
    pub mae: f64,
    pub max_error: f64,
    pub correct_winners: usize,
    /// Percentage of matches with the winner called correctly.
    pub accuracy: f64,
}

pub fn is_correct_winner(predicted_margin: f64, actual_margin: f64) -> bool {
    (actual_margin > 0.0 && predicted_margin > 0.0)
        || (actual_margin < 0.0 && predicted_margin < 0.0)
        || (actual_margin == 0.0 && predicted_margin.abs() < DRAW_TOLERANCE)
}

/// Error metrics over paired predicted/actual margins. `None` when there is
/// nothing to score or the slices disagree in length.
pub fn evaluate_margins(predicted: &[f64], actual: &[f64]) -> Option<Metrics> {
    if predicted.is_empty() || predicted.len() != actual.len() {
        return None;
    }

    let mut sq_sum = 0.0_f64;
    let mut abs_sum = 0.0_f64;
    let mut max_error = 0.0_f64;
    let mut correct = 0usize;

    for (p, a) in predicted.iter().zip(actual) {
        let err = (p - a).abs();
        sq_sum += err * err;
        abs_sum += err;
        max_error = max_error.max(err);
        if is_correct_winner(*p, *a) {
            correct += 1;
        }
    }

    let n = predicted.len() as f64;
    Some(Metrics {
        samples: predicted.len(),
        rmse: (sq_sum / n).sqrt(),
        mae: abs_sum / n,
        max_error,
        correct_winners: correct,
        accuracy: correct as f64 / n * 100.0,
    })
}

/// Everything a trial reads. Shared across trials and never mutated.
#[derive(Clone, Copy)]
pub struct CalibrationInputs<'a> {
    pub results: &'a [HistoricalMatch],
    pub lineups: &'a dyn LineupProvider,
    pub table: &'a RatingTable,
    pub ratings: &'a HistoricalRatings,
}

/// Predicts every historical match with `params`. The first failing match
/// fails the whole batch.
pub fn predict_results(
    inputs: &CalibrationInputs<'_>,
    params: &ParameterSet,
) -> Result<Vec<MatchPrediction>> {
    inputs
        .results
        .iter()
        .map(|m| predict_one(inputs, m, params))
        .collect()
}

fn predict_one(
    inputs: &CalibrationInputs<'_>,
    m: &HistoricalMatch,
    params: &ParameterSet,
) -> Result<MatchPrediction> {
    let trial_err = |err: PredictError| PredictError::TrialFailure {
        match_file: m.match_file.clone(),
        reason: err.to_string(),
    };
    let lineup = inputs.lineups.lineup(&m.match_file).map_err(trial_err)?;
    let squads = squad_builder::build_match_squads(&lineup, inputs.table);
    win_prob::simulate_match(&m.home, &m.away, &squads.players, inputs.ratings, params)
        .map_err(trial_err)
}

/// Scores one configuration against every historical result. Any failure
/// discards the configuration; there is no partial credit.
pub fn evaluate_params(inputs: &CalibrationInputs<'_>, params: &ParameterSet) -> Result<Metrics> {
    let predictions = predict_results(inputs, params)?;
    let predicted: Vec<f64> = predictions.iter().map(|p| p.margin).collect();
    let actual: Vec<f64> = inputs.results.iter().map(|m| m.actual_margin()).collect();
    evaluate_margins(&predicted, &actual).ok_or_else(|| PredictError::TrialFailure {
        match_file: String::new(),
        reason: "no historical matches to score".to_string(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchGrid {
    pub tactical_weights: Vec<f64>,
    pub home_advantages: Vec<f64>,
}

impl Default for SearchGrid {
    fn default() -> Self {
        Self {
            tactical_weights: (50..=80).step_by(5).map(|w| w as f64 / 100.0).collect(),
            home_advantages: (0..=5).map(f64::from).collect(),
        }
    }
}

impl SearchGrid {
    pub fn len(&self) -> usize {
        self.tactical_weights.len() * self.home_advantages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(tactical_weight, home_advantage)` pairs, tactical weight outermost.
    pub fn combinations(&self) -> Vec<(f64, f64)> {
        self.tactical_weights
            .iter()
            .flat_map(|&t| self.home_advantages.iter().map(move |&h| (t, h)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub tactical_weight: f64,
    pub elo_weight: f64,
    pub home_advantage: f64,
    pub metrics: Metrics,
}

impl TrialResult {
    /// The full parameter set this row was scored with.
    pub fn params(&self, base: &ParameterSet) -> ParameterSet {
        base.with_fusion(self.tactical_weight, self.home_advantage)
    }
}

#[derive(Debug, Clone)]
pub struct GridSearchReport {
    pub base_params: ParameterSet,
    pub combinations: usize,
    pub discarded: usize,
    /// Surviving trials, ascending by RMSE. Never empty.
    pub ranked: Vec<TrialResult>,
    /// Score of `base_params` itself, when it could be evaluated.
    pub baseline: Option<Metrics>,
}

impl GridSearchReport {
    pub fn best(&self) -> &TrialResult {
        &self.ranked[0]
    }

    pub fn best_params(&self) -> ParameterSet {
        self.best().params(&self.base_params)
    }

    /// Relative RMSE gain of the best trial over the baseline, in percent.
    pub fn improvement_pct(&self) -> Option<f64> {
        let baseline = self.baseline?;
        if baseline.rmse <= 0.0 {
            return None;
        }
        Some((baseline.rmse - self.best().metrics.rmse) / baseline.rmse * 100.0)
    }
}

/// Sweeps `grid` over copies of `base`, scores each copy against every
/// historical match and ranks the survivors by RMSE.
pub fn grid_search(
    inputs: &CalibrationInputs<'_>,
    base: &ParameterSet,
    grid: &SearchGrid,
) -> Result<GridSearchReport> {
    let combos = grid.combinations();
    let total = combos.len();
    info!(
        "testing {total} parameter combinations over {} matches",
        inputs.results.len()
    );

    let done = AtomicUsize::new(0);
    let outcomes: Vec<Option<TrialResult>> = combos
        .par_iter()
        .map(|&(tactical_weight, home_advantage)| {
            let params = base.with_fusion(tactical_weight, home_advantage);
            let outcome = match evaluate_params(inputs, &params) {
                Ok(metrics) => Some(TrialResult {
                    tactical_weight,
                    elo_weight: round2(1.0 - tactical_weight),
                    home_advantage,
                    metrics,
                }),
                Err(err) => {
                    warn!(
                        "discarding tactical={tactical_weight:.2} home_adv={home_advantage:.1}: {err}"
                    );
                    None
                }
            };
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if n % PROGRESS_EVERY == 0 {
                info!("progress: {n}/{total} combinations evaluated");
            }
            outcome
        })
        .collect();

    let mut ranked: Vec<TrialResult> = outcomes.into_iter().flatten().collect();
    let discarded = total - ranked.len();
    if ranked.is_empty() {
        return Err(PredictError::NoSuccessfulTrial);
    }
    ranked.sort_by(|a, b| a.metrics.rmse.total_cmp(&b.metrics.rmse));

    let baseline = match evaluate_params(inputs, base) {
        Ok(m) => Some(m),
        Err(err) => {
            warn!("baseline parameters could not be evaluated: {err}");
            None
        }
    };
    debug!("{discarded} of {total} combinations discarded");

    Ok(GridSearchReport {
        base_params: *base,
        combinations: total,
        discarded,
        ranked,
        baseline,
    })
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
