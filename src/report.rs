use std::fmt::Write as _;

use crate::calibration::{GridSearchReport, TrialResult};
use crate::historical_results::HistoricalMatch;
use crate::model_params::ParameterSet;
use crate::types::MatchPrediction;

const RULE_WIDTH: usize = 70;
pub const TOP_N: usize = 10;

/// Team with the dominant pack when the blended gap clears the mismatch
/// threshold.
pub fn pack_alert<'a>(pred: &'a MatchPrediction, params: &ParameterSet) -> Option<&'a str> {
    let diff = pred.debug.pack_diff;
    if diff.abs() <= params.mismatch_threshold {
        return None;
    }
    Some(if diff > 0.0 { &pred.home } else { &pred.away })
}

pub fn prediction_report(pred: &MatchPrediction, params: &ParameterSet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Match: {} vs {}", pred.home, pred.away);
    let _ = writeln!(out, "Predicted Winner: {}", pred.predicted_winner().to_uppercase());
    let _ = writeln!(out, "Predicted Margin: {:.1} points", pred.margin.abs());
    let _ = writeln!(out, "Win Probability: {:.1}%", pred.winner_probability() * 100.0);
    let _ = writeln!(out);
    let _ = writeln!(out, "Breakdown:");
    let _ = writeln!(
        out,
        "Tactical Advantage (Squad): {:+.1} points",
        pred.debug.tactical_margin
    );
    let _ = writeln!(
        out,
        "Historical Advantage (ELO): {:+.1} points",
        pred.debug.elo_margin
    );
    if let Some(team) = pack_alert(pred, params) {
        let _ = writeln!(out, "ALERT: {team} has critical physical advantage in the pack.");
    }
    let _ = writeln!(out, "{}", "-".repeat(60));
    out
}

pub fn matches_summary(results: &[HistoricalMatch]) -> String {
    let mut out = String::new();
    for (i, m) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {} vs {}: {}-{}",
            i + 1,
            m.home,
            m.away,
            m.home_score,
            m.away_score
        );
    }
    out
}

fn trial_line(t: &TrialResult) -> String {
    format!(
        "{:>15.2} {:>10.2} {:>14.1} {:>8.2} {:>8.2} {:>9.2} {:>15} {:>10.1}",
        t.tactical_weight,
        t.elo_weight,
        t.home_advantage,
        t.metrics.rmse,
        t.metrics.mae,
        t.metrics.max_error,
        t.metrics.correct_winners,
        t.metrics.accuracy
    )
}

/// Top-ranked rows, best configuration, and the comparison with `base_params`.
pub fn calibration_report(report: &GridSearchReport) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}\nOPTIMIZATION RESULTS\n{rule}");
    let _ = writeln!(
        out,
        "{} of {} combinations scored\n",
        report.ranked.len(),
        report.combinations
    );
    let _ = writeln!(out, "Top {TOP_N} configurations by RMSE:\n");
    let _ = writeln!(
        out,
        "{:>15} {:>10} {:>14} {:>8} {:>8} {:>9} {:>15} {:>10}",
        "tactical_weight",
        "elo_weight",
        "home_advantage",
        "rmse",
        "mae",
        "max_error",
        "correct_winners",
        "accuracy_%"
    );
    for t in report.ranked.iter().take(TOP_N) {
        let _ = writeln!(out, "{}", trial_line(t));
    }

    let best = report.best();
    let _ = writeln!(out, "\n{rule}\nBEST CONFIGURATION\n{rule}");
    let _ = writeln!(out, "Tactical Weight:    {:.2}", best.tactical_weight);
    let _ = writeln!(out, "ELO Weight:         {:.2}", best.elo_weight);
    let _ = writeln!(out, "Home Advantage:     {:.1} points", best.home_advantage);
    let _ = writeln!(out, "\nPerformance:");
    let _ = writeln!(out, "  RMSE:             {:.2} points", best.metrics.rmse);
    let _ = writeln!(out, "  MAE:              {:.2} points", best.metrics.mae);
    let _ = writeln!(out, "  Max Error:        {:.2} points", best.metrics.max_error);
    let _ = writeln!(
        out,
        "  Correct Winners:  {}/{}",
        best.metrics.correct_winners, best.metrics.samples
    );
    let _ = writeln!(out, "  Accuracy:         {:.1}%", best.metrics.accuracy);

    let base = &report.base_params;
    let _ = writeln!(out, "\n{rule}\nCOMPARISON WITH CURRENT PARAMETERS\n{rule}");
    let _ = writeln!(
        out,
        "Current:   tactical={:.2} elo={:.2} home_adv={:.1}",
        base.weight_model_tactical, base.weight_model_elo, base.home_advantage
    );
    match report.baseline {
        Some(m) => {
            let _ = writeln!(out, "  RMSE: {:.2} points", m.rmse);
            let _ = writeln!(out, "  Accuracy: {:.1}%", m.accuracy);
        }
        None => {
            let _ = writeln!(out, "  could not be evaluated");
        }
    }
    let _ = writeln!(
        out,
        "Optimized: tactical={:.2} elo={:.2} home_adv={:.1}",
        best.tactical_weight, best.elo_weight, best.home_advantage
    );
    let _ = writeln!(out, "  RMSE: {:.2} points", best.metrics.rmse);
    let _ = writeln!(out, "  Accuracy: {:.1}%", best.metrics.accuracy);
    if let Some(pct) = report.improvement_pct() {
        let _ = writeln!(out, "\nRMSE improvement: {pct:+.1}%");
    }
    out
}
