use std::f64::consts::SQRT_2;

use statrs::function::erf::erf;

use crate::elo::HistoricalRatings;
use crate::error::{PredictError, Result};
use crate::model_params::ParameterSet;
use crate::tactical;
use crate::types::{MatchPrediction, PredictionBreakdown, ResolvedPlayer, TeamTacticalProfile};

// Share of the blended pack rating carried by the starting eight.
const PACK_STARTERS_SHARE: f64 = 0.7;
const PACK_BENCH_SHARE: f64 = 0.3;

/// Standard normal CDF.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / SQRT_2))
}

/// Starters/bench blend of a team's forward pack.
pub fn blended_pack(profile: &TeamTacticalProfile) -> f64 {
    PACK_STARTERS_SHARE * profile.pack_score_starters + PACK_BENCH_SHARE * profile.pack_score_bench
}

/// Flat bonus once the pack gap clears the threshold, signed toward the
/// stronger pack. A gap of 4.01 and one of 40 earn the same bonus.
pub fn mismatch_bonus(pack_diff: f64, params: &ParameterSet) -> f64 {
    if pack_diff > params.mismatch_threshold {
        params.mismatch_bonus
    } else if pack_diff < -params.mismatch_threshold {
        -params.mismatch_bonus
    } else {
        0.0
    }
}

/// Hybrid margin from two tactical profiles and their historical ratings.
pub fn predict_from_profiles(
    home: &str,
    away: &str,
    home_profile: &TeamTacticalProfile,
    away_profile: &TeamTacticalProfile,
    elo_home: f64,
    elo_away: f64,
    params: &ParameterSet,
) -> MatchPrediction {
    let pack_diff = blended_pack(home_profile) - blended_pack(away_profile);
    let tactical_margin = (home_profile.total_score - away_profile.total_score)
        * params.tactical_scaling_factor
        + mismatch_bonus(pack_diff, params);

    let elo_margin = (elo_home - elo_away) * params.elo_scaling;

    let margin = tactical_margin * params.weight_model_tactical
        + elo_margin * params.weight_model_elo
        + params.home_advantage;

    let win_probability_home = normal_cdf(margin / params.std_dev).clamp(0.0, 1.0);

    MatchPrediction {
        home: home.to_string(),
        away: away.to_string(),
        margin,
        win_probability_home,
        debug: PredictionBreakdown {
            tactical_margin,
            elo_margin,
            pack_diff,
        },
    }
}

/// Aggregates both squads and predicts the match.
///
/// Fails with [`PredictError::MissingTeamData`] naming every team that has no
/// players in `players`.
pub fn simulate_match(
    home: &str,
    away: &str,
    players: &[ResolvedPlayer],
    ratings: &HistoricalRatings,
    params: &ParameterSet,
) -> Result<MatchPrediction> {
    let home_profile = tactical::team_profile(players, home, params);
    let away_profile = tactical::team_profile(players, away, params);

    let (Some(home_profile), Some(away_profile)) = (home_profile, away_profile) else {
        let teams = [(home, home_profile.is_none()), (away, away_profile.is_none())]
            .into_iter()
            .filter(|(_, missing)| *missing)
            .map(|(team, _)| team.to_string())
            .collect();
        return Err(PredictError::MissingTeamData { teams });
    };

    Ok(predict_from_profiles(
        home,
        away,
        &home_profile,
        &away_profile,
        ratings.rating(home),
        ratings.rating(away),
        params,
    ))
}
