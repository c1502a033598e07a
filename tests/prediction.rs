use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rugby_predictor::elo::HistoricalRatings;
use rugby_predictor::win_prob::{self, normal_cdf};
use rugby_predictor::{
    ParameterSet, PositionGroup, PredictError, ResolvedPlayer, TeamTacticalProfile,
};

fn squad(team: &str, skill_for: impl Fn(u32) -> f64) -> Vec<ResolvedPlayer> {
    (1..=20)
        .map(|n| ResolvedPlayer {
            country: team.to_string(),
            name: format!("{team} {n}"),
            position_group: PositionGroup::from_shirt_number(n),
            skill: skill_for(n),
            starting: n <= 15,
            shirt_number: Some(n),
        })
        .collect()
}

fn random_profile(rng: &mut StdRng) -> TeamTacticalProfile {
    TeamTacticalProfile {
        total_score: rng.gen_range(60.0..95.0),
        pack_score_starters: rng.gen_range(60.0..95.0),
        pack_score_bench: rng.gen_range(60.0..95.0),
    }
}

fn random_params(rng: &mut StdRng) -> ParameterSet {
    let tactical = rng.gen_range(0.0..1.0);
    ParameterSet {
        home_advantage: rng.gen_range(-5.0..8.0),
        std_dev: rng.gen_range(1.0..25.0),
        weight_model_tactical: tactical,
        weight_model_elo: 1.0 - tactical,
        tactical_scaling_factor: rng.gen_range(0.1..2.0),
        elo_scaling: rng.gen_range(0.1..2.0),
        mismatch_threshold: rng.gen_range(0.0..8.0),
        mismatch_bonus: rng.gen_range(0.0..10.0),
        ..ParameterSet::default()
    }
}

#[test]
fn identical_squads_predict_home_advantage_only() {
    let mut players = squad("Georgia", |_| 75.0);
    players.extend(squad("Romania", |_| 75.0));
    let ratings = HistoricalRatings::new(HashMap::from([
        ("Georgia".to_string(), 72.0),
        ("Romania".to_string(), 72.0),
    ]));

    let pred = win_prob::simulate_match(
        "Georgia",
        "Romania",
        &players,
        &ratings,
        &ParameterSet::default(),
    )
    .unwrap();

    assert_eq!(pred.margin, 2.0);
    assert_eq!(pred.win_probability_home, normal_cdf(2.0 / 13.5));
    assert!((pred.win_probability_home - 0.558_887).abs() < 1e-5);
    assert_eq!(pred.predicted_winner(), "Georgia");
}

#[test]
fn unlisted_teams_share_the_default_rating() {
    let mut players = squad("Portugal", |_| 75.0);
    players.extend(squad("Spain", |_| 75.0));
    let pred = win_prob::simulate_match(
        "Portugal",
        "Spain",
        &players,
        &HistoricalRatings::default(),
        &ParameterSet::default(),
    )
    .unwrap();
    assert_eq!(pred.debug.elo_margin, 0.0);
    assert_eq!(pred.margin, 2.0);
}

#[test]
fn probability_stays_in_unit_interval() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    for _ in 0..2_000 {
        let params = random_params(&mut rng);
        let home = random_profile(&mut rng);
        let away = random_profile(&mut rng);
        let elo_home = rng.gen_range(60.0..95.0);
        let elo_away = rng.gen_range(60.0..95.0);
        let pred =
            win_prob::predict_from_profiles("H", "A", &home, &away, elo_home, elo_away, &params);
        assert!((0.0..=1.0).contains(&pred.win_probability_home));
        if pred.margin == 0.0 {
            assert_eq!(pred.win_probability_home, 0.5);
        }
    }
}

#[test]
fn swapping_sides_negates_the_neutral_margin() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..500 {
        let params = random_params(&mut rng);
        let home = random_profile(&mut rng);
        let away = random_profile(&mut rng);
        let elo_home = rng.gen_range(60.0..95.0);
        let elo_away = rng.gen_range(60.0..95.0);

        let forward =
            win_prob::predict_from_profiles("H", "A", &home, &away, elo_home, elo_away, &params);
        let reverse =
            win_prob::predict_from_profiles("A", "H", &away, &home, elo_away, elo_home, &params);

        let neutral_fwd = forward.margin - params.home_advantage;
        let neutral_rev = reverse.margin - params.home_advantage;
        assert!((neutral_fwd + neutral_rev).abs() < 1e-9);
        assert!((forward.debug.pack_diff + reverse.debug.pack_diff).abs() < 1e-9);
    }
}

#[test]
fn without_home_advantage_probabilities_are_complementary() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let params = ParameterSet {
            home_advantage: 0.0,
            ..random_params(&mut rng)
        };
        let home = random_profile(&mut rng);
        let away = random_profile(&mut rng);
        let forward = win_prob::predict_from_profiles("H", "A", &home, &away, 80.0, 85.0, &params);
        let reverse = win_prob::predict_from_profiles("A", "H", &away, &home, 85.0, 80.0, &params);
        assert!((forward.margin + reverse.margin).abs() < 1e-9);
        assert!((forward.win_probability_away() - reverse.win_probability_home).abs() < 1e-9);
    }
}

#[test]
fn stronger_pack_earns_the_flat_bonus() {
    let params = ParameterSet {
        home_advantage: 0.0,
        ..ParameterSet::default()
    };
    let ratings = HistoricalRatings::empty();

    // Forwards only differ; backs identical so only the pack moves.
    let forwards = |n: u32| PositionGroup::from_shirt_number(n) == PositionGroup::Forwards;
    let run = |forward_skill: f64| {
        let mut players = squad("Home", |n| if forwards(n) { forward_skill } else { 75.0 });
        players.extend(squad("Away", |_| 75.0));
        win_prob::simulate_match("Home", "Away", &players, &ratings, &params).unwrap()
    };

    let over = run(79.1);
    assert!((over.debug.pack_diff - 4.1).abs() < 1e-9);
    let over_tactical_base = over.debug.tactical_margin - 5.0;

    let far = run(95.0);
    assert!(far.debug.pack_diff > 4.0);

    let under = run(78.9);
    assert!((under.debug.pack_diff - 3.9).abs() < 1e-9);

    // Tactical margin minus the scaled total-score gap is exactly the bonus.
    let total_gap = |fs: f64| {
        let pack_weight = params.weight_pack;
        (fs - 75.0) * pack_weight * params.tactical_scaling_factor
    };
    assert!((over_tactical_base - total_gap(79.1)).abs() < 1e-9);
    assert!((far.debug.tactical_margin - total_gap(95.0) - 5.0).abs() < 1e-9);
    assert!((under.debug.tactical_margin - total_gap(78.9)).abs() < 1e-9);
}

#[test]
fn missing_away_squad_is_reported_by_name() {
    let players = squad("Ireland", |_| 80.0);
    let err = win_prob::simulate_match(
        "Ireland",
        "Italy",
        &players,
        &HistoricalRatings::default(),
        &ParameterSet::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Italy"));
    assert!(matches!(err, PredictError::MissingTeamData { .. }));
}
