use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use rugby_predictor::app_config::{self, AppConfig, CliArgs};
use rugby_predictor::lineup;
use rugby_predictor::match_ready;
use rugby_predictor::player_ratings;
use rugby_predictor::squad_builder;

const DEFAULT_OUT: &str = "match_ready_squads.csv";

fn main() -> Result<()> {
    let args = CliArgs::from_env();
    app_config::init_logging(args.has_flag("--verbose"));
    let config = AppConfig::from_env().with_args(&args);

    let lineup_path = args.path("--lineup").ok_or_else(|| {
        anyhow!("usage: prepare_match --lineup <Home-Away.xlsx|csv> [--ratings FILE] [--out FILE]")
    })?;
    let out_path = args
        .path("--out")
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT));

    info!("loading ratings: {}", config.ratings_file.display());
    let table = player_ratings::load_rating_table(&config.ratings_file)
        .with_context(|| format!("cannot read {}", config.ratings_file.display()))?;

    let teams = match (args.value("--home"), args.value("--away")) {
        (Some(home), Some(away)) => Some((home, away)),
        _ => None,
    };
    info!("loading match lineup: {}", lineup_path.display());
    let lineup = lineup::load_lineup_with_teams(&lineup_path, teams)?;
    info!("teams: {} vs {}", lineup.team1, lineup.team2);
    if lineup.skipped_rows > 0 {
        warn!("{} lineup rows without a usable number skipped", lineup.skipped_rows);
    }

    let build = squad_builder::build_match_squads(&lineup, &table);
    let checks = squad_builder::validate_squads(&build.players);
    for check in &checks {
        info!(
            "{}: {} players, {} starters{}",
            check.team,
            check.players,
            check.starters,
            if check.is_valid() { "" } else { " (check lineup)" }
        );
    }

    match_ready::write_match_ready_csv(&out_path, &build.players)?;
    println!(
        "{} players written to {} ({} imputed)",
        build.players.len(),
        out_path.display(),
        build.unresolved.len()
    );
    Ok(())
}
