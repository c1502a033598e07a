use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use rugby_predictor::app_config::{self, AppConfig, CliArgs};
use rugby_predictor::lineup;
use rugby_predictor::match_ready::{self, MatchReadySquads};
use rugby_predictor::player_ratings;
use rugby_predictor::report;
use rugby_predictor::squad_builder;
use rugby_predictor::win_prob;

const DEFAULT_SQUADS_FILE: &str = "match_ready_squads.csv";

fn main() -> Result<()> {
    let args = CliArgs::from_env();
    app_config::init_logging(args.has_flag("--verbose"));

    let config = AppConfig::from_env().with_args(&args);
    let params = config.load_params()?;
    let ratings = config.load_ratings()?;

    let squads = match args.path("--lineup") {
        Some(lineup_path) => squads_from_lineup(&config, &lineup_path)?,
        None => {
            let path = args
                .path("--squads")
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SQUADS_FILE));
            let squads = match_ready::load_match_ready_csv(&path).with_context(|| {
                format!(
                    "cannot read {}; run prepare_match first or pass --lineup",
                    path.display()
                )
            })?;
            info!(
                "data loaded: {} ({} records)",
                path.display(),
                squads.players.len()
            );
            if squads.skipped_rows > 0 {
                warn!("{} malformed squad rows skipped", squads.skipped_rows);
            }
            squads
        }
    };

    println!("\nSIX NATIONS MATCH PREDICTION\n");
    println!("Teams found: {}", squads.teams.join(", "));
    let [home, away] = squads.teams.as_slice() else {
        return Err(anyhow!(
            "expected exactly 2 teams, found {}: {:?}",
            squads.teams.len(),
            squads.teams
        ));
    };

    for team in [home, away] {
        if !ratings.is_listed(team) {
            warn!(
                "{team} has no historical rating, using default {:.1}",
                ratings.rating(team)
            );
        }
    }

    let prediction = win_prob::simulate_match(home, away, &squads.players, &ratings, &params)?;
    print!("{}", report::prediction_report(&prediction, &params));
    Ok(())
}

fn squads_from_lineup(config: &AppConfig, lineup_path: &Path) -> Result<MatchReadySquads> {
    let table = player_ratings::load_rating_table(&config.ratings_file)
        .with_context(|| format!("load ratings {}", config.ratings_file.display()))?;
    let lineup = lineup::load_lineup(lineup_path)?;
    let build = squad_builder::build_match_squads(&lineup, &table);
    squad_builder::validate_squads(&build.players);
    Ok(MatchReadySquads {
        teams: vec![lineup.team1.clone(), lineup.team2.clone()],
        has_shirt_numbers: true,
        skipped_rows: build.skipped_rows,
        players: build.players,
    })
}
