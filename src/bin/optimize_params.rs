use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{info, warn};

use rugby_predictor::app_config::{self, AppConfig, CliArgs};
use rugby_predictor::calibration::{self, CalibrationInputs, SearchGrid};
use rugby_predictor::historical_results;
use rugby_predictor::lineup::FileLineups;
use rugby_predictor::model_params;
use rugby_predictor::player_ratings;
use rugby_predictor::report;
use rugby_predictor::results_export;

const DEFAULT_OUT: &str = "optimization_results.csv";

fn main() -> Result<()> {
    let args = CliArgs::from_env();
    app_config::init_logging(args.has_flag("--verbose"));
    let config = AppConfig::from_env().with_args(&args);

    let base = config.load_params()?;
    let ratings = config.load_ratings()?;
    let table = player_ratings::load_rating_table(&config.ratings_file)
        .with_context(|| format!("cannot read {}", config.ratings_file.display()))?;
    let results = match &config.results_path {
        Some(path) => historical_results::load_results(path)?,
        None => historical_results::default_results(),
    };
    let lineups = FileLineups::new(&config.data_dir);
    for m in &results {
        for team in [&m.home, &m.away] {
            if !ratings.is_listed(team) {
                warn!("{team} has no historical rating, using the default");
            }
        }
    }

    let mut grid = SearchGrid::default();
    if let Some(weights) = args.f64_list("--tactical-weights") {
        grid.tactical_weights = weights;
    }
    if let Some(home) = args.f64_list("--home-adv") {
        grid.home_advantages = home;
    }

    let rule = "=".repeat(70);
    println!("{rule}\nGRID SEARCH OPTIMIZATION - Six Nations Predictor\n{rule}");
    println!("\nEvaluating {} matches\n\nMatches:", results.len());
    print!("{}", report::matches_summary(&results));
    println!("\nTesting {} parameter combinations...", grid.len());

    let inputs = CalibrationInputs {
        results: &results,
        lineups: &lineups,
        table: &table,
        ratings: &ratings,
    };
    let outcome = calibration::grid_search(&inputs, &base, &grid)?;
    print!("\n{}", report::calibration_report(&outcome));

    let out_path = args
        .path("--out")
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT));
    results_export::write_results(&out_path, &outcome)?;
    println!("\nResults saved to: {}", out_path.display());
    if let Some(xlsx) = args.path("--xlsx") {
        results_export::write_results_xlsx(&xlsx, &outcome)?;
        println!("Workbook saved to: {}", xlsx.display());
    }

    if let Some(best_path) = args.path("--save-best") {
        model_params::save_params(&best_path, &outcome.best_params(), "grid_search")?;
        info!("best parameters saved to {}", best_path.display());
    }
    Ok(())
}
