pub mod app_config;
pub mod calibration;
pub mod csv_input;
pub mod elo;
pub mod error;
pub mod historical_results;
pub mod lineup;
pub mod match_ready;
pub mod model_params;
pub mod player_ratings;
pub mod report;
pub mod results_export;
pub mod squad_builder;
pub mod tactical;
pub mod types;
pub mod win_prob;

pub use error::{PredictError, Result};
pub use model_params::ParameterSet;
pub use types::{
    LineupEntry, MatchPrediction, PlayerRecord, PositionGroup, PredictionBreakdown,
    ResolvedPlayer, TeamTacticalProfile,
};
