use rstt_core::ConfigError;
use rstt_engine::EngineError;
use rstt_uncertainty::UncertaintyError;
use thiserror::Error;

/// Construction failures. Per-request problems are reported as
/// `PredictionOutcome::Failure` instead.
#[derive(Error, Debug)]
pub enum PredictorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Uncertainty(#[from] UncertaintyError),
}
