//! Predictor configuration read from `Properties`.

use crate::error::PredictorError;
use rstt_core::{ConfigError, Properties};
use rstt_engine::EngineSearchConfig;
use rstt_uncertainty::{
    AzShSource, UncertaintyError, UncertaintyEstimator, UncertaintyScales, UncertaintyType,
};
use std::path::Path;

pub const PREDICTIONS_PER_TASK_KEY: &str = "slbmPredictionsPerTask";

#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    pub engine: EngineSearchConfig,
    pub uncertainty_type: UncertaintyType,
    pub az_sh: AzShSource,
    pub scales: UncertaintyScales,
    /// Requests handled per engine session in batch mode
    pub predictions_per_task: usize,
}

impl PredictorConfig {
    pub fn new(engine: EngineSearchConfig, uncertainty_type: UncertaintyType) -> Self {
        Self {
            engine,
            uncertainty_type,
            az_sh: AzShSource::Default,
            scales: UncertaintyScales::default(),
            predictions_per_task: usize::MAX,
        }
    }

    pub fn from_properties(properties: &Properties) -> Result<Self, PredictorError> {
        let predictions_per_task = match properties.get_usize(PREDICTIONS_PER_TASK_KEY)? {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    key: PREDICTIONS_PER_TASK_KEY.to_string(),
                    value: "0".to_string(),
                    reason: "must be at least 1".to_string(),
                }
                .into())
            }
            Some(n) => n,
            None => usize::MAX,
        };

        Ok(Self {
            engine: EngineSearchConfig::from_properties(properties)?,
            uncertainty_type: UncertaintyType::from_properties(properties)?,
            az_sh: AzShSource::from_properties(properties),
            scales: UncertaintyScales::from_properties(properties)?,
            predictions_per_task,
        })
    }

    /// Load from a YAML properties file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PredictorError> {
        Self::from_properties(&Properties::load(path)?)
    }

    /// Build the uncertainty estimator, loading the azimuth/slowness table.
    pub fn estimator(&self) -> Result<UncertaintyEstimator, UncertaintyError> {
        let table = self.az_sh.load_table()?;
        Ok(UncertaintyEstimator::new(
            self.uncertainty_type,
            table,
            self.scales,
        ))
    }
}
