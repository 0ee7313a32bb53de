use rstt_core::{ConfigError, GeoAttribute};
use rstt_engine::EngineError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UncertaintyError {
    #[error(
        "'{value}' is not a valid uncertainty type; must be one of DistanceDependent, \
         PathDependent, HierarchicalDistanceDependent, HierarchicalPathDependent"
    )]
    InvalidType { value: String },

    #[error(
        "{attribute} is not an uncertainty attribute; must be one of TT_MODEL_UNCERTAINTY, \
         AZIMUTH_MODEL_UNCERTAINTY, AZIMUTH_MODEL_UNCERTAINTY_DEGREES, \
         SLOWNESS_MODEL_UNCERTAINTY, SLOWNESS_MODEL_UNCERTAINTY_DEGREES"
    )]
    UnsupportedAttribute { attribute: GeoAttribute },

    #[error("failed to read azimuth/slowness uncertainty file {path}: {source}")]
    TableIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name} line {line}: {message}")]
    TableParse {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("{source_name}: default values are not specified (no line like '* * 0.5 5.0')")]
    MissingDefaultEntry { source_name: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
