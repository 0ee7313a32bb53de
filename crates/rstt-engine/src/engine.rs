//! Call contract of the regional travel-time engine.
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(
        "could not load the native engine library {library}; searched:\n{}",
        .searched.iter().map(|s| format!("  - {}", s)).collect::<Vec<_>>().join("\n")
    )]
    LibraryNotFound {
        library: String,
        searched: Vec<String>,
    },

    #[error("failed to open {path}: {message}")]
    LibraryOpen { path: PathBuf, message: String },

    #[error("library {path} does not export symbol {symbol}: {message}")]
    MissingSymbol {
        path: PathBuf,
        symbol: String,
        message: String,
    },

    #[error("slbmModel = {0} does not exist.")]
    ModelFileMissing(PathBuf),

    #[error("failed to load velocity model {path}: {message}")]
    ModelLoad { path: PathBuf, message: String },

    #[error("{call} failed: {message}")]
    Call { call: &'static str, message: String },
}

impl EngineError {
    pub fn call(call: &'static str, message: impl Into<String>) -> Self {
        EngineError::Call {
            call,
            message: message.into(),
        }
    }

    /// Message text without the failing call's name; this is what a
    /// failed prediction reports.
    pub fn detail(&self) -> String {
        match self {
            EngineError::Call { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Operations of the native engine. Every query after `create_great_circle`
/// reads the context established by the most recent call to it.
///
/// Latitudes and longitudes are radians, depths km, distances radians.
pub trait TravelTimeEngine: Send {
    fn load_velocity_model(&mut self, path: &Path) -> Result<(), EngineError>;

    fn set_max_distance(&mut self, radians: f64) -> Result<(), EngineError>;

    fn set_max_depth(&mut self, km: f64) -> Result<(), EngineError>;

    fn set_ch_max(&mut self, ch_max: f64) -> Result<(), EngineError>;

    #[allow(clippy::too_many_arguments)]
    fn create_great_circle(
        &mut self,
        phase: &str,
        src_lat: f64,
        src_lon: f64,
        src_depth: f64,
        rcv_lat: f64,
        rcv_lon: f64,
        rcv_depth: f64,
    ) -> Result<(), EngineError>;

    /// Seconds.
    fn travel_time(&mut self) -> Result<f64, EngineError>;

    /// Horizontal slowness, seconds/radian.
    fn slowness(&mut self) -> Result<f64, EngineError>;

    /// Seconds/km, positive down.
    fn dtt_ddepth(&mut self) -> Result<f64, EngineError>;

    /// Seconds/radian.
    fn dtt_dlat(&mut self) -> Result<f64, EngineError>;

    /// Seconds/radian.
    fn dtt_dlon(&mut self) -> Result<f64, EngineError>;

    /// Distance-dependent travel-time uncertainty, seconds.
    fn travel_time_uncertainty(&mut self, phase: &str, distance: f64) -> Result<f64, EngineError>;

    /// Path-dependent travel-time uncertainty of the current context, seconds.
    fn travel_time_uncertainty_path(&mut self, use_path: bool) -> Result<f64, EngineError>;

    fn version(&self) -> String;
}
