//! RSTT Core: shared data model for travel-time prediction
//!
//! Attribute identifiers, the NA sentinel, source/receiver geometry,
//! prediction requests and outcomes, and the flat key/value properties
//! object every other crate reads its configuration from.

pub mod attributes;
pub mod error;
pub mod geo;
pub mod outcome;
pub mod properties;
pub mod request;

pub use attributes::{Attributes, GeoAttribute, NA_VALUE};
pub use error::ConfigError;
pub use geo::Location;
pub use outcome::{Prediction, PredictionFailure, PredictionOutcome, RayType};
pub use properties::Properties;
pub use request::{Phase, PredictionRequest, Receiver, StationType};

/// Predictor crate family version
pub const RSTT_PREDICTOR_VERSION: &str = env!("CARGO_PKG_VERSION");
