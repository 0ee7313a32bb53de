//! Prediction requests as assembled by the caller.
use crate::attributes::GeoAttribute;
use crate::geo::Location;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Kind of receiver; selects the azimuth/slowness fallback tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StationType {
    Array,
    #[default]
    SingleSensor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    /// Station code, e.g. "WRA"
    pub sta: String,
    pub location: Location,
    #[serde(default)]
    pub sta_type: StationType,
}

impl Receiver {
    pub fn new(sta: impl Into<String>, location: Location, sta_type: StationType) -> Self {
        Self {
            sta: sta.into(),
            location,
            sta_type,
        }
    }

    pub fn is_array(&self) -> bool {
        self.sta_type == StationType::Array
    }
}

/// Seismic phase token as supplied by the caller ("P", "Pn", "Lg", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phase(String);

impl Phase {
    pub fn new(name: impl Into<String>) -> Self {
        Phase(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name handed to the regional engine: the generic compressional
    /// phase "P" becomes "Pn", everything else passes through.
    pub fn engine_name(&self) -> &str {
        match self.0.as_str() {
            "P" => "Pn",
            other => other,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Phase {
    fn from(s: &str) -> Self {
        Phase::new(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub source: Location,
    pub receiver: Receiver,
    pub phase: Phase,
    #[serde(default)]
    pub requested_attributes: BTreeSet<GeoAttribute>,
    #[serde(default = "default_defining")]
    pub defining: bool,
}

fn default_defining() -> bool {
    true
}

impl PredictionRequest {
    pub fn new(
        source: Location,
        receiver: Receiver,
        phase: impl Into<Phase>,
        requested_attributes: impl IntoIterator<Item = GeoAttribute>,
    ) -> Self {
        Self {
            source,
            receiver,
            phase: phase.into(),
            requested_attributes: requested_attributes.into_iter().collect(),
            defining: true,
        }
    }

    pub fn non_defining(mut self) -> Self {
        self.defining = false;
        self
    }

    pub fn requests(&self, attribute: GeoAttribute) -> bool {
        self.requested_attributes.contains(&attribute)
    }

    /// Source-receiver separation in radians.
    pub fn distance(&self) -> f64 {
        self.source.distance(&self.receiver.location)
    }

    pub fn distance_degrees(&self) -> f64 {
        self.distance().to_degrees()
    }

    /// Receiver-to-source azimuth, radians.
    pub fn seaz(&self) -> Option<f64> {
        self.receiver.location.azimuth(&self.source)
    }

    /// Source-to-receiver azimuth, radians.
    pub fn esaz(&self) -> Option<f64> {
        self.source.azimuth(&self.receiver.location)
    }
}
