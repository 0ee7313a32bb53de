//! Prediction outcomes: exactly one of success or failure.
use crate::attributes::{Attributes, GeoAttribute};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RayType {
    Refraction,
    Reflection,
    Diffraction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub attributes: Attributes,
    pub ray_type: RayType,
    /// File name of the velocity model that produced the values
    pub model_name: String,
    pub engine_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionFailure {
    pub message: String,
    /// Seconds spent, when CALCULATION_TIME was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredictionOutcome {
    Success(Prediction),
    Failure(PredictionFailure),
}

impl PredictionOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        PredictionOutcome::Failure(PredictionFailure {
            message: message.into(),
            calculation_time: None,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PredictionOutcome::Success(_))
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            PredictionOutcome::Success(p) => Some(p),
            PredictionOutcome::Failure(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            PredictionOutcome::Success(_) => None,
            PredictionOutcome::Failure(f) => Some(&f.message),
        }
    }

    /// Shortcut for a populated attribute of a successful outcome.
    pub fn attribute(&self, attribute: GeoAttribute) -> Option<f64> {
        self.prediction().and_then(|p| p.attributes.get(attribute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_serializes_with_status_tag() {
        let outcome = PredictionOutcome::failure("PredictionRequest was non-defining");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "FAILURE");
        assert_eq!(json["message"], "PredictionRequest was non-defining");
        assert!(json.get("calculation_time").is_none());
        assert_eq!(outcome.attribute(GeoAttribute::TravelTime), None);
    }

    #[test]
    fn test_success_accessors() {
        let mut attributes = Attributes::new();
        attributes.insert(GeoAttribute::TravelTime, 15.2);
        let outcome = PredictionOutcome::Success(Prediction {
            attributes,
            ray_type: RayType::Refraction,
            model_name: "pdu202009Du.geotess".to_string(),
            engine_version: "3.2.1".to_string(),
        });

        assert!(outcome.is_success());
        assert_eq!(outcome.error_message(), None);
        assert_eq!(outcome.attribute(GeoAttribute::TravelTime), Some(15.2));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "SUCCESS");
        assert_eq!(json["ray_type"], "REFRACTION");
    }
}
