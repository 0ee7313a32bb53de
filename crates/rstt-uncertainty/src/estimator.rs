//! Model uncertainty of travel time, azimuth and slowness.

use crate::error::UncertaintyError;
use crate::heuristics;
use crate::scale::UncertaintyScales;
use crate::selector::{AzShSource, UncertaintyType};
use crate::table::AzShUncertaintyTable;
use rstt_core::{GeoAttribute, PredictionRequest, Properties};
use rstt_engine::{EngineError, TravelTimeEngine};

#[derive(Debug, Clone)]
pub struct UncertaintyEstimator {
    uncertainty_type: UncertaintyType,
    table: Option<AzShUncertaintyTable>,
    scales: UncertaintyScales,
}

impl UncertaintyEstimator {
    pub fn new(
        uncertainty_type: UncertaintyType,
        table: Option<AzShUncertaintyTable>,
        scales: UncertaintyScales,
    ) -> Self {
        Self {
            uncertainty_type,
            table,
            scales,
        }
    }

    /// Classify the type, load the azimuth/slowness table and read the
    /// scales. Any failure here means the deployment is unusable.
    pub fn from_properties(properties: &Properties) -> Result<Self, UncertaintyError> {
        let uncertainty_type = UncertaintyType::from_properties(properties)?;
        let table = AzShSource::from_properties(properties).load_table()?;
        let scales = UncertaintyScales::from_properties(properties)?;
        Ok(Self::new(uncertainty_type, table, scales))
    }

    pub fn uncertainty_type(&self) -> UncertaintyType {
        self.uncertainty_type
    }

    pub fn table(&self) -> Option<&AzShUncertaintyTable> {
        self.table.as_ref()
    }

    pub fn scales(&self) -> &UncertaintyScales {
        &self.scales
    }

    /// Uncertainty of `attribute` for `request`. The travel-time branch
    /// queries `engine`, whose current great circle must belong to `request`
    /// when the type is path dependent.
    pub fn estimate(
        &self,
        request: &PredictionRequest,
        attribute: GeoAttribute,
        engine: &mut dyn TravelTimeEngine,
    ) -> Result<f64, UncertaintyError> {
        match attribute {
            GeoAttribute::TtModelUncertainty => {
                let seconds = self.travel_time_uncertainty(request, engine)?;
                Ok(self.scales.travel_time.apply(seconds))
            }
            GeoAttribute::AzimuthModelUncertainty => {
                Ok(self.azimuth_uncertainty_deg(request).to_radians())
            }
            GeoAttribute::AzimuthModelUncertaintyDegrees => Ok(self.azimuth_uncertainty_deg(request)),
            // s/deg to s/rad
            GeoAttribute::SlownessModelUncertainty => {
                Ok(self.slowness_uncertainty_s_per_deg(request).to_degrees())
            }
            GeoAttribute::SlownessModelUncertaintyDegrees => {
                Ok(self.slowness_uncertainty_s_per_deg(request))
            }
            other => Err(UncertaintyError::UnsupportedAttribute { attribute: other }),
        }
    }

    fn travel_time_uncertainty(
        &self,
        request: &PredictionRequest,
        engine: &mut dyn TravelTimeEngine,
    ) -> Result<f64, EngineError> {
        if self.uncertainty_type.is_distance_dependent() {
            engine.travel_time_uncertainty(request.phase.as_str(), request.distance())
        } else {
            engine.travel_time_uncertainty_path(true)
        }
    }

    /// Scaled azimuth uncertainty, degrees.
    pub fn azimuth_uncertainty_deg(&self, request: &PredictionRequest) -> f64 {
        let raw = match self.lookup(request) {
            Some(entry) => entry.azimuth_deg,
            None => heuristics::azimuth_uncertainty_deg(
                request.receiver.is_array(),
                request.distance_degrees(),
            ),
        };
        self.scales.azimuth.apply(raw)
    }

    /// Scaled slowness uncertainty, seconds/degree.
    pub fn slowness_uncertainty_s_per_deg(&self, request: &PredictionRequest) -> f64 {
        let raw = match self.lookup(request) {
            Some(entry) => entry.slowness_s_per_deg,
            None => heuristics::slowness_uncertainty_s_per_deg(request.receiver.is_array()),
        };
        self.scales.slowness.apply(raw)
    }

    fn lookup(&self, request: &PredictionRequest) -> Option<crate::table::AzShEntry> {
        self.table
            .as_ref()
            .and_then(|t| t.lookup(&request.receiver.sta, request.phase.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstt_core::{Location, Receiver, StationType};
    use rstt_engine::scripted::{EngineCall, ScriptedEngine, ScriptedResponses};

    fn request(sta_type: StationType, distance_deg: f64, phase: &str) -> PredictionRequest {
        PredictionRequest::new(
            Location::from_degrees(0.0, 0.0, 10.0),
            Receiver::new("ABC", Location::from_degrees(distance_deg, 0.0, 0.0), sta_type),
            phase,
            [],
        )
    }

    fn estimator(uncertainty_type: UncertaintyType) -> UncertaintyEstimator {
        UncertaintyEstimator::new(
            uncertainty_type,
            Some(AzShUncertaintyTable::default()),
            UncertaintyScales::default(),
        )
    }

    #[test]
    fn test_azimuth_fallback_values() {
        let estimator = estimator(UncertaintyType::DistanceDependent);
        let mut engine = ScriptedEngine::new(ScriptedResponses::default());
        let attribute = GeoAttribute::AzimuthModelUncertaintyDegrees;

        let cases = [
            (StationType::SingleSensor, 50.0, 10.0),
            (StationType::SingleSensor, 150.0, 5.0),
            (StationType::Array, 10.0, 5.0),
        ];
        for (sta_type, distance, expected) in cases {
            let value = estimator
                .estimate(&request(sta_type, distance, "Pn"), attribute, &mut engine)
                .unwrap();
            assert!((value - expected).abs() < 1e-9, "{:?} at {}", sta_type, distance);
        }

        let radians = estimator
            .estimate(
                &request(StationType::SingleSensor, 50.0, "Pn"),
                GeoAttribute::AzimuthModelUncertainty,
                &mut engine,
            )
            .unwrap();
        assert!((radians - 10f64.to_radians()).abs() < 1e-12);
        assert!(engine.log().snapshot().is_empty());
    }

    #[test]
    fn test_slowness_units() {
        let estimator = estimator(UncertaintyType::PathDependent);
        let mut engine = ScriptedEngine::new(ScriptedResponses::default());
        let request = request(StationType::Array, 10.0, "Pn");

        let per_degree = estimator
            .estimate(&request, GeoAttribute::SlownessModelUncertaintyDegrees, &mut engine)
            .unwrap();
        assert_eq!(per_degree, 1.5);

        let per_radian = estimator
            .estimate(&request, GeoAttribute::SlownessModelUncertainty, &mut engine)
            .unwrap();
        assert!((per_radian - 1.5f64.to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn test_table_entry_preferred() {
        let table = AzShUncertaintyTable::parse("* * 0.31 2.1\nABC Pn 0.55 5.5\n", "records").unwrap();
        let estimator = UncertaintyEstimator::new(
            UncertaintyType::DistanceDependent,
            Some(table),
            UncertaintyScales::default(),
        );
        let mut engine = ScriptedEngine::new(ScriptedResponses::default());

        let az = estimator
            .estimate(
                &request(StationType::SingleSensor, 50.0, "Pn"),
                GeoAttribute::AzimuthModelUncertaintyDegrees,
                &mut engine,
            )
            .unwrap();
        assert_eq!(az, 5.5);

        let slo = estimator
            .estimate(
                &request(StationType::SingleSensor, 50.0, "Lg"),
                GeoAttribute::SlownessModelUncertaintyDegrees,
                &mut engine,
            )
            .unwrap();
        assert_eq!(slo, 0.31);
    }

    #[test]
    fn test_travel_time_distance_dependent() {
        let estimator = estimator(UncertaintyType::HierarchicalDistanceDependent);
        let mut engine = ScriptedEngine::new(ScriptedResponses::default());
        let request = request(StationType::SingleSensor, 5.0, "P");

        let value = estimator
            .estimate(&request, GeoAttribute::TtModelUncertainty, &mut engine)
            .unwrap();
        assert_eq!(value, ScriptedResponses::default().distance_uncertainty);

        let calls = engine.log().snapshot();
        match &calls[..] {
            [EngineCall::UncertaintyByDistance { phase, distance }] => {
                assert_eq!(phase, "P");
                assert!((distance - 5f64.to_radians()).abs() < 1e-9);
            }
            other => panic!("unexpected calls: {:?}", other),
        }
    }

    #[test]
    fn test_travel_time_path_dependent_uses_context() {
        let estimator = estimator(UncertaintyType::PathDependent);
        let mut engine = ScriptedEngine::new(ScriptedResponses::default());
        let request = request(StationType::SingleSensor, 5.0, "Pn");

        // no great circle yet
        let err = estimator
            .estimate(&request, GeoAttribute::TtModelUncertainty, &mut engine)
            .unwrap_err();
        assert!(matches!(err, UncertaintyError::Engine(_)));

        engine
            .create_great_circle("Pn", 0.0, 0.0, 10.0, 5f64.to_radians(), 0.0, 0.0)
            .unwrap();
        let value = estimator
            .estimate(&request, GeoAttribute::TtModelUncertainty, &mut engine)
            .unwrap();
        assert_eq!(value, ScriptedResponses::default().path_uncertainty);
        assert!(engine
            .log()
            .snapshot()
            .contains(&EngineCall::UncertaintyByPath(true)));
    }

    #[test]
    fn test_scales_applied_in_native_units() {
        let scales = UncertaintyScales {
            azimuth: crate::scale::UncertaintyScale {
                scale: 2.0,
                offset: 1.0,
            },
            ..Default::default()
        };
        let estimator = UncertaintyEstimator::new(UncertaintyType::DistanceDependent, None, scales);
        let mut engine = ScriptedEngine::new(ScriptedResponses::default());

        let radians = estimator
            .estimate(
                &request(StationType::SingleSensor, 50.0, "Pn"),
                GeoAttribute::AzimuthModelUncertainty,
                &mut engine,
            )
            .unwrap();
        assert!((radians - 21f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_unsupported_attribute() {
        let estimator = estimator(UncertaintyType::DistanceDependent);
        let mut engine = ScriptedEngine::new(ScriptedResponses::default());
        let err = estimator
            .estimate(
                &request(StationType::SingleSensor, 5.0, "Pn"),
                GeoAttribute::TravelTime,
                &mut engine,
            )
            .unwrap_err();
        assert!(err.to_string().contains("SLOWNESS_MODEL_UNCERTAINTY_DEGREES"));
    }
}
