//! End-to-end predictor tests against the scripted engine.
//!
//! ```text
//! PredictorConfig → EngineResolver<ScriptedFactory> → EngineHandle
//!                                                        ↓
//!                            SlbmPredictor::predict(request) → PredictionOutcome
//! ```

use rstt_core::{
    GeoAttribute, Location, Phase, NA_VALUE, PredictionOutcome, PredictionRequest, RayType, Receiver,
    StationType,
};
use rstt_engine::scripted::{EngineCall, ScriptedFactory, ScriptedResponses};
use rstt_engine::{EngineCutoffs, EngineResolver, EngineSearchConfig};
use rstt_predictor::{PredictorConfig, SlbmPredictor};
use rstt_uncertainty::UncertaintyType;
use std::ffi::OsString;
use tempfile::NamedTempFile;

struct Fixture {
    model: NamedTempFile,
    resolver: EngineResolver<ScriptedFactory>,
    config: PredictorConfig,
}

impl Fixture {
    fn new(responses: ScriptedResponses, cutoffs: EngineCutoffs) -> Self {
        Self::with_type(responses, cutoffs, UncertaintyType::DistanceDependent)
    }

    fn with_type(
        responses: ScriptedResponses,
        cutoffs: EngineCutoffs,
        uncertainty_type: UncertaintyType,
    ) -> Self {
        let model = NamedTempFile::new().unwrap();
        let mut engine = EngineSearchConfig::new(model.path());
        engine.cutoffs = cutoffs;
        let config = PredictorConfig::new(engine, uncertainty_type);
        let resolver = EngineResolver::with_factory(ScriptedFactory::new(responses))
            .with_env(|_: &str| None::<OsString>);
        Self {
            model,
            resolver,
            config,
        }
    }

    fn predictor(&self) -> SlbmPredictor<'_> {
        let handle = self.resolver.resolve(&self.config.engine).unwrap();
        SlbmPredictor::with_handle(handle, &self.config).unwrap()
    }

    fn great_circles(&self) -> Vec<String> {
        self.resolver
            .factory()
            .log()
            .snapshot()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::CreateGreatCircle { phase, .. } => Some(phase),
                _ => None,
            })
            .collect()
    }
}

fn request(phase: &str, depth: f64, distance_deg: f64, attributes: &[GeoAttribute]) -> PredictionRequest {
    PredictionRequest::new(
        Location::from_degrees(0.0, 0.0, depth),
        Receiver::new(
            "ABC",
            Location::from_degrees(distance_deg, 0.0, 0.0),
            StationType::SingleSensor,
        ),
        phase,
        attributes.iter().copied(),
    )
}

// =============================================================================
// Admission
// =============================================================================

#[test]
fn test_non_defining_never_reaches_engine() {
    let fixture = Fixture::new(ScriptedResponses::default(), EngineCutoffs::default());
    let predictor = fixture.predictor();

    let outcome = predictor.predict(&request("P", 10.0, 1.0, &[GeoAttribute::TravelTime]).non_defining());
    assert!(!outcome.is_success());
    assert!(outcome.error_message().unwrap().contains("non-defining"));
    assert!(fixture.great_circles().is_empty());
}

#[test]
fn test_depth_over_bound() {
    let cutoffs = EngineCutoffs {
        max_depth_km: Some(5.0),
        ..Default::default()
    };
    let fixture = Fixture::new(ScriptedResponses::default(), cutoffs);
    let predictor = fixture.predictor();

    let outcome = predictor.predict(&request("P", 10.0, 1.0, &[GeoAttribute::TravelTime]));
    assert_eq!(
        outcome.error_message(),
        Some("Source depth of 10.000 exceeds slbmMaxDepth 5.000")
    );
    assert!(fixture.great_circles().is_empty());
}

#[test]
fn test_distance_over_bound() {
    let cutoffs = EngineCutoffs {
        max_distance_radians: Some(10f64.to_radians()),
        ..Default::default()
    };
    let fixture = Fixture::new(ScriptedResponses::default(), cutoffs);
    let predictor = fixture.predictor();

    let outcome = predictor.predict(&request("Pn", 10.0, 12.0, &[GeoAttribute::TravelTime]));
    let message = outcome.error_message().unwrap();
    assert!(message.contains("12.000 degrees"), "{}", message);
    assert!(message.contains("10.000 degrees"), "{}", message);
}

// =============================================================================
// Derivation
// =============================================================================

#[test]
fn test_compressional_phase_scenario() {
    let responses = ScriptedResponses::default();
    let fixture = Fixture::new(responses.clone(), EngineCutoffs::default());
    let predictor = fixture.predictor();

    let outcome = predictor.predict(&request("P", 10.0, 1.0, &[GeoAttribute::TravelTime]));
    let prediction = outcome.prediction().unwrap();

    assert_eq!(fixture.great_circles(), vec!["Pn".to_string()]);
    assert_eq!(prediction.ray_type, RayType::Refraction);
    assert_eq!(prediction.attributes.get(GeoAttribute::TtBasemodel), Some(responses.travel_time));
    assert_eq!(prediction.attributes.get(GeoAttribute::TravelTime), Some(responses.travel_time));
    assert_eq!(prediction.attributes.get(GeoAttribute::DttDlat), Some(responses.dtt_dlat));
    assert_eq!(prediction.attributes.get(GeoAttribute::DttDlon), Some(responses.dtt_dlon));
    assert!(!prediction.attributes.contains(GeoAttribute::Slowness));
    assert!(!prediction.attributes.contains(GeoAttribute::Azimuth));
    assert_eq!(prediction.engine_version, responses.version);
    assert_eq!(
        prediction.model_name,
        fixture.model.path().file_name().unwrap().to_string_lossy()
    );
}

#[test]
fn test_engine_failure_becomes_outcome() {
    let responses = ScriptedResponses {
        fail_great_circle: Some(
            "GreatCircle.cc line 88: Source-receiver separation exceeds maximum value".to_string(),
        ),
        ..Default::default()
    };
    let fixture = Fixture::new(responses, EngineCutoffs::default());
    let predictor = fixture.predictor();

    let outcome = predictor.predict(&request(
        "Pn",
        10.0,
        1.0,
        &[GeoAttribute::TravelTime, GeoAttribute::CalculationTime],
    ));
    match outcome {
        PredictionOutcome::Failure(failure) => {
            assert_eq!(failure.message, "Source-receiver separation exceeds maximum value");
            assert!(failure.calculation_time.unwrap() >= 0.0);
        }
        PredictionOutcome::Success(_) => panic!("expected failure"),
    }
}

#[test]
fn test_non_finite_travel_time_is_a_failure() {
    let responses = ScriptedResponses {
        travel_time: f64::NAN,
        ..Default::default()
    };
    let fixture = Fixture::new(responses, EngineCutoffs::default());
    let predictor = fixture.predictor();

    let outcome = predictor.predict(&request("Pn", 10.0, 1.0, &[GeoAttribute::TravelTime]));
    assert!(!outcome.is_success());
    assert_eq!(outcome.error_message(), Some("no valid value for TT_BASEMODEL"));
}

#[test]
fn test_calculation_time_only_when_requested() {
    let fixture = Fixture::new(ScriptedResponses::default(), EngineCutoffs::default());
    let predictor = fixture.predictor();

    let timed = predictor.predict(&request(
        "Pn",
        10.0,
        1.0,
        &[GeoAttribute::TravelTime, GeoAttribute::CalculationTime],
    ));
    assert!(timed.attribute(GeoAttribute::CalculationTime).unwrap() >= 0.0);

    let untimed = predictor.predict(&request("Pn", 10.0, 1.0, &[GeoAttribute::TravelTime]));
    assert_eq!(untimed.attribute(GeoAttribute::CalculationTime), None);
}

// =============================================================================
// Uncertainty
// =============================================================================

#[test]
fn test_distance_dependent_travel_time_uncertainty() {
    let responses = ScriptedResponses::default();
    let fixture = Fixture::new(responses.clone(), EngineCutoffs::default());
    let predictor = fixture.predictor();

    let outcome = predictor.predict(&request(
        "P",
        10.0,
        3.0,
        &[GeoAttribute::TravelTime, GeoAttribute::TtModelUncertainty],
    ));
    assert_eq!(
        outcome.attribute(GeoAttribute::TtModelUncertainty),
        Some(responses.distance_uncertainty)
    );

    let log = fixture.resolver.factory().log().snapshot();
    let by_distance = log.iter().find_map(|call| match call {
        EngineCall::UncertaintyByDistance { phase, distance } => Some((phase.clone(), *distance)),
        _ => None,
    });
    let (phase, distance) = by_distance.unwrap();
    assert_eq!(phase, "P");
    assert!((distance - 3f64.to_radians()).abs() < 1e-9);
}

#[test]
fn test_na_uncertainty_is_a_failure() {
    let responses = ScriptedResponses {
        distance_uncertainty: NA_VALUE,
        ..Default::default()
    };
    let fixture = Fixture::new(responses, EngineCutoffs::default());
    let predictor = fixture.predictor();

    let outcome = predictor.predict(&request(
        "Pn",
        10.0,
        3.0,
        &[GeoAttribute::TravelTime, GeoAttribute::TtModelUncertainty],
    ));
    assert!(!outcome.is_success());
    assert_eq!(
        outcome.error_message(),
        Some("no valid value for TT_MODEL_UNCERTAINTY")
    );
}

#[test]
fn test_path_dependent_uncertainty_follows_great_circle() {
    let responses = ScriptedResponses::default();
    let fixture = Fixture::with_type(
        responses.clone(),
        EngineCutoffs::default(),
        UncertaintyType::PathDependent,
    );
    let predictor = fixture.predictor();

    let outcome = predictor.predict(&request(
        "Lg",
        10.0,
        3.0,
        &[GeoAttribute::TtModelUncertainty, GeoAttribute::AzimuthModelUncertaintyDegrees],
    ));
    assert_eq!(
        outcome.attribute(GeoAttribute::TtModelUncertainty),
        Some(responses.path_uncertainty)
    );
    assert_eq!(outcome.attribute(GeoAttribute::AzimuthModelUncertaintyDegrees), Some(20.0));

    let log = fixture.resolver.factory().log().snapshot();
    let circle = log
        .iter()
        .position(|c| matches!(c, EngineCall::CreateGreatCircle { .. }))
        .unwrap();
    let path = log
        .iter()
        .position(|c| *c == EngineCall::UncertaintyByPath(true))
        .unwrap();
    assert!(circle < path);
}

// =============================================================================
// Batch
// =============================================================================

#[test]
fn test_batch_requests_are_independent() {
    let mut fixture = Fixture::new(ScriptedResponses::default(), EngineCutoffs::default());
    fixture.config.predictions_per_task = 2;
    let predictor = fixture.predictor();

    let requests = vec![
        request("Pn", 10.0, 1.0, &[GeoAttribute::TravelTime]),
        request("Pn", 10.0, 1.0, &[GeoAttribute::TravelTime]).non_defining(),
        request("Sn", 15.0, 4.0, &[GeoAttribute::TravelTime]),
    ];
    let outcomes = predictor.predict_batch(&requests);

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_success());
    assert!(outcomes[1].error_message().unwrap().contains("non-defining"));
    assert!(outcomes[2].is_success());
    assert_eq!(fixture.great_circles(), vec!["Pn".to_string(), "Sn".to_string()]);
}

// =============================================================================
// Surface
// =============================================================================

#[test]
fn test_predictor_surface() {
    let fixture = Fixture::new(ScriptedResponses::default(), EngineCutoffs::default());
    let predictor = fixture.predictor();

    assert_eq!(predictor.predictor_name(), "slbm");
    assert_eq!(predictor.engine_version(), "3.2.1");
    assert_eq!(predictor.uncertainty_type(), UncertaintyType::DistanceDependent);
    assert!(predictor.is_supported(&Phase::new("P"), GeoAttribute::TravelTime));
    assert!(predictor.is_supported(&Phase::new("Lg"), GeoAttribute::SlownessModelUncertainty));
    assert!(!predictor.is_supported(&Phase::new("PKP"), GeoAttribute::TravelTime));
    assert!(!predictor.is_supported(&Phase::new("Pn"), GeoAttribute::AzimuthBasemodel));
}

#[test]
fn test_outcome_json() {
    let fixture = Fixture::new(ScriptedResponses::default(), EngineCutoffs::default());
    let predictor = fixture.predictor();

    let outcome = predictor.predict(&request("Pn", 10.0, 1.0, &[GeoAttribute::TravelTime]));
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "SUCCESS");
    assert_eq!(json["ray_type"], "REFRACTION");
    assert!(json["attributes"]["TT_BASEMODEL"].is_number());
}
