//! `SlbmPredictor`: validation, derivation and uncertainty for each request.

use crate::config::PredictorConfig;
use crate::deriver::{derive_attributes, put, DeriveError, RayPath, RAY_TYPE};
use crate::error::PredictorError;
use crate::messages::failure_message;
use crate::validator::{validate, Admission};
use rstt_core::{
    Attributes, GeoAttribute, Phase, Prediction, PredictionFailure, PredictionOutcome,
    PredictionRequest,
};
use rstt_engine::{EngineHandle, TravelTimeEngine};
use rstt_uncertainty::{UncertaintyError, UncertaintyEstimator, UncertaintyType};
use std::time::Instant;

pub const PREDICTOR_NAME: &str = "slbm";

/// Phases the engine models, by engine name.
pub const SUPPORTED_PHASES: [&str; 4] = ["Pn", "Sn", "Pg", "Lg"];

pub const SUPPORTED_ATTRIBUTES: [GeoAttribute; 38] = [
    GeoAttribute::TravelTime,
    GeoAttribute::TtBasemodel,
    GeoAttribute::TtModelUncertainty,
    GeoAttribute::TtPathCorrection,
    GeoAttribute::TtPathCorrDerivHorizontal,
    GeoAttribute::TtPathCorrDerivLat,
    GeoAttribute::TtPathCorrDerivLon,
    GeoAttribute::TtPathCorrDerivRadial,
    GeoAttribute::DttDlat,
    GeoAttribute::DttDlon,
    GeoAttribute::DttDr,
    GeoAttribute::DttDtime,
    GeoAttribute::Azimuth,
    GeoAttribute::AzimuthDegrees,
    GeoAttribute::AzimuthModelUncertainty,
    GeoAttribute::AzimuthModelUncertaintyDegrees,
    GeoAttribute::AzimuthPathCorrDerivHorizontal,
    GeoAttribute::AzimuthPathCorrDerivLat,
    GeoAttribute::AzimuthPathCorrDerivLon,
    GeoAttribute::AzimuthPathCorrDerivRadial,
    GeoAttribute::DazDlat,
    GeoAttribute::DazDlon,
    GeoAttribute::DazDr,
    GeoAttribute::DazDtime,
    GeoAttribute::Slowness,
    GeoAttribute::SlownessDegrees,
    GeoAttribute::SlownessModelUncertainty,
    GeoAttribute::SlownessModelUncertaintyDegrees,
    GeoAttribute::SlownessPathCorrDerivHorizontal,
    GeoAttribute::SlownessPathCorrDerivLat,
    GeoAttribute::SlownessPathCorrDerivLon,
    GeoAttribute::SlownessPathCorrDerivRadial,
    GeoAttribute::Backazimuth,
    GeoAttribute::BackazimuthDegrees,
    GeoAttribute::OutOfPlane,
    GeoAttribute::CalculationTime,
    GeoAttribute::Distance,
    GeoAttribute::DistanceDegrees,
];

/// Predictor bound to an initialized engine.
///
/// Each `predict` holds the engine session for the duration of one
/// request; `predict_batch` holds it for a chunk of requests.
#[derive(Debug)]
pub struct SlbmPredictor<'h> {
    handle: &'h EngineHandle,
    estimator: UncertaintyEstimator,
    predictions_per_task: usize,
}

impl SlbmPredictor<'static> {
    /// Predictor on the process-wide engine, initializing it if needed.
    pub fn new(config: &PredictorConfig) -> Result<Self, PredictorError> {
        let handle = rstt_engine::resolve(&config.engine)?;
        Self::with_handle(handle, config)
    }
}

impl<'h> SlbmPredictor<'h> {
    pub fn with_handle(handle: &'h EngineHandle, config: &PredictorConfig) -> Result<Self, PredictorError> {
        let estimator = config.estimator()?;
        tracing::info!(
            model = %handle.model_name(),
            version = %handle.version(),
            uncertainty = %estimator.uncertainty_type(),
            "slbm predictor ready"
        );
        Ok(Self {
            handle,
            estimator,
            predictions_per_task: config.predictions_per_task.max(1),
        })
    }

    pub fn predictor_name(&self) -> &'static str {
        PREDICTOR_NAME
    }

    pub fn model_name(&self) -> String {
        self.handle.model_name()
    }

    pub fn engine_version(&self) -> &str {
        self.handle.version()
    }

    pub fn uncertainty_type(&self) -> UncertaintyType {
        self.estimator.uncertainty_type()
    }

    pub fn handle(&self) -> &'h EngineHandle {
        self.handle
    }

    /// Advisory: whether the engine can answer `attribute` for `phase`.
    /// `predict` does not enforce it.
    pub fn is_supported(&self, phase: &Phase, attribute: GeoAttribute) -> bool {
        SUPPORTED_PHASES.contains(&phase.engine_name()) && SUPPORTED_ATTRIBUTES.contains(&attribute)
    }

    pub fn predict(&self, request: &PredictionRequest) -> PredictionOutcome {
        if let Admission::Rejected(reason) = validate(request, self.handle.cutoffs()) {
            tracing::debug!(sta = %request.receiver.sta, phase = %request.phase, %reason, "request rejected");
            return PredictionOutcome::failure(reason);
        }
        let mut session = self.handle.session();
        self.predict_admitted(request, &mut *session)
    }

    /// Predict every request independently, in chunks sharing one engine
    /// session. Outcomes are in request order.
    pub fn predict_batch(&self, requests: &[PredictionRequest]) -> Vec<PredictionOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for chunk in requests.chunks(self.predictions_per_task) {
            let mut session = self.handle.session();
            for request in chunk {
                let outcome = match validate(request, self.handle.cutoffs()) {
                    Admission::Admitted => self.predict_admitted(request, &mut *session),
                    Admission::Rejected(reason) => {
                        tracing::debug!(sta = %request.receiver.sta, phase = %request.phase, %reason, "request rejected");
                        PredictionOutcome::failure(reason)
                    }
                };
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    fn predict_admitted(
        &self,
        request: &PredictionRequest,
        engine: &mut dyn TravelTimeEngine,
    ) -> PredictionOutcome {
        let started = Instant::now();
        let result = self.compute(request, engine);
        let calculation_time = request
            .requests(GeoAttribute::CalculationTime)
            .then(|| started.elapsed().as_secs_f64());

        match result {
            Ok(mut attributes) => {
                if let Some(seconds) = calculation_time {
                    attributes.insert(GeoAttribute::CalculationTime, seconds);
                }
                PredictionOutcome::Success(Prediction {
                    attributes,
                    ray_type: RAY_TYPE,
                    model_name: self.handle.model_name(),
                    engine_version: self.handle.version().to_string(),
                })
            }
            Err(message) => {
                tracing::warn!(
                    sta = %request.receiver.sta,
                    phase = %request.phase,
                    %message,
                    "prediction failed"
                );
                PredictionOutcome::Failure(PredictionFailure {
                    message,
                    calculation_time,
                })
            }
        }
    }

    /// Derived attributes plus the requested uncertainties, all on one
    /// great circle.
    fn compute(
        &self,
        request: &PredictionRequest,
        engine: &mut dyn TravelTimeEngine,
    ) -> Result<Attributes, String> {
        let mut ray = RayPath::open(engine, request).map_err(|e| failure_message(&e))?;
        let mut attributes = derive_attributes(request, &mut ray).map_err(|e| match e {
            DeriveError::Engine(engine_error) => failure_message(&engine_error),
            other => other.to_string(),
        })?;

        for attribute in request.requested_attributes.iter().filter(|a| a.is_uncertainty()) {
            let value = self
                .estimator
                .estimate(request, *attribute, ray.engine())
                .map_err(|e| match e {
                    UncertaintyError::Engine(engine_error) => failure_message(&engine_error),
                    other => other.to_string(),
                })?;
            put(&mut attributes, *attribute, value).map_err(|e| e.to_string())?;
        }
        Ok(attributes)
    }
}
