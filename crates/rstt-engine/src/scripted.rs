//! In-memory engine with fixed answers that records every call it receives.
//!
//! Enabled for this crate's tests and, through the `scripted` feature, for
//! the tests of crates that drive an engine.

use crate::engine::{EngineError, TravelTimeEngine};
use crate::resolver::EngineFactory;
use crate::search::LibraryCandidate;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    LoadVelocityModel(PathBuf),
    SetMaxDistance(f64),
    SetMaxDepth(f64),
    SetChMax(f64),
    CreateGreatCircle {
        phase: String,
        source: [f64; 3],
        receiver: [f64; 3],
    },
    TravelTime,
    Slowness,
    DttDdepth,
    DttDlat,
    DttDlon,
    UncertaintyByDistance { phase: String, distance: f64 },
    UncertaintyByPath(bool),
}

#[derive(Debug, Clone)]
pub struct ScriptedResponses {
    pub travel_time: f64,
    /// seconds/radian
    pub slowness: f64,
    pub dtt_ddepth: f64,
    pub dtt_dlat: f64,
    pub dtt_dlon: f64,
    pub distance_uncertainty: f64,
    pub path_uncertainty: f64,
    pub version: String,
    /// Error message returned by every `create_great_circle`
    pub fail_great_circle: Option<String>,
    pub fail_model_load: Option<String>,
}

impl Default for ScriptedResponses {
    fn default() -> Self {
        Self {
            travel_time: 62.5,
            slowness: 785.0,
            dtt_ddepth: -0.12,
            dtt_dlat: 410.0,
            dtt_dlon: -225.0,
            distance_uncertainty: 1.4,
            path_uncertainty: 0.9,
            version: "3.2.1".to_string(),
            fail_great_circle: None,
            fail_model_load: None,
        }
    }
}

/// Shared, append-only record of engine calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<EngineCall>>>);

impl CallLog {
    fn push(&self, call: EngineCall) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    pub fn snapshot(&self) -> Vec<EngineCall> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| pred(c))
            .count()
    }
}

#[derive(Debug)]
pub struct ScriptedEngine {
    responses: ScriptedResponses,
    log: CallLog,
    has_great_circle: bool,
}

impl ScriptedEngine {
    pub fn new(responses: ScriptedResponses) -> Self {
        Self::with_log(responses, CallLog::default())
    }

    pub fn with_log(responses: ScriptedResponses, log: CallLog) -> Self {
        Self {
            responses,
            log,
            has_great_circle: false,
        }
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    fn query(&mut self, call: EngineCall, name: &'static str, value: f64) -> Result<f64, EngineError> {
        self.log.push(call);
        if self.has_great_circle {
            Ok(value)
        } else {
            Err(EngineError::call(name, "no great circle has been created"))
        }
    }
}

impl TravelTimeEngine for ScriptedEngine {
    fn load_velocity_model(&mut self, path: &Path) -> Result<(), EngineError> {
        self.log.push(EngineCall::LoadVelocityModel(path.to_path_buf()));
        match &self.responses.fail_model_load {
            Some(message) => Err(EngineError::ModelLoad {
                path: path.to_path_buf(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn set_max_distance(&mut self, radians: f64) -> Result<(), EngineError> {
        self.log.push(EngineCall::SetMaxDistance(radians));
        Ok(())
    }

    fn set_max_depth(&mut self, km: f64) -> Result<(), EngineError> {
        self.log.push(EngineCall::SetMaxDepth(km));
        Ok(())
    }

    fn set_ch_max(&mut self, ch_max: f64) -> Result<(), EngineError> {
        self.log.push(EngineCall::SetChMax(ch_max));
        Ok(())
    }

    fn create_great_circle(
        &mut self,
        phase: &str,
        src_lat: f64,
        src_lon: f64,
        src_depth: f64,
        rcv_lat: f64,
        rcv_lon: f64,
        rcv_depth: f64,
    ) -> Result<(), EngineError> {
        self.log.push(EngineCall::CreateGreatCircle {
            phase: phase.to_string(),
            source: [src_lat, src_lon, src_depth],
            receiver: [rcv_lat, rcv_lon, rcv_depth],
        });
        match &self.responses.fail_great_circle {
            Some(message) => {
                self.has_great_circle = false;
                Err(EngineError::call("createGreatCircle", message.clone()))
            }
            None => {
                self.has_great_circle = true;
                Ok(())
            }
        }
    }

    fn travel_time(&mut self) -> Result<f64, EngineError> {
        let value = self.responses.travel_time;
        self.query(EngineCall::TravelTime, "getTravelTime", value)
    }

    fn slowness(&mut self) -> Result<f64, EngineError> {
        let value = self.responses.slowness;
        self.query(EngineCall::Slowness, "getSlowness", value)
    }

    fn dtt_ddepth(&mut self) -> Result<f64, EngineError> {
        let value = self.responses.dtt_ddepth;
        self.query(EngineCall::DttDdepth, "get_dtt_ddepth", value)
    }

    fn dtt_dlat(&mut self) -> Result<f64, EngineError> {
        let value = self.responses.dtt_dlat;
        self.query(EngineCall::DttDlat, "get_dtt_dlat", value)
    }

    fn dtt_dlon(&mut self) -> Result<f64, EngineError> {
        let value = self.responses.dtt_dlon;
        self.query(EngineCall::DttDlon, "get_dtt_dlon", value)
    }

    fn travel_time_uncertainty(&mut self, phase: &str, distance: f64) -> Result<f64, EngineError> {
        self.log.push(EngineCall::UncertaintyByDistance {
            phase: phase.to_string(),
            distance,
        });
        Ok(self.responses.distance_uncertainty)
    }

    fn travel_time_uncertainty_path(&mut self, use_path: bool) -> Result<f64, EngineError> {
        let value = self.responses.path_uncertainty;
        self.query(
            EngineCall::UncertaintyByPath(use_path),
            "getTravelTimeUncertainty",
            value,
        )
    }

    fn version(&self) -> String {
        self.responses.version.clone()
    }
}

/// Factory handing out `ScriptedEngine`s that share one call log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFactory {
    responses: ScriptedResponses,
    loadable: Option<Vec<PathBuf>>,
    opens: Arc<AtomicUsize>,
    log: CallLog,
}

impl ScriptedFactory {
    pub fn new(responses: ScriptedResponses) -> Self {
        Self {
            responses,
            ..Default::default()
        }
    }

    /// Only candidates at these paths open; every other one fails.
    pub fn loadable_only<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.loadable = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// Number of engines created so far.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }
}

impl EngineFactory for ScriptedFactory {
    fn open(&self, candidate: &LibraryCandidate) -> Result<Box<dyn TravelTimeEngine>, EngineError> {
        if let Some(loadable) = &self.loadable {
            if !loadable.contains(&candidate.path) {
                return Err(EngineError::LibraryOpen {
                    path: candidate.path.clone(),
                    message: "cannot open shared object file".to_string(),
                });
            }
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedEngine::with_log(
            self.responses.clone(),
            self.log.clone(),
        )))
    }
}
