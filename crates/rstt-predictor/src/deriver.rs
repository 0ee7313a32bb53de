//! Attribute derivation from one engine great circle.

use rstt_core::geo::MIN_AZIMUTH_DISTANCE;
use rstt_core::{Attributes, GeoAttribute, PredictionRequest, RayType};
use rstt_engine::{EngineError, TravelTimeEngine};
use thiserror::Error;

/// The engine only models regional refracted arrivals.
pub const RAY_TYPE: RayType = RayType::Refraction;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeriveError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The engine answered with NA or a non-finite number.
    #[error("no valid value for {0}")]
    MissingValue(GeoAttribute),
}

/// Store `value` under `attribute`, failing when it is not usable.
pub fn put(
    attributes: &mut Attributes,
    attribute: GeoAttribute,
    value: f64,
) -> Result<(), DeriveError> {
    if attributes.insert(attribute, value) {
        Ok(())
    } else {
        Err(DeriveError::MissingValue(attribute))
    }
}

/// The engine's great-circle context for one request. Primitive
/// quantities are read at most once.
pub struct RayPath<'e> {
    engine: &'e mut dyn TravelTimeEngine,
    travel_time: Option<f64>,
    slowness: Option<f64>,
    dtt_dr: Option<f64>,
}

impl<'e> RayPath<'e> {
    /// Establish the context for `request`, handing the engine the
    /// normalized phase name.
    pub fn open(
        engine: &'e mut dyn TravelTimeEngine,
        request: &PredictionRequest,
    ) -> Result<Self, EngineError> {
        let source = &request.source;
        let receiver = &request.receiver.location;
        engine.create_great_circle(
            request.phase.engine_name(),
            source.lat,
            source.lon,
            source.depth,
            receiver.lat,
            receiver.lon,
            receiver.depth,
        )?;
        Ok(Self {
            engine,
            travel_time: None,
            slowness: None,
            dtt_dr: None,
        })
    }

    /// Seconds.
    pub fn travel_time(&mut self) -> Result<f64, EngineError> {
        if let Some(value) = self.travel_time {
            return Ok(value);
        }
        let value = self.engine.travel_time()?;
        self.travel_time = Some(value);
        Ok(value)
    }

    /// Seconds/radian.
    pub fn slowness(&mut self) -> Result<f64, EngineError> {
        if let Some(value) = self.slowness {
            return Ok(value);
        }
        let value = self.engine.slowness()?;
        self.slowness = Some(value);
        Ok(value)
    }

    /// Derivative with respect to radius, seconds/km (the engine reports
    /// the depth derivative).
    pub fn dtt_dr(&mut self) -> Result<f64, EngineError> {
        if let Some(value) = self.dtt_dr {
            return Ok(value);
        }
        let value = -self.engine.dtt_ddepth()?;
        self.dtt_dr = Some(value);
        Ok(value)
    }

    pub fn dtt_dlat(&mut self) -> Result<f64, EngineError> {
        self.engine.dtt_dlat()
    }

    pub fn dtt_dlon(&mut self) -> Result<f64, EngineError> {
        self.engine.dtt_dlon()
    }

    /// The engine, still positioned on this great circle.
    pub fn engine(&mut self) -> &mut dyn TravelTimeEngine {
        &mut *self.engine
    }
}

/// Attributes for `request`. `TT_BASEMODEL`, `DTT_DLAT` and `DTT_DLON` are
/// always present; everything else only when requested.
pub fn derive_attributes(
    request: &PredictionRequest,
    ray: &mut RayPath<'_>,
) -> Result<Attributes, DeriveError> {
    use GeoAttribute::*;

    let mut attributes = Attributes::new();
    let travel_time = ray.travel_time()?;
    put(&mut attributes, TtBasemodel, travel_time)?;
    put(&mut attributes, DttDlat, ray.dtt_dlat()?)?;
    put(&mut attributes, DttDlon, ray.dtt_dlon()?)?;

    let distance = request.distance();
    let back_azimuth = request.esaz().unwrap_or(0.0);

    if request.requests(Backazimuth) {
        put(&mut attributes, Backazimuth, back_azimuth)?;
    }
    if request.requests(BackazimuthDegrees) {
        put(&mut attributes, BackazimuthDegrees, back_azimuth.to_degrees())?;
    }
    if request.requests(Distance) {
        put(&mut attributes, Distance, distance)?;
    }
    if request.requests(DistanceDegrees) {
        put(&mut attributes, DistanceDegrees, distance.to_degrees())?;
    }
    if request.requests(OutOfPlane) {
        put(&mut attributes, OutOfPlane, 0.0)?;
    }
    if request.requests(TravelTime) {
        put(&mut attributes, TravelTime, travel_time)?;
    }
    if request.requests(DttDr) {
        put(&mut attributes, DttDr, ray.dtt_dr()?)?;
    }
    if request.requests(DttDtime) {
        put(&mut attributes, DttDtime, 1.0)?;
    }

    if request.requests(Slowness) || request.requests(SlownessDegrees) {
        let slowness = ray.slowness()?;
        put(&mut attributes, SlownessBasemodel, slowness)?;
        if request.requests(Slowness) {
            put(&mut attributes, Slowness, slowness)?;
        }
        if request.requests(SlownessDegrees) {
            // s/rad to s/deg
            put(&mut attributes, SlownessDegrees, slowness.to_radians())?;
        }
    }

    if request.requests(Azimuth) || request.requests(AzimuthDegrees) {
        let requested = if request.requests(Azimuth) { Azimuth } else { AzimuthDegrees };
        let azimuth = request.seaz().ok_or(DeriveError::MissingValue(requested))?;
        put(&mut attributes, AzimuthBasemodel, azimuth)?;
        if request.requests(Azimuth) {
            put(&mut attributes, Azimuth, azimuth)?;
        }
        if request.requests(AzimuthDegrees) {
            put(&mut attributes, AzimuthDegrees, azimuth.to_degrees())?;
        }
        if distance >= MIN_AZIMUTH_DISTANCE {
            if request.requests(DazDlat) {
                put(&mut attributes, DazDlat, back_azimuth.sin() / distance.sin())?;
            }
            if request.requests(DazDlon) {
                put(&mut attributes, DazDlon, -back_azimuth.cos() / distance.sin())?;
            }
        }
        if request.requests(DazDr) {
            put(&mut attributes, DazDr, 0.0)?;
        }
        if request.requests(DazDtime) {
            put(&mut attributes, DazDtime, 0.0)?;
        }
    }

    Ok(attributes)
}
