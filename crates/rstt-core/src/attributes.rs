//! Attribute identifiers and the attribute map carried by a prediction.
//!
//! `Attributes` never stores the NA sentinel: a key that is present always
//! holds a computed value, and callers that need a dense row ask for
//! `get_or_na`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Distinguished "not available" value used by persistence layers.
pub const NA_VALUE: f64 = -999999.0;

/// Returns true when `value` is usable as a populated attribute.
pub fn is_valid(value: f64) -> bool {
    value.is_finite() && value != NA_VALUE
}

macro_rules! geo_attributes {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Closed set of quantities a predictor can be asked for.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum GeoAttribute {
            $(
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl GeoAttribute {
            pub const ALL: &'static [GeoAttribute] = &[$(GeoAttribute::$variant),+];

            /// Canonical upper-snake name, e.g. `TT_BASEMODEL`.
            pub fn name(&self) -> &'static str {
                match self {
                    $(GeoAttribute::$variant => $name,)+
                }
            }
        }

        impl FromStr for GeoAttribute {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($name => Ok(GeoAttribute::$variant),)+
                    other => Err(format!("unknown attribute '{}'", other)),
                }
            }
        }
    };
}

geo_attributes! {
    TravelTime => "TRAVEL_TIME",
    TtBasemodel => "TT_BASEMODEL",
    TtModelUncertainty => "TT_MODEL_UNCERTAINTY",
    TtPathCorrection => "TT_PATH_CORRECTION",
    TtPathCorrDerivHorizontal => "TT_PATH_CORR_DERIV_HORIZONTAL",
    TtPathCorrDerivLat => "TT_PATH_CORR_DERIV_LAT",
    TtPathCorrDerivLon => "TT_PATH_CORR_DERIV_LON",
    TtPathCorrDerivRadial => "TT_PATH_CORR_DERIV_RADIAL",
    DttDlat => "DTT_DLAT",
    DttDlon => "DTT_DLON",
    DttDr => "DTT_DR",
    DttDtime => "DTT_DTIME",
    Azimuth => "AZIMUTH",
    AzimuthDegrees => "AZIMUTH_DEGREES",
    AzimuthBasemodel => "AZIMUTH_BASEMODEL",
    AzimuthModelUncertainty => "AZIMUTH_MODEL_UNCERTAINTY",
    AzimuthModelUncertaintyDegrees => "AZIMUTH_MODEL_UNCERTAINTY_DEGREES",
    AzimuthPathCorrDerivHorizontal => "AZIMUTH_PATH_CORR_DERIV_HORIZONTAL",
    AzimuthPathCorrDerivLat => "AZIMUTH_PATH_CORR_DERIV_LAT",
    AzimuthPathCorrDerivLon => "AZIMUTH_PATH_CORR_DERIV_LON",
    AzimuthPathCorrDerivRadial => "AZIMUTH_PATH_CORR_DERIV_RADIAL",
    DazDlat => "DAZ_DLAT",
    DazDlon => "DAZ_DLON",
    DazDr => "DAZ_DR",
    DazDtime => "DAZ_DTIME",
    Slowness => "SLOWNESS",
    SlownessDegrees => "SLOWNESS_DEGREES",
    SlownessBasemodel => "SLOWNESS_BASEMODEL",
    SlownessModelUncertainty => "SLOWNESS_MODEL_UNCERTAINTY",
    SlownessModelUncertaintyDegrees => "SLOWNESS_MODEL_UNCERTAINTY_DEGREES",
    SlownessPathCorrDerivHorizontal => "SLOWNESS_PATH_CORR_DERIV_HORIZONTAL",
    SlownessPathCorrDerivLat => "SLOWNESS_PATH_CORR_DERIV_LAT",
    SlownessPathCorrDerivLon => "SLOWNESS_PATH_CORR_DERIV_LON",
    SlownessPathCorrDerivRadial => "SLOWNESS_PATH_CORR_DERIV_RADIAL",
    Backazimuth => "BACKAZIMUTH",
    BackazimuthDegrees => "BACKAZIMUTH_DEGREES",
    OutOfPlane => "OUT_OF_PLANE",
    CalculationTime => "CALCULATION_TIME",
    Distance => "DISTANCE",
    DistanceDegrees => "DISTANCE_DEGREES",
}

impl GeoAttribute {
    /// The five attributes answered by an uncertainty model.
    pub const UNCERTAINTIES: [GeoAttribute; 5] = [
        GeoAttribute::TtModelUncertainty,
        GeoAttribute::AzimuthModelUncertainty,
        GeoAttribute::AzimuthModelUncertaintyDegrees,
        GeoAttribute::SlownessModelUncertainty,
        GeoAttribute::SlownessModelUncertaintyDegrees,
    ];

    pub fn is_uncertainty(&self) -> bool {
        Self::UNCERTAINTIES.contains(self)
    }
}

impl fmt::Display for GeoAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Populated attribute values of one prediction.
///
/// Deserialization drops NA and non-finite entries, as `insert` does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<GeoAttribute, f64>",
    into = "BTreeMap<GeoAttribute, f64>"
)]
pub struct Attributes {
    values: BTreeMap<GeoAttribute, f64>,
}

impl From<BTreeMap<GeoAttribute, f64>> for Attributes {
    fn from(mut values: BTreeMap<GeoAttribute, f64>) -> Self {
        values.retain(|_, value| is_valid(*value));
        Self { values }
    }
}

impl From<Attributes> for BTreeMap<GeoAttribute, f64> {
    fn from(attributes: Attributes) -> Self {
        attributes.values
    }
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` unless it is NA or not finite. Returns whether it was stored.
    pub fn insert(&mut self, attribute: GeoAttribute, value: f64) -> bool {
        if !is_valid(value) {
            return false;
        }
        self.values.insert(attribute, value);
        true
    }

    pub fn get(&self, attribute: GeoAttribute) -> Option<f64> {
        self.values.get(&attribute).copied()
    }

    /// Value for a dense record: unset entries read as `NA_VALUE`.
    pub fn get_or_na(&self, attribute: GeoAttribute) -> f64 {
        self.get(attribute).unwrap_or(NA_VALUE)
    }

    pub fn contains(&self, attribute: GeoAttribute) -> bool {
        self.values.contains_key(&attribute)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = GeoAttribute> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GeoAttribute, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}
