//! Admission checks run before the engine is touched.

use rstt_core::PredictionRequest;
use rstt_engine::EngineCutoffs;

pub const NON_DEFINING_MESSAGE: &str = "PredictionRequest was non-defining";

#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Admitted,
    Rejected(String),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// First failing check wins: definingness, source depth, distance.
pub fn validate(request: &PredictionRequest, cutoffs: &EngineCutoffs) -> Admission {
    if !request.defining {
        return Admission::Rejected(NON_DEFINING_MESSAGE.to_string());
    }

    if let Some(max_depth) = cutoffs.max_depth_km {
        if request.source.depth >= max_depth {
            return Admission::Rejected(format!(
                "Source depth of {:.3} exceeds slbmMaxDepth {:.3}",
                request.source.depth, max_depth
            ));
        }
    }

    if let Some(max_distance) = cutoffs.max_distance_radians {
        let distance = request.distance();
        if distance >= max_distance {
            return Admission::Rejected(format!(
                "Source-receiver distance of {:.3} degrees exceeds slbmMaxDistance {:.3} degrees",
                distance.to_degrees(),
                max_distance.to_degrees()
            ));
        }
    }

    Admission::Admitted
}
