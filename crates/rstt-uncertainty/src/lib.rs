//! RSTT Uncertainty: model uncertainty of predicted attributes
//!
//! - `UncertaintyType`: which travel-time uncertainty model the engine answers with
//! - `AzShSource` / `AzShUncertaintyTable`: station/phase keyed azimuth and slowness uncertainty
//! - `heuristics`: fixed fallback values when no table entry applies
//! - `UncertaintyScales`: per-family linear adjustment
//! - `UncertaintyEstimator`: answers the five uncertainty attributes

pub mod error;
pub mod estimator;
pub mod heuristics;
pub mod scale;
pub mod selector;
pub mod table;

pub use error::UncertaintyError;
pub use estimator::UncertaintyEstimator;
pub use scale::{UncertaintyFamily, UncertaintyScale, UncertaintyScales};
pub use selector::{AzShSource, UncertaintyType, AZSH_FILE_KEYS, AZSH_FILE_NAME, TYPE_KEYS};
pub use table::{AzShEntry, AzShUncertaintyTable, WILDCARD};
