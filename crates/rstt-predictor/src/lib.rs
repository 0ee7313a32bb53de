//! RSTT Predictor: travel-time predictions from the regional engine
//!
//! Each request flows through three steps:
//!
//! ```text
//! PredictionRequest → validate ─rejected→ Failure(reason)
//!                        │
//!                    admitted
//!                        ↓
//!                 RayPath (one great circle) → derive_attributes → uncertainty pass
//!                        ↓
//!                 Success(attributes, REFRACTION) | Failure(engine diagnostic)
//! ```
//!
//! Rejections never reach the engine. Engine failures become per-request
//! failures; they never abort a batch.

pub mod assembler;
pub mod config;
pub mod deriver;
pub mod error;
pub mod messages;
pub mod validator;

pub use assembler::{SlbmPredictor, PREDICTOR_NAME, SUPPORTED_ATTRIBUTES, SUPPORTED_PHASES};
pub use config::{PredictorConfig, PREDICTIONS_PER_TASK_KEY};
pub use deriver::{derive_attributes, put, DeriveError, RayPath, RAY_TYPE};
pub use error::PredictorError;
pub use validator::{validate, Admission, NON_DEFINING_MESSAGE};
