//! RSTT Engine: native engine resolution and access
//!
//! The native travel-time engine is loaded once per process. Resolution
//! walks an ordered list of library candidates (explicit path, system
//! search, then install roots named by environment variables), loads the
//! velocity model and applies the engine-wide cutoffs.
//!
//! ```text
//! EngineSearchConfig → EngineResolver ─(once)→ EngineHandle ─lock→ EngineSession
//!                           │                                         │
//!                      candidates                            TravelTimeEngine calls
//! ```
//!
//! The engine keeps one ray-path context and is not safe for interleaved
//! use. All access goes through `EngineSession`, a single-owner token that
//! cannot leave the thread that acquired it.

pub mod engine;
pub mod native;
pub mod resolver;
pub mod search;

#[cfg(any(test, feature = "scripted"))]
pub mod scripted;

pub use engine::{EngineError, TravelTimeEngine};
pub use native::{NativeEngine, NativeEngineFactory};
pub use resolver::{
    global, resolve, resolve_or_exit, EngineFactory, EngineHandle, EngineResolver, EngineSession,
};
pub use search::{
    library_candidates, library_file_name, CandidateOrigin, EngineCutoffs, EngineSearchConfig,
    LibraryCandidate, ALTERNATE_EXTENSION, LIBRARY_NAME, ROOT_ENV_VARS,
};
