//! Where to find the engine library and model, and which cutoffs to apply.
//!
//! The library search order is data: `library_candidates` returns the full
//! ordered list so the tie-break policy can be checked in isolation.

use rstt_core::{ConfigError, Properties};
use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Canonical name of the engine's C shell library.
pub const LIBRARY_NAME: &str = "slbmCshell";

/// Install roots consulted in this order when the system search fails.
pub const ROOT_ENV_VARS: [&str; 4] = ["RSTT_ROOT", "RSTT_HOME", "SLBM_ROOT", "SLBM_HOME"];

/// Extension tried under a root when the platform one is absent.
pub const ALTERNATE_EXTENSION: &str = "jnilib";

pub const LIBRARY_PATH_KEY: &str = "slbmLibraryPath";
pub const MODEL_KEYS: [&str; 2] = ["slbmModel", "rsttModel"];
pub const MAX_DISTANCE_KEY: &str = "slbm_max_distance";
pub const MAX_DEPTH_KEY: &str = "slbm_max_depth";
pub const CH_MAX_KEY: &str = "slbm_ch_max";

/// Engine-wide limits, each independently optional.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineCutoffs {
    pub max_distance_radians: Option<f64>,
    pub max_depth_km: Option<f64>,
    pub ch_max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSearchConfig {
    pub explicit_library_path: Option<PathBuf>,
    pub model_path: PathBuf,
    pub cutoffs: EngineCutoffs,
}

impl EngineSearchConfig {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            explicit_library_path: None,
            model_path: model_path.into(),
            cutoffs: EngineCutoffs::default(),
        }
    }

    pub fn from_properties(properties: &Properties) -> Result<Self, ConfigError> {
        let (_, model) = properties
            .get_first(&MODEL_KEYS)
            .ok_or_else(|| ConfigError::missing(&MODEL_KEYS))?;

        let cutoffs = EngineCutoffs {
            max_distance_radians: properties
                .get_f64(MAX_DISTANCE_KEY)?
                .map(f64::to_radians),
            max_depth_km: properties.get_f64(MAX_DEPTH_KEY)?,
            ch_max: properties.get_f64(CH_MAX_KEY)?,
        };

        Ok(Self {
            explicit_library_path: properties.get_path(LIBRARY_PATH_KEY),
            model_path: PathBuf::from(model),
            cutoffs,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOrigin {
    Configured,
    SystemSearch,
    EnvRoot(&'static str),
}

impl CandidateOrigin {
    /// Candidates under an install root are only tried when the file exists.
    pub fn requires_existing_file(&self) -> bool {
        matches!(self, CandidateOrigin::EnvRoot(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryCandidate {
    pub origin: CandidateOrigin,
    pub path: PathBuf,
}

impl fmt::Display for LibraryCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            CandidateOrigin::Configured => write!(f, "{} ({})", self.path.display(), LIBRARY_PATH_KEY),
            CandidateOrigin::SystemSearch => {
                write!(f, "{} (system library search path)", self.path.display())
            }
            CandidateOrigin::EnvRoot(var) => write!(f, "{} (${})", self.path.display(), var),
        }
    }
}

/// Platform file name of the engine library, e.g. `libslbmCshell.so`.
pub fn library_file_name() -> String {
    format!("{}{}{}", DLL_PREFIX, LIBRARY_NAME, DLL_SUFFIX)
}

/// Split `libslbmCshell.so` into `("libslbmCshell", "so")`.
fn split_file_name(name: &str) -> (&str, &str) {
    match name.split_once('.') {
        Some((base, ext)) => (base, ext),
        None => (name, ""),
    }
}

/// Ordered library candidates for `explicit` and the environment seen
/// through `env`.
pub fn library_candidates(
    explicit: Option<&Path>,
    env: &dyn Fn(&str) -> Option<OsString>,
) -> Vec<LibraryCandidate> {
    let file_name = library_file_name();
    let (base, ext) = split_file_name(&file_name);

    let mut candidates = Vec::new();
    if let Some(path) = explicit {
        candidates.push(LibraryCandidate {
            origin: CandidateOrigin::Configured,
            path: path.to_path_buf(),
        });
    }
    candidates.push(LibraryCandidate {
        origin: CandidateOrigin::SystemSearch,
        path: PathBuf::from(&file_name),
    });

    for var in ROOT_ENV_VARS {
        let Some(root) = env(var) else { continue };
        let lib_dir = PathBuf::from(root).join("lib");
        let mut extensions = vec![ext];
        if ext != ALTERNATE_EXTENSION {
            extensions.push(ALTERNATE_EXTENSION);
        }
        for extension in extensions {
            candidates.push(LibraryCandidate {
                origin: CandidateOrigin::EnvRoot(var),
                path: lib_dir.join(format!("{}.{}", base, extension)),
            });
        }
    }
    candidates
}
