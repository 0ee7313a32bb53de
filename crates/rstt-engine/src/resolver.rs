//! One-time engine resolution.
//!
//! `EngineResolver` walks the library candidates, loads the velocity model
//! and applies the cutoffs exactly once; every later `resolve` returns the
//! same `EngineHandle`. Concurrent first callers block until the winner
//! finishes. A failed attempt leaves the resolver empty so the caller may
//! retry with a corrected configuration.

use crate::engine::{EngineError, TravelTimeEngine};
use crate::native::NativeEngineFactory;
use crate::search::{
    library_candidates, library_file_name, EngineCutoffs, EngineSearchConfig, LibraryCandidate,
    LIBRARY_PATH_KEY, ROOT_ENV_VARS,
};
use once_cell::sync::{Lazy, OnceCell};
use std::ffi::OsString;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Turns a library candidate into a live engine.
pub trait EngineFactory: Send + Sync {
    fn open(&self, candidate: &LibraryCandidate) -> Result<Box<dyn TravelTimeEngine>, EngineError>;
}

/// The initialized engine shared by every predictor in the process.
pub struct EngineHandle {
    engine: Mutex<Box<dyn TravelTimeEngine>>,
    library: LibraryCandidate,
    model_path: PathBuf,
    version: String,
    cutoffs: EngineCutoffs,
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHandle")
            .field("library", &self.library)
            .field("model_path", &self.model_path)
            .field("version", &self.version)
            .field("cutoffs", &self.cutoffs)
            .finish()
    }
}

impl EngineHandle {
    /// Exclusive access to the engine until the session is dropped.
    pub fn session(&self) -> EngineSession<'_> {
        // A panic mid-prediction leaves no invariant behind that the next
        // great circle does not reset.
        let guard = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        EngineSession { guard }
    }

    /// Candidate the engine was loaded from.
    pub fn library(&self) -> &LibraryCandidate {
        &self.library
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// File name of the loaded velocity model.
    pub fn model_name(&self) -> String {
        self.model_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.model_path.display().to_string())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn cutoffs(&self) -> &EngineCutoffs {
        &self.cutoffs
    }
}

/// Single-owner access token for the engine. Holding it serializes
/// every great-circle context; it cannot be sent to another thread.
pub struct EngineSession<'a> {
    guard: MutexGuard<'a, Box<dyn TravelTimeEngine>>,
}

impl Deref for EngineSession<'_> {
    type Target = dyn TravelTimeEngine;

    fn deref(&self) -> &Self::Target {
        &**self.guard
    }
}

impl DerefMut for EngineSession<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut **self.guard
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<OsString> + Send + Sync>;

pub struct EngineResolver<F: EngineFactory = NativeEngineFactory> {
    factory: F,
    env: EnvLookup,
    cell: OnceCell<EngineHandle>,
}

impl EngineResolver<NativeEngineFactory> {
    pub fn new() -> Self {
        Self::with_factory(NativeEngineFactory)
    }
}

impl Default for EngineResolver<NativeEngineFactory> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: EngineFactory> EngineResolver<F> {
    pub fn with_factory(factory: F) -> Self {
        Self {
            factory,
            env: Box::new(|key: &str| std::env::var_os(key)),
            cell: OnceCell::new(),
        }
    }

    /// Replace the process environment as the source of install roots.
    pub fn with_env(
        mut self,
        env: impl Fn(&str) -> Option<OsString> + Send + Sync + 'static,
    ) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The engine handle, initializing it on first use. The configuration
    /// of the first successful call wins.
    pub fn resolve(&self, config: &EngineSearchConfig) -> Result<&EngineHandle, EngineError> {
        let handle = self.cell.get_or_try_init(|| self.initialize(config))?;
        if handle.model_path != config.model_path {
            tracing::warn!(
                loaded = %handle.model_path.display(),
                requested = %config.model_path.display(),
                "engine already initialized with a different model; keeping the loaded one"
            );
        }
        Ok(handle)
    }

    fn initialize(&self, config: &EngineSearchConfig) -> Result<EngineHandle, EngineError> {
        let (library, mut engine) = self.open_library(config)?;

        if !config.model_path.exists() {
            return Err(EngineError::ModelFileMissing(config.model_path.clone()));
        }
        engine
            .load_velocity_model(&config.model_path)
            .map_err(|e| match e {
                EngineError::ModelLoad { .. } => e,
                other => EngineError::ModelLoad {
                    path: config.model_path.clone(),
                    message: other.detail(),
                },
            })?;

        let cutoffs = config.cutoffs;
        if let Some(radians) = cutoffs.max_distance_radians {
            engine.set_max_distance(radians)?;
        }
        if let Some(km) = cutoffs.max_depth_km {
            engine.set_max_depth(km)?;
        }
        if let Some(ch_max) = cutoffs.ch_max {
            engine.set_ch_max(ch_max)?;
        }

        let version = engine.version();
        tracing::info!(
            library = %library,
            model = %config.model_path.display(),
            version = %version,
            "travel-time engine initialized"
        );

        Ok(EngineHandle {
            engine: Mutex::new(engine),
            library,
            model_path: config.model_path.clone(),
            version,
            cutoffs,
        })
    }

    fn open_library(
        &self,
        config: &EngineSearchConfig,
    ) -> Result<(LibraryCandidate, Box<dyn TravelTimeEngine>), EngineError> {
        let candidates = library_candidates(config.explicit_library_path.as_deref(), &*self.env);
        let mut searched = Vec::new();

        for candidate in candidates {
            if candidate.origin.requires_existing_file() && !candidate.path.is_file() {
                tracing::debug!(candidate = %candidate, "library candidate does not exist");
                searched.push(format!("{}: not found", candidate));
                continue;
            }
            match self.factory.open(&candidate) {
                Ok(engine) => return Ok((candidate, engine)),
                Err(e) => {
                    tracing::debug!(candidate = %candidate, error = %e, "library candidate rejected");
                    searched.push(format!("{}: {}", candidate, e));
                }
            }
        }

        for var in ROOT_ENV_VARS {
            if (self.env)(var).is_none() {
                searched.push(format!("${} is not set", var));
            }
        }

        Err(EngineError::LibraryNotFound {
            library: library_file_name(),
            searched,
        })
    }
}

static GLOBAL: Lazy<EngineResolver> = Lazy::new(EngineResolver::new);

/// Process-wide resolver backed by the native library.
pub fn global() -> &'static EngineResolver {
    &GLOBAL
}

pub fn resolve(config: &EngineSearchConfig) -> Result<&'static EngineHandle, EngineError> {
    global().resolve(config)
}

/// Resolve the process-wide engine or terminate with a diagnostic.
/// Only for binaries; libraries propagate `EngineError`.
pub fn resolve_or_exit(config: &EngineSearchConfig) -> &'static EngineHandle {
    match resolve(config) {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(error = %e, "travel-time engine initialization failed");
            eprintln!("{}", e);
            if matches!(e, EngineError::LibraryNotFound { .. }) {
                eprintln!(
                    "Set one of ${} to the RSTT install root, or set {} in the properties file.",
                    ROOT_ENV_VARS.join(", $"),
                    LIBRARY_PATH_KEY
                );
            }
            std::process::exit(1);
        }
    }
}
