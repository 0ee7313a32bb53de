//! Binding to the RSTT C shell library through `libloading`.
//!
//! Every `slbm_shell_*` entry point returns 0 on success; on failure the
//! engine's last error message is fetched with `slbm_shell_getErrorMessage`.

use crate::engine::{EngineError, TravelTimeEngine};
use crate::resolver::EngineFactory;
use crate::search::LibraryCandidate;
use libloading::Library;
use std::ffi::{c_char, c_int, CStr, CString};
use std::path::{Path, PathBuf};

type StatusFn = unsafe extern "C" fn() -> c_int;
type LoadModelFn = unsafe extern "C" fn(*const c_char) -> c_int;
type GreatCircleFn =
    unsafe extern "C" fn(*const c_char, f64, f64, f64, f64, f64, f64) -> c_int;
type GetFn = unsafe extern "C" fn(*mut f64) -> c_int;
type SetFn = unsafe extern "C" fn(*const f64) -> c_int;
type PhaseDistanceUncertaintyFn = unsafe extern "C" fn(*const c_char, f64, *mut f64) -> c_int;
type PathUncertaintyFn = unsafe extern "C" fn(c_int, *mut f64) -> c_int;
type TextFn = unsafe extern "C" fn(*mut c_char, c_int);

const TEXT_BUFFER_LEN: usize = 2048;

/// Function pointers resolved from the library. Valid while the owning
/// `NativeEngine` keeps its `Library` open.
struct ShellApi {
    create: StatusFn,
    load_velocity_model: LoadModelFn,
    create_great_circle: GreatCircleFn,
    get_travel_time: GetFn,
    get_slowness: GetFn,
    get_dtt_ddepth: GetFn,
    get_dtt_dlat: GetFn,
    get_dtt_dlon: GetFn,
    get_tt_uncertainty_phase_distance: PhaseDistanceUncertaintyFn,
    get_tt_uncertainty_path: PathUncertaintyFn,
    set_max_distance: SetFn,
    set_max_depth: SetFn,
    set_ch_max: SetFn,
    get_version: TextFn,
    get_error_message: TextFn,
}

impl ShellApi {
    fn resolve(library: &Library, path: &Path) -> Result<Self, EngineError> {
        Ok(Self {
            create: symbol(library, path, "slbm_shell_create")?,
            load_velocity_model: symbol(library, path, "slbm_shell_loadVelocityModel")?,
            create_great_circle: symbol(library, path, "slbm_shell_createGreatCircle")?,
            get_travel_time: symbol(library, path, "slbm_shell_getTravelTime")?,
            get_slowness: symbol(library, path, "slbm_shell_getSlowness")?,
            get_dtt_ddepth: symbol(library, path, "slbm_shell_get_dtt_ddepth")?,
            get_dtt_dlat: symbol(library, path, "slbm_shell_get_dtt_dlat")?,
            get_dtt_dlon: symbol(library, path, "slbm_shell_get_dtt_dlon")?,
            get_tt_uncertainty_phase_distance: symbol(
                library,
                path,
                "slbm_shell_getTravelTimeUncertaintyPhaseDistance",
            )?,
            get_tt_uncertainty_path: symbol(library, path, "slbm_shell_getTravelTimeUncertainty")?,
            set_max_distance: symbol(library, path, "slbm_shell_setMaxDistance")?,
            set_max_depth: symbol(library, path, "slbm_shell_setMaxDepth")?,
            set_ch_max: symbol(library, path, "slbm_shell_setCHMax")?,
            get_version: symbol(library, path, "slbm_shell_getVersion")?,
            get_error_message: symbol(library, path, "slbm_shell_getErrorMessage")?,
        })
    }
}

fn symbol<T: Copy>(library: &Library, path: &Path, name: &str) -> Result<T, EngineError> {
    // SAFETY: `T` is the C shell's documented signature for `name`; the
    // copied pointer is only called while `library` stays loaded.
    unsafe {
        library
            .get::<T>(name.as_bytes())
            .map(|s| *s)
            .map_err(|e| EngineError::MissingSymbol {
                path: path.to_path_buf(),
                symbol: name.to_string(),
                message: e.to_string(),
            })
    }
}

/// The engine as exposed by the native C shell library.
pub struct NativeEngine {
    path: PathBuf,
    api: ShellApi,
    _library: Library,
}

impl std::fmt::Debug for NativeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeEngine").field("path", &self.path).finish()
    }
}

impl NativeEngine {
    /// Open the library at `path` (a bare file name uses the system search
    /// path) and create the engine instance.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        // SAFETY: loading the library runs its initializers; the RSTT C
        // shell has no load-time side effects beyond static setup.
        let library = unsafe { Library::new(path) }.map_err(|e| EngineError::LibraryOpen {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let api = ShellApi::resolve(&library, path)?;
        let engine = Self {
            path: path.to_path_buf(),
            api,
            _library: library,
        };
        // SAFETY: no arguments; creates the shell's engine instance.
        let status = unsafe { (engine.api.create)() };
        engine.check("slbm_shell_create", status)?;
        Ok(engine)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_text(&self, f: TextFn) -> String {
        let mut buffer = vec![0u8; TEXT_BUFFER_LEN];
        // SAFETY: the buffer is writable for TEXT_BUFFER_LEN bytes and the
        // shell writes a NUL-terminated string no longer than that.
        unsafe { f(buffer.as_mut_ptr() as *mut c_char, TEXT_BUFFER_LEN as c_int) };
        CStr::from_bytes_until_nul(&buffer)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&buffer).into_owned())
    }

    fn check(&self, call: &'static str, status: c_int) -> Result<(), EngineError> {
        if status == 0 {
            Ok(())
        } else {
            Err(EngineError::call(call, self.read_text(self.api.get_error_message)))
        }
    }

    fn get(&self, call: &'static str, f: GetFn) -> Result<f64, EngineError> {
        let mut value = 0.0;
        // SAFETY: `value` is a valid out-pointer for the duration of the call.
        let status = unsafe { f(&mut value) };
        self.check(call, status)?;
        Ok(value)
    }

    fn set(&self, call: &'static str, f: SetFn, value: f64) -> Result<(), EngineError> {
        // SAFETY: `value` outlives the call and is only read.
        let status = unsafe { f(&value) };
        self.check(call, status)
    }
}

fn c_string(call: &'static str, text: &str) -> Result<CString, EngineError> {
    CString::new(text).map_err(|_| EngineError::call(call, format!("'{}' contains a NUL byte", text)))
}

impl TravelTimeEngine for NativeEngine {
    fn load_velocity_model(&mut self, path: &Path) -> Result<(), EngineError> {
        let text = path.to_str().ok_or_else(|| EngineError::ModelLoad {
            path: path.to_path_buf(),
            message: "path is not valid UTF-8".to_string(),
        })?;
        let c_path = c_string("slbm_shell_loadVelocityModel", text)?;
        // SAFETY: `c_path` is NUL-terminated and outlives the call.
        let status = unsafe { (self.api.load_velocity_model)(c_path.as_ptr()) };
        self.check("slbm_shell_loadVelocityModel", status)
            .map_err(|e| EngineError::ModelLoad {
                path: path.to_path_buf(),
                message: e.detail(),
            })
    }

    fn set_max_distance(&mut self, radians: f64) -> Result<(), EngineError> {
        self.set("slbm_shell_setMaxDistance", self.api.set_max_distance, radians)
    }

    fn set_max_depth(&mut self, km: f64) -> Result<(), EngineError> {
        self.set("slbm_shell_setMaxDepth", self.api.set_max_depth, km)
    }

    fn set_ch_max(&mut self, ch_max: f64) -> Result<(), EngineError> {
        self.set("slbm_shell_setCHMax", self.api.set_ch_max, ch_max)
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
        let c_phase = c_string("slbm_shell_createGreatCircle", phase)?;
        // SAFETY: `c_phase` is NUL-terminated and outlives the call.
        let status = unsafe {
            (self.api.create_great_circle)(
                c_phase.as_ptr(),
                src_lat,
                src_lon,
                src_depth,
                rcv_lat,
                rcv_lon,
                rcv_depth,
            )
        };
        self.check("slbm_shell_createGreatCircle", status)
    }

    fn travel_time(&mut self) -> Result<f64, EngineError> {
        self.get("slbm_shell_getTravelTime", self.api.get_travel_time)
    }

    fn slowness(&mut self) -> Result<f64, EngineError> {
        self.get("slbm_shell_getSlowness", self.api.get_slowness)
    }

    fn dtt_ddepth(&mut self) -> Result<f64, EngineError> {
        self.get("slbm_shell_get_dtt_ddepth", self.api.get_dtt_ddepth)
    }

    fn dtt_dlat(&mut self) -> Result<f64, EngineError> {
        self.get("slbm_shell_get_dtt_dlat", self.api.get_dtt_dlat)
    }

    fn dtt_dlon(&mut self) -> Result<f64, EngineError> {
        self.get("slbm_shell_get_dtt_dlon", self.api.get_dtt_dlon)
    }

    fn travel_time_uncertainty(&mut self, phase: &str, distance: f64) -> Result<f64, EngineError> {
        let call = "slbm_shell_getTravelTimeUncertaintyPhaseDistance";
        let c_phase = c_string(call, phase)?;
        let mut value = 0.0;
        // SAFETY: `c_phase` and `value` are valid for the duration of the call.
        let status = unsafe {
            (self.api.get_tt_uncertainty_phase_distance)(c_phase.as_ptr(), distance, &mut value)
        };
        self.check(call, status)?;
        Ok(value)
    }

    fn travel_time_uncertainty_path(&mut self, use_path: bool) -> Result<f64, EngineError> {
        let mut value = 0.0;
        // SAFETY: `value` is a valid out-pointer for the duration of the call.
        let status = unsafe { (self.api.get_tt_uncertainty_path)(use_path as c_int, &mut value) };
        self.check("slbm_shell_getTravelTimeUncertainty", status)?;
        Ok(value)
    }

    fn version(&self) -> String {
        self.read_text(self.api.get_version)
    }
}

/// Opens candidates as native libraries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEngineFactory;

impl EngineFactory for NativeEngineFactory {
    fn open(&self, candidate: &LibraryCandidate) -> Result<Box<dyn TravelTimeEngine>, EngineError> {
        NativeEngine::open(&candidate.path).map(|e| Box::new(e) as Box<dyn TravelTimeEngine>)
    }
}
