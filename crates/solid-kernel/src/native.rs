use std::ffi::{CString, c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

use libloading::Library;
use solid_core::Solid;
use tracing::{debug, error, info, warn};

use crate::{GENERATE_SYMBOL, GeometryKernel, KernelError, KernelSearch};

/// `int generate_shape(int shape_id, const char* output_path)`.
type GenerateShapeFn = unsafe extern "C-unwind" fn(c_int, *const c_char) -> c_int;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loaded,
    LoadFailed,
}

struct LoadedModule {
    generate_shape: GenerateShapeFn,
    path: PathBuf,
    // Keeps `generate_shape` valid.
    _library: Library,
}

/// Dynamically loaded geometry module.
///
/// The load runs at most once, on construction through [`NativeKernel::load`]
/// or lazily on first use. A failed load is cached for the lifetime of the
/// value and never retried. Calls into the module are serialized since the
/// routine is not known to be reentrant.
pub struct NativeKernel {
    search: KernelSearch,
    module: OnceLock<Result<LoadedModule, KernelError>>,
    load_attempts: AtomicUsize,
    call_lock: Mutex<()>,
}

impl NativeKernel {
    /// Unloaded binding; the search runs on first use.
    pub fn new(search: KernelSearch) -> Self {
        Self {
            search,
            module: OnceLock::new(),
            load_attempts: AtomicUsize::new(0),
            call_lock: Mutex::new(()),
        }
    }

    /// Binding with the load phase already performed.
    pub fn load(search: KernelSearch) -> Self {
        let kernel = Self::new(search);
        let _ = kernel.module();
        kernel
    }

    pub fn search(&self) -> &KernelSearch {
        &self.search
    }

    pub fn state(&self) -> LoadState {
        match self.module.get() {
            None => LoadState::Unloaded,
            Some(Ok(_)) => LoadState::Loaded,
            Some(Err(_)) => LoadState::LoadFailed,
        }
    }

    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::SeqCst)
    }

    /// Where the module was loaded from, once loaded.
    pub fn module_path(&self) -> Option<&Path> {
        match self.module.get() {
            Some(Ok(module)) => Some(module.path.as_path()),
            _ => None,
        }
    }

    fn module(&self) -> Result<&LoadedModule, &KernelError> {
        self.module.get_or_init(|| self.open()).as_ref()
    }

    fn open(&self) -> Result<LoadedModule, KernelError> {
        self.load_attempts.fetch_add(1, Ordering::SeqCst);
        let result = self.search.locate().and_then(|path| open_module(path));
        match &result {
            Ok(module) => info!(path = %module.path.display(), "geometry module loaded"),
            Err(err) => error!(error = %err, "geometry module unavailable"),
        }
        result
    }
}

fn open_module(path: PathBuf) -> Result<LoadedModule, KernelError> {
    let load_error = |err: libloading::Error| KernelError::ModuleLoad {
        path: path.clone(),
        message: err.to_string(),
    };

    // SAFETY: loading runs the module's initialisers. The module is a plain
    // C-ABI library shipped alongside the application.
    let library = unsafe { Library::new(&path) }.map_err(load_error)?;
    // SAFETY: the exported symbol has the fixed signature of `GenerateShapeFn`.
    let generate_shape = *unsafe { library.get::<GenerateShapeFn>(GENERATE_SYMBOL) }
        .map_err(load_error)?;

    Ok(LoadedModule {
        generate_shape,
        path,
        _library: library,
    })
}

impl GeometryKernel for NativeKernel {
    fn ensure_loaded(&self) -> Result<(), KernelError> {
        self.module().map(|_| ()).map_err(Clone::clone)
    }

    fn generate(&self, shape_id: i32, output_path: &Path) -> Result<(), KernelError> {
        let module = self.module().map_err(Clone::clone)?;
        let solid = Solid::from_code(shape_id).ok_or(KernelError::InvalidShapeId(shape_id))?;
        let encoded = encode_path(output_path)?;

        let _guard = self.call_lock.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(shape = %solid, path = %output_path.display(), "invoking geometry kernel");

        // `encoded` outlives the call; the module must not retain the pointer.
        // SAFETY: `shape_id` is within the contract and the path is NUL-terminated.
        let status = panic::catch_unwind(AssertUnwindSafe(|| unsafe {
            (module.generate_shape)(shape_id, encoded.as_ptr())
        }))
        .map_err(|_| {
            error!(shape = %solid, "geometry kernel call unwound");
            KernelError::CallPanicked
        })?;

        if status != 0 {
            warn!(shape = %solid, status, "geometry kernel reported failure");
            return Err(KernelError::CallFailed { status });
        }
        Ok(())
    }
}

/// NUL-terminated UTF-8 encoding of the output path.
pub(crate) fn encode_path(path: &Path) -> Result<CString, KernelError> {
    let text = path.to_str().ok_or_else(|| KernelError::PathEncoding {
        path: path.display().to_string(),
        reason: "path is not valid UTF-8",
    })?;
    CString::new(text).map_err(|_| KernelError::PathEncoding {
        path: path.display().to_string(),
        reason: "path contains a NUL byte",
    })
}
