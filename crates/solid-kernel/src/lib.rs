//! Call boundary to the native geometry module.
//!
//! The module exports one routine, `int generate_shape(int shape_id, const char* output_path)`,
//! which writes an OBJ file and returns `0` on success. [`GeometryKernel`] is the
//! seam the pipeline talks to; [`NativeKernel`] is the dynamically loaded
//! implementation.

pub mod native;
pub mod search;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use native::{LoadState, NativeKernel};
pub use search::{DEFAULT_MODULE_NAME, KernelSearch};

/// Exported symbol name, NUL-terminated for the loader.
pub const GENERATE_SYMBOL: &[u8] = b"generate_shape\0";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("geometry module '{name}' not found (searched: {})", display_dirs(.searched))]
    ModuleNotFound { name: String, searched: Vec<PathBuf> },
    #[error("failed to load geometry module '{}': {message}", .path.display())]
    ModuleLoad { path: PathBuf, message: String },
    #[error("invalid shape id {0}; the kernel accepts 1 (cube) or 2 (sphere)")]
    InvalidShapeId(i32),
    #[error("output path '{path}' cannot be passed to the kernel: {reason}")]
    PathEncoding { path: String, reason: &'static str },
    #[error("geometry kernel reported failure (status {status})")]
    CallFailed { status: i32 },
    #[error("geometry kernel call unwound instead of returning a status")]
    CallPanicked,
}

impl KernelError {
    /// Load-phase errors are cached by the binding and returned for every
    /// later call.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            KernelError::ModuleNotFound { .. } | KernelError::ModuleLoad { .. }
        )
    }
}

fn display_dirs(dirs: &[PathBuf]) -> String {
    if dirs.is_empty() {
        return "no directories".to_string();
    }
    dirs.iter()
        .map(|dir| dir.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub trait GeometryKernel {
    /// `Ok` once the module is loaded; the cached load error otherwise.
    fn ensure_loaded(&self) -> Result<(), KernelError>;

    /// Writes the solid identified by `shape_id` to `output_path`. The binding
    /// does not check that the file exists afterwards.
    fn generate(&self, shape_id: i32, output_path: &Path) -> Result<(), KernelError>;
}
