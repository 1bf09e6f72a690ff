//! Native geometry module loaded by `solid-kernel`.
//!
//! Built as a `cdylib` named `geometry` (`libgeometry.so` on Linux) and
//! exporting `int generate_shape(int shape_id, const char* output_path)`.

pub mod mesh;

use std::ffi::{CStr, c_char, c_int};
use std::fs;
use std::io;
use std::panic;
use std::path::Path;

use solid_core::Solid;
use thiserror::Error;

pub use mesh::{Mesh, cube, tetrahedron, to_obj};

pub const STATUS_OK: c_int = 0;
pub const STATUS_IO: c_int = -1;
pub const STATUS_INVALID_SHAPE: c_int = -2;
pub const STATUS_INVALID_PATH: c_int = -3;
pub const STATUS_PANICKED: c_int = -4;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("invalid shape id {0}")]
    InvalidShape(i32),
    #[error("could not write '{}': {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: io::Error,
    },
}

impl WriteError {
    pub fn status(&self) -> c_int {
        match self {
            WriteError::InvalidShape(_) => STATUS_INVALID_SHAPE,
            WriteError::Io { .. } => STATUS_IO,
        }
    }
}

/// Writes the OBJ mesh for `shape_id` to `path`, replacing any existing file.
pub fn write_shape(shape_id: i32, path: &Path) -> Result<(), WriteError> {
    let solid = Solid::from_code(shape_id).ok_or(WriteError::InvalidShape(shape_id))?;
    let obj = to_obj(&Mesh::for_solid(solid));
    fs::write(path, obj).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// C entry point. Returns `0` on success and a negative status otherwise.
///
/// # Safety
///
/// `output_path` must be null or point to a NUL-terminated string that stays
/// valid for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn generate_shape(shape_id: c_int, output_path: *const c_char) -> c_int {
    if output_path.is_null() {
        return STATUS_INVALID_PATH;
    }
    // SAFETY: non-null and NUL-terminated per the caller contract.
    let Ok(path) = unsafe { CStr::from_ptr(output_path) }.to_str() else {
        return STATUS_INVALID_PATH;
    };

    panic::catch_unwind(|| match write_shape(shape_id, Path::new(path)) {
        Ok(()) => STATUS_OK,
        Err(err) => {
            // Loaded into foreign hosts that install no tracing subscriber;
            // stderr is the only sink guaranteed to exist.
            eprintln!("[geometry] {err}");
            err.status()
        }
    })
    .unwrap_or(STATUS_PANICKED)
}
