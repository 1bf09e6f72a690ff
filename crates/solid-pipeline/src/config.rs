use std::ffi::OsString;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use solid_core::OutputPlanner;
use solid_kernel::{DEFAULT_MODULE_NAME, KernelSearch, NativeKernel};

use crate::Pipeline;

pub const OUTPUT_DIR_VAR: &str = "SOLID_OUTPUT_DIR";
pub const RESOURCES_DIR_VAR: &str = "SOLID_RESOURCES_DIR";
pub const MODULE_NAME_VAR: &str = "SOLID_KERNEL_NAME";

/// Host-supplied configuration. Unset directories fall back to the user's
/// desktop (output) and the executable's directory (bundled resources).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub output_dir: Option<PathBuf>,
    pub resources_dir: Option<PathBuf>,
    pub module_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: None,
            resources_dir: None,
            module_name: DEFAULT_MODULE_NAME.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Builds settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let value = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            output_dir: value(OUTPUT_DIR_VAR).map(PathBuf::from),
            resources_dir: value(RESOURCES_DIR_VAR).map(PathBuf::from),
            module_name: value(MODULE_NAME_VAR)
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| DEFAULT_MODULE_NAME.to_string()),
        }
    }

    pub fn resources_dir(&self) -> Option<PathBuf> {
        self.resources_dir.clone().or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(PathBuf::from))
        })
    }

    /// Working directory first, then the bundled-resources directory.
    pub fn kernel_search(&self) -> KernelSearch {
        let search = KernelSearch::new(&self.module_name).with_working_dir();
        match self.resources_dir() {
            Some(dir) if !search.dirs().contains(&dir) => search.with_dir(dir),
            _ => search,
        }
    }

    pub fn planner(&self) -> OutputPlanner {
        match &self.output_dir {
            Some(dir) => OutputPlanner::with_output_dir(dir),
            None => OutputPlanner::new(),
        }
    }

    /// Pipeline over the native module, loaded eagerly.
    pub fn native_pipeline(&self) -> Pipeline<NativeKernel> {
        Pipeline::new(NativeKernel::load(self.kernel_search()), self.planner())
    }
}
