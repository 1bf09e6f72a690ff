use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::shape::Solid;

/// Second resolution. Two requests for the same solid within one second plan
/// the same path and the later file overwrites the earlier one.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const OUTPUT_EXTENSION: &str = "obj";

#[derive(Debug, Error)]
pub enum PathError {
    #[error("no output directory configured and no desktop directory could be found")]
    NoOutputDirectory,
    #[error("output directory '{}' cannot be resolved to an absolute path: {source}", .dir.display())]
    Unresolvable {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub solid: Solid,
}

/// Derives `<label>_model_<YYYYMMDD_HHMMSS>.obj` paths under an output
/// directory. Without an explicit directory the user's desktop is used.
#[derive(Debug, Clone, Default)]
pub struct OutputPlanner {
    output_dir: Option<PathBuf>,
}

impl OutputPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: Some(output_dir.into()),
        }
    }

    pub fn configured_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Absolute output directory. Relative configured paths resolve against
    /// the current working directory.
    pub fn output_dir(&self) -> Result<PathBuf, PathError> {
        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => default_output_dir().ok_or(PathError::NoOutputDirectory)?,
        };
        std::path::absolute(&dir).map_err(|source| PathError::Unresolvable { dir, source })
    }

    pub fn file_name(solid: Solid, now: NaiveDateTime) -> String {
        format!(
            "{}_model_{}.{OUTPUT_EXTENSION}",
            solid.label(),
            now.format(TIMESTAMP_FORMAT)
        )
    }

    pub fn plan(&self, solid: Solid, now: NaiveDateTime) -> Result<OutputTarget, PathError> {
        let path = self.output_dir()?.join(Self::file_name(solid, now));
        Ok(OutputTarget { path, solid })
    }
}

fn default_output_dir() -> Option<PathBuf> {
    dirs::desktop_dir().or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
}
