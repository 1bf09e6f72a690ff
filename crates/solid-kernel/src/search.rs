use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::KernelError;

/// Base name of the module; the platform prefix and extension are added by
/// [`libloading::library_filename`] (`libgeometry.so`, `geometry.dll`, ...).
pub const DEFAULT_MODULE_NAME: &str = "geometry";

/// Ordered list of directories probed for the geometry module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSearch {
    file_name: OsString,
    dirs: Vec<PathBuf>,
}

impl Default for KernelSearch {
    fn default() -> Self {
        Self::new(DEFAULT_MODULE_NAME)
    }
}

impl KernelSearch {
    pub fn new(module_name: impl AsRef<OsStr>) -> Self {
        Self {
            file_name: libloading::library_filename(module_name),
            dirs: Vec::new(),
        }
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    /// Appends the current working directory. Skipped when it cannot be read.
    pub fn with_working_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(dir) => self.with_dir(dir),
            Err(err) => {
                tracing::warn!(error = %err, "working directory unavailable for module search");
                self
            }
        }
    }

    pub fn file_name(&self) -> &OsStr {
        &self.file_name
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// First directory, in search order, that contains the module file.
    pub fn locate(&self) -> Result<PathBuf, KernelError> {
        self.dirs
            .iter()
            .map(|dir| dir.join(&self.file_name))
            .find(|candidate| is_file(candidate))
            .ok_or_else(|| KernelError::ModuleNotFound {
                name: self.file_name.to_string_lossy().into_owned(),
                searched: self.dirs.clone(),
            })
    }
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|meta| meta.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_MODULE_NAME, KernelSearch};
    use crate::KernelError;

    #[test]
    fn file_name_uses_platform_conventions() {
        let search = KernelSearch::new(DEFAULT_MODULE_NAME);
        let name = search.file_name().to_string_lossy().into_owned();
        assert!(name.contains("geometry"));
        if cfg!(target_os = "linux") {
            assert_eq!(name, "libgeometry.so");
        }
    }

    #[test]
    fn earlier_directories_win() {
        let first = tempfile::tempdir().expect("temp dir should be created");
        let second = tempfile::tempdir().expect("temp dir should be created");
        let search = KernelSearch::default()
            .with_dir(first.path())
            .with_dir(second.path());
        for dir in [first.path(), second.path()] {
            std::fs::write(dir.join(search.file_name()), b"module")
                .expect("module placeholder should be written");
        }

        let found = search.locate().expect("module should be located");
        assert_eq!(found, first.path().join(search.file_name()));
    }

    #[test]
    fn falls_back_to_later_directories() {
        let empty = tempfile::tempdir().expect("temp dir should be created");
        let bundle = tempfile::tempdir().expect("temp dir should be created");
        let search = KernelSearch::default()
            .with_dir(empty.path())
            .with_dir(bundle.path());
        std::fs::write(bundle.path().join(search.file_name()), b"module")
            .expect("module placeholder should be written");

        let found = search.locate().expect("module should be located");
        assert!(found.starts_with(bundle.path()));
    }

    #[test]
    fn directories_named_like_the_module_are_ignored() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let search = KernelSearch::default().with_dir(dir.path());
        std::fs::create_dir(dir.path().join(search.file_name()))
            .expect("decoy directory should be created");

        let err = search.locate().expect_err("a directory is not a module");
        assert!(matches!(err, KernelError::ModuleNotFound { .. }));
    }

    #[test]
    fn missing_module_reports_every_searched_dir() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let search = KernelSearch::new("does_not_exist").with_dir(dir.path());

        match search.locate() {
            Err(KernelError::ModuleNotFound { searched, .. }) => {
                assert_eq!(searched, vec![dir.path().to_path_buf()]);
            }
            other => panic!("expected ModuleNotFound, got {other:?}"),
        }
    }
}
