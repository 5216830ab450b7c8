//! Optional extension modules.
//!
//! # Responsibilities
//! - Find dynamic libraries in `mod-dir`
//! - Activate each one independently
//! - Report failures without stopping the scan
//!
//! # Design Decisions
//! - Best-effort: a broken module is logged and recorded, bootstrap continues
//! - Only an unreadable `mod-dir` fails the step
//! - Loaded libraries live as long as the [`ExtensionReport`] holding them

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ConfigError;

/// File extension of dynamic libraries on this platform (`so`, `dylib`, `dll`).
pub const MODULE_EXTENSION: &str = std::env::consts::DLL_EXTENSION;

/// Why a single module could not be activated.
#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("failed to load extension {}: {reason}", .path.display())]
    LoadFailure { path: PathBuf, reason: String },
}

/// A module that was activated successfully.
#[derive(Debug)]
pub struct LoadedModule {
    path: PathBuf,
    _library: Option<libloading::Library>,
}

impl LoadedModule {
    /// A loaded module backed by an open library handle.
    pub fn from_library(path: PathBuf, library: libloading::Library) -> Self {
        Self {
            path,
            _library: Some(library),
        }
    }

    /// A module record with no library handle attached.
    pub fn detached(path: PathBuf) -> Self {
        Self {
            path,
            _library: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Attempts to activate the unit of code at a path.
pub trait ModuleActivator {
    fn activate(&self, path: &Path) -> Result<LoadedModule, ExtensionError>;
}

/// Activates modules by opening them as dynamic libraries.
#[derive(Debug, Clone, Copy, Default)]
pub struct DylibActivator;

impl ModuleActivator for DylibActivator {
    fn activate(&self, path: &Path) -> Result<LoadedModule, ExtensionError> {
        // SAFETY: opening a library runs its initializers. Modules in mod-dir
        // are trusted in the same way as the binary itself.
        let library = unsafe { libloading::Library::new(path) }.map_err(|e| {
            ExtensionError::LoadFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        Ok(LoadedModule::from_library(path.to_path_buf(), library))
    }
}

/// Outcome of scanning a module directory.
#[derive(Debug, Default)]
pub struct ExtensionReport {
    pub loaded: Vec<LoadedModule>,
    pub failed: Vec<ExtensionError>,
}

impl ExtensionReport {
    pub fn loaded_paths(&self) -> impl Iterator<Item = &Path> {
        self.loaded.iter().map(LoadedModule::path)
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Regular files in `dir` whose name ends in `.` + [`MODULE_EXTENSION`],
/// sorted.
pub fn module_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let suffix = format!(".{}", MODULE_EXTENSION);
    let dir_err = |source| ConfigError::DirectoryAccess {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(dir_err)? {
        let entry = entry.map_err(dir_err)?;
        if entry.file_type().map_err(dir_err)?.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(&suffix) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Activate every module in `dir`, collecting failures instead of returning
/// them.
pub fn load_extensions(
    dir: &Path,
    activator: &dyn ModuleActivator,
) -> Result<ExtensionReport, ConfigError> {
    let mut report = ExtensionReport::default();
    for path in module_files(dir)? {
        match activator.activate(&path) {
            Ok(module) => {
                tracing::info!(path = %path.display(), "Extension loaded");
                report.loaded.push(module);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Extension skipped");
                report.failed.push(e);
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fails any module whose file name contains "bad".
    struct PickyActivator;

    impl ModuleActivator for PickyActivator {
        fn activate(&self, path: &Path) -> Result<LoadedModule, ExtensionError> {
            if path.to_string_lossy().contains("bad") {
                return Err(ExtensionError::LoadFailure {
                    path: path.to_path_buf(),
                    reason: "rejected".into(),
                });
            }
            Ok(LoadedModule::detached(path.to_path_buf()))
        }
    }

    fn module_name(stem: &str) -> String {
        format!("{}.{}", stem, MODULE_EXTENSION)
    }

    #[test]
    fn test_failures_do_not_stop_scan() {
        let dir = tempfile::tempdir().unwrap();
        for stem in ["a_good", "b_bad", "c_good"] {
            fs::write(dir.path().join(module_name(stem)), b"").unwrap();
        }
        fs::write(dir.path().join("readme.txt"), b"").unwrap();
        fs::create_dir(dir.path().join(module_name("subdir"))).unwrap();

        let report = load_extensions(dir.path(), &PickyActivator).unwrap();

        let loaded: Vec<_> = report
            .loaded_paths()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(loaded, vec![module_name("a_good"), module_name("c_good")]);
        assert_eq!(report.failed.len(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_bare_suffix_file_is_a_module() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(module_name("")), b"").unwrap();
        fs::write(dir.path().join(format!("lib{}", MODULE_EXTENSION)), b"").unwrap();

        let files = module_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join(module_name(""))]);
    }

    #[test]
    fn test_dylib_activator_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(module_name("garbage"));
        fs::write(&path, b"not a shared object").unwrap();

        let report = load_extensions(dir.path(), &DylibActivator).unwrap();
        assert!(report.loaded.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].to_string().contains("garbage"));
    }

    #[test]
    fn test_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_extensions(&dir.path().join("mods"), &DylibActivator).unwrap_err();
        assert!(matches!(err, ConfigError::DirectoryAccess { .. }));
    }
}
