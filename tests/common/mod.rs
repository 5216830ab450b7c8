//! Shared fixtures for bootstrap integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use relay_bootstrap::config::{keys, ConfigMap};
use tempfile::TempDir;

/// A throwaway config directory laid out the way the relay expects.
pub struct ConfigFixture {
    dir: TempDir,
}

impl ConfigFixture {
    /// An empty config directory with a `hosts/` subdirectory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("hosts")).unwrap();
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `name`, relative to the config directory.
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    /// Write the main config file and return defaults pointing at it.
    pub fn with_config(&self, contents: impl AsRef<[u8]>) -> ConfigMap {
        let path = self.write("relay.conf", contents);
        let mut config = ConfigMap::with_defaults();
        config.set(keys::CONFIG, path.to_string_lossy());
        config
    }
}
