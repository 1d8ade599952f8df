//! Test utilities for file-backed tests.
//!
//! The temporary directory is removed when the environment is dropped, even
//! if the test panics.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::config::AppConfig;
use crate::Backend;

/// Temporary directory holding the files a test reads and writes
pub struct TestEnvironment {
    /// Base directory path for manual inspection if needed
    pub base_path: PathBuf,
    _temp_dir: TempDir, // Keep alive to prevent cleanup
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        crate::logging::init_for_tests();
        let temp_dir = TempDir::new()?;
        Ok(Self {
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.base_path.join(file_name)
    }

    pub fn write_file(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path(file_name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_file(&self, file_name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.path(file_name))?)
    }

    /// Config whose student and group files live in this environment
    pub fn config(&self) -> AppConfig {
        AppConfig {
            students_file: self.path("students.csv"),
            groups_file: self.path("groups.csv"),
            ..AppConfig::default()
        }
    }
}

/// A backend wired to a fresh store and a config pointing into a test environment
pub struct TestHelper {
    pub env: TestEnvironment,
    pub backend: Backend,
}

impl TestHelper {
    pub fn new() -> Result<Self> {
        let env = TestEnvironment::new()?;
        let backend = Backend::new(env.config())?;
        Ok(Self { env, backend })
    }
}
