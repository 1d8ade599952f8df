//! # Student Roster Backend
//!
//! In-memory students and groups with delimited-text persistence.
//!
//! - Synchronous throughout; no async runtime
//! - One shared `RosterStore` holds the repositories and the group registry
//! - Services are plain structs that callers (console, GUI, tests) hold
//!   directly; there is no IO/REST layer

use anyhow::{Context, Result};
use log::info;
use std::path::Path;

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod storage;

// Re-export commonly used types
pub use config::AppConfig;
pub use domain::models::{Group, Person, Student};
pub use domain::{CsvService, GroupRegistry, GroupService, GroupStatistics, StudentService};
pub use error::RosterError;
pub use storage::csv::Delimiter;
pub use storage::RosterStore;

/// Main backend struct wiring every service onto one store
#[derive(Clone)]
pub struct Backend {
    pub student_service: StudentService,
    pub group_service: GroupService,
    pub csv_service: CsvService,
    store: RosterStore,
}

impl Backend {
    /// Create a backend with an empty store
    pub fn new(config: AppConfig) -> error::Result<Self> {
        let store = RosterStore::new();
        let student_service = StudentService::new(store.clone());
        let group_service = GroupService::new(store.clone());
        let csv_service = CsvService::new(store.clone(), &config)?;

        info!(
            "Backend ready (delimiter '{}', students {:?}, groups {:?})",
            csv_service.delimiter(),
            csv_service.students_file(),
            csv_service.groups_file()
        );

        Ok(Backend {
            student_service,
            group_service,
            csv_service,
            store,
        })
    }

    /// Backend with the default config; nothing is read until asked
    pub fn in_memory() -> Self {
        let store = RosterStore::new();
        Backend {
            student_service: StudentService::new(store.clone()),
            group_service: GroupService::new(store.clone()),
            csv_service: CsvService::from_parts(
                store.clone(),
                Delimiter::DEFAULT,
                &AppConfig::default(),
            ),
            store,
        }
    }

    /// Load (or create) the YAML config at `path` and build a backend from
    /// it. Relative data file paths are taken relative to the config file.
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let config = AppConfig::load_or_create(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let config = config.resolve_paths(base);
        Backend::new(config).with_context(|| format!("Invalid config in {:?}", path))
    }

    /// The shared state behind every service
    pub fn store(&self) -> &RosterStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_share_one_store() {
        logging::init_for_tests();
        let backend = Backend::in_memory();
        assert_eq!(backend.csv_service.delimiter(), Delimiter::DEFAULT);

        backend.group_service.create_group("G1", "Java Monday").unwrap();
        assert!(backend.store().lock().registry.is_empty());

        let clone = backend.clone();
        assert!(clone.group_service.group_exists("G1"));

        clone.store().reset();
        assert!(!backend.group_service.group_exists("G1"));
    }
}
