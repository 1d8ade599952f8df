//! # Domain Module
//!
//! Entities, the one-group-per-student registry and the services that operate
//! on them.
//!
//! ## Services
//!
//! - `StudentService`: create, replace-on-update, remove, transfer, grades
//! - `GroupService`: group CRUD with cascading membership removal, statistics
//! - `CsvService`: lenient student/group import and export, strict per-group
//!   roster import and export
//!
//! Every service holds a clone of the same `RosterStore` and locks it once per
//! operation. Services return `crate::error::Result` so callers can tell
//! validation, duplicate, not-found and I/O failures apart.

pub mod csv_service;
pub mod group_registry;
pub mod group_service;
pub mod models;
pub mod statistics;
pub mod student_service;

pub use csv_service::CsvService;
pub use group_registry::GroupRegistry;
pub use group_service::GroupService;
pub use statistics::GroupStatistics;
pub use student_service::StudentService;
