//! In-memory repositories. Entities are owned here; groups and the registry
//! only refer to students by id.

pub mod group_repository;
pub mod student_repository;

pub use group_repository::GroupRepository;
pub use student_repository::StudentRepository;
