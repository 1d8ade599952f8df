//! # Storage Traits
//!
//! Repository interfaces used by the domain services. The in-memory
//! repositories in `storage::memory` are the implementations the backend
//! wires up; the CSV codecs in `storage::csv` load and save their contents.

use crate::domain::models::{Group, Student};

/// Student records keyed by generated id
pub trait StudentStorage: Send {
    /// Insert a student under its id (an existing entry with that id is replaced)
    fn store_student(&mut self, student: Student);

    fn get_student(&self, student_id: &str) -> Option<&Student>;

    fn get_student_mut(&mut self, student_id: &str) -> Option<&mut Student>;

    /// All students ordered by id, i.e. by creation order
    fn list_students(&self) -> Vec<&Student>;

    /// Linear scan for a student with the given index number
    fn find_by_index_number(&self, index_number: &str) -> Option<&Student>;

    /// Swap the entry under `old_id` for `student`, which is then keyed by its
    /// own id. Returns false if `old_id` was not present.
    fn replace_student(&mut self, old_id: &str, student: Student) -> bool;

    fn delete_student(&mut self, student_id: &str) -> Option<Student>;

    fn student_count(&self) -> usize;

    fn clear_students(&mut self);
}

/// Groups keyed by name
pub trait GroupStorage: Send {
    fn store_group(&mut self, group: Group);

    fn get_group(&self, name: &str) -> Option<&Group>;

    fn get_group_mut(&mut self, name: &str) -> Option<&mut Group>;

    /// All groups ordered by name
    fn list_groups(&self) -> Vec<&Group>;

    fn group_exists(&self, name: &str) -> bool;

    fn delete_group(&mut self, name: &str) -> Option<Group>;

    fn group_count(&self) -> usize;

    fn clear_groups(&mut self);
}
