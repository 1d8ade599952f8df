//! # Group Registry
//!
//! Maps a student id to the name of the single group that student belongs to.
//! `Group::add_student` consults this map before touching its own member set,
//! which is what keeps a student out of two groups at once.
//!
//! The registry is a plain owned value. The backend keeps one inside its shared
//! store next to the repositories; tests build their own.

use log::debug;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    assignments: HashMap<String, String>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_assigned(&self, student_id: &str) -> bool {
        self.assignments.contains_key(student_id)
    }

    pub fn group_name_of(&self, student_id: &str) -> Option<&str> {
        self.assignments.get(student_id).map(String::as_str)
    }

    /// Record (or overwrite) the group of a student
    pub fn assign(&mut self, student_id: &str, group_name: &str) {
        debug!("Registry: {} -> '{}'", student_id, group_name);
        self.assignments
            .insert(student_id.to_string(), group_name.to_string());
    }

    pub fn unassign(&mut self, student_id: &str) {
        if self.assignments.remove(student_id).is_some() {
            debug!("Registry: {} unassigned", student_id);
        }
    }

    pub fn clear(&mut self) {
        self.assignments.clear();
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
