use log::warn;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::memory::{GroupRepository, StudentRepository};
use super::traits::GroupStorage;
use crate::domain::group_registry::GroupRegistry;

/// Everything the services read and write: both repositories, the membership
/// registry, and the id mapping left behind by the last student import.
#[derive(Debug, Default)]
pub struct RosterState {
    pub students: StudentRepository,
    pub groups: GroupRepository,
    pub registry: GroupRegistry,
    /// Student id as written in an imported file -> id of the live student
    pub source_ids: HashMap<String, String>,
}

impl RosterState {
    /// Take a student out of whatever group the registry places them in.
    /// Returns that group's name. A registry entry naming a group that no
    /// longer exists is dropped.
    pub(crate) fn detach_student(&mut self, student_id: &str) -> Option<String> {
        let group_name = self.registry.group_name_of(student_id)?.to_string();
        match self.groups.get_group_mut(&group_name) {
            Some(group) => {
                group.remove_member(&mut self.registry, student_id);
            }
            None => {
                warn!(
                    "Registry names missing group '{}' for student {}",
                    group_name, student_id
                );
                self.registry.unassign(student_id);
            }
        }
        Some(group_name)
    }
}

/// Shared handle to the roster state.
///
/// Services hold clones of the same store and take the lock once per
/// operation, so a registry check and the membership change that follows it
/// cannot interleave with another caller.
#[derive(Debug, Clone, Default)]
pub struct RosterStore {
    state: Arc<Mutex<RosterState>>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> MutexGuard<'_, RosterState> {
        // Poisoning only means another caller panicked; the maps stay readable
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop every student, group, assignment and import mapping
    pub fn reset(&self) {
        *self.lock() = RosterState::default();
    }
}
