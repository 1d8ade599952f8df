use log::{debug, info, warn};

use crate::domain::models::{Group, Student};
use crate::domain::statistics::GroupStatistics;
use crate::error::{Result, RosterError};
use crate::storage::traits::{GroupStorage, StudentStorage};
use crate::storage::{RosterState, RosterStore};

/// Service for managing groups and their membership
#[derive(Clone)]
pub struct GroupService {
    store: RosterStore,
}

impl GroupService {
    pub fn new(store: RosterStore) -> Self {
        Self { store }
    }

    /// Create an empty group. Name and description are trimmed.
    pub fn create_group(&self, name: &str, description: &str) -> Result<Group> {
        debug!("Creating group: {}", name);

        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::validation("Group name is required."));
        }

        let mut state = self.store.lock();
        if state.groups.group_exists(name) {
            return Err(RosterError::DuplicateGroupName(name.to_string()));
        }

        let group = Group::new(name, description.trim());
        state.groups.store_group(group.clone());

        info!("Group created: {}", name);
        Ok(group)
    }

    pub fn update_group_description(&self, name: &str, description: &str) -> Result<()> {
        debug!("Updating description for group: {}", name);

        let mut state = self.store.lock();
        let group = state
            .groups
            .get_group_mut(name)
            .ok_or_else(|| RosterError::GroupNotFound(name.to_string()))?;

        let description = description.trim();
        if description.is_empty() {
            return Err(RosterError::validation("Description cannot be empty."));
        }

        group.set_description(description);
        Ok(())
    }

    /// Detach every member, then delete the group. Returns the member count.
    pub fn remove_group(&self, name: &str) -> Result<usize> {
        debug!("Removing group: {}", name);

        let mut state = self.store.lock();
        let state: &mut RosterState = &mut state;

        let group = state
            .groups
            .get_group_mut(name)
            .ok_or_else(|| RosterError::GroupNotFound(name.to_string()))?;
        let detached = group.remove_all_members(&mut state.registry);
        state.groups.delete_group(name);

        info!("Group removed: {} (had {} members)", name, detached.len());
        Ok(detached.len())
    }

    pub fn group_exists(&self, name: &str) -> bool {
        self.store.lock().groups.group_exists(name)
    }

    pub fn get_group(&self, name: &str) -> Option<Group> {
        self.store.lock().groups.get_group(name).cloned()
    }

    /// All groups ordered by name
    pub fn list_groups(&self) -> Vec<Group> {
        self.store
            .lock()
            .groups
            .list_groups()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Add a student to a group.
    ///
    /// `Ok(true)` when the student is now (or already was) a member,
    /// `Ok(false)` when another group already holds the student.
    pub fn add_student_to_group(&self, name: &str, student_id: &str) -> Result<bool> {
        let mut state = self.store.lock();
        let RosterState {
            students,
            groups,
            registry,
            ..
        } = &mut *state;

        let student = students
            .get_student(student_id)
            .ok_or_else(|| RosterError::StudentNotFound(student_id.to_string()))?;
        let group = groups
            .get_group_mut(name)
            .ok_or_else(|| RosterError::GroupNotFound(name.to_string()))?;

        Ok(group.add_student(registry, student))
    }

    /// Remove a student from a group; `Ok(false)` if they were not a member
    pub fn remove_student_from_group(&self, name: &str, student_id: &str) -> Result<bool> {
        let mut state = self.store.lock();
        let RosterState {
            students,
            groups,
            registry,
            ..
        } = &mut *state;

        let group = groups
            .get_group_mut(name)
            .ok_or_else(|| RosterError::GroupNotFound(name.to_string()))?;
        match students.get_student(student_id) {
            Some(student) => Ok(group.remove_student(registry, student)),
            None => {
                warn!("Student {} not found, removing id from group '{}'", student_id, name);
                Ok(group.remove_member(registry, student_id))
            }
        }
    }

    /// Members of a group in id order
    pub fn list_members(&self, name: &str) -> Result<Vec<Student>> {
        let state = self.store.lock();
        let group = state
            .groups
            .get_group(name)
            .ok_or_else(|| RosterError::GroupNotFound(name.to_string()))?;

        let members = group
            .members()
            .iter()
            .filter_map(|id| {
                let student = state.students.get_student(id);
                if student.is_none() {
                    warn!("Group '{}' lists unknown student {}", name, id);
                }
                student.cloned()
            })
            .collect();
        Ok(members)
    }

    pub fn group_statistics(&self, name: &str) -> Result<GroupStatistics> {
        let members = self.list_members(name)?;
        let stats = GroupStatistics::from_members(&members);
        debug!("Statistics for group '{}': {:?}", name, stats);
        Ok(stats)
    }
}
