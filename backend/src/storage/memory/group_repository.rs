use std::collections::BTreeMap;

use crate::domain::models::Group;
use crate::storage::traits::GroupStorage;

/// In-memory group repository keyed by group name
#[derive(Debug, Clone, Default)]
pub struct GroupRepository {
    groups: BTreeMap<String, Group>,
}

impl GroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GroupStorage for GroupRepository {
    fn store_group(&mut self, group: Group) {
        self.groups.insert(group.name().to_string(), group);
    }

    fn get_group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    fn get_group_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups.get_mut(name)
    }

    fn list_groups(&self) -> Vec<&Group> {
        self.groups.values().collect()
    }

    fn group_exists(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    fn delete_group(&mut self, name: &str) -> Option<Group> {
        self.groups.remove(name)
    }

    fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn clear_groups(&mut self) {
        self.groups.clear();
    }
}
