use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::student::Student;
use crate::domain::group_registry::GroupRegistry;

/// A named group of students.
///
/// Members are stored by student id; the students themselves live in the
/// student repository. Membership only changes through `add_student` and
/// `remove_student`, which keep the registry in step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    name: String,
    description: String,
    members: BTreeSet<String>,
}

impl Group {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let group = Self {
            name: name.into(),
            description: description.into(),
            members: BTreeSet::new(),
        };
        info!(
            "Group created: name='{}', description='{}'",
            group.name, group.description
        );
        group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        info!(
            "Group '{}' description updated to: '{}'",
            self.name, self.description
        );
    }

    /// Read-only view of the member ids
    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    pub fn contains(&self, student_id: &str) -> bool {
        self.members.contains(student_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add a student unless the registry already places them in another group.
    ///
    /// Returns `false` (and changes nothing) when the student belongs to a
    /// different group, `true` when the student is now, or already was, a
    /// member of this one.
    pub fn add_student(&mut self, registry: &mut GroupRegistry, student: &Student) -> bool {
        let student_id = student.id();

        if let Some(assigned) = registry.group_name_of(student_id) {
            if assigned != self.name {
                warn!(
                    "Cannot add student id={} to group='{}', already in group='{}'",
                    student_id, self.name, assigned
                );
                return false;
            }
            debug!(
                "Student index={} already in group='{}'",
                student.index_number(),
                self.name
            );
            self.members.insert(student_id.to_string());
            return true;
        }

        self.members.insert(student_id.to_string());
        registry.assign(student_id, &self.name);
        info!(
            "Student index={} added to group='{}'",
            student.index_number(),
            self.name
        );
        true
    }

    /// Remove a student; returns whether they were a member
    pub fn remove_student(&mut self, registry: &mut GroupRegistry, student: &Student) -> bool {
        let removed = self.remove_member(registry, student.id());
        if removed {
            info!(
                "Student index={} removed from group='{}'",
                student.index_number(),
                self.name
            );
        } else {
            warn!(
                "Attempt to remove not-member index={} from group='{}'",
                student.index_number(),
                self.name
            );
        }
        removed
    }

    /// Id-based removal, used when the student record may already be gone
    pub(crate) fn remove_member(&mut self, registry: &mut GroupRegistry, student_id: &str) -> bool {
        let removed = self.members.remove(student_id);
        if removed {
            registry.unassign(student_id);
        }
        removed
    }

    /// Detach every member, returning the ids that were removed
    pub(crate) fn remove_all_members(&mut self, registry: &mut GroupRegistry) -> Vec<String> {
        let ids: Vec<String> = std::mem::take(&mut self.members).into_iter().collect();
        for id in &ids {
            registry.unassign(id);
        }
        ids
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Group {} ({}) size={}",
            self.name,
            self.description,
            self.members.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Gender;

    fn student(index: &str) -> Student {
        Student::new("Anna", "Nowak", "05.03.2001", Gender::Female, index).unwrap()
    }

    #[test]
    fn test_add_student_registers_membership() {
        let mut registry = GroupRegistry::new();
        let mut group = Group::new("G1", "Java Monday");
        let anna = student("S1");

        assert!(group.add_student(&mut registry, &anna));
        assert!(group.contains(anna.id()));
        assert_eq!(registry.group_name_of(anna.id()), Some("G1"));
        assert_eq!(group.to_string(), "Group G1 (Java Monday) size=1");
    }

    #[test]
    fn test_add_student_is_idempotent() {
        let mut registry = GroupRegistry::new();
        let mut group = Group::new("G1", "Java Monday");
        let anna = student("S1");

        assert!(group.add_student(&mut registry, &anna));
        assert!(group.add_student(&mut registry, &anna));
        assert_eq!(group.len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_student_cannot_join_second_group() {
        let mut registry = GroupRegistry::new();
        let mut g1 = Group::new("G1", "Java Monday");
        let mut g2 = Group::new("G2", "Rust Friday");
        let anna = student("S1");
        let piotr = student("S2");

        assert!(g1.add_student(&mut registry, &anna));
        assert!(g1.add_student(&mut registry, &piotr));
        assert!(!g2.add_student(&mut registry, &anna));

        assert!(g2.is_empty());
        assert_eq!(g1.len(), 2);
        assert_eq!(registry.group_name_of(anna.id()), Some("G1"));
    }

    #[test]
    fn test_remove_student() {
        let mut registry = GroupRegistry::new();
        let mut g1 = Group::new("G1", "Java Monday");
        let mut g2 = Group::new("G2", "Rust Friday");
        let anna = student("S1");

        assert!(!g1.remove_student(&mut registry, &anna));

        g1.add_student(&mut registry, &anna);
        assert!(g1.remove_student(&mut registry, &anna));
        assert!(!registry.is_assigned(anna.id()));
        assert!(g2.add_student(&mut registry, &anna));
    }

    #[test]
    fn test_removing_from_wrong_group_keeps_registry() {
        let mut registry = GroupRegistry::new();
        let mut g1 = Group::new("G1", "Java Monday");
        let mut g2 = Group::new("G2", "Rust Friday");
        let anna = student("S1");

        g1.add_student(&mut registry, &anna);
        assert!(!g2.remove_student(&mut registry, &anna));
        assert_eq!(registry.group_name_of(anna.id()), Some("G1"));
    }

    #[test]
    fn test_remove_all_members() {
        let mut registry = GroupRegistry::new();
        let mut group = Group::new("G1", "Java Monday");
        let a = student("S1");
        let b = student("S2");
        group.add_student(&mut registry, &a);
        group.add_student(&mut registry, &b);

        let removed = group.remove_all_members(&mut registry);
        assert_eq!(removed.len(), 2);
        assert!(group.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_set_description() {
        let mut group = Group::new("G1", "Java Monday");
        group.set_description("Java Tuesday");
        assert_eq!(group.description(), "Java Tuesday");
    }
}
