use log::debug;
use std::collections::BTreeMap;

use crate::domain::models::Student;
use crate::storage::traits::StudentStorage;

/// In-memory student repository.
///
/// Ids are zero-padded base-36, so the ordered map iterates in creation order.
#[derive(Debug, Clone, Default)]
pub struct StudentRepository {
    students: BTreeMap<String, Student>,
}

impl StudentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StudentStorage for StudentRepository {
    fn store_student(&mut self, student: Student) {
        debug!("Storing student {} (index={})", student.id(), student.index_number());
        self.students.insert(student.id().to_string(), student);
    }

    fn get_student(&self, student_id: &str) -> Option<&Student> {
        self.students.get(student_id)
    }

    fn get_student_mut(&mut self, student_id: &str) -> Option<&mut Student> {
        self.students.get_mut(student_id)
    }

    fn list_students(&self) -> Vec<&Student> {
        self.students.values().collect()
    }

    fn find_by_index_number(&self, index_number: &str) -> Option<&Student> {
        self.students
            .values()
            .find(|s| s.index_number() == index_number)
    }

    fn replace_student(&mut self, old_id: &str, student: Student) -> bool {
        if self.students.remove(old_id).is_none() {
            return false;
        }
        debug!("Replacing student {} with {}", old_id, student.id());
        self.students.insert(student.id().to_string(), student);
        true
    }

    fn delete_student(&mut self, student_id: &str) -> Option<Student> {
        self.students.remove(student_id)
    }

    fn student_count(&self) -> usize {
        self.students.len()
    }

    fn clear_students(&mut self) {
        self.students.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Gender;

    fn student(index: &str) -> Student {
        Student::new("Jan", "Kowalski", "01.01.2000", Gender::Male, index).unwrap()
    }

    #[test]
    fn test_store_and_get() {
        let mut repo = StudentRepository::new();
        let s = student("S1");
        let id = s.id().to_string();
        repo.store_student(s);

        assert_eq!(repo.get_student(&id).unwrap().index_number(), "S1");
        assert!(repo.get_student("missing").is_none());
        assert_eq!(repo.student_count(), 1);
    }

    #[test]
    fn test_list_in_creation_order() {
        let mut repo = StudentRepository::new();
        let first = student("S1");
        let second = student("S2");
        repo.store_student(second);
        repo.store_student(first);

        let indexes: Vec<&str> = repo.list_students().iter().map(|s| s.index_number()).collect();
        assert_eq!(indexes, vec!["S1", "S2"]);
    }

    #[test]
    fn test_find_by_index_number() {
        let mut repo = StudentRepository::new();
        repo.store_student(student("S1"));
        repo.store_student(student("S2"));

        assert!(repo.find_by_index_number("S2").is_some());
        assert!(repo.find_by_index_number("S3").is_none());
    }

    #[test]
    fn test_replace_student_rekeys_entry() {
        let mut repo = StudentRepository::new();
        let old = student("S1");
        let old_id = old.id().to_string();
        repo.store_student(old);

        let replacement = student("S1b");
        let new_id = replacement.id().to_string();
        assert!(repo.replace_student(&old_id, replacement));

        assert!(repo.get_student(&old_id).is_none());
        assert_eq!(repo.get_student(&new_id).unwrap().index_number(), "S1b");
        assert_eq!(repo.student_count(), 1);

        assert!(!repo.replace_student("missing", student("S9")));
        assert_eq!(repo.student_count(), 1);
    }

    #[test]
    fn test_delete_and_clear() {
        let mut repo = StudentRepository::new();
        let s = student("S1");
        let id = s.id().to_string();
        repo.store_student(s);
        repo.store_student(student("S2"));

        assert!(repo.delete_student(&id).is_some());
        assert!(repo.delete_student(&id).is_none());
        repo.clear_students();
        assert_eq!(repo.student_count(), 0);
    }
}
