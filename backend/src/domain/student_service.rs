use log::{debug, info, warn};
use shared::{CreateStudentRequest, UpdateStudentRequest};

use crate::domain::models::Student;
use crate::error::{Result, RosterError};
use crate::storage::traits::{GroupStorage, StudentStorage};
use crate::storage::{RosterState, RosterStore};

/// Service for managing students and their grades
#[derive(Clone)]
pub struct StudentService {
    store: RosterStore,
}

impl StudentService {
    pub fn new(store: RosterStore) -> Self {
        Self { store }
    }

    /// Create a student, add the requested grades and optionally join a group.
    ///
    /// A group name that does not resolve to an existing group is ignored, as
    /// is a group that refuses the student.
    pub fn create_student(&self, request: CreateStudentRequest) -> Result<Student> {
        info!(
            "Creating student: {} {} (index: {})",
            request.first_name, request.last_name, request.index_number
        );

        // Validate the request
        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(RosterError::validation(
                "First name and last name are required.",
            ));
        }
        let index_number = request.index_number.trim();
        if index_number.is_empty() {
            return Err(RosterError::validation("Index number is required."));
        }

        let mut state = self.store.lock();
        let state = &mut *state;

        if state.students.find_by_index_number(index_number).is_some() {
            return Err(RosterError::DuplicateIndexNumber(index_number.to_string()));
        }

        let mut student = Student::new(
            request.first_name.trim(),
            request.last_name.trim(),
            &request.birth_date,
            request.gender,
            index_number,
        )?;
        for grade in &request.grades {
            student.add_grade(*grade)?;
        }

        if let Some(group_name) = request
            .group_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            match state.groups.get_group_mut(group_name) {
                Some(group) => {
                    if group.add_student(&mut state.registry, &student) {
                        info!("Student added to group: {}", group_name);
                    } else {
                        warn!("Could not add student to group: {}", group_name);
                    }
                }
                None => warn!("Group '{}' not found, student left ungrouped", group_name),
            }
        }

        state.students.store_student(student.clone());
        info!("Created student {} with ID: {}", student, student.id());

        Ok(student)
    }

    /// Replace a student with one built from the request.
    ///
    /// Identity fields are immutable, so this does not edit in place: a new
    /// `Student` (with a new id) is built, takes over the grades, replaces the
    /// old entry and rejoins the old student's group. Nothing changes if the
    /// replacement cannot be built.
    pub fn update_student(
        &self,
        student_id: &str,
        request: UpdateStudentRequest,
    ) -> Result<Student> {
        info!("Updating student: {}", student_id);

        let mut state = self.store.lock();
        let state = &mut *state;

        let old = state
            .students
            .get_student(student_id)
            .ok_or_else(|| RosterError::StudentNotFound(student_id.to_string()))?;

        if [
            &request.first_name,
            &request.last_name,
            &request.birth_date,
            &request.index_number,
        ]
        .iter()
        .any(|field| field.trim().is_empty())
        {
            return Err(RosterError::validation("All fields are required."));
        }

        let index_number = request.index_number.trim();
        if index_number != old.index_number()
            && state.students.find_by_index_number(index_number).is_some()
        {
            return Err(RosterError::DuplicateIndexNumber(index_number.to_string()));
        }

        let mut replacement = Student::new(
            request.first_name.trim(),
            request.last_name.trim(),
            &request.birth_date,
            request.gender,
            index_number,
        )?;
        for grade in old.grades() {
            replacement.add_grade(*grade)?;
        }
        let old_index = old.index_number().to_string();

        let group_name = state.detach_student(student_id);
        state.students.replace_student(student_id, replacement.clone());
        for live_id in state.source_ids.values_mut() {
            if *live_id == student_id {
                *live_id = replacement.id().to_string();
            }
        }

        if let Some(group_name) = group_name {
            if let Some(group) = state.groups.get_group_mut(&group_name) {
                if !group.add_student(&mut state.registry, &replacement) {
                    warn!(
                        "Replacement {} could not rejoin group '{}'",
                        replacement.id(),
                        group_name
                    );
                }
            }
        }

        info!(
            "Student updated: old index={}, new index={}, id {} -> {}",
            old_index,
            replacement.index_number(),
            student_id,
            replacement.id()
        );
        Ok(replacement)
    }

    /// Detach a student from their group and delete them
    pub fn remove_student(&self, student_id: &str) -> Result<Student> {
        info!("Removing student: {}", student_id);

        let mut state = self.store.lock();
        if state.students.get_student(student_id).is_none() {
            warn!("Student not found: {}", student_id);
            return Err(RosterError::StudentNotFound(student_id.to_string()));
        }

        state.detach_student(student_id);
        state.source_ids.retain(|_, live_id| *live_id != student_id);
        let student = state
            .students
            .delete_student(student_id)
            .ok_or_else(|| RosterError::StudentNotFound(student_id.to_string()))?;

        info!("Student removed: {} {}", student.first_name(), student.last_name());
        Ok(student)
    }

    /// Move a student into `target_group`, leaving their current group.
    ///
    /// Runs under one lock: if the target refuses the student after the
    /// detach, the student is put back where they were.
    pub fn transfer_student(&self, student_id: &str, target_group: &str) -> Result<()> {
        info!("Transferring student {} to group {}", student_id, target_group);

        let mut state = self.store.lock();
        let state: &mut RosterState = &mut state;

        if state.students.get_student(student_id).is_none() {
            return Err(RosterError::StudentNotFound(student_id.to_string()));
        }
        if !state.groups.group_exists(target_group) {
            return Err(RosterError::GroupNotFound(target_group.to_string()));
        }
        if state.registry.group_name_of(student_id) == Some(target_group) {
            return Err(RosterError::AlreadyInGroup {
                student_id: student_id.to_string(),
                group_name: target_group.to_string(),
            });
        }

        let previous = state.detach_student(student_id);
        if let Some(previous) = &previous {
            info!("Student {} removed from group {}", student_id, previous);
        }

        let RosterState {
            students,
            groups,
            registry,
            ..
        } = state;
        let student = students
            .get_student(student_id)
            .ok_or_else(|| RosterError::StudentNotFound(student_id.to_string()))?;

        let added = groups
            .get_group_mut(target_group)
            .map(|group| group.add_student(registry, student))
            .unwrap_or(false);
        if !added {
            if let Some(group) = previous.as_deref().and_then(|name| groups.get_group_mut(name)) {
                group.add_student(registry, student);
            }
            return Err(RosterError::MembershipRejected {
                student_id: student_id.to_string(),
                group_name: target_group.to_string(),
            });
        }

        info!("Student {} transferred to group {}", student_id, target_group);
        Ok(())
    }

    pub fn get_student(&self, student_id: &str) -> Option<Student> {
        self.store.lock().students.get_student(student_id).cloned()
    }

    /// All students in creation order
    pub fn list_students(&self) -> Vec<Student> {
        let state = self.store.lock();
        let students: Vec<Student> = state.students.list_students().into_iter().cloned().collect();
        debug!("Found {} students", students.len());
        students
    }

    pub fn find_by_index_number(&self, index_number: &str) -> Option<Student> {
        self.store
            .lock()
            .students
            .find_by_index_number(index_number)
            .cloned()
    }

    /// Name of the group the student belongs to, if any
    pub fn group_of(&self, student_id: &str) -> Result<Option<String>> {
        let state = self.store.lock();
        if state.students.get_student(student_id).is_none() {
            return Err(RosterError::StudentNotFound(student_id.to_string()));
        }
        Ok(state.registry.group_name_of(student_id).map(str::to_string))
    }

    pub fn add_grade(&self, student_id: &str, grade: f64) -> Result<()> {
        self.with_student_mut(student_id, |student| {
            student.add_grade(grade)?;
            info!("Grade {} added to student {}", grade, student.index_number());
            Ok(())
        })
    }

    /// Remove the grade at `position`; `Ok(false)` if out of range
    pub fn remove_grade(&self, student_id: &str, position: usize) -> Result<bool> {
        self.with_student_mut(student_id, |student| {
            let removed = student.remove_grade(position);
            if removed {
                info!(
                    "Grade at index {} removed from student {}",
                    position,
                    student.index_number()
                );
            }
            Ok(removed)
        })
    }

    pub fn remove_grade_value(&self, student_id: &str, value: f64) -> Result<bool> {
        self.with_student_mut(student_id, |student| {
            let removed = student.remove_grade_value(value);
            if removed {
                info!("Grade {} removed from student {}", value, student.index_number());
            }
            Ok(removed)
        })
    }

    pub fn clear_grades(&self, student_id: &str) -> Result<()> {
        self.with_student_mut(student_id, |student| {
            student.clear_grades();
            info!("All grades cleared from student {}", student.index_number());
            Ok(())
        })
    }

    /// Parse grades typed as free text, e.g. `"5.0, 4.5 3"`.
    ///
    /// Tokens are split on commas, semicolons and whitespace. Tokens that are
    /// not numbers are skipped; permitted values are checked later by
    /// `Student::add_grade`.
    pub fn parse_grades(text: &str) -> Vec<f64> {
        text.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .filter_map(|token| match token.parse::<f64>() {
                Ok(grade) => Some(grade),
                Err(_) => {
                    warn!("Invalid grade format: {}", token);
                    None
                }
            })
            .collect()
    }

    fn with_student_mut<T>(
        &self,
        student_id: &str,
        f: impl FnOnce(&mut Student) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.store.lock();
        let student = state
            .students
            .get_student_mut(student_id)
            .ok_or_else(|| RosterError::StudentNotFound(student_id.to_string()))?;
        f(student)
    }
}
