use chrono::NaiveDate;
use log::{debug, error, trace};
use serde::Serialize;
use shared::Gender;
use std::fmt;

use super::person::Person;
use crate::error::{Result, RosterError};

/// The only grade values a student can hold
pub const VALID_GRADES: [f64; 6] = [2.0, 3.0, 3.5, 4.0, 4.5, 5.0];

pub fn is_valid_grade(value: f64) -> bool {
    VALID_GRADES.contains(&value)
}

/// A person enrolled with an index number and an ordered grade list.
///
/// Identity fields are fixed at construction. Editing a student means building
/// a replacement value (which receives a fresh id), see
/// `StudentService::update_student`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Student {
    person: Person,
    index_number: String,
    grades: Vec<f64>,
}

impl Student {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: &str,
        gender: Gender,
        index_number: impl Into<String>,
    ) -> Result<Self> {
        let person = Person::new(first_name, last_name, birth_date, gender)?;
        let student = Self {
            person,
            index_number: index_number.into(),
            grades: Vec::new(),
        };
        debug!(
            "New student created: index={} personId={}",
            student.index_number,
            student.id()
        );
        Ok(student)
    }

    pub fn person(&self) -> &Person {
        &self.person
    }

    pub fn id(&self) -> &str {
        self.person.id()
    }

    pub fn first_name(&self) -> &str {
        self.person.first_name()
    }

    pub fn last_name(&self) -> &str {
        self.person.last_name()
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.person.birth_date()
    }

    pub fn birth_date_string(&self) -> String {
        self.person.birth_date_string()
    }

    pub fn gender(&self) -> Gender {
        self.person.gender()
    }

    pub fn age_years(&self) -> u32 {
        self.person.age_years()
    }

    pub fn index_number(&self) -> &str {
        &self.index_number
    }

    pub fn grades(&self) -> &[f64] {
        &self.grades
    }

    /// Append a grade; only the values in `VALID_GRADES` are accepted
    pub fn add_grade(&mut self, grade: f64) -> Result<()> {
        if !is_valid_grade(grade) {
            error!(
                "Attempt to add invalid grade={} for student index={}",
                grade, self.index_number
            );
            return Err(RosterError::InvalidGrade(grade));
        }
        self.grades.push(grade);
        debug!(
            "Added grade={} to student index={} (now {} grades)",
            grade,
            self.index_number,
            self.grades.len()
        );
        Ok(())
    }

    /// Remove the grade at `position`; out-of-range positions leave the list alone
    pub fn remove_grade(&mut self, position: usize) -> bool {
        if position >= self.grades.len() {
            return false;
        }
        let removed = self.grades.remove(position);
        debug!(
            "Removed grade={} at position {} from student index={}",
            removed, position, self.index_number
        );
        true
    }

    /// Remove the first grade equal to `value`
    pub fn remove_grade_value(&mut self, value: f64) -> bool {
        match self.grades.iter().position(|&g| g == value) {
            Some(position) => self.remove_grade(position),
            None => false,
        }
    }

    pub fn clear_grades(&mut self) {
        self.grades.clear();
        debug!("Cleared grades of student index={}", self.index_number);
    }

    /// Arithmetic mean of the grades, `None` when there are none
    pub fn average(&self) -> Option<f64> {
        if self.grades.is_empty() {
            trace!("Computed average for index={}: no grades", self.index_number);
            return None;
        }
        let avg = self.grades.iter().sum::<f64>() / self.grades.len() as f64;
        trace!("Computed average for index={}: {}", self.index_number, avg);
        Some(avg)
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [index={}]", self.person, self.index_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Student {
        Student::new("Anna", "Nowak", "05.03.2001", Gender::Female, "S1").unwrap()
    }

    #[test]
    fn test_new_student_has_no_grades() {
        let s = student();
        assert_eq!(s.index_number(), "S1");
        assert!(s.grades().is_empty());
        assert_eq!(s.average(), None);
        assert_eq!(s.to_string(), "Anna Nowak (05.03.2001, FEMALE) [index=S1]");
    }

    #[test]
    fn test_add_grade_accepts_only_valid_values() {
        let mut s = student();
        s.add_grade(4.5).unwrap();
        assert_eq!(s.grades(), &[4.5]);

        let err = s.add_grade(3.3).unwrap_err();
        assert!(matches!(err, RosterError::InvalidGrade(g) if g == 3.3));
        assert!(err.is_validation());
        assert_eq!(s.grades(), &[4.5]);

        for bad in [0.0, 1.0, 2.5, 5.5, 6.0, f64::NAN] {
            assert!(s.add_grade(bad).is_err());
        }
        assert_eq!(s.grades().len(), 1);
    }

    #[test]
    fn test_average() {
        let mut s = student();
        for g in [5.0, 4.0, 3.5] {
            s.add_grade(g).unwrap();
        }
        let avg = s.average().unwrap();
        assert!((avg - 4.1666666).abs() < 1e-6);
    }

    #[test]
    fn test_remove_grade_by_position() {
        let mut s = student();
        s.add_grade(2.0).unwrap();
        s.add_grade(3.0).unwrap();

        assert!(!s.remove_grade(2));
        assert!(s.remove_grade(0));
        assert_eq!(s.grades(), &[3.0]);
    }

    #[test]
    fn test_remove_grade_value_removes_first_match() {
        let mut s = student();
        for g in [4.0, 5.0, 4.0] {
            s.add_grade(g).unwrap();
        }
        assert!(s.remove_grade_value(4.0));
        assert_eq!(s.grades(), &[5.0, 4.0]);
        assert!(!s.remove_grade_value(2.0));
    }

    #[test]
    fn test_clear_grades() {
        let mut s = student();
        s.add_grade(5.0).unwrap();
        s.clear_grades();
        assert!(s.grades().is_empty());
        assert_eq!(s.average(), None);
    }
}
