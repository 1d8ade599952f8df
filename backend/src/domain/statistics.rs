//! Orderings and summary figures over a set of students.

use serde::Serialize;
use std::cmp::Ordering;

use crate::domain::models::Student;

/// Summary of a group's grade averages.
///
/// `average` and `median` are taken over the per-student averages of members
/// that have at least one grade; both are `None` when no member does.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStatistics {
    pub member_count: usize,
    pub graded_count: usize,
    pub average: Option<f64>,
    pub median: Option<f64>,
}

impl GroupStatistics {
    pub fn from_members(members: &[Student]) -> Self {
        let mut averages: Vec<f64> = members.iter().filter_map(Student::average).collect();
        averages.sort_by(f64::total_cmp);

        let average = if averages.is_empty() {
            None
        } else {
            Some(averages.iter().sum::<f64>() / averages.len() as f64)
        };

        Self {
            member_count: members.len(),
            graded_count: averages.len(),
            average,
            median: median_of_sorted(&averages),
        }
    }
}

fn median_of_sorted(values: &[f64]) -> Option<f64> {
    let len = values.len();
    match len {
        0 => None,
        _ if len % 2 == 1 => Some(values[len / 2]),
        _ => Some((values[len / 2 - 1] + values[len / 2]) / 2.0),
    }
}

/// Last name, then first name
pub fn sort_by_name(students: &mut [Student]) {
    students.sort_by(|a, b| {
        a.last_name()
            .cmp(b.last_name())
            .then_with(|| a.first_name().cmp(b.first_name()))
    });
}

/// Highest average first; students without grades go last
pub fn sort_by_average_desc(students: &mut [Student]) {
    students.sort_by(|a, b| compare_average_desc(a.average(), b.average()));
}

/// Youngest first
pub fn sort_by_age(students: &mut [Student]) {
    students.sort_by(|a, b| b.birth_date().cmp(&a.birth_date()));
}

/// The `n` best students by average. Students without grades are not ranked.
pub fn top_by_average(students: &[Student], n: usize) -> Vec<Student> {
    let mut ranked: Vec<Student> = students
        .iter()
        .filter(|s| s.average().is_some())
        .cloned()
        .collect();
    sort_by_average_desc(&mut ranked);
    ranked.truncate(n);
    ranked
}

fn compare_average_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
