use chrono::{Datelike, Local, NaiveDate};
use log::trace;
use serde::Serialize;
use shared::Gender;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, RosterError};

/// Birth dates are read and written in this pattern everywhere
pub const BIRTH_DATE_FORMAT: &str = "%d.%m.%Y";

const ID_WIDTH: usize = 7;

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identity block shared by every kind of person record.
///
/// The id is taken from a process-wide counter when the value is built and
/// never changes afterwards, so two `Person` values built from the same
/// fields still carry different ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Person {
    id: String,
    first_name: String,
    last_name: String,
    birth_date: NaiveDate,
    gender: Gender,
}

impl Person {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: &str,
        gender: Gender,
    ) -> Result<Self> {
        let birth_date = parse_birth_date(birth_date)?;
        let id = Self::generate_id();
        trace!("Generated person id {}", id);

        Ok(Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date,
            gender,
        })
    }

    /// Next id from the counter: base-36, upper-case, zero-padded to 7 chars
    pub fn generate_id() -> String {
        let value = ID_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{:0>width$}", to_base36(value), width = ID_WIDTH)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    /// Birth date in DD.MM.YYYY form
    pub fn birth_date_string(&self) -> String {
        self.birth_date.format(BIRTH_DATE_FORMAT).to_string()
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    /// Full years of age today
    pub fn age_years(&self) -> u32 {
        self.age_years_on(Local::now().date_naive())
    }

    /// Full years of age on the given day (0 for days before the birth date)
    pub fn age_years_on(&self, day: NaiveDate) -> u32 {
        let mut years = day.year() - self.birth_date.year();
        if (day.month(), day.day()) < (self.birth_date.month(), self.birth_date.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}, {})",
            self.first_name,
            self.last_name,
            self.birth_date_string(),
            self.gender
        )
    }
}

/// Parse a DD.MM.YYYY birth date
pub fn parse_birth_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), BIRTH_DATE_FORMAT).map_err(|_| {
        RosterError::InvalidBirthDate {
            value: value.to_string(),
        }
    })
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.iter().rev().map(|&d| d as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base36_rendering() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(46_655), "ZZZ");
    }

    #[test]
    fn test_generated_ids_are_padded_and_increasing() {
        let first = Person::generate_id();
        let second = Person::generate_id();

        assert_eq!(first.len(), 7);
        assert_eq!(second.len(), 7);
        assert!(first.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        // Zero padding keeps lexical order equal to numeric order
        assert!(second > first);
    }

    #[test]
    fn test_new_person_parses_birth_date() {
        let person = Person::new("Anna", "Nowak", "05.03.2001", Gender::Female).unwrap();
        assert_eq!(person.birth_date(), NaiveDate::from_ymd_opt(2001, 3, 5).unwrap());
        assert_eq!(person.birth_date_string(), "05.03.2001");
        assert_eq!(person.to_string(), "Anna Nowak (05.03.2001, FEMALE)");
    }

    #[test]
    fn test_identical_fields_get_distinct_ids() {
        let a = Person::new("Jan", "Kowalski", "01.01.2000", Gender::Male).unwrap();
        let b = Person::new("Jan", "Kowalski", "01.01.2000", Gender::Male).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_invalid_birth_date() {
        for bad in ["2001-03-05", "32.01.2000", "", "05/03/2001"] {
            let err = Person::new("Anna", "Nowak", bad, Gender::Female).unwrap_err();
            assert!(matches!(err, RosterError::InvalidBirthDate { .. }), "{}", bad);
        }
    }

    #[test]
    fn test_age_years_on() {
        let person = Person::new("Anna", "Nowak", "15.06.2000", Gender::Female).unwrap();
        let day_before = NaiveDate::from_ymd_opt(2020, 6, 14).unwrap();
        let birthday = NaiveDate::from_ymd_opt(2020, 6, 15).unwrap();
        assert_eq!(person.age_years_on(day_before), 19);
        assert_eq!(person.age_years_on(birthday), 20);
        assert_eq!(person.age_years_on(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()), 0);
    }
}
