use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gender of a person, rendered upper-case in persisted files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MALE" => Ok(Gender::Male),
            "FEMALE" => Ok(Gender::Female),
            "OTHER" => Ok(Gender::Other),
            _ => Err(format!("Invalid gender: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStudentRequest {
    pub first_name: String,
    pub last_name: String,
    /// Birth date in DD.MM.YYYY format
    pub birth_date: String,
    pub gender: Gender,
    /// Externally assigned index number, unique among students
    pub index_number: String,
    /// Initial grades; every value must be one of the permitted grades
    #[serde(default)]
    pub grades: Vec<f64>,
    /// Group to join right after creation (ignored if the group does not exist)
    #[serde(default)]
    pub group_name: Option<String>,
}

/// Replacement values for an existing student. Grades and group membership
/// carry over from the student being replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStudentRequest {
    pub first_name: String,
    pub last_name: String,
    /// Birth date in DD.MM.YYYY format
    pub birth_date: String,
    pub gender: Gender,
    pub index_number: String,
}

/// Outcome of a CSV import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsvImportResult {
    /// Records inserted into the repository
    pub items_added: usize,
    /// Memberships created while importing
    pub items_added_to_group: usize,
    /// Records skipped because the key was already taken
    pub items_skipped: usize,
    /// Records dropped as malformed
    pub items_rejected: usize,
    /// Human-readable warnings collected while decoding and applying records
    pub warnings: Vec<String>,
}

impl CsvImportResult {
    pub fn message(&self) -> String {
        let mut message = if self.items_added_to_group > 0 {
            format!(
                "Loaded {} item(s), added {} to group (skipped {} duplicate(s))",
                self.items_added, self.items_added_to_group, self.items_skipped
            )
        } else {
            format!(
                "Loaded {} item(s) (skipped {} duplicate(s))",
                self.items_added, self.items_skipped
            )
        };
        if self.items_rejected > 0 {
            message.push_str(&format!(", rejected {} malformed record(s)", self.items_rejected));
        }
        message
    }
}
