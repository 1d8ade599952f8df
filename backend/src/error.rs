use thiserror::Error;

/// Errors surfaced by the roster domain, storage and services
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid grade: {0}. Valid grades are: 2.0, 3.0, 3.5, 4.0, 4.5, 5.0")]
    InvalidGrade(f64),

    #[error("Invalid birth date '{value}', expected DD.MM.YYYY")]
    InvalidBirthDate { value: String },

    #[error("Student with index number '{0}' already exists")]
    DuplicateIndexNumber(String),

    #[error("Group with name '{0}' already exists")]
    DuplicateGroupName(String),

    #[error("Student not found: {0}")]
    StudentNotFound(String),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Student {student_id} is already in group '{group_name}'")]
    AlreadyInGroup {
        student_id: String,
        group_name: String,
    },

    #[error("Student {student_id} could not be added to group '{group_name}'")]
    MembershipRejected {
        student_id: String,
        group_name: String,
    },

    #[error("Malformed CSV line {line}: {message}")]
    CsvFormat { line: u64, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),
}

impl RosterError {
    pub fn validation(message: impl Into<String>) -> Self {
        RosterError::Validation {
            message: message.into(),
        }
    }

    /// Empty fields, bad grades and bad birth dates
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RosterError::Validation { .. }
                | RosterError::InvalidGrade(_)
                | RosterError::InvalidBirthDate { .. }
        )
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            RosterError::DuplicateIndexNumber(_) | RosterError::DuplicateGroupName(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RosterError::StudentNotFound(_) | RosterError::GroupNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
