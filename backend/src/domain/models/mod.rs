pub mod group;
pub mod person;
pub mod student;

pub use group::Group;
pub use person::{parse_birth_date, Person, BIRTH_DATE_FORMAT};
pub use student::{is_valid_grade, Student, VALID_GRADES};
