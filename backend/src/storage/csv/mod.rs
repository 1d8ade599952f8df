//! # CSV Storage Module
//!
//! Line-oriented, delimiter-separated persistence for students and groups.
//!
//! ## File Formats
//!
//! No header line, no quoting. The delimiter defaults to `;`.
//!
//! ```text
//! students:     id;indexNumber;firstName;lastName;DD.MM.YYYY;GENDER;[g1,g2,...]
//! groups:       name;description;[id1,id2,...]
//! group roster: id;indexNumber;firstName;lastName;DD.MM.YYYY;[g1,g2,...]
//! ```
//!
//! Grades are written with one decimal place and a `.` separator. Field values
//! must not contain the delimiter, and list values must not contain `[`, `]`
//! or `,`; such values are written anyway (with a warning) and will not read
//! back intact.
//!
//! ## Recovery Policies
//!
//! - **Lenient** (`student_codec`, `group_codec`): malformed records, bad
//!   dates, unknown genders and unresolved member ids are skipped and reported
//!   as warnings; the rest of the file still loads.
//! - **Strict** (`group_roster`): any malformed record aborts the whole decode
//!   with `RosterError::CsvFormat`. Bad grade tokens remain warnings.
//!
//! Exports write to a temp file and rename it over the target.

pub mod group_codec;
pub mod group_roster;
pub mod student_codec;

#[cfg(test)]
pub mod test_utils;

pub use group_codec::{decode_groups, encode_groups, load_groups, save_groups, DecodedGroup};
pub use group_roster::{decode_roster, encode_roster, export_roster, import_roster};
pub use student_codec::{
    decode_students, encode_students, load_students, save_students, DecodedStudent,
};

use log::{debug, warn};
use std::fmt;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::domain::models::Student;
use crate::error::{Result, RosterError};

/// Field separator for the delimited files (a single ASCII character)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter(u8);

impl Delimiter {
    pub const DEFAULT: Delimiter = Delimiter(b';');

    /// Accepts exactly one ASCII punctuation, space or tab character other
    /// than the list syntax characters `[`, `]`, `,` and quotes.
    pub fn parse(value: &str) -> Result<Self> {
        if value.chars().count() != 1 {
            return Err(RosterError::validation(format!(
                "Only single-character delimiters are supported, got '{}'",
                value.escape_debug()
            )));
        }
        let byte = value.as_bytes()[0];
        let allowed = value.is_ascii()
            && (byte.is_ascii_punctuation() || byte == b' ' || byte == b'\t')
            && !matches!(byte, b'[' | b']' | b',' | b'"' | b'\'');
        if !allowed {
            return Err(RosterError::validation(format!(
                "Delimiter '{}' is not allowed",
                value.escape_debug()
            )));
        }
        Ok(Delimiter(byte))
    }

    pub fn as_byte(self) -> u8 {
        self.0
    }

    pub fn as_char(self) -> char {
        self.0 as char
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// The whole record was dropped
    RecordSkipped,
    /// One value inside an otherwise usable record was dropped
    ValueSkipped,
}

/// Something the lenient decoders dropped instead of failing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvWarning {
    pub line: u64,
    pub kind: WarningKind,
    pub message: String,
}

impl fmt::Display for CsvWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Decoded records plus whatever was skipped on the way
#[derive(Debug, Clone)]
pub struct DecodeReport<T> {
    pub records: Vec<T>,
    pub warnings: Vec<CsvWarning>,
}

impl<T> Default for DecodeReport<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<T> DecodeReport<T> {
    pub fn skip_record(&mut self, line: u64, message: impl Into<String>) {
        let message = message.into();
        warn!("Skipping record at line {}: {}", line, message);
        self.warnings.push(CsvWarning {
            line,
            kind: WarningKind::RecordSkipped,
            message,
        });
    }

    pub fn skip_value(&mut self, line: u64, message: impl Into<String>) {
        let message = message.into();
        warn!("Skipping value at line {}: {}", line, message);
        self.warnings.push(CsvWarning {
            line,
            kind: WarningKind::ValueSkipped,
            message,
        });
    }

    /// Number of records dropped entirely
    pub fn rejected_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| w.kind == WarningKind::RecordSkipped)
            .count()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// One non-blank record of a delimited file
pub(crate) struct RawRecord {
    pub line: u64,
    pub fields: Vec<String>,
}

impl RawRecord {
    /// The record as it appeared in the file (modulo field trimming)
    pub fn text(&self, delimiter: Delimiter) -> String {
        self.fields.join(&delimiter.to_string())
    }
}

/// Read every non-blank record. Undecodable records (e.g. invalid UTF-8) are
/// handed to `on_unreadable`; I/O failures abort.
pub(crate) fn read_records<R: Read>(
    reader: R,
    delimiter: Delimiter,
    mut on_unreadable: impl FnMut(u64, &csv::Error) -> Result<()>,
) -> Result<Vec<RawRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter.as_byte())
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                on_unreadable(line, &e)?;
                continue;
            }
        };
        if record.iter().all(str::is_empty) && record.len() <= 1 {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        records.push(RawRecord {
            line,
            fields: record.iter().map(str::to_string).collect(),
        });
    }
    Ok(records)
}

/// Writer configured for the unquoted, headerless format
pub(crate) fn record_writer<W: Write>(writer: W, delimiter: Delimiter) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(delimiter.as_byte())
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer)
}

/// Warn about values that cannot survive a round trip through the format
pub(crate) fn check_fields(fields: &[&str], delimiter: Delimiter) {
    for field in fields {
        if field.contains(delimiter.as_char()) || field.contains('\n') {
            warn!(
                "Field '{}' contains the delimiter '{}' or a line break and will not read back intact",
                field, delimiter
            );
        }
    }
}

/// `[a,b,c]`
pub(crate) fn format_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
    format!("[{}]", joined.join(","))
}

/// Items of a bracketed list, or `None` when the value is not bracketed
pub(crate) fn split_list(value: &str) -> Option<Vec<&str>> {
    let inner = value.strip_prefix('[')?.strip_suffix(']')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    Some(inner.split(',').map(str::trim).collect())
}

pub(crate) fn format_grades(grades: &[f64]) -> String {
    format_list(grades.iter().map(|g| format!("{:.1}", g)))
}

/// Add the grades of a bracketed grade list to `student`. Tokens that are not
/// numbers or not permitted grades are skipped with a warning.
pub(crate) fn apply_grades<T>(
    student: &mut Student,
    value: &str,
    line: u64,
    report: &mut DecodeReport<T>,
) {
    let Some(tokens) = split_list(value) else {
        report.skip_value(line, format!("grades '{}' are not a bracketed list", value));
        return;
    };
    for token in tokens {
        match token.parse::<f64>() {
            Ok(grade) => {
                if let Err(e) = student.add_grade(grade) {
                    report.skip_value(line, format!("invalid grade '{}': {}", token, e));
                }
            }
            Err(_) => report.skip_value(line, format!("invalid grade '{}'", token)),
        }
    }
}

/// Replace `path` with `contents` via a sibling temp file
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = match path.extension() {
        Some(ext) => path.with_extension(format!("{}.tmp", ext.to_string_lossy())),
        None => path.with_extension("tmp"),
    };
    fs::write(&temp_path, contents)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}
