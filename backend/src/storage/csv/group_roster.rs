//! Per-group roster files: the members of one group, without gender.
//!
//! Unlike the other codecs this one is strict. A record that does not have
//! exactly six fields, carries a bad birth date or cannot be read at all
//! fails the whole decode with `RosterError::CsvFormat`.

use log::info;
use shared::Gender;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use super::{
    apply_grades, check_fields, format_grades, read_records, record_writer, write_atomically,
    DecodeReport, DecodedStudent, Delimiter,
};
use crate::domain::models::Student;
use crate::error::{Result, RosterError};

const ROSTER_FIELDS: usize = 6;

/// Write one `id;index;first;last;birthDate;[grades]` line per student
pub fn encode_roster<'a, W, I>(writer: W, students: I, delimiter: Delimiter) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Student>,
{
    let mut csv_writer = record_writer(writer, delimiter);
    let mut written = 0;

    for student in students {
        let birth_date = student.birth_date_string();
        let grades = format_grades(student.grades());
        let fields = [
            student.id(),
            student.index_number(),
            student.first_name(),
            student.last_name(),
            birth_date.as_str(),
            grades.as_str(),
        ];
        check_fields(&fields, delimiter);
        csv_writer.write_record(fields)?;
        written += 1;
    }

    csv_writer.flush()?;
    Ok(written)
}

/// Decode a roster. Students get gender OTHER since the format has none.
pub fn decode_roster<R: Read>(
    reader: R,
    delimiter: Delimiter,
) -> Result<DecodeReport<DecodedStudent>> {
    let records = read_records(reader, delimiter, |line, e| {
        Err(RosterError::CsvFormat {
            line,
            message: format!("unreadable record: {}", e),
        })
    })?;

    let mut report = DecodeReport::default();
    for record in records {
        let line = record.line;
        let fields = &record.fields;

        if fields.len() != ROSTER_FIELDS {
            return Err(RosterError::CsvFormat {
                line,
                message: format!(
                    "expected {} fields, found {}: {}",
                    ROSTER_FIELDS,
                    fields.len(),
                    record.text(delimiter)
                ),
            });
        }

        let mut student = Student::new(&fields[2], &fields[3], &fields[4], Gender::Other, &fields[1])
            .map_err(|e| RosterError::CsvFormat {
                line,
                message: e.to_string(),
            })?;
        apply_grades(&mut student, &fields[5], line, &mut report);

        report.records.push(DecodedStudent {
            source_id: fields[0].clone(),
            student,
        });
    }

    Ok(report)
}

pub fn export_roster<'a, I>(path: &Path, students: I, delimiter: Delimiter) -> Result<usize>
where
    I: IntoIterator<Item = &'a Student>,
{
    let mut buffer = Vec::new();
    let written = encode_roster(&mut buffer, students, delimiter)?;
    write_atomically(path, &buffer)?;
    info!("Exported {} roster lines to {:?}", written, path);
    Ok(written)
}

pub fn import_roster(path: &Path, delimiter: Delimiter) -> Result<DecodeReport<DecodedStudent>> {
    let file = File::open(path)?;
    decode_roster(BufReader::new(file), delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;

    #[test]
    fn test_encode_line_shape() {
        let mut anna = Student::new("Anna", "Nowak", "05.03.2001", Gender::Female, "S1").unwrap();
        anna.add_grade(4.5).unwrap();

        let mut out = Vec::new();
        encode_roster(&mut out, [&anna], Delimiter::DEFAULT).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("{};S1;Anna;Nowak;05.03.2001;[4.5]\n", anna.id())
        );
    }

    #[test]
    fn test_decode_defaults_gender_to_other() {
        let data = "0000001;S1;Anna;Nowak;05.03.2001;[5.0,4.0]\n0000002;S2;Piotr;Zielinski;01.01.2000;[]\n";
        let report = decode_roster(data.as_bytes(), Delimiter::DEFAULT).unwrap();

        assert_eq!(report.records.len(), 2);
        assert!(report
            .records
            .iter()
            .all(|d| d.student.gender() == Gender::Other));
        assert_eq!(report.records[0].student.grades(), &[5.0, 4.0]);
        assert_eq!(report.records[1].source_id, "0000002");
    }

    #[test]
    fn test_wrong_field_count_fails_whole_decode() {
        let data = "0000001;S1;Anna;Nowak;05.03.2001;[5.0]\n0000002;S2;Piotr;Zielinski;01.01.2000\n";
        let err = decode_roster(data.as_bytes(), Delimiter::DEFAULT).unwrap_err();

        match err {
            RosterError::CsvFormat { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("expected 6 fields, found 5"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_utf8_line_fails_whole_decode() {
        let data: &[u8] =
            b"0000001;S1;Anna;Nowak;05.03.2001;[5.0]\n0000002;S2;\xff\xfe;Zielinski;01.01.2000;[]\n";
        let err = decode_roster(data, Delimiter::DEFAULT).unwrap_err();

        match err {
            RosterError::CsvFormat { line, message } => {
                assert_eq!(line, 2);
                assert!(message.starts_with("unreadable record"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_student_file_line_is_rejected() {
        let data = "0000001;S1;Anna;Nowak;05.03.2001;FEMALE;[5.0]\n";
        let err = decode_roster(data.as_bytes(), Delimiter::DEFAULT).unwrap_err();
        assert!(matches!(err, RosterError::CsvFormat { line: 1, .. }));
    }

    #[test]
    fn test_bad_birth_date_fails() {
        let data = "0000001;S1;Anna;Nowak;31.02.2001;[]\n";
        let err = decode_roster(data.as_bytes(), Delimiter::DEFAULT).unwrap_err();
        assert!(matches!(err, RosterError::CsvFormat { .. }));
    }

    #[test]
    fn test_bad_grade_is_only_a_warning() {
        let data = "0000001;S1;Anna;Nowak;05.03.2001;[5.0,1.0]\n";
        let report = decode_roster(data.as_bytes(), Delimiter::DEFAULT).unwrap();

        assert_eq!(report.records[0].student.grades(), &[5.0]);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_export_and_import_file() {
        let env = TestEnvironment::new().unwrap();
        let path = env.path("g1.csv");
        let anna = Student::new("Anna", "Nowak", "05.03.2001", Gender::Female, "S1").unwrap();

        assert_eq!(export_roster(&path, [&anna], Delimiter::DEFAULT).unwrap(), 1);
        let report = import_roster(&path, Delimiter::DEFAULT).unwrap();
        assert_eq!(report.records[0].student.index_number(), "S1");
    }
}
