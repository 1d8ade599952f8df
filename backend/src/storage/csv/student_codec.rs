use log::info;
use shared::Gender;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use super::{
    apply_grades, check_fields, format_grades, read_records, record_writer, write_atomically,
    DecodeReport, Delimiter,
};
use crate::domain::models::Student;
use crate::error::Result;

const STUDENT_FIELDS: usize = 7;

/// A student rebuilt from a file line. The student carries a freshly
/// generated id; `source_id` is the id the line was written with.
#[derive(Debug, Clone)]
pub struct DecodedStudent {
    pub source_id: String,
    pub student: Student,
}

/// Write one `id;index;first;last;birthDate;GENDER;[grades]` line per student
pub fn encode_students<'a, W, I>(writer: W, students: I, delimiter: Delimiter) -> Result<usize>
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
            student.gender().as_str(),
            grades.as_str(),
        ];
        check_fields(&fields, delimiter);
        csv_writer.write_record(fields)?;
        written += 1;
    }

    csv_writer.flush()?;
    Ok(written)
}

/// Lenient decode: records with fewer than 7 fields, an unparseable birth
/// date or an unknown gender are skipped; bad grade tokens are dropped.
/// Fields past the seventh are ignored.
pub fn decode_students<R: Read>(
    reader: R,
    delimiter: Delimiter,
) -> Result<DecodeReport<DecodedStudent>> {
    let mut report = DecodeReport::default();
    let mut unreadable = Vec::new();
    let records = read_records(reader, delimiter, |line, e| {
        unreadable.push((line, e.to_string()));
        Ok(())
    })?;
    for (line, message) in unreadable {
        report.skip_record(line, format!("unreadable record: {}", message));
    }

    for record in records {
        let line = record.line;
        let fields = &record.fields;

        if fields.len() < STUDENT_FIELDS {
            report.skip_record(
                line,
                format!(
                    "expected {} fields, found {}: {}",
                    STUDENT_FIELDS,
                    fields.len(),
                    record.text(delimiter)
                ),
            );
            continue;
        }

        let gender = match fields[5].parse::<Gender>() {
            Ok(gender) => gender,
            Err(e) => {
                report.skip_record(line, e);
                continue;
            }
        };

        let mut student =
            match Student::new(&fields[2], &fields[3], &fields[4], gender, &fields[1]) {
                Ok(student) => student,
                Err(e) => {
                    report.skip_record(line, e.to_string());
                    continue;
                }
            };
        apply_grades(&mut student, &fields[6], line, &mut report);

        report.records.push(DecodedStudent {
            source_id: fields[0].clone(),
            student,
        });
    }

    Ok(report)
}

/// Export students to `path`, returning how many lines were written
pub fn save_students<'a, I>(path: &Path, students: I, delimiter: Delimiter) -> Result<usize>
where
    I: IntoIterator<Item = &'a Student>,
{
    let mut buffer = Vec::new();
    let written = encode_students(&mut buffer, students, delimiter)?;
    write_atomically(path, &buffer)?;
    info!("Saved {} students to {:?}", written, path);
    Ok(written)
}

/// Decode the students in `path`; a missing or unreadable file is an error
pub fn load_students(path: &Path, delimiter: Delimiter) -> Result<DecodeReport<DecodedStudent>> {
    let file = File::open(path)?;
    let report = decode_students(BufReader::new(file), delimiter)?;
    info!(
        "Decoded {} students from {:?} ({} warnings)",
        report.records.len(),
        path,
        report.warnings.len()
    );
    Ok(report)
}
