use log::info;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use super::{
    check_fields, format_list, read_records, record_writer, split_list, write_atomically,
    DecodeReport, Delimiter,
};
use crate::domain::models::Group;
use crate::error::Result;

const GROUP_FIELDS: usize = 3;

/// A group line with its member ids already resolved to live students
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedGroup {
    pub name: String,
    pub description: String,
    pub member_ids: Vec<String>,
}

/// Write one `name;description;[id1,id2,...]` line per group
pub fn encode_groups<'a, W, I>(writer: W, groups: I, delimiter: Delimiter) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Group>,
{
    let mut csv_writer = record_writer(writer, delimiter);
    let mut written = 0;

    for group in groups {
        let members = format_list(group.members());
        let fields = [group.name(), group.description(), members.as_str()];
        check_fields(&fields, delimiter);
        csv_writer.write_record(fields)?;
        written += 1;
    }

    csv_writer.flush()?;
    Ok(written)
}

/// Lenient decode. Each member id goes through `resolve`, which maps it to
/// the id of a live student; ids it cannot resolve are dropped with a
/// warning. Lines without exactly three fields, or with an empty name, are
/// skipped.
pub fn decode_groups<R, F>(
    reader: R,
    delimiter: Delimiter,
    resolve: F,
) -> Result<DecodeReport<DecodedGroup>>
where
    R: Read,
    F: Fn(&str) -> Option<String>,
{
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

        if fields.len() != GROUP_FIELDS {
            report.skip_record(
                line,
                format!(
                    "expected {} fields, found {}: {}",
                    GROUP_FIELDS,
                    fields.len(),
                    record.text(delimiter)
                ),
            );
            continue;
        }
        if fields[0].is_empty() {
            report.skip_record(line, "group name is empty");
            continue;
        }

        let mut member_ids = Vec::new();
        match split_list(&fields[2]) {
            Some(ids) => {
                for id in ids {
                    match resolve(id) {
                        Some(resolved) => member_ids.push(resolved),
                        None => report.skip_value(
                            line,
                            format!("student {} not found for group {}", id, fields[0]),
                        ),
                    }
                }
            }
            None => report.skip_value(
                line,
                format!("members '{}' are not a bracketed list", fields[2]),
            ),
        }

        report.records.push(DecodedGroup {
            name: fields[0].clone(),
            description: fields[1].clone(),
            member_ids,
        });
    }

    Ok(report)
}

pub fn save_groups<'a, I>(path: &Path, groups: I, delimiter: Delimiter) -> Result<usize>
where
    I: IntoIterator<Item = &'a Group>,
{
    let mut buffer = Vec::new();
    let written = encode_groups(&mut buffer, groups, delimiter)?;
    write_atomically(path, &buffer)?;
    info!("Saved {} groups to {:?}", written, path);
    Ok(written)
}

pub fn load_groups<F>(
    path: &Path,
    delimiter: Delimiter,
    resolve: F,
) -> Result<DecodeReport<DecodedGroup>>
where
    F: Fn(&str) -> Option<String>,
{
    let file = File::open(path)?;
    let report = decode_groups(BufReader::new(file), delimiter, resolve)?;
    info!(
        "Decoded {} groups from {:?} ({} warnings)",
        report.records.len(),
        path,
        report.warnings.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::group_registry::GroupRegistry;
    use crate::domain::models::Student;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::csv::WarningKind;
    use shared::Gender;

    fn known(ids: &'static [&'static str]) -> impl Fn(&str) -> Option<String> {
        move |id| ids.iter().any(|known| *known == id).then(|| id.to_string())
    }

    #[test]
    fn test_encode_line_shape() {
        let mut registry = GroupRegistry::new();
        let anna = Student::new("Anna", "Nowak", "05.03.2001", Gender::Female, "S1").unwrap();
        let mut group = Group::new("G1", "Java Monday");
        group.add_student(&mut registry, &anna);

        let mut out = Vec::new();
        encode_groups(&mut out, [&group, &Group::new("G2", "Empty")], Delimiter::DEFAULT).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, format!("G1;Java Monday;[{}]\nG2;Empty;[]\n", anna.id()));
    }

    #[test]
    fn test_decode_resolves_members() {
        let data = "G1;Java Monday;[A1,A2]\nG2;Rust Friday;[]\n";
        let report =
            decode_groups(data.as_bytes(), Delimiter::DEFAULT, known(&["A1", "A2"])).unwrap();

        assert!(report.warnings.is_empty());
        assert_eq!(
            report.records,
            vec![
                DecodedGroup {
                    name: "G1".into(),
                    description: "Java Monday".into(),
                    member_ids: vec!["A1".into(), "A2".into()],
                },
                DecodedGroup {
                    name: "G2".into(),
                    description: "Rust Friday".into(),
                    member_ids: vec![],
                },
            ]
        );
    }

    #[test]
    fn test_resolver_can_map_ids() {
        let data = "G1;Java Monday;[OLD]\n";
        let report = decode_groups(data.as_bytes(), Delimiter::DEFAULT, |id| {
            (id == "OLD").then(|| "NEW".to_string())
        })
        .unwrap();

        assert_eq!(report.records[0].member_ids, vec!["NEW".to_string()]);
    }

    #[test]
    fn test_unknown_member_is_dropped_with_warning() {
        let data = "G1;Java Monday;[A1,ZZZ]\n";
        let report = decode_groups(data.as_bytes(), Delimiter::DEFAULT, known(&["A1"])).unwrap();

        assert_eq!(report.records[0].member_ids, vec!["A1".to_string()]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::ValueSkipped);
        assert!(report.warnings[0].message.contains("ZZZ"));
    }

    #[test]
    fn test_wrong_field_count_is_skipped() {
        let data = "G1;Java Monday\nG2;Rust;[];extra\nG3;Go Wednesday;[]\n;No name;[]\n";
        let report = decode_groups(data.as_bytes(), Delimiter::DEFAULT, known(&[])).unwrap();

        let names: Vec<&str> = report.records.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["G3"]);
        assert_eq!(report.rejected_count(), 3);
    }

    #[test]
    fn test_unbracketed_members_keep_group() {
        let data = "G1;Java Monday;A1\n";
        let report = decode_groups(data.as_bytes(), Delimiter::DEFAULT, known(&["A1"])).unwrap();

        assert_eq!(report.records.len(), 1);
        assert!(report.records[0].member_ids.is_empty());
        assert_eq!(report.warnings[0].kind, WarningKind::ValueSkipped);
    }

    #[test]
    fn test_save_and_load_file() {
        let env = TestEnvironment::new().unwrap();
        let path = env.path("groups.csv");
        let groups = vec![Group::new("G1", "Java Monday"), Group::new("G2", "Rust Friday")];

        assert_eq!(save_groups(&path, &groups, Delimiter::DEFAULT).unwrap(), 2);
        assert_eq!(env.read_file("groups.csv").unwrap(), "G1;Java Monday;[]\nG2;Rust Friday;[]\n");

        let report = load_groups(&path, Delimiter::DEFAULT, known(&[])).unwrap();
        assert_eq!(report.records.len(), 2);
    }
}
