use log::{debug, error, info, warn};
use shared::CsvImportResult;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::domain::models::Group;
use crate::error::{Result, RosterError};
use crate::storage::csv::{self, DecodeReport, DecodedStudent, Delimiter};
use crate::storage::traits::{GroupStorage, StudentStorage};
use crate::storage::{RosterState, RosterStore};

/// Service for importing and exporting the roster as delimited text files
#[derive(Clone)]
pub struct CsvService {
    store: RosterStore,
    delimiter: Delimiter,
    students_file: PathBuf,
    groups_file: PathBuf,
}

impl CsvService {
    /// Fails if the configured delimiter is not usable
    pub fn new(store: RosterStore, config: &AppConfig) -> Result<Self> {
        Ok(Self::from_parts(store, config.delimiter()?, config))
    }

    pub(crate) fn from_parts(store: RosterStore, delimiter: Delimiter, config: &AppConfig) -> Self {
        Self {
            store,
            delimiter,
            students_file: config.students_file.clone(),
            groups_file: config.groups_file.clone(),
        }
    }

    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    pub fn set_delimiter(&mut self, delimiter: Delimiter) {
        info!("CSV delimiter changed from '{}' to '{}'", self.delimiter, delimiter);
        self.delimiter = delimiter;
    }

    pub fn students_file(&self) -> &Path {
        &self.students_file
    }

    pub fn groups_file(&self) -> &Path {
        &self.groups_file
    }

    /// Lenient student import.
    ///
    /// Malformed records are skipped and counted as rejected; students whose
    /// index number is already taken are counted as skipped. Each file id is
    /// remembered against the live student it ended up as, so a groups file
    /// saved alongside can find its members again; mappings from an earlier
    /// import are dropped first. With `group_name`, every added student also
    /// joins that group, which must exist.
    pub fn load_students(&self, path: &Path, group_name: Option<&str>) -> Result<CsvImportResult> {
        info!("Loading students from CSV: {:?}", path);

        let group_name = group_name.map(str::trim).filter(|name| !name.is_empty());
        if let Some(name) = group_name {
            if !self.store.lock().groups.group_exists(name) {
                warn!("Target group not found: {}", name);
                return Err(RosterError::GroupNotFound(name.to_string()));
            }
        }

        let report = csv::load_students(path, self.delimiter)?;

        let mut state = self.store.lock();
        state.source_ids.clear();
        let result = add_students(&mut state, report, group_name);

        info!(
            "Loaded {} students from CSV (skipped {} duplicates, rejected {})",
            result.items_added, result.items_skipped, result.items_rejected
        );
        Ok(result)
    }

    /// Lenient group import.
    ///
    /// Member ids are looked up in the ids recorded by the last student import
    /// first, since a file id may equal the live id of a different student
    /// after a restart. Ids without a mapping are matched against live
    /// student ids. Groups whose name is
    /// taken are skipped whole; members already held by another group are
    /// left out with a warning.
    pub fn load_groups(&self, path: &Path) -> Result<CsvImportResult> {
        info!("Loading groups from CSV: {:?}", path);

        let mut state = self.store.lock();
        let RosterState {
            students,
            groups,
            registry,
            source_ids,
        } = &mut *state;

        let report = csv::load_groups(path, self.delimiter, |id| match source_ids.get(id) {
            Some(live_id) => Some(live_id.clone()),
            None => students.get_student(id).map(|_| id.to_string()),
        })?;

        let mut result = CsvImportResult {
            items_rejected: report.rejected_count(),
            warnings: report.warning_messages(),
            ..Default::default()
        };

        for decoded in report.records {
            if groups.group_exists(&decoded.name) {
                debug!("Skipping duplicate group: {}", decoded.name);
                result.items_skipped += 1;
                continue;
            }

            let mut group = Group::new(decoded.name, decoded.description);
            for member_id in &decoded.member_ids {
                let Some(student) = students.get_student(member_id) else {
                    continue;
                };
                if group.contains(member_id) {
                    debug!("Member {} listed twice for group {}", member_id, group.name());
                    continue;
                }
                if group.add_student(registry, student) {
                    result.items_added_to_group += 1;
                } else {
                    result.warnings.push(format!(
                        "student {} is already in group {}, not added to {}",
                        member_id,
                        registry.group_name_of(member_id).unwrap_or("?"),
                        group.name()
                    ));
                }
            }
            groups.store_group(group);
            result.items_added += 1;
        }

        info!(
            "Loaded {} groups from CSV (skipped {} duplicates)",
            result.items_added, result.items_skipped
        );
        Ok(result)
    }

    /// Write every student; returns how many were written
    pub fn save_students(&self, path: &Path) -> Result<usize> {
        let state = self.store.lock();
        info!(
            "Saving {} students to CSV: {:?}",
            state.students.student_count(),
            path
        );
        csv::save_students(path, state.students.list_students(), self.delimiter)
    }

    /// Write every group; returns how many were written
    pub fn save_groups(&self, path: &Path) -> Result<usize> {
        let state = self.store.lock();
        info!("Saving {} groups to CSV: {:?}", state.groups.group_count(), path);
        csv::save_groups(path, state.groups.list_groups(), self.delimiter)
    }

    /// Write the members of one group in the six-field roster format
    pub fn export_group_roster(&self, group_name: &str, path: &Path) -> Result<usize> {
        info!("Exporting roster of group '{}' to {:?}", group_name, path);

        let state = self.store.lock();
        let group = state
            .groups
            .get_group(group_name)
            .ok_or_else(|| RosterError::GroupNotFound(group_name.to_string()))?;
        let members = group
            .members()
            .iter()
            .filter_map(|id| state.students.get_student(id));

        csv::export_roster(path, members, self.delimiter)
    }

    /// Strict roster import into an existing group.
    ///
    /// The whole file is decoded before anything is touched, so a malformed
    /// record fails the import with `RosterError::CsvFormat` and leaves the
    /// roster unchanged. Decoded students go through the same duplicate check
    /// as `load_students` and join the group.
    pub fn import_group_roster(&self, group_name: &str, path: &Path) -> Result<CsvImportResult> {
        info!("Importing roster of group '{}' from {:?}", group_name, path);

        if !self.store.lock().groups.group_exists(group_name) {
            return Err(RosterError::GroupNotFound(group_name.to_string()));
        }

        let report = csv::import_roster(path, self.delimiter).map_err(|e| {
            error!("Roster import from {:?} aborted: {}", path, e);
            e
        })?;

        let mut state = self.store.lock();
        if !state.groups.group_exists(group_name) {
            return Err(RosterError::GroupNotFound(group_name.to_string()));
        }
        let result = add_students(&mut state, report, Some(group_name));

        info!(
            "Imported {} students into group '{}' (skipped {} duplicates)",
            result.items_added, group_name, result.items_skipped
        );
        Ok(result)
    }

    /// Load the configured students file, then the groups file. A file that
    /// does not exist yet counts as empty.
    pub fn load_all(&self) -> Result<(CsvImportResult, CsvImportResult)> {
        let students = if self.students_file.exists() {
            self.load_students(&self.students_file, None)?
        } else {
            info!("No students file at {:?}, starting empty", self.students_file);
            CsvImportResult::default()
        };
        let groups = if self.groups_file.exists() {
            self.load_groups(&self.groups_file)?
        } else {
            info!("No groups file at {:?}, starting empty", self.groups_file);
            CsvImportResult::default()
        };
        Ok((students, groups))
    }

    /// Save students and groups to the configured files
    pub fn save_all(&self) -> Result<(usize, usize)> {
        let students = self.save_students(&self.students_file)?;
        let groups = self.save_groups(&self.groups_file)?;
        Ok((students, groups))
    }
}

/// Insert decoded students, skipping taken index numbers, and optionally add
/// the new ones to a group
fn add_students(
    state: &mut RosterState,
    report: DecodeReport<DecodedStudent>,
    group_name: Option<&str>,
) -> CsvImportResult {
    let mut result = CsvImportResult {
        items_rejected: report.rejected_count(),
        warnings: report.warning_messages(),
        ..Default::default()
    };

    for DecodedStudent { source_id, student } in report.records {
        if let Some(existing) = state.students.find_by_index_number(student.index_number()) {
            debug!("Skipping duplicate student: {}", student.index_number());
            state
                .source_ids
                .insert(source_id, existing.id().to_string());
            result.items_skipped += 1;
            continue;
        }

        if let Some(group) = group_name.and_then(|name| state.groups.get_group_mut(name)) {
            if group.add_student(&mut state.registry, &student) {
                result.items_added_to_group += 1;
            }
        }

        state
            .source_ids
            .insert(source_id, student.id().to_string());
        state.students.store_student(student);
        result.items_added += 1;
    }

    result
}
