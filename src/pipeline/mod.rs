//! Roster + punch log in, reconciled attendance out.

pub mod directory;
pub mod punches;
pub mod query;
pub mod reconcile;
pub mod summary;

use std::path::Path;

use tracing::{info, instrument, warn};

use crate::error::PipelineError;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Directory;
use crate::model::punch::PunchEvent;
use crate::model::summary::AttendanceSummary;

/// Result of one batch: everything the report and the query API need.
#[derive(Debug, Clone)]
pub struct Batch {
    pub directory: Directory,
    pub records: Vec<AttendanceRecord>,
    pub summary: AttendanceSummary,
}

/// Runs extraction, parsing, reconciliation and aggregation over two in-memory inputs.
///
/// Empty intermediate results abort the batch before anything is written.
#[instrument(skip_all, fields(roster_bytes = roster.len(), log_bytes = attendance_log.len()))]
pub fn run_batch(roster: &[u8], attendance_log: &[u8], top_n: usize) -> Result<Batch, PipelineError> {
    let directory = directory::extract_directory(roster);
    let events = punches::parse_punch_bytes(attendance_log);
    assemble(directory, &events, top_n)
}

/// Same as [`run_batch`], reading both inputs from disk. Unreadable files count as empty.
#[instrument(skip(top_n))]
pub fn run_batch_files(roster: &Path, attendance_log: &Path, top_n: usize) -> Result<Batch, PipelineError> {
    let directory = directory::read_directory_file(roster);
    let events = punches::read_punch_file(attendance_log);
    assemble(directory, &events, top_n)
}

fn assemble(directory: Directory, events: &[PunchEvent], top_n: usize) -> Result<Batch, PipelineError> {
    if directory.is_empty() {
        warn!("No employees recovered from roster");
        return Err(PipelineError::EmptyDirectory);
    }
    if events.is_empty() {
        warn!("No punch events parsed from attendance log");
        return Err(PipelineError::NoPunchEvents);
    }

    let records = reconcile::reconcile(events, &directory);
    if records.is_empty() {
        return Err(PipelineError::NoRecords);
    }

    let summary = summary::summarize(&records, top_n);
    info!(
        employees = summary.overview.total_employees,
        records = summary.overview.total_records,
        late = summary.overview.late_records,
        attendance_rate = %format!("{:.1}%", summary.overview.attendance_rate * 100.0),
        "Batch reconciled"
    );

    Ok(Batch {
        directory,
        records,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<u8> {
        let mut bytes = vec![0x01];
        bytes.extend_from_slice(b"Jane Doe\0\0\0");
        bytes.extend_from_slice(b"007\0");
        bytes.extend(std::iter::repeat_n(0u8, 60));
        bytes
    }

    #[test]
    fn runs_a_full_batch() {
        let log = b"007\t2024-01-10 09:15:00\n007\t2024-01-10 17:20:00\n042\t2024-02-01 10:00:00\nabc\tnotadate\n";

        let batch = run_batch(&roster(), log, 10).unwrap();

        assert_eq!(batch.directory.len(), 1);
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[1].employee_name, "Unknown_042");
        assert_eq!(batch.summary.overview.total_employees, 2);
    }

    #[test]
    fn empty_roster_is_fatal() {
        let err = run_batch(&[0u8; 64], b"007\t2024-01-10 09:15:00\n", 10).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyDirectory));
    }

    #[test]
    fn log_without_events_is_fatal() {
        let err = run_batch(&roster(), b"abc\tnotadate\n", 10).unwrap_err();
        assert!(matches!(err, PipelineError::NoPunchEvents));
    }

    #[test]
    fn runs_from_files_and_treats_missing_log_as_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let roster_path = tmp.path().join("roster.dat");
        let log_path = tmp.path().join("attendance.txt");
        std::fs::write(&roster_path, roster()).unwrap();

        let err = run_batch_files(&roster_path, &log_path, 10).unwrap_err();
        assert!(matches!(err, PipelineError::NoPunchEvents));

        std::fs::write(&log_path, "007\t2024-01-10 09:15:00\n").unwrap();
        let batch = run_batch_files(&roster_path, &log_path, 10).unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].employee_name, "Jane Doe");
    }
}
