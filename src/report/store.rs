//! Durable, timestamp-named batch artifacts.
//!
//! Each batch publishes `attendance_<stamp>_<suffix>.xlsx` and a matching
//! `.json` dataset. Files are written to a temp file in the output
//! directory and renamed into place, and the dataset goes last: a batch
//! is only visible once its dataset exists.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Directory;
use crate::pipeline::Batch;

use super::workbook::render_workbook;

const ARTIFACT_PREFIX: &str = "attendance_";
const DATASET_EXT: &str = "json";
const WORKBOOK_EXT: &str = "xlsx";

/// What a published batch leaves on disk for query serving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDataset {
    pub generated_at: DateTime<Utc>,
    pub directory: Directory,
    pub records: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifact {
    pub name: String,
    pub workbook: PathBuf,
    pub dataset: PathBuf,
}

#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn artifact_name(now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().to_string();
        format!("{ARTIFACT_PREFIX}{}_{}", now.format("%Y%m%d_%H%M%S_%3f"), &suffix[..8])
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        Ok(())
    }

    /// Renders and publishes a batch. On failure nothing new becomes visible.
    pub fn publish(&self, batch: &Batch) -> Result<PublishedArtifact, StoreError> {
        fs::create_dir_all(&self.dir)?;

        let now = Utc::now();
        let workbook_bytes = render_workbook(batch, now.date_naive())?;
        let dataset = StoredDataset {
            generated_at: now,
            directory: batch.directory.clone(),
            records: batch.records.clone(),
        };
        let dataset_bytes = serde_json::to_vec(&dataset)?;

        let name = Self::artifact_name(now);
        let workbook = self.dir.join(format!("{name}.{WORKBOOK_EXT}"));
        let dataset = self.dir.join(format!("{name}.{DATASET_EXT}"));

        self.write_atomic(&workbook, &workbook_bytes)?;
        if let Err(e) = self.write_atomic(&dataset, &dataset_bytes) {
            error!(error = %e, artifact = %name, "Dataset write failed, discarding workbook");
            if let Err(rm) = fs::remove_file(&workbook) {
                error!(error = %rm, path = %workbook.display(), "Failed to discard workbook");
            }
            return Err(e);
        }

        info!(artifact = %name, dir = %self.dir.display(), "Published attendance artifacts");
        Ok(PublishedArtifact {
            name,
            workbook,
            dataset,
        })
    }

    /// Most recent complete batch, by the timestamp in its name.
    pub fn latest_dataset_path(&self) -> Result<Option<PathBuf>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut latest: Option<(String, PathBuf)> = None;
        for entry in entries {
            let path = entry?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let is_dataset = file_name.starts_with(ARTIFACT_PREFIX)
                && path.extension().and_then(|e| e.to_str()) == Some(DATASET_EXT);
            if !is_dataset {
                continue;
            }
            if latest.as_ref().is_none_or(|(best, _)| file_name > best.as_str()) {
                latest = Some((file_name.to_string(), path.clone()));
            }
        }

        debug!(latest = ?latest.as_ref().map(|(name, _)| name), "Resolved latest dataset");
        Ok(latest.map(|(_, path)| path))
    }

    /// Workbook published alongside the most recent dataset.
    pub fn latest_workbook_path(&self) -> Result<Option<PathBuf>, StoreError> {
        Ok(self
            .latest_dataset_path()?
            .map(|dataset| dataset.with_extension(WORKBOOK_EXT))
            .filter(|workbook| workbook.is_file()))
    }

    pub fn load_dataset(&self, path: &Path) -> Result<StoredDataset, StoreError> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run_batch;
    use tempfile::TempDir;

    fn batch(log: &[u8]) -> Batch {
        let mut roster = vec![0x01];
        roster.extend_from_slice(b"Jane Doe\0\0");
        roster.extend_from_slice(b"007\0");
        roster.extend(std::iter::repeat_n(0u8, 60));
        run_batch(&roster, log, 10).unwrap()
    }

    #[test]
    fn missing_directory_has_no_latest() {
        let store = OutputStore::new("/nonexistent/attendance-output");

        assert_eq!(store.latest_dataset_path().unwrap(), None);
        assert_eq!(store.latest_workbook_path().unwrap(), None);
    }

    #[test]
    fn publish_then_load_latest() {
        let tmp = TempDir::new().unwrap();
        let store = OutputStore::new(tmp.path());

        let artifact = store.publish(&batch(b"007\t2024-01-10 09:15:00\n007\t2024-01-10 17:20:00\n")).unwrap();

        assert!(artifact.workbook.is_file());
        assert!(artifact.name.starts_with("attendance_"));
        assert_eq!(store.latest_dataset_path().unwrap(), Some(artifact.dataset.clone()));
        assert_eq!(store.latest_workbook_path().unwrap(), Some(artifact.workbook.clone()));

        let loaded = store.load_dataset(&artifact.dataset).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].working_hours, 8.08);
        assert_eq!(loaded.directory.get(&"007".into()), Some("Jane Doe"));
    }

    #[test]
    fn newer_batch_wins_and_orphans_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let store = OutputStore::new(tmp.path());

        let first = store.publish(&batch(b"007\t2024-01-10 09:15:00\n")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = store.publish(&batch(b"007\t2024-01-11 09:15:00\n")).unwrap();
        assert_ne!(first.name, second.name);

        // a workbook without a dataset is not a complete batch
        fs::write(tmp.path().join("attendance_99991231_235959_999_ffffffff.xlsx"), b"partial").unwrap();

        assert_eq!(store.latest_dataset_path().unwrap(), Some(second.dataset.clone()));
        let loaded = store.load_dataset(&second.dataset).unwrap();
        assert_eq!(loaded.records[0].date.to_string(), "2024-01-11");
    }
}
