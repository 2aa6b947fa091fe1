use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use tracing::debug;

use crate::error::StoreError;
use crate::model::attendance::AttendanceRecord;
use crate::model::summary::AttendanceSummary;
use crate::pipeline::summary::summarize;
use crate::report::store::{OutputStore, StoredDataset};

/// A published batch loaded back for query serving.
#[derive(Debug)]
pub struct Dataset {
    pub artifact: String,
    pub generated_at: DateTime<Utc>,
    pub records: Vec<AttendanceRecord>,
    pub summary: AttendanceSummary,
}

impl Dataset {
    pub fn from_stored(artifact: String, stored: StoredDataset, top_n: usize) -> Self {
        let summary = summarize(&stored.records, top_n);
        Self {
            artifact,
            generated_at: stored.generated_at,
            records: stored.records,
            summary,
        }
    }
}

/// Serves the most recent dataset on disk, parsing each artifact once.
///
/// Entries are keyed by artifact path, so publishing a newer batch makes
/// the next lookup load it; old entries just age out.
#[derive(Clone)]
pub struct DatasetCache {
    store: OutputStore,
    cache: Cache<PathBuf, Arc<Dataset>>,
    top_n: usize,
}

impl DatasetCache {
    pub fn new(store: OutputStore, top_n: usize) -> Self {
        Self {
            store,
            cache: Cache::builder()
                .max_capacity(4) // a handful of recent batches
                .time_to_live(Duration::from_secs(3600))
                .build(),
            top_n,
        }
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// `None` when no batch has been published yet.
    pub async fn current(&self) -> Result<Option<Arc<Dataset>>, StoreError> {
        let Some(path) = self.store.latest_dataset_path()? else {
            return Ok(None);
        };

        if let Some(dataset) = self.cache.get(&path).await {
            return Ok(Some(dataset));
        }

        let stored = self.store.load_dataset(&path)?;
        let artifact = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let dataset = Arc::new(Dataset::from_stored(artifact, stored, self.top_n));
        debug!(artifact = %dataset.artifact, records = dataset.records.len(), "Loaded dataset into cache");

        self.cache.insert(path, dataset.clone()).await;
        Ok(Some(dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::run_batch;
    use tempfile::TempDir;

    fn publish(store: &OutputStore, log: &[u8]) -> String {
        let mut roster = vec![0x01];
        roster.extend_from_slice(b"Jane Doe\0\0");
        roster.extend_from_slice(b"007\0");
        roster.extend(std::iter::repeat_n(0u8, 60));
        let batch = run_batch(&roster, log, 10).unwrap();
        store.publish(&batch).unwrap().name
    }

    #[actix_web::test]
    async fn empty_store_has_no_dataset() {
        let tmp = TempDir::new().unwrap();
        let cache = DatasetCache::new(OutputStore::new(tmp.path()), 10);

        assert!(cache.current().await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn picks_up_newer_batches() {
        let tmp = TempDir::new().unwrap();
        let store = OutputStore::new(tmp.path());
        let cache = DatasetCache::new(store.clone(), 10);

        let first = publish(&store, b"007\t2024-01-10 09:15:00\n");
        let dataset = cache.current().await.unwrap().unwrap();
        assert_eq!(dataset.artifact, first);
        assert_eq!(dataset.records.len(), 1);

        std::thread::sleep(Duration::from_millis(5));
        let second = publish(&store, b"007\t2024-01-10 09:15:00\n007\t2024-01-11 09:15:00\n");
        let dataset = cache.current().await.unwrap().unwrap();
        assert_eq!(dataset.artifact, second);
        assert_eq!(dataset.records.len(), 2);
        assert_eq!(dataset.summary.overview.total_records, 2);
    }
}
