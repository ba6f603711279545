use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;

use super::error::Result;
use super::ingest::{load_all, IngestOptions, LoadResult};

/// Runs the discover → load → normalize pipeline at most once.
///
/// Build one at startup and hand it to whatever needs the datasets; every
/// successful [`DatasetCache::get`] after the first returns the same
/// [`LoadResult`] without touching the filesystem or the store. A failed
/// load is not remembered, so the next call tries again.
#[derive(Debug)]
pub struct DatasetCache {
    data_dir: PathBuf,
    db_path: PathBuf,
    options: IngestOptions,
    cell: OnceCell<LoadResult>,
}

impl DatasetCache {
    pub fn new(data_dir: impl Into<PathBuf>, db_path: impl Into<PathBuf>, options: IngestOptions) -> Self {
        DatasetCache {
            data_dir: data_dir.into(),
            db_path: db_path.into(),
            options,
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Result<&LoadResult> {
        self.cell
            .get_or_try_init(|| load_all(&self.data_dir, &self.db_path, &self.options))
    }

    /// Whether the load has already completed.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn second_get_returns_same_result() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir(&data).unwrap();
        std::fs::write(data.join("tenants.csv"), "TENANT_ID,DATASOURCE_ID\n1,a\n").unwrap();

        let cache = DatasetCache::new(&data, dir.path().join("db/store.duckdb"), IngestOptions::default());
        assert!(!cache.is_loaded());
        let first = cache.get().unwrap() as *const LoadResult;

        // New files after the first load are not picked up.
        std::fs::write(data.join("outbound.csv"), "CAMPAIGN_GROUP\nLoom\n").unwrap();
        let second = cache.get().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn failed_load_is_retried() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        let cache = DatasetCache::new(&data, dir.path().join("store.duckdb"), IngestOptions::default());

        assert!(cache.get().is_err());
        assert!(!cache.is_loaded());

        std::fs::create_dir(&data).unwrap();
        assert!(cache.get().unwrap().is_empty());
    }
}
