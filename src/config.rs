use std::path::PathBuf;

use clap::Parser;

use crate::data::{DatasetCache, IngestOptions};

/// Command-line / environment configuration for the dashboard.
#[derive(Debug, Clone, Parser)]
#[command(name = "campaign-lens", version, about = "Marketing and sales dataset explorer")]
pub struct DashboardConfig {
    /// Directory containing the input CSV files.
    #[arg(long, env = "CAMPAIGN_LENS_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// DuckDB file used to persist loaded tables across runs.
    #[arg(long, env = "CAMPAIGN_LENS_DB_PATH", default_value = "db/warehouse.duckdb")]
    pub db_path: PathBuf,
}

impl DashboardConfig {
    /// Build the process-wide dataset cache for this configuration.
    pub fn dataset_cache(&self) -> DatasetCache {
        DatasetCache::new(&self.data_dir, &self.db_path, IngestOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = DashboardConfig::try_parse_from(["campaign-lens"]).unwrap();
        // Only checked when no environment override is present.
        if std::env::var_os("CAMPAIGN_LENS_DATA_DIR").is_none() {
            assert_eq!(cfg.data_dir, PathBuf::from("data"));
        }
        if std::env::var_os("CAMPAIGN_LENS_DB_PATH").is_none() {
            assert_eq!(cfg.db_path, PathBuf::from("db/warehouse.duckdb"));
        }
    }

    #[test]
    fn flags_override_defaults() {
        let cfg = DashboardConfig::try_parse_from([
            "campaign-lens",
            "--data-dir",
            "/srv/data",
            "--db-path",
            "/tmp/x.duckdb",
        ])
        .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/data"));
        let cache = cfg.dataset_cache();
        assert_eq!(cache.db_path(), std::path::Path::new("/tmp/x.duckdb"));
        assert!(!cache.is_loaded());
    }
}
