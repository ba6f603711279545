use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::discovery::{discover_tables, DiscoveredFile};
use super::error::Result;
use super::loader::{load_csv, ParseOptions};
use super::model::Dataset;
use super::normalize::{normalize, NormalizeOptions};
use crate::store::{PersistOutcome, TableStore};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Knobs for a full load. `Default` matches the shipped data layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Table whose source file carries a preamble above the header.
    pub preamble_table: String,
    /// Lines of preamble to skip for that table.
    pub preamble_rows: usize,
    pub normalize: NormalizeOptions,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            preamble_table: "market".to_string(),
            preamble_rows: 4,
            normalize: NormalizeOptions::default(),
        }
    }
}

impl IngestOptions {
    pub fn parse_options_for(&self, table_name: &str) -> ParseOptions {
        if table_name == self.preamble_table {
            ParseOptions::with_preamble(self.preamble_rows)
        } else {
            ParseOptions::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One file that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub file: PathBuf,
    pub table: String,
    pub reason: String,
}

/// What the loader did with each discovered file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Tables written to the store during this load.
    pub created: Vec<String>,
    /// Tables already present in the store, left untouched.
    pub skipped_existing: Vec<String>,
    pub failures: Vec<FileFailure>,
}

impl LoadReport {
    /// Pretty JSON rendering, for copying out of the dashboard.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Product of a full load: normalized datasets plus the parsed originals.
#[derive(Debug, Clone, Default)]
pub struct LoadResult {
    pub datasets: BTreeMap<String, Dataset>,
    pub raw: BTreeMap<String, Dataset>,
    pub report: LoadReport,
}

impl LoadResult {
    /// Normalized dataset by name.
    pub fn get(&self, name: &str) -> Option<&Dataset> {
        self.datasets.get(name)
    }

    /// Parsed dataset before normalization.
    pub fn raw(&self, name: &str) -> Option<&Dataset> {
        self.raw.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Full load
// ---------------------------------------------------------------------------

/// Discover every CSV in `data_dir`, persist each table into the store at
/// `db_path` if it is not there yet, and return the normalized datasets.
///
/// Only a missing data directory or an unusable store fail the call; a bad
/// file is logged, recorded in the report and left out of the result.
pub fn load_all(data_dir: &Path, db_path: &Path, options: &IngestOptions) -> Result<LoadResult> {
    let files = discover_tables(data_dir)?;
    let mut store = TableStore::open(db_path)?;
    let result = load_into(&files, &mut store, options);
    log::info!(
        "Loaded {} of {} tables from {} ({} created, {} already stored, {} failed)",
        result.len(),
        files.len(),
        data_dir.display(),
        result.report.created.len(),
        result.report.skipped_existing.len(),
        result.report.failures.len()
    );
    Ok(result)
}

/// Load already discovered files against an open store.
pub fn load_into(files: &[DiscoveredFile], store: &mut TableStore, options: &IngestOptions) -> LoadResult {
    let mut result = LoadResult::default();

    for file in files {
        let table = &file.table_name;
        let parse_options = options.parse_options_for(table);

        let dataset = match load_csv(&file.path, table, &parse_options) {
            Ok(ds) => ds,
            Err(e) => {
                log::warn!("Error loading {}: {e:#}", file.file_name());
                result.report.failures.push(FileFailure {
                    file: file.path.clone(),
                    table: table.clone(),
                    reason: format!("{e:#}"),
                });
                continue;
            }
        };

        match store.persist_if_absent(&dataset) {
            Ok(PersistOutcome::Created) => {
                log::info!(
                    "Data from {} stored as '{table}' ({} rows)",
                    file.file_name(),
                    dataset.len()
                );
                result.report.created.push(table.clone());
            }
            Ok(PersistOutcome::AlreadyExists) => {
                log::info!("Table '{table}' already exists, skipping");
                result.report.skipped_existing.push(table.clone());
            }
            Err(e) => {
                log::warn!("Error storing {}: {e}", file.file_name());
                result.report.failures.push(FileFailure {
                    file: file.path.clone(),
                    table: table.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        }

        let normalized = normalize(&dataset, &options.normalize);
        result.datasets.insert(table.clone(), normalized);
        result.raw.insert(table.clone(), dataset);
    }

    result
}
