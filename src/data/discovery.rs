//! Input file discovery.

use std::path::{Path, PathBuf};

use super::error::{IngestError, Result};

/// A tabular input file and the table name derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// File name with the extension stripped.
    pub table_name: String,
}

impl DiscoveredFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Lists all CSV files in a directory, sorted by file name.
///
/// A missing directory is fatal for the whole load.
pub fn discover_tables(dir: &Path) -> Result<Vec<DiscoveredFile>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == "csv")
            .unwrap_or(false);
        if !is_csv {
            continue;
        }

        let Some(table_name) = path.file_stem().and_then(|s| s.to_str()) else {
            log::warn!("Skipping file with non UTF-8 name: {}", path.display());
            continue;
        };
        let table_name = table_name.to_string();
        files.push(DiscoveredFile { path, table_name });
    }

    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_csv_files_sorted_with_table_names() {
        let dir = TempDir::new().unwrap();
        for name in ["tenants.csv", "market.csv", "notes.txt", "outbound.CSV"] {
            std::fs::write(dir.path().join(name), "A\n1\n").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let files = discover_tables(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.table_name.as_str()).collect();
        assert_eq!(names, vec!["market", "tenants"]);
        assert_eq!(files[0].file_name(), "market.csv");
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        let dir = TempDir::new().unwrap();
        for name in ["outbound.CSV", "market.Csv", "tenants.csv"] {
            std::fs::write(dir.path().join(name), "A\n1\n").unwrap();
        }
        let files = discover_tables(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].table_name, "tenants");
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(discover_tables(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("data");
        let err = discover_tables(&missing).unwrap_err();
        assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
    }
}
