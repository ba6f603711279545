//! Error types for dataset ingestion.

use std::path::PathBuf;
use thiserror::Error;

use crate::store::StoreError;

/// Failures that abort the whole load. Anything scoped to a single file
/// or a single cell is reported through [`super::ingest::LoadReport`] or
/// degraded to [`super::model::Value::Null`] instead.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input directory is missing or is not a directory.
    #[error("data directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The relational store could not be opened or created.
    #[error("relational store unavailable: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
