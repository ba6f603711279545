//! Data layer: discovery, loading, normalization and caching.
//!
//! Architecture:
//! ```text
//!   data/*.csv
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ discovery │  list files → table names
//!   └───────────┘
//!        │
//!        ▼
//!   ┌───────────┐     ┌──────────────┐
//!   │  loader   │ ──▶ │ store (DuckDB)│  write once per table name
//!   └───────────┘     └──────────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ normalize │  dates, currency → typed values, dedup rows
//!   └───────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │   cache   │  one load per process
//!   └───────────┘
//! ```

pub mod cache;
pub mod discovery;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod loader;
pub mod model;
pub mod normalize;

pub use cache::DatasetCache;
pub use error::IngestError;
pub use ingest::{load_all, IngestOptions, LoadReport, LoadResult};
pub use model::{Dataset, Value};
