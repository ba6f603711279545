pub mod analytics;
pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod export;
pub mod state;
pub mod store;
pub mod ui;

pub use data::{load_all, Dataset, DatasetCache, IngestError, IngestOptions, LoadResult, Value};
