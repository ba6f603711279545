//! DuckDB table store
//!
//! Durable, file-backed catalog of parsed datasets. Tables are only ever
//! added: a table that already exists is never replaced, altered or
//! dropped. Each write runs inside its own transaction that also performs
//! the existence check, and the connection is borrowed mutably for the
//! duration, so no other writer can create the same table in between.

use std::path::{Path, PathBuf};

use duckdb::types::Value as SqlValue;
use duckdb::{Connection, ToSql};

use crate::data::model::{Dataset, Value};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database file could not be opened or created
    #[error("failed to open store at {path}: {message}")]
    Open { path: PathBuf, message: String },

    /// A catalog or read query failed
    #[error("query failed: {0}")]
    Query(String),

    /// Creating or filling a table failed
    #[error("failed to write table '{table}': {message}")]
    Write { table: String, message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// What happened when a dataset was offered to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Created,
    AlreadyExists,
}

pub struct TableStore {
    /// Path to the database file (None for in-memory)
    db_path: Option<PathBuf>,
    connection: Connection,
}

impl TableStore {
    /// Open (or create) a file-backed store. Missing parent directories are
    /// created.
    pub fn open(db_path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = db_path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Open {
                path: path.clone(),
                message: format!("creating {}: {e}", parent.display()),
            })?;
        }
        let connection = Connection::open(&path).map_err(|e| StoreError::Open {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            db_path: Some(path),
            connection,
        })
    }

    /// In-memory store, for tests.
    pub fn in_memory() -> StoreResult<Self> {
        let connection = Connection::open_in_memory().map_err(|e| StoreError::Open {
            path: PathBuf::from(":memory:"),
            message: e.to_string(),
        })?;
        Ok(Self {
            db_path: None,
            connection,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path.is_none()
    }

    pub fn table_exists(&self, table: &str) -> StoreResult<bool> {
        table_exists(&self.connection, table)
    }

    /// Names of all tables in the store, sorted.
    pub fn table_names(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .connection
            .prepare(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = 'main' ORDER BY table_name",
            )
            .map_err(|e| StoreError::Query(format!("Prepare failed: {}", e)))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::Query(format!("Query failed: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Query(format!("Row fetch error: {}", e)))?;
        Ok(names)
    }

    pub fn row_count(&self, table: &str) -> StoreResult<usize> {
        let sql = format!("SELECT count(*) FROM {}", quote_ident(table));
        let count: i64 = self
            .connection
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| StoreError::Query(format!("Count failed: {}", e)))?;
        Ok(count.max(0) as usize)
    }

    /// Write `dataset` as table `dataset.name` unless a table of that name
    /// already exists. Either the whole table lands or nothing does.
    pub fn persist_if_absent(&mut self, dataset: &Dataset) -> StoreResult<PersistOutcome> {
        let table = dataset.name.as_str();
        let write_err = |e: duckdb::Error| StoreError::Write {
            table: table.to_string(),
            message: e.to_string(),
        };

        let tx = self.connection.transaction().map_err(write_err)?;

        if table_exists(&tx, table)? {
            return Ok(PersistOutcome::AlreadyExists);
        }

        tx.execute_batch(&create_table_sql(dataset))
            .map_err(write_err)?;

        if !dataset.columns.is_empty() {
            let placeholders = vec!["?"; dataset.columns.len()].join(", ");
            let insert = format!("INSERT INTO {} VALUES ({placeholders})", quote_ident(table));
            let mut stmt = tx.prepare(&insert).map_err(write_err)?;
            for row in &dataset.rows {
                let values: Vec<SqlValue> = row.iter().map(to_sql_value).collect();
                let params: Vec<&dyn ToSql> = values.iter().map(|v| v as &dyn ToSql).collect();
                stmt.execute(params.as_slice()).map_err(write_err)?;
            }
        }

        tx.commit().map_err(write_err)?;
        Ok(PersistOutcome::Created)
    }
}

/// DuckDB resolves table names without regard to case, so the lookup
/// does the same.
fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT count(*) FROM information_schema.tables \
             WHERE table_schema = 'main' AND lower(table_name) = lower(?)",
            [table],
            |row| row.get(0),
        )
        .map_err(|e| StoreError::Query(format!("Catalog lookup failed: {}", e)))?;
    Ok(count > 0)
}

/// Quote an identifier for DuckDB, doubling embedded quotes.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table_sql(dataset: &Dataset) -> String {
    let columns: Vec<String> = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let sql_type = column_sql_type(dataset.rows.iter().map(|r| &r[idx]));
            format!("{} {sql_type}", quote_ident(name))
        })
        .collect();
    // DuckDB rejects a table without columns; a header-only, zero-column
    // file still gets a placeholder so the table name is recorded.
    let columns = if columns.is_empty() {
        vec!["\"_empty\" VARCHAR".to_string()]
    } else {
        columns
    };
    format!(
        "CREATE TABLE {} ({})",
        quote_ident(&dataset.name),
        columns.join(", ")
    )
}

/// SQL type for a column, from the variants of its non-null cells.
fn column_sql_type<'a>(cells: impl Iterator<Item = &'a Value>) -> &'static str {
    let (mut ints, mut floats, mut bools, mut dates, mut texts) = (false, false, false, false, false);
    for cell in cells {
        match cell {
            Value::Null => {}
            Value::Integer(_) => ints = true,
            Value::Float(_) => floats = true,
            Value::Bool(_) => bools = true,
            Value::Date(_) => dates = true,
            Value::Text(_) => texts = true,
        }
    }
    match (ints, floats, bools, dates, texts) {
        (_, _, _, _, true) => "VARCHAR",
        (true, false, false, false, false) => "BIGINT",
        (_, true, false, false, false) => "DOUBLE",
        (false, false, true, false, false) => "BOOLEAN",
        (false, false, false, true, false) => "DATE",
        (false, false, false, false, false) => "VARCHAR",
        _ => "VARCHAR",
    }
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Boolean(*b),
        Value::Integer(i) => SqlValue::BigInt(*i),
        Value::Float(f) => SqlValue::Double(*f),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Date(d) => SqlValue::Text(d.format("%Y-%m-%d").to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(name: &str) -> Dataset {
        Dataset::new(
            name,
            vec!["CAMPAIGN_GROUP".into(), "NB_EMAILS".into(), "RATE".into()],
            vec![
                vec![Value::Text("Loom".into()), Value::Integer(10), Value::Float(0.5)],
                vec![Value::Text("GA4".into()), Value::Null, Value::Integer(2)],
            ],
        )
    }

    #[test]
    fn creates_table_once() {
        let mut store = TableStore::in_memory().unwrap();
        assert!(store.is_in_memory());
        assert!(!store.table_exists("outbound").unwrap());

        let first = store.persist_if_absent(&dataset("outbound")).unwrap();
        assert_eq!(first, PersistOutcome::Created);
        assert_eq!(store.row_count("outbound").unwrap(), 2);

        let mut bigger = dataset("outbound");
        bigger.rows.extend(dataset("outbound").rows);
        let second = store.persist_if_absent(&bigger).unwrap();
        assert_eq!(second, PersistOutcome::AlreadyExists);
        assert_eq!(store.row_count("outbound").unwrap(), 2);
        assert_eq!(store.table_names().unwrap(), vec!["outbound".to_string()]);
    }

    #[test]
    fn existing_table_matches_regardless_of_case() {
        let mut store = TableStore::in_memory().unwrap();
        assert_eq!(store.persist_if_absent(&dataset("Tenants")).unwrap(), PersistOutcome::Created);

        assert!(store.table_exists("tenants").unwrap());
        assert!(store.table_exists("TENANTS").unwrap());
        assert_eq!(store.persist_if_absent(&dataset("tenants")).unwrap(), PersistOutcome::AlreadyExists);
        assert_eq!(store.table_names().unwrap(), vec!["Tenants".to_string()]);
    }

    #[test]
    fn failed_create_leaves_no_table_behind() {
        let mut store = TableStore::in_memory().unwrap();
        let clash = Dataset::new(
            "clash",
            vec!["id".into(), "ID".into()],
            vec![vec![Value::Integer(1), Value::Integer(2)]],
        );

        let err = store.persist_if_absent(&clash).unwrap_err();
        assert!(matches!(err, StoreError::Write { ref table, .. } if table == "clash"));
        assert!(!store.table_exists("clash").unwrap());
        assert_eq!(store.persist_if_absent(&dataset("outbound")).unwrap(), PersistOutcome::Created);
    }

    #[test]
    fn awkward_names_are_quoted() {
        let mut store = TableStore::in_memory().unwrap();
        let ds = Dataset::new(
            "market \"2024\"",
            vec!["POLAR ARR ($)".into()],
            vec![vec![Value::Integer(5)]],
        );
        store.persist_if_absent(&ds).unwrap();
        assert!(store.table_exists("market \"2024\"").unwrap());
        assert_eq!(store.row_count("market \"2024\"").unwrap(), 1);
    }

    #[test]
    fn sql_types_follow_cells() {
        let ints = [Value::Integer(1), Value::Null];
        let mixed = [Value::Integer(1), Value::Float(2.0)];
        let text = [Value::Integer(1), Value::Text("a".into())];
        assert_eq!(column_sql_type(ints.iter()), "BIGINT");
        assert_eq!(column_sql_type(mixed.iter()), "DOUBLE");
        assert_eq!(column_sql_type(text.iter()), "VARCHAR");
        assert_eq!(column_sql_type([Value::Null].iter()), "VARCHAR");
    }
}
