use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

use campaign_lens::data::{load_all, DatasetCache, IngestError, IngestOptions, Value};
use campaign_lens::store::TableStore;

const OUTBOUND: &str = "\
CAMPAIGN_GROUP,CAMPAIGN_START_DATE,CAMPAIGN_LAST_DATE,NB_EMAILS,NEW_ARR_FROM_OB_ALL_TIME,OWNER
GA4 2023-01-01 relaunch,2023-01-02,2023-02-01,120,\"$12,000\",alice
Loom,2023-03-01,2023-03-15,80,$0,bob
Loom,2023-03-01,2023-03-15,80,$0,bob
";

const MARKET: &str = "\
Market sizing export
Source: merchant census
Currency: USD

PLATFORM,GMV_CATEGORY,COUNTRY,POLAR ARR ($),
Shopify,b) $1M - $5M,United States,\"$1,500\",
Shopify,a) < $1M,Canada,$200,
";

struct Workspace {
    _root: TempDir,
    data: PathBuf,
    db: PathBuf,
}

fn workspace(files: &[(&str, &str)]) -> Workspace {
    let root = TempDir::new().unwrap();
    let data = root.path().join("data");
    fs::create_dir(&data).unwrap();
    for (name, body) in files {
        fs::write(data.join(name), body).unwrap();
    }
    let db = root.path().join("db").join("warehouse.duckdb");
    Workspace { _root: root, data, db }
}

fn stored_tables(db: &Path) -> Vec<String> {
    let mut names = TableStore::open(db).unwrap().table_names().unwrap();
    names.sort();
    names
}

#[test]
fn loads_every_csv_and_ignores_other_files() {
    let ws = workspace(&[
        ("outbound.csv", OUTBOUND),
        ("market.csv", MARKET),
        ("notes.txt", "not a table"),
    ]);

    let result = load_all(&ws.data, &ws.db, &IngestOptions::default()).unwrap();

    assert_eq!(result.names().collect::<Vec<_>>(), vec!["market", "outbound"]);
    assert_eq!(result.report.created, vec!["market".to_string(), "outbound".to_string()]);
    assert!(result.report.failures.is_empty());
    assert_eq!(stored_tables(&ws.db), vec!["market", "outbound"]);
}

#[test]
fn second_load_leaves_stored_tables_untouched() {
    let ws = workspace(&[("outbound.csv", OUTBOUND)]);
    load_all(&ws.data, &ws.db, &IngestOptions::default()).unwrap();

    // Grow the file; the store keeps the first snapshot.
    fs::write(
        ws.data.join("outbound.csv"),
        format!("{OUTBOUND}Klaviyo,2023-04-01,2023-04-30,10,$500,carol\n"),
    )
    .unwrap();

    let again = load_all(&ws.data, &ws.db, &IngestOptions::default()).unwrap();
    assert!(again.report.created.is_empty());
    assert_eq!(again.report.skipped_existing, vec!["outbound".to_string()]);

    let store = TableStore::open(&ws.db).unwrap();
    assert_eq!(store.row_count("outbound").unwrap(), 3);
    // The in-memory result reflects the file as read now, deduplicated.
    assert_eq!(again.get("outbound").unwrap().len(), 3);
}

#[test]
fn malformed_file_does_not_stop_the_others() {
    let ws = workspace(&[
        ("outbound.csv", OUTBOUND),
        ("broken.csv", "A,B\n1,2,3,4\n"),
        ("tenants.csv", "TENANT_ID,DATASOURCE_ID\n1,10\n1,11\n2,12\n"),
    ]);

    let result = load_all(&ws.data, &ws.db, &IngestOptions::default()).unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.get("broken").is_none());
    assert_eq!(result.report.failures.len(), 1);
    assert_eq!(result.report.failures[0].table, "broken");
    assert_eq!(stored_tables(&ws.db), vec!["outbound", "tenants"]);
}

#[test]
fn renamed_file_matches_stored_table_regardless_of_case() {
    let ws = workspace(&[("Tenants.csv", "TENANT_ID,DATASOURCE_ID\n1,10\n")]);
    let first = load_all(&ws.data, &ws.db, &IngestOptions::default()).unwrap();
    assert_eq!(first.report.created, vec!["Tenants".to_string()]);

    fs::rename(ws.data.join("Tenants.csv"), ws.data.join("tenants.csv")).unwrap();
    let second = load_all(&ws.data, &ws.db, &IngestOptions::default()).unwrap();

    assert!(second.report.failures.is_empty());
    assert_eq!(second.report.skipped_existing, vec!["tenants".to_string()]);
    assert_eq!(second.names().collect::<Vec<_>>(), vec!["tenants"]);
    assert_eq!(stored_tables(&ws.db), vec!["Tenants"]);
}

#[test]
fn unwritable_table_does_not_stop_the_others() {
    let ws = workspace(&[
        ("clash.csv", "id,ID\n1,2\n"),
        ("outbound.csv", OUTBOUND),
    ]);

    let result = load_all(&ws.data, &ws.db, &IngestOptions::default()).unwrap();

    assert_eq!(result.names().collect::<Vec<_>>(), vec!["outbound"]);
    assert!(result.raw("clash").is_none());
    assert_eq!(result.report.failures.len(), 1);
    assert_eq!(result.report.failures[0].table, "clash");
    assert_eq!(result.report.failures[0].file, ws.data.join("clash.csv"));
    assert_eq!(stored_tables(&ws.db), vec!["outbound"]);
}

#[test]
fn market_preamble_and_empty_columns_are_dropped() {
    let ws = workspace(&[("market.csv", MARKET)]);
    let result = load_all(&ws.data, &ws.db, &IngestOptions::default()).unwrap();

    let market = result.get("market").unwrap();
    assert_eq!(market.columns, vec!["PLATFORM", "GMV_CATEGORY", "COUNTRY", "POLAR ARR ($)"]);
    assert_eq!(market.len(), 2);

    let arr = market.column_index("POLAR ARR ($)").unwrap();
    let category = market.column_index("GMV_CATEGORY").unwrap();
    assert_eq!(market.rows[0][arr], Value::Integer(1500));
    assert_eq!(market.rows[1][category], Value::Text("a) < $1M".into()));
}

#[test]
fn outbound_is_normalized() {
    let ws = workspace(&[("outbound.csv", OUTBOUND)]);
    let result = load_all(&ws.data, &ws.db, &IngestOptions::default()).unwrap();
    let outbound = result.get("outbound").unwrap();

    // The duplicate Loom row collapses.
    assert_eq!(outbound.len(), 2);

    let col = |name: &str| outbound.column_index(name).unwrap();
    let first = &outbound.rows[0];
    assert_eq!(
        first[col("CAMPAIGN_GROUP")],
        Value::Text("GA4 2023-01-01 relaunch".into())
    );
    assert_eq!(
        first[col("CAMPAIGN_START_DATE")],
        Value::Date(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap())
    );
    assert_eq!(first[col("NB_EMAILS")], Value::Integer(120));
    assert_eq!(first[col("NEW_ARR_FROM_OB_ALL_TIME")], Value::Integer(12_000));
    // Free text outside the allowlist does not survive coercion.
    assert_eq!(first[col("OWNER")], Value::Null);

    // The raw table keeps the text as read.
    let raw = result.raw("outbound").unwrap();
    assert_eq!(raw.len(), 3);
    assert_eq!(raw.rows[0][col("OWNER")], Value::Text("alice".into()));
}

#[test]
fn missing_data_directory_is_fatal() {
    let root = TempDir::new().unwrap();
    let err = load_all(
        &root.path().join("nope"),
        &root.path().join("db.duckdb"),
        &IngestOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
}

#[test]
fn unopenable_store_is_fatal() {
    let ws = workspace(&[("outbound.csv", OUTBOUND)]);
    // A directory where the database file should be.
    let db_dir = ws.data.parent().unwrap().join("dbdir");
    fs::create_dir(&db_dir).unwrap();

    let err = load_all(&ws.data, &db_dir, &IngestOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::Store(_)));
}

#[test]
fn cache_loads_once_per_process() {
    let ws = workspace(&[("outbound.csv", OUTBOUND)]);
    let cache = DatasetCache::new(&ws.data, &ws.db, IngestOptions::default());

    let first = cache.get().unwrap() as *const _;
    fs::remove_dir_all(&ws.data).unwrap();
    let second = cache.get().unwrap() as *const _;

    assert_eq!(first, second);
    assert!(cache.is_loaded());
}
