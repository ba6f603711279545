//! Per-column type coercion for freshly parsed datasets.
//!
//! Text columns are classified once, then converted cell by cell:
//!
//! 1. exempt names (categorical labels) are left as text
//! 2. a column where any cell contains a `YYYY-MM-DD` / `YYYY/MM/DD`
//!    substring is parsed as dates
//! 3. everything else is stripped of `$` and `,` and parsed as an integer
//!
//! A cell that fails its conversion becomes [`Value::Null`]. Duplicate rows
//! are removed once the column pass is complete.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{Dataset, Value};

static DATE_SUBSTRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}[-/]\d{2}[-/]\d{2}").expect("valid date pattern"));

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Categorical identifiers that are never coerced.
pub const DEFAULT_EXEMPT_COLUMNS: &[&str] = &["CAMPAIGN_GROUP", "PLATFORM", "GMV_CATEGORY", "COUNTRY"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub exempt_columns: BTreeSet<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            exempt_columns: DEFAULT_EXEMPT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// How a column will be treated by [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Parsed with a concrete type already; left untouched.
    Typed,
    /// On the exempt list; left as text.
    Exempt,
    /// Some cell contains a date-shaped substring.
    DateLike,
    /// Currency / thousands-separated text coerced to integers.
    CurrencyNumeric,
}

/// Decide how a column is converted. Never fails.
pub fn classify_column<'a>(
    name: &str,
    cells: impl IntoIterator<Item = &'a Value>,
    options: &NormalizeOptions,
) -> ColumnKind {
    let texts: Vec<&str> = cells.into_iter().filter_map(Value::as_text).collect();
    if texts.is_empty() {
        return ColumnKind::Typed;
    }
    if options.exempt_columns.contains(name) {
        return ColumnKind::Exempt;
    }
    if texts.iter().any(|s| DATE_SUBSTRING.is_match(s)) {
        return ColumnKind::DateLike;
    }
    ColumnKind::CurrencyNumeric
}

/// Parse a cell as a calendar date. Times of day are discarded.
pub fn coerce_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Strip currency symbols and thousands separators, then parse an integer.
/// Decimals are accepted only when their fractional part is zero.
pub fn coerce_currency(raw: &str) -> Option<i64> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    if let Ok(i) = cleaned.parse::<i64>() {
        return Some(i);
    }
    let f = cleaned.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn convert_cell(kind: ColumnKind, cell: &Value) -> Value {
    let Value::Text(raw) = cell else {
        return cell.clone();
    };
    match kind {
        ColumnKind::Typed | ColumnKind::Exempt => cell.clone(),
        ColumnKind::DateLike => coerce_date(raw).map(Value::Date).unwrap_or(Value::Null),
        ColumnKind::CurrencyNumeric => coerce_currency(raw)
            .map(Value::Integer)
            .unwrap_or(Value::Null),
    }
}

/// Produce a normalized copy of `dataset`.
pub fn normalize(dataset: &Dataset, options: &NormalizeOptions) -> Dataset {
    let kinds: Vec<ColumnKind> = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let kind = classify_column(name, dataset.rows.iter().map(|r| &r[idx]), options);
            log::debug!("{}.{name}: {kind:?}", dataset.name);
            kind
        })
        .collect();

    let rows = dataset
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(&kinds)
                .map(|(cell, kind)| convert_cell(*kind, cell))
                .collect()
        })
        .collect();

    Dataset::new(dataset.name.clone(), dataset.columns.clone(), dedup_rows(rows))
}

/// Remove fully identical rows, keeping the first occurrence.
pub fn dedup_rows(rows: Vec<Vec<Value>>) -> Vec<Vec<Value>> {
    let mut seen: HashSet<Vec<Value>> = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect()
}
