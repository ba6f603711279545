//! Exploratory summaries: descriptive statistics, distinct counts and the
//! derived columns shown on the EDA page.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;

use super::{label, numeric};
use crate::data::model::{Dataset, Value};

pub const CAMPAIGN_START: &str = "CAMPAIGN_START_DATE";
pub const CAMPAIGN_END: &str = "CAMPAIGN_LAST_DATE";
pub const CAMPAIGN_LENGTH: &str = "CAMPAIGN_LENGTH";

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Statistics for every column holding only numbers (and nulls).
pub fn describe(ds: &Dataset) -> Vec<ColumnStats> {
    ds.columns
        .iter()
        .enumerate()
        .filter_map(|(idx, name)| {
            let cells = ds.rows.iter().map(|r| &r[idx]);
            let mut values = Vec::new();
            for cell in cells {
                match cell {
                    Value::Null => {}
                    Value::Integer(_) | Value::Float(_) => values.extend(cell.as_f64()),
                    _ => return None,
                }
            }
            if values.is_empty() {
                return None;
            }
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let std = (values.len() > 1).then(|| {
                (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
            });
            Some(ColumnStats {
                column: name.clone(),
                count: values.len(),
                mean,
                std,
                min: values.iter().cloned().fold(f64::INFINITY, f64::min),
                max: values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            })
        })
        .collect()
}

/// Distinct non-null values per column, in column order.
pub fn unique_counts(ds: &Dataset) -> Vec<(String, usize)> {
    let unique = ds.unique_values();
    ds.columns
        .iter()
        .map(|c| (c.clone(), unique.get(c).map(BTreeSet::len).unwrap_or(0)))
        .collect()
}

/// Copy of an outbound dataset with `CAMPAIGN_LENGTH` (days between start
/// and last date) inserted right after the last-date column. Returns the
/// input unchanged when either date column is missing.
pub fn with_campaign_length(ds: &Dataset) -> Dataset {
    let (Some(start), Some(end)) = (ds.column_index(CAMPAIGN_START), ds.column_index(CAMPAIGN_END))
    else {
        return ds.clone();
    };

    let mut out = ds.clone();
    if let Some(existing) = out.column_index(CAMPAIGN_LENGTH) {
        out.columns.remove(existing);
        for row in &mut out.rows {
            row.remove(existing);
        }
    }
    let end_pos = out.column_index(CAMPAIGN_END).unwrap_or(end);

    out.columns.insert(end_pos + 1, CAMPAIGN_LENGTH.to_string());
    for (row, src) in out.rows.iter_mut().zip(&ds.rows) {
        let length = match (src[start].as_date(), src[end].as_date()) {
            (Some(s), Some(e)) => Value::Integer((e - s).num_days()),
            _ => Value::Null,
        };
        row.insert(end_pos + 1, length);
    }
    out
}

/// Sum of `value_col` per calendar month (1–12) of `date_col`.
pub fn sum_by_month(ds: &Dataset, date_col: &str, value_col: &str) -> BTreeMap<u32, f64> {
    let mut out = BTreeMap::new();
    let (Some(d), Some(v)) = (ds.column_index(date_col), ds.column_index(value_col)) else {
        return out;
    };
    for row in &ds.rows {
        let Some(date) = row[d].as_date() else { continue };
        let entry = out.entry(date.month()).or_insert(0.0);
        if let Some(x) = numeric(&row[v]) {
            *entry += x;
        }
    }
    out
}

/// Distinct `value_col` values per `group_col`, largest first.
pub fn distinct_per_group(ds: &Dataset, group_col: &str, value_col: &str) -> Vec<(String, usize)> {
    let (Some(g), Some(v)) = (ds.column_index(group_col), ds.column_index(value_col)) else {
        return Vec::new();
    };
    let mut groups: BTreeMap<String, BTreeSet<&Value>> = BTreeMap::new();
    for row in &ds.rows {
        let Some(key) = label(&row[g]) else { continue };
        let set = groups.entry(key).or_default();
        if !row[v].is_null() {
            set.insert(&row[v]);
        }
    }
    let mut out: Vec<(String, usize)> = groups.into_iter().map(|(k, s)| (k, s.len())).collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}
