//! Pure computations behind the dashboard pages.
//!
//! Everything here reads a [`Dataset`] and returns plain values; nothing
//! touches the UI. Missing columns yield empty results rather than errors,
//! since a page must still render when one input file failed to load.

use std::collections::BTreeMap;

use crate::data::model::{Dataset, Value};

pub mod attribution;
pub mod outbound;
pub mod summary;

/// Cells of a numeric column as `f64`; `None` for nulls and text.
pub(crate) fn numeric_column(ds: &Dataset, column: &str) -> Vec<Option<f64>> {
    ds.column_values(column)
        .map(|cells| cells.map(numeric).collect())
        .unwrap_or_default()
}

/// Numeric reading of a cell. Text is accepted when it parses cleanly,
/// which lets raw (un-normalized) tables feed the same helpers.
pub(crate) fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Text(s) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    }
}

/// Display label for a grouping cell, `None` for nulls.
pub(crate) fn label(value: &Value) -> Option<String> {
    if value.is_null() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Sum `value_col` per distinct non-null `group_col`, keyed by label.
pub fn group_sum(ds: &Dataset, group_col: &str, value_col: &str) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    let (Some(g), Some(v)) = (ds.column_index(group_col), ds.column_index(value_col)) else {
        return out;
    };
    for row in &ds.rows {
        let Some(key) = label(&row[g]) else { continue };
        let entry = out.entry(key).or_insert(0.0);
        if let Some(x) = numeric(&row[v]) {
            *entry += x;
        }
    }
    out
}

/// Largest `n` groups of [`group_sum`], descending.
pub fn top_n_by_sum(ds: &Dataset, group_col: &str, value_col: &str, n: usize) -> Vec<(String, f64)> {
    let mut sums: Vec<(String, f64)> = group_sum(ds, group_col, value_col).into_iter().collect();
    sums.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sums.truncate(n);
    sums
}

/// Arithmetic mean of the finite values, `None` when there are none.
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds() -> Dataset {
        Dataset::new(
            "market",
            vec!["PLATFORM".into(), "TOTAL_GMV".into()],
            vec![
                vec![Value::Text("Shopify".into()), Value::Integer(10)],
                vec![Value::Text("Wix".into()), Value::Integer(3)],
                vec![Value::Text("Shopify".into()), Value::Null],
                vec![Value::Null, Value::Integer(100)],
                vec![Value::Text("Magento".into()), Value::Text("7".into())],
            ],
        )
    }

    #[test]
    fn group_sum_skips_null_groups() {
        let sums = group_sum(&ds(), "PLATFORM", "TOTAL_GMV");
        assert_eq!(sums.len(), 3);
        assert_eq!(sums["Shopify"], 10.0);
        assert_eq!(sums["Magento"], 7.0);
    }

    #[test]
    fn top_n_orders_descending() {
        let top = top_n_by_sum(&ds(), "PLATFORM", "TOTAL_GMV", 2);
        assert_eq!(top, vec![("Shopify".to_string(), 10.0), ("Magento".to_string(), 7.0)]);
    }

    #[test]
    fn missing_columns_give_empty_results() {
        assert!(group_sum(&ds(), "NOPE", "TOTAL_GMV").is_empty());
        assert!(numeric_column(&ds(), "NOPE").is_empty());
    }

    #[test]
    fn mean_ignores_non_finite() {
        assert_eq!(mean([1.0, 3.0, f64::INFINITY]), Some(2.0));
        assert_eq!(mean(Vec::<f64>::new()), None);
    }
}
