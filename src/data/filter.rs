use std::collections::{BTreeMap, BTreeSet};

use super::model::{Dataset, Value};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per categorical column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of selected values.
/// A column absent from the map is unconstrained.
pub type FilterState = BTreeMap<String, BTreeSet<Value>>;

/// Initialise a [`FilterState`] over `columns` with every value selected.
/// Columns missing from the dataset are ignored.
pub fn init_filter_state(dataset: &Dataset, columns: &[&str]) -> FilterState {
    let unique = dataset.unique_values();
    columns
        .iter()
        .filter_map(|col| unique.get(*col).map(|vals| (col.to_string(), vals.clone())))
        .collect()
}

/// Return indices of rows that pass all active filters.
///
/// A row passes a column filter when:
/// * the filter set for that column is empty → nothing selected → fails
/// * every distinct value of the column is selected → passes
/// * the row's value for that column is in the selected set → passes
pub fn filtered_indices(dataset: &Dataset, filters: &FilterState) -> Vec<usize> {
    let unique = dataset.unique_values();
    let active: Vec<(usize, &BTreeSet<Value>)> = filters
        .iter()
        .filter_map(|(col, selected)| {
            let idx = dataset.column_index(col)?;
            // Everything selected, no filtering needed.
            match unique.get(col) {
                Some(all_vals) if !selected.is_empty() && selected.len() >= all_vals.len() => None,
                _ => Some((idx, selected)),
            }
        })
        .collect();

    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            active
                .iter()
                .all(|(idx, selected)| !selected.is_empty() && selected.contains(&row[*idx]))
        })
        .map(|(i, _)| i)
        .collect()
}
