use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Value – a single cell of a dataset
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common DataFrame dtypes.
/// Rows are deduplicated through `HashSet` and unique values are kept in
/// `BTreeSet`, so `Value` must be both `Hash` and `Ord`.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --
// Equality follows `Ord`, so NaN equals NaN and duplicate rows holding it
// still collapse.

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Try to interpret the value as an `f64` for aggregation and plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Dataset – one named table
// ---------------------------------------------------------------------------

/// A named table of rows. Every row is exactly `columns.len()` wide.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Logical table name, derived from the source file stem.
    pub name: String,
    /// Ordered column names.
    pub columns: Vec<String>,
    /// Row-major cells, in source order.
    pub rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Dataset {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Iterate the cells of one column, top to bottom.
    pub fn column_values<'a>(&'a self, column: &str) -> Option<impl Iterator<Item = &'a Value> + 'a> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Sorted set of distinct non-null values per column.
    pub fn unique_values(&self) -> BTreeMap<String, BTreeSet<Value>> {
        let mut out: BTreeMap<String, BTreeSet<Value>> = BTreeMap::new();
        for (idx, col) in self.columns.iter().enumerate() {
            let set = out.entry(col.clone()).or_default();
            for row in &self.rows {
                if !row[idx].is_null() {
                    set.insert(row[idx].clone());
                }
            }
        }
        out
    }

    /// Copy of this dataset restricted to the given row indices.
    pub fn select_rows(&self, indices: &[usize]) -> Dataset {
        Dataset {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Whether any cell of the column holds text, i.e. the column was not
    /// given a concrete type when parsed.
    pub fn is_text_column(&self, idx: usize) -> bool {
        self.rows
            .iter()
            .any(|row| matches!(row[idx], Value::Text(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            "outbound",
            vec!["CAMPAIGN_GROUP".into(), "NB_EMAILS".into()],
            vec![
                vec![Value::Text("Loom".into()), Value::Integer(10)],
                vec![Value::Text("GA4".into()), Value::Null],
                vec![Value::Text("Loom".into()), Value::Integer(4)],
            ],
        )
    }

    #[test]
    fn unique_values_skip_nulls_and_sort() {
        let uniques = sample().unique_values();
        let groups: Vec<_> = uniques["CAMPAIGN_GROUP"].iter().cloned().collect();
        assert_eq!(
            groups,
            vec![Value::Text("GA4".into()), Value::Text("Loom".into())]
        );
        assert_eq!(uniques["NB_EMAILS"].len(), 2);
    }

    #[test]
    fn ordering_groups_by_variant_first() {
        assert!(Value::Null < Value::Integer(-5));
        assert!(Value::Integer(100) < Value::Float(0.0));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_eq!(
            Value::Float(1.5).cmp(&Value::Float(1.5)),
            std::cmp::Ordering::Equal
        );
    }

    #[test]
    fn select_rows_keeps_columns() {
        let ds = sample().select_rows(&[2, 7]);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.rows[0][1], Value::Integer(4));
        assert_eq!(ds.columns.len(), 2);
    }

    #[test]
    fn text_column_detection() {
        let ds = sample();
        assert!(ds.is_text_column(0));
        assert!(!ds.is_text_column(1));
    }
}
