use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};

use super::model::{Dataset, Value};

/// Tokens read as a missing value, matching the usual DataFrame defaults.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Parse options
// ---------------------------------------------------------------------------

/// How a single CSV file is turned into a [`Dataset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Raw lines to discard before the header row.
    pub skip_rows: usize,
    /// Drop columns whose every cell is missing.
    pub drop_empty_columns: bool,
}

impl ParseOptions {
    /// Options for a file carrying a free-form preamble above its header.
    pub fn with_preamble(skip_rows: usize) -> Self {
        ParseOptions {
            skip_rows,
            drop_empty_columns: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one CSV file as a dataset called `table_name`.
pub fn load_csv(path: &Path, table_name: &str, options: &ParseOptions) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading CSV file {}", path.display()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let body = skip_lines(text, options.skip_rows);
    parse_csv(table_name, body.as_bytes(), options)
        .with_context(|| format!("parsing {}", path.display()))
}

/// Parse CSV text (header row first) into a dataset.
///
/// Layout rules:
/// * blank header cells become `Unnamed: <index>`
/// * repeated header names get `.1`, `.2`, ... suffixes
/// * short records are padded with nulls, long records are an error
/// * each column is typed as integer, float, bool or text from its cells
pub fn parse_csv<R: Read>(table_name: &str, reader: R, options: &ParseOptions) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record.context("reading CSV header")?,
        None => bail!("no header row found"),
    };
    let mut columns = dedupe_headers(header.iter());
    let width = columns.len();

    // Column-major raw cells; `None` marks a missing value.
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
    for (row_no, result) in records.enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > width {
            bail!(
                "CSV row {row_no}: expected {width} fields, found {}",
                record.len()
            );
        }
        for (col_idx, column) in raw.iter_mut().enumerate() {
            let cell = record
                .get(col_idx)
                .filter(|s| !NA_TOKENS.contains(s))
                .map(str::to_string);
            column.push(cell);
        }
    }

    let mut typed: Vec<Vec<Value>> = raw.iter().map(|cells| infer_column(cells)).collect();

    if options.drop_empty_columns {
        let keep: Vec<bool> = typed
            .iter()
            .map(|cells| cells.iter().any(|v| !v.is_null()))
            .collect();
        let mut flags = keep.iter();
        columns.retain(|_| *flags.next().unwrap_or(&true));
        let mut flags = keep.iter();
        typed.retain(|_| *flags.next().unwrap_or(&true));
    }

    let n_rows = typed.first().map(Vec::len).unwrap_or(0);
    let mut columns_iter: Vec<std::vec::IntoIter<Value>> =
        typed.into_iter().map(Vec::into_iter).collect();
    let rows: Vec<Vec<Value>> = (0..n_rows)
        .map(|_| {
            columns_iter
                .iter_mut()
                .map(|col| col.next().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Ok(Dataset::new(table_name, columns, rows))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Slice off the first `n` raw lines.
fn skip_lines(text: &str, n: usize) -> &str {
    let offset: usize = text.split_inclusive('\n').take(n).map(str::len).sum();
    &text[offset..]
}

fn dedupe_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    names
        .enumerate()
        .map(|(idx, name)| {
            let base = if name.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let out = if *count == 0 {
                base
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            out
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellType {
    Integer,
    Float,
    Bool,
    Text,
}

fn infer_column(cells: &[Option<String>]) -> Vec<Value> {
    let present = || cells.iter().flatten();

    let cell_type = if present().all(|s| s.trim().parse::<i64>().is_ok()) {
        CellType::Integer
    } else if present().all(|s| s.trim().parse::<f64>().is_ok()) {
        CellType::Float
    } else if present().all(|s| parse_bool(s).is_some()) {
        CellType::Bool
    } else {
        CellType::Text
    };

    cells
        .iter()
        .map(|cell| match cell {
            None => Value::Null,
            Some(s) => match cell_type {
                CellType::Integer => s.trim().parse().map(Value::Integer).unwrap_or(Value::Null),
                CellType::Float => s.trim().parse().map(Value::Float).unwrap_or(Value::Null),
                CellType::Bool => parse_bool(s).map(Value::Bool).unwrap_or(Value::Null),
                CellType::Text => Value::Text(s.clone()),
            },
        })
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}
