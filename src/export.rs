use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;

use crate::data::model::{Dataset, Value};

// ---------------------------------------------------------------------------
// Parquet export
// ---------------------------------------------------------------------------

/// Write a dataset to a Parquet file, one Arrow column per dataset column.
///
/// Column types are chosen from the cells:
/// * only integers → `Int64`
/// * integers and floats → `Float64`
/// * only booleans → `Boolean`
/// * only dates → `Date32`
/// * anything else → `Utf8` (cells rendered as text)
pub fn write_parquet(dataset: &Dataset, path: &Path) -> Result<()> {
    let batch = to_record_batch(dataset)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)
        .context("building parquet writer")?;
    writer.write(&batch).context("writing parquet record batch")?;
    writer.close().context("finalising parquet file")?;
    Ok(())
}

pub fn to_record_batch(dataset: &Dataset) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(dataset.columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(dataset.columns.len());

    for (idx, name) in dataset.columns.iter().enumerate() {
        let cells: Vec<&Value> = dataset.rows.iter().map(|r| &r[idx]).collect();
        let (data_type, array) = build_array(&cells);
        fields.push(Field::new(name, data_type, true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    RecordBatch::try_new(schema, arrays)
        .with_context(|| format!("assembling record batch for '{}'", dataset.name))
}

fn build_array(cells: &[&Value]) -> (DataType, ArrayRef) {
    if all_cells(cells, |v| matches!(v, Value::Integer(_))) {
        let arr: Int64Array = cells
            .iter()
            .map(|v| match v {
                Value::Integer(i) => Some(*i),
                _ => None,
            })
            .collect();
        (DataType::Int64, Arc::new(arr))
    } else if all_cells(cells, |v| matches!(v, Value::Integer(_) | Value::Float(_))) {
        let arr: Float64Array = cells.iter().map(|v| v.as_f64()).collect();
        (DataType::Float64, Arc::new(arr))
    } else if all_cells(cells, |v| matches!(v, Value::Bool(_))) {
        let arr: BooleanArray = cells
            .iter()
            .map(|v| match v {
                Value::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        (DataType::Boolean, Arc::new(arr))
    } else if all_cells(cells, |v| matches!(v, Value::Date(_))) {
        let arr: Date32Array = cells.iter().map(|v| v.as_date().map(days_since_epoch)).collect();
        (DataType::Date32, Arc::new(arr))
    } else {
        let arr: StringArray = cells
            .iter()
            .map(|v| (!v.is_null()).then(|| v.to_string()))
            .collect();
        (DataType::Utf8, Arc::new(arr))
    }
}

/// Whether every non-null cell satisfies `pred`.
fn all_cells(cells: &[&Value], pred: impl Fn(&Value) -> bool) -> bool {
    cells.iter().filter(|v| !v.is_null()).all(|v| pred(v))
}

/// Days from 0001-01-01 (CE) to 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::TempDir;

    fn dataset() -> Dataset {
        Dataset::new(
            "outbound",
            vec!["GROUP".into(), "ARR".into(), "RATE".into(), "START".into()],
            vec![
                vec![
                    Value::Text("Loom".into()),
                    Value::Integer(1200),
                    Value::Float(0.5),
                    Value::Date(NaiveDate::from_ymd_opt(1970, 1, 11).unwrap()),
                ],
                vec![Value::Null, Value::Null, Value::Integer(2), Value::Null],
            ],
        )
    }

    #[test]
    fn column_types_follow_cells() {
        let batch = to_record_batch(&dataset()).unwrap();
        let schema = batch.schema();
        let types: Vec<_> = schema.fields().iter().map(|f| f.data_type().clone()).collect();
        assert_eq!(
            types,
            vec![DataType::Utf8, DataType::Int64, DataType::Float64, DataType::Date32]
        );
        let dates = batch.column(3).as_any().downcast_ref::<Date32Array>().unwrap();
        assert_eq!(dates.value(0), 10);
        assert!(dates.is_null(1));
    }

    #[test]
    fn parquet_round_trip_row_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("outbound.parquet");
        write_parquet(&dataset(), &path).unwrap();

        let file = std::fs::File::open(&path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(rows, 2);
    }
}
