use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{CatalogError, Result};
use super::model::{CellValue, RawTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular source into a [`RawTable`]. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line
/// * `.json`    – `[{ "gene_name": "BRAF", "x": 1.0, ... }, ...]`
/// * `.parquet` – flat columns of strings / integers / floats
pub fn load_table(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => Err(CatalogError::UnsupportedFormat(other.to_string())),
    }?;
    debug!(
        "loaded {} rows x {} columns from {}",
        table.len(),
        table.headers.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    read_csv(file, path.display().to_string())
}

/// Read CSV text from any reader. Every non-empty cell is kept as text;
/// typing happens when the table is validated into records.
pub fn read_csv<R: Read>(reader: R, source_name: impl Into<String>) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut table = RawTable::new(source_name, headers);
    for result in reader.records() {
        let record = result?;
        let cells = record
            .iter()
            .map(|value| {
                if value.is_empty() {
                    CellValue::Null
                } else {
                    CellValue::String(value.to_string())
                }
            })
            .collect();
        table.rows.push(cells);
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path)?;
    read_json(&text, path.display().to_string())
}

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "gene_name": "BRAF", "resno_y": 600, "x": 1.5, ... },
///   ...
/// ]
/// ```
///
/// The header is the union of keys over all records; a key missing from one
/// record reads as null in that row.
pub fn read_json(text: &str, source_name: impl Into<String>) -> Result<RawTable> {
    let source_name = source_name.into();
    let root: JsonValue = serde_json::from_str(text)?;
    let records = root
        .as_array()
        .ok_or_else(|| CatalogError::schema(&source_name, "expected a top-level JSON array"))?;

    let mut keys = BTreeSet::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| {
            CatalogError::schema(&source_name, format!("record {} is not a JSON object", i + 1))
        })?;
        keys.extend(obj.keys().cloned());
    }
    let headers: Vec<String> = keys.into_iter().collect();

    let mut table = RawTable::new(source_name, headers.clone());
    for rec in records {
        let cells = headers
            .iter()
            .map(|h| rec.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
            .collect();
        table.rows.push(cells);
    }
    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table, as written by `df.to_parquet()` (Pandas) or
/// `df.write_parquet()` (Polars). Integer columns of any width read as
/// integers, float columns as floats, everything else is cast to text.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut table = RawTable::new(path.display().to_string(), headers);
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch
            .columns()
            .iter()
            .map(column_cells)
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            table
                .rows
                .push(columns.iter().map(|col| col[row].clone()).collect());
        }
    }
    Ok(table)
}

/// Convert one Arrow column into cells.
fn column_cells(col: &ArrayRef) -> Result<Vec<CellValue>> {
    let n = col.len();
    let cells = match col.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => {
            let wide = cast(col, &DataType::Int64)?;
            let arr = wide.as_primitive::<Int64Type>();
            (0..n)
                .map(|i| {
                    if arr.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Integer(arr.value(i))
                    }
                })
                .collect()
        }
        DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let wide = cast(col, &DataType::Float64)?;
            let arr = wide.as_primitive::<Float64Type>();
            (0..n)
                .map(|i| {
                    if arr.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Float(arr.value(i))
                    }
                })
                .collect()
        }
        DataType::Boolean => {
            let arr = col.as_boolean();
            (0..n)
                .map(|i| {
                    if arr.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Bool(arr.value(i))
                    }
                })
                .collect()
        }
        _ => {
            let text = cast(col, &DataType::Utf8)?;
            let arr = text.as_string::<i32>();
            (0..n)
                .map(|i| {
                    if arr.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::String(arr.value(i).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(cells)
}
