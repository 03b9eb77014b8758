use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Dataset};

/// Tokens read as missing cells in CSV input, matching common dataframe
/// defaults.
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat scalar columns
/// * `.json`    – `[{ "Year": 1979, "Jan_Value": 15.4, ... }, ...]`
/// * `.csv`     – header row followed by one record per row
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        dataset.len(),
        dataset.columns(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`). Columns are the
/// union of all record keys; a key absent from a record is a missing cell.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Missing))
                .collect()
        })
        .collect();

    Ok(Dataset::new(columns, rows)?)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Missing,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every record the same width.
fn load_csv(path: &Path) -> Result<Dataset> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Dataset> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(Dataset::new(headers, rows)?)
}

fn guess_cell_type(raw: &str) -> CellValue {
    let s = raw.trim();
    if NA_TOKENS.contains(&s) {
        return CellValue::Missing;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat scalar columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nested columns are kept as text.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let batch_columns = batch
            .columns()
            .iter()
            .zip(&columns)
            .map(|(col, name)| {
                widen_column(col).with_context(|| format!("converting column {name}"))
            })
            .collect::<Result<Vec<_>>>()?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch_columns
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(Dataset::new(columns, rows)?)
}

/// Cast narrow and exotic scalar types onto the few that `extract_cell`
/// reads: small and unsigned integers to `Int64`, half floats and decimals
/// to `Float64`, dictionaries to their value type.
fn widen_column(col: &ArrayRef) -> Result<ArrayRef> {
    let target = match col.data_type() {
        DataType::Int8
        | DataType::Int16
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DataType::Int64,
        DataType::Float16 | DataType::Decimal128(_, _) | DataType::Decimal256(_, _) => {
            DataType::Float64
        }
        DataType::Dictionary(_, values) => {
            let decoded = cast(col, values.as_ref())?;
            return widen_column(&decoded);
        }
        _ => return Ok(Arc::clone(col)),
    };
    Ok(cast(col, &target)?)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Missing;
    }
    let any = col.as_any();
    let cell = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| CellValue::Text(a.value(row).to_string())),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row))),
        other => Some(CellValue::Text(format!("{other:?}"))),
    };
    cell.unwrap_or(CellValue::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    #[test]
    fn csv_cells_are_typed() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        writeln!(file, "Year,Jan_Value,Feb_Value,Note")?;
        writeln!(file, "1979,15.4,NaN,ok")?;
        writeln!(file, "1980,,16.1,")?;
        file.flush()?;

        let ds = load_file(file.path())?;
        assert_eq!(ds.columns(), ["Year", "Jan_Value", "Feb_Value", "Note"]);
        assert_eq!(ds.len(), 2);

        let first = ds.row(0).context("row 0")?;
        assert_eq!(first.get("Year"), Some(&CellValue::Integer(1979)));
        assert_eq!(first.get("Jan_Value"), Some(&CellValue::Float(15.4)));
        assert_eq!(first.get("Feb_Value"), Some(&CellValue::Missing));
        assert_eq!(first.get("Note"), Some(&CellValue::Text("ok".into())));

        let second = ds.row(1).context("row 1")?;
        assert!(second.get("Jan_Value").is_some_and(CellValue::is_missing));
        assert!(second.get("Note").is_some_and(CellValue::is_missing));
        Ok(())
    }

    #[test]
    fn ragged_csv_is_rejected() -> Result<()> {
        let reader = csv::Reader::from_reader("Year,Jan_Value\n1979,15.4,3\n".as_bytes());
        assert!(read_csv(reader).is_err());
        Ok(())
    }

    #[test]
    fn json_records_fill_absent_keys() -> Result<()> {
        let ds = parse_json(
            r#"[{"Year": 1979, "Jan_Value": 15.4}, {"Year": 1980, "Jan_Value": null, "Feb_Value": "16.0"}]"#,
        )?;
        assert_eq!(ds.len(), 2);
        assert!(ds.has_column("Feb_Value"));
        let first = ds.row(0).context("row 0")?;
        assert_eq!(first.get("Feb_Value"), Some(&CellValue::Missing));
        let second = ds.row(1).context("row 1")?;
        assert_eq!(second.get("Jan_Value"), Some(&CellValue::Missing));
        assert_eq!(second.get("Feb_Value").and_then(CellValue::as_f64), Some(16.0));
        Ok(())
    }

    #[test]
    fn parquet_scalar_columns() -> Result<()> {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Year", DataType::Int64, false),
            Field::new("Jan_Value", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1979, 1980])),
                Arc::new(Float64Array::from(vec![Some(15.4), None])),
            ],
        )?;

        let file = tempfile::Builder::new().suffix(".parquet").tempfile()?;
        let mut writer = ArrowWriter::try_new(file.reopen()?, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;

        let ds = load_file(file.path())?;
        assert_eq!(ds.columns(), ["Year", "Jan_Value"]);
        let second = ds.row(1).context("row 1")?;
        assert_eq!(second.get("Year"), Some(&CellValue::Integer(1980)));
        assert_eq!(second.get("Jan_Value"), Some(&CellValue::Missing));
        Ok(())
    }

    #[test]
    fn parquet_narrow_and_dictionary_columns() -> Result<()> {
        use arrow::array::{DictionaryArray, Int16Array, UInt8Array};
        use arrow::datatypes::Int32Type;

        let schema = Arc::new(Schema::new(vec![
            Field::new("Year", DataType::Int16, false),
            Field::new("Month", DataType::UInt8, false),
            Field::new(
                "Region",
                DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8)),
                false,
            ),
            Field::new("Jan_Value", DataType::Float64, true),
        ]));
        let region: DictionaryArray<Int32Type> = vec!["arctic", "arctic"].into_iter().collect();
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int16Array::from(vec![1979, 1980])),
                Arc::new(UInt8Array::from(vec![1, 1])),
                Arc::new(region),
                Arc::new(Float64Array::from(vec![Some(15.4), Some(15.1)])),
            ],
        )?;

        let file = tempfile::Builder::new().suffix(".parquet").tempfile()?;
        let mut writer = ArrowWriter::try_new(file.reopen()?, schema, None)?;
        writer.write(&batch)?;
        writer.close()?;

        let ds = load_file(file.path())?;
        let first = ds.row(0).context("row 0")?;
        assert_eq!(first.get("Year"), Some(&CellValue::Integer(1979)));
        assert_eq!(first.get("Month"), Some(&CellValue::Integer(1)));
        assert_eq!(first.get("Region"), Some(&CellValue::Text("arctic".into())));
        let second = ds.row(1).context("row 1")?;
        assert_eq!(second.get("Year").and_then(CellValue::as_f64), Some(1980.0));
        Ok(())
    }

    #[test]
    fn unsupported_extension() {
        assert!(load_file(Path::new("extent.xlsx")).is_err());
    }
}
