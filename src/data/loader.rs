use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{BumpDataset, DataError, Observation};

pub const COUNTRY: &str = "Country";
pub const YEAR: &str = "Year";
pub const RANK: &str = "Rank";
pub const TOTAL_POINTS: &str = "TotalPoints";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a rank table and keep only the `top_n` best countries.
pub fn load_file(path: &Path, top_n: usize) -> Result<BumpDataset> {
    let rows = read_observations(path)?;
    let dataset = BumpDataset::from_observations(rows, top_n)
        .with_context(|| format!("building chart data from {}", path.display()))?;
    Ok(dataset)
}

/// Read every observation from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with `Country`, `Year`, `Rank`, `TotalPoints`
/// * `.json`    – `[{ "Country": ..., "Year": ..., "Rank": ..., "TotalPoints": ... }, ...]`
/// * `.parquet` – the same four columns
pub fn read_observations(path: &Path) -> Result<Vec<Observation>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataError::UnsupportedExtension(other.to_string()).into()),
    }
}

// ---------------------------------------------------------------------------
// Type coercion
// ---------------------------------------------------------------------------

/// Largest magnitude an integer cell may have: every value up to it is
/// exactly representable as an `f64`.
pub const MAX_EXACT_INTEGER: i64 = (1 << 53) - 1;

/// Coerce a cell to an integer.  `"2012"` and `"2012.0"` are both accepted;
/// anything non-integral or beyond [`MAX_EXACT_INTEGER`] is an error.
pub fn coerce_integer(raw: &str, row: usize, column: &str) -> Result<i64, DataError> {
    let s = raw.trim();
    let value = match s.parse::<i64>() {
        Ok(i) => Some(i),
        Err(_) => s.parse::<f64>().ok().and_then(exact_integer),
    };
    value
        .filter(|i| i.abs() <= MAX_EXACT_INTEGER)
        .ok_or_else(|| invalid(row, column, raw))
}

/// Coerce a Rank cell: an integer of at least 1.
pub fn coerce_rank(raw: &str, row: usize) -> Result<i64, DataError> {
    coerce_integer(raw, row, RANK).and_then(|rank| positive_rank(rank, row))
}

fn positive_rank(rank: i64, row: usize) -> Result<i64, DataError> {
    if rank >= 1 {
        Ok(rank)
    } else {
        Err(invalid(row, RANK, &rank.to_string()))
    }
}

fn exact_integer(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER as f64)
        .then_some(f as i64)
}

fn coerce_number(raw: &str, row: usize, column: &str) -> Result<f64, DataError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| invalid(row, column, raw))
}

fn invalid(row: usize, column: &str, value: &str) -> DataError {
    DataError::InvalidNumber {
        row,
        column: column.to_string(),
        value: value.to_string(),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<Observation>> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

/// Parse a rank table from any CSV source.  Extra columns are ignored.
pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Observation>> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let column = |name: &str| -> Result<usize, DataError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    };
    let country_idx = column(COUNTRY)?;
    let year_idx = column(YEAR)?;
    let rank_idx = column(RANK)?;
    let points_idx = column(TOTAL_POINTS)?;

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        rows.push(Observation {
            country: cell(country_idx).to_string(),
            year: coerce_integer(cell(year_idx), row_no, YEAR)?,
            rank: coerce_rank(cell(rank_idx), row_no)?,
            total_points: coerce_number(cell(points_idx), row_no, TOTAL_POINTS)?,
        });
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, as written by `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "Country": "United States", "Year": 2012, "Rank": 1, "TotalPoints": 250 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Observation>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub fn parse_json(text: &str) -> Result<Vec<Observation>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let country = match json_field(obj, COUNTRY)? {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        };

        rows.push(Observation {
            country,
            year: json_integer(json_field(obj, YEAR)?, i, YEAR)?,
            rank: json_integer(json_field(obj, RANK)?, i, RANK)
                .and_then(|rank| positive_rank(rank, i))?,
            total_points: json_number(json_field(obj, TOTAL_POINTS)?, i, TOTAL_POINTS)?,
        });
    }

    Ok(rows)
}

fn json_field<'a>(
    obj: &'a serde_json::Map<String, JsonValue>,
    name: &str,
) -> Result<&'a JsonValue, DataError> {
    obj.get(name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))
}

fn json_integer(val: &JsonValue, row: usize, column: &str) -> Result<i64, DataError> {
    match val {
        JsonValue::Number(n) => coerce_integer(&n.to_string(), row, column),
        JsonValue::String(s) => coerce_integer(s, row, column),
        other => Err(invalid(row, column, &other.to_string())),
    }
}

fn json_number(val: &JsonValue, row: usize, column: &str) -> Result<f64, DataError> {
    match val {
        JsonValue::Number(n) => n
            .as_f64()
            .ok_or_else(|| invalid(row, column, &n.to_string())),
        JsonValue::String(s) => coerce_number(s, row, column),
        other => Err(invalid(row, column, &other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet rank table.
///
/// Expected schema:
/// - `Country`: Utf8 or LargeUtf8
/// - `Year`, `Rank`: Int32 / Int64 (integral floats are accepted too)
/// - `TotalPoints`: any integer or float column
fn load_parquet(path: &Path) -> Result<Vec<Observation>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let country_col = column(&batch, COUNTRY)?;
        let year_col = column(&batch, YEAR)?;
        let rank_col = column(&batch, RANK)?;
        let points_col = column(&batch, TOTAL_POINTS)?;

        let offset = rows.len();
        for row in 0..batch.num_rows() {
            let row_no = offset + row;
            rows.push(Observation {
                country: extract_string(country_col, row)
                    .with_context(|| format!("Row {row_no}: failed to read '{COUNTRY}'"))?,
                year: extract_number(year_col, row)
                    .and_then(|v| integral(v, row_no, YEAR))?,
                rank: extract_number(rank_col, row)
                    .and_then(|v| integral(v, row_no, RANK))
                    .and_then(|rank| positive_rank(rank, row_no).map_err(Into::into))?,
                total_points: extract_number(points_col, row)
                    .with_context(|| format!("Row {row_no}: failed to read '{TOTAL_POINTS}'"))?,
            });
        }
    }

    Ok(rows)
}

// -- Parquet / Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Arc<dyn Array>, DataError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))
}

fn integral(value: f64, row: usize, column: &str) -> Result<i64> {
    exact_integer(value).ok_or_else(|| invalid(row, column, &value.to_string()).into())
}

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in string column");
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected Utf8 column, got {other:?}"),
    }
}

/// Read a numeric cell of any integer or float type as `f64`.
fn extract_number(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row)),
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    value.context("column type does not match its declared data type")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn csv_rows(text: &str) -> Result<Vec<Observation>> {
        read_csv(csv::Reader::from_reader(text.as_bytes()))
    }

    #[test]
    fn coerces_integral_floats() {
        assert_eq!(coerce_integer("2012", 0, YEAR), Ok(2012));
        assert_eq!(coerce_integer(" 2012.0 ", 0, YEAR), Ok(2012));
        assert!(coerce_integer("2.5", 3, RANK).is_err());
        assert_eq!(
            coerce_integer("gold", 3, RANK),
            Err(DataError::InvalidNumber {
                row: 3,
                column: RANK.to_string(),
                value: "gold".to_string(),
            })
        );
    }

    #[test]
    fn integers_must_be_exact_as_doubles() {
        assert_eq!(coerce_integer("9007199254740991", 0, RANK), Ok(MAX_EXACT_INTEGER));
        assert!(coerce_integer("9007199254740992", 0, RANK).is_err());
        assert!(coerce_integer("9223372036854775807", 0, RANK).is_err());
        assert!(coerce_integer("1e20", 0, RANK).is_err());
        assert!(coerce_integer("-1e300", 0, YEAR).is_err());
    }

    #[test]
    fn ranks_start_at_one() {
        assert_eq!(coerce_rank("1", 0), Ok(1));
        assert_eq!(
            coerce_rank("0", 4),
            Err(DataError::InvalidNumber {
                row: 4,
                column: RANK.to_string(),
                value: "0".to_string(),
            })
        );
        assert!(coerce_rank("-3.0", 0).is_err());
    }

    #[test]
    fn oversized_ranks_fail_to_load_instead_of_overflowing() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Country,Year,Rank,TotalPoints").unwrap();
        writeln!(file, "A,2012,9223372036854775807,1").unwrap();
        writeln!(file, "A,2016,1e20,1").unwrap();
        file.flush().unwrap();

        let err = load_file(file.path(), 10).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::InvalidNumber { row: 0, .. })
        ));
    }

    #[test]
    fn json_rejects_zero_rank_and_huge_year() {
        let zero = parse_json(r#"[{"Country": "A", "Year": 2012, "Rank": 0, "TotalPoints": 1}]"#)
            .unwrap_err();
        assert!(matches!(
            zero.downcast_ref::<DataError>(),
            Some(DataError::InvalidNumber { row: 0, .. })
        ));
        assert!(parse_json(r#"[{"Country": "A", "Year": 1e20, "Rank": 1, "TotalPoints": 1}]"#).is_err());
    }

    #[test]
    fn csv_with_extra_columns_and_any_order() {
        let rows = csv_rows(
            "Year,Country,TotalPoints,Rank,Note\n\
             2012,Kenya,12,5,x\n\
             2016,Kenya,15.5,4,y\n",
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], Observation::new("Kenya", 2016, 4, 15.5));
    }

    #[test]
    fn csv_missing_column_is_reported() {
        let err = csv_rows("Country,Year,Rank\nA,2012,1\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<DataError>(),
            Some(&DataError::MissingColumn(TOTAL_POINTS.to_string()))
        );
    }

    #[test]
    fn csv_bad_rank_names_the_row() {
        let err = csv_rows("Country,Year,Rank,TotalPoints\nA,2012,1,3\nB,2012,two,2\n")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::InvalidNumber { row: 1, .. })
        ));
    }

    #[test]
    fn json_accepts_numbers_and_strings() {
        let rows = parse_json(
            r#"[
                {"Country": "Japan", "Year": 2020, "Rank": 3, "TotalPoints": 58},
                {"Country": "Japan", "Year": "2016", "Rank": "6.0", "TotalPoints": "41"}
            ]"#,
        )
        .unwrap();
        assert_eq!(rows[0], Observation::new("Japan", 2020, 3, 58.0));
        assert_eq!(rows[1], Observation::new("Japan", 2016, 6, 41.0));
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(parse_json(r#"{"Country": "A"}"#).is_err());
    }

    #[test]
    fn unsupported_extension() {
        let err = read_observations(Path::new("ranks.xlsx")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DataError>(),
            Some(&DataError::UnsupportedExtension("xlsx".to_string()))
        );
    }

    #[test]
    fn load_file_selects_top_countries() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Country,Year,Rank,TotalPoints").unwrap();
        for (i, country) in ["A", "B", "C"].iter().enumerate() {
            writeln!(file, "{country},2012,{},{}", i + 1, 30 - i).unwrap();
        }
        file.flush().unwrap();

        let ds = load_file(file.path(), 2).unwrap();
        assert_eq!(ds.countries, vec!["A", "B"]);
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn empty_csv_fails_to_load() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Country,Year,Rank,TotalPoints").unwrap();
        file.flush().unwrap();

        let err = load_file(file.path(), 10).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DataError>(),
            Some(&DataError::EmptyDataset)
        );
    }

    #[test]
    fn parquet_round_trip_through_loader() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(COUNTRY, DataType::Utf8, false),
            Field::new(YEAR, DataType::Int64, false),
            Field::new(RANK, DataType::Int32, false),
            Field::new(TOTAL_POINTS, DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["France", "Italy"])),
                Arc::new(Int64Array::from(vec![2024, 2024])),
                Arc::new(Int32Array::from(vec![2, 7])),
                Arc::new(Float64Array::from(vec![120.0, 61.0])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let rows = read_observations(file.path()).unwrap();
        assert_eq!(rows, vec![
            Observation::new("France", 2024, 2, 120.0),
            Observation::new("Italy", 2024, 7, 61.0),
        ]);
    }
}
