use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type, UInt32Type, UInt64Type,
};
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{SalesRecord, SalesTable, DATE_FORMAT};

/// Canonical names of the columns every input must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "date",
    "sales_person",
    "country",
    "product",
    "amount",
    "boxes_shipped",
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a sales file could not be turned into a [`SalesTable`].
///
/// Any of these aborts the whole load; there is no partial table.
#[derive(Debug, Error, PartialEq)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: cannot parse date '{value}' (expected DD/MM/YYYY)")]
    BadDate { row: usize, value: String },
    #[error("row {row}: invalid amount '{value}'")]
    BadAmount { row: usize, value: String },
    #[error("row {row}: invalid box count '{value}'")]
    BadBoxes { row: usize, value: String },
    #[error("column '{column}' has unsupported type {data_type}")]
    UnexpectedType { column: &'static str, data_type: String },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one sale per line (recommended)
/// * `.json`    – `[{ "Date": "...", "Sales Person": "...", ... }, ...]`
/// * `.parquet` – one column per attribute, dates as text or `Date32`
pub fn load_file(path: &Path) -> Result<SalesTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} sales records ({} countries, {} products) from {}",
        table.len(),
        table.countries.len(),
        table.products.len(),
        path.display()
    );
    Ok(table)
}

/// Normalise a header so `Sales Person`, `sales_person` and `SALES-PERSON`
/// all compare equal.
pub fn normalize_column_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Position of every required column within `headers`.
fn resolve_columns<'a, I>(headers: I) -> Result<[usize; 6], LoadError>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized: Vec<String> = headers.into_iter().map(normalize_column_name).collect();
    let mut positions = [0usize; 6];
    for (slot, wanted) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = normalized
            .iter()
            .position(|h| h == wanted)
            .ok_or(LoadError::MissingColumn(wanted))?;
    }
    Ok(positions)
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

/// Strict `DD/MM/YYYY`: one or two digit day and month, four digit year.
pub fn parse_date(raw: &str, row: usize) -> Result<NaiveDate, LoadError> {
    let bad = || LoadError::BadDate {
        row,
        value: raw.to_string(),
    };
    let trimmed = raw.trim();
    let parts: Vec<&str> = trimmed.split('/').collect();
    let digits = |s: &str, lo: usize, hi: usize| {
        (lo..=hi).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    // chrono's %Y alone would take `22` as year 0022.
    if parts.len() != 3
        || !digits(parts[0], 1, 2)
        || !digits(parts[1], 1, 2)
        || !digits(parts[2], 4, 4)
    {
        return Err(bad());
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| bad())
}

/// Drop thousands separators, rejecting commas that do not sit between
/// groups of three digits (`1,234` is fine, `1,2,3` is not).
fn strip_thousands(s: &str) -> Option<String> {
    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (s, None),
    };
    if frac.is_some_and(|f| f.contains(',')) {
        return None;
    }
    let mut groups = whole.split(',');
    let mut out = groups.next()?.to_string();
    if whole.contains(',') && !(1..=3).contains(&out.len()) {
        return None;
    }
    for group in groups {
        if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        out.push_str(group);
    }
    if let Some(frac) = frac {
        out.push('.');
        out.push_str(frac);
    }
    Some(out)
}

/// Accepts `5320`, `5320.5` and currency text such as ` $5,320.00 `.
pub fn parse_amount(raw: &str, row: usize) -> Result<f64, LoadError> {
    let cleaned = strip_thousands(raw.trim().trim_start_matches('$').trim());
    match cleaned.map(|c| c.parse::<f64>()) {
        Some(Ok(v)) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(LoadError::BadAmount {
            row,
            value: raw.to_string(),
        }),
    }
}

pub fn parse_boxes(raw: &str, row: usize) -> Result<u64, LoadError> {
    strip_thousands(raw.trim())
        .and_then(|c| c.parse::<u64>().ok())
        .ok_or_else(|| LoadError::BadBoxes {
            row,
            value: raw.to_string(),
        })
}

/// Build one record from its six text fields, in [`REQUIRED_COLUMNS`] order.
fn parse_text_row(fields: [&str; 6], row: usize) -> Result<SalesRecord, LoadError> {
    Ok(SalesRecord {
        date: parse_date(fields[0], row)?,
        sales_person: fields[1].trim().to_string(),
        country: fields[2].trim().to_string(),
        product: fields[3].trim().to_string(),
        amount: parse_amount(fields[4], row)?,
        boxes_shipped: parse_boxes(fields[5], row)?,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row naming at least the six sales attributes, any
/// order, extra columns ignored. Rows are numbered from 1 after the header.
fn load_csv(path: &Path) -> Result<SalesTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;
    let columns = resolve_columns(reader.headers().context("reading CSV headers")?.iter())?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = result.with_context(|| format!("CSV row {row}"))?;
        let fields = columns.map(|idx| record.get(idx).unwrap_or(""));
        records.push(parse_text_row(fields, row)?);
    }

    Ok(SalesTable::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Sales Person": "Jehu Rudeforth",
///     "Country": "UK",
///     "Product": "Mint Chip Choco",
///     "Date": "04/01/2022",
///     "Amount": "$5,320.00",
///     "Boxes Shipped": 180
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<SalesTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, value) in rows.iter().enumerate() {
        let row = i + 1;
        let obj = value
            .as_object()
            .with_context(|| format!("Row {row} is not a JSON object"))?;

        let columns = resolve_columns(obj.keys().map(String::as_str))?;
        let values: Vec<&JsonValue> = obj.values().collect();
        let texts = columns.map(|idx| json_text(values[idx]));
        let fields = texts.each_ref().map(String::as_str);
        records.push(parse_text_row(fields, row)?);
    }

    Ok(SalesTable::from_records(records))
}

fn json_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing sales records.
///
/// Column types accepted:
/// - `date`: Utf8 (`DD/MM/YYYY`) or Date32
/// - `sales_person`, `country`, `product`: Utf8 / LargeUtf8
/// - `amount`: any float or integer, or currency text
/// - `boxes_shipped`: any integer, or text
fn load_parquet(path: &Path) -> Result<SalesTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let columns =
            resolve_columns(schema.fields().iter().map(|f| f.name().as_str()))?;
        let [date_col, person_col, country_col, product_col, amount_col, boxes_col] =
            columns.map(|idx| batch.column(idx));

        for i in 0..batch.num_rows() {
            let row = records.len() + 1;
            records.push(SalesRecord {
                date: date_at(date_col, i, row)?,
                sales_person: string_at(person_col, i, REQUIRED_COLUMNS[1])?,
                country: string_at(country_col, i, REQUIRED_COLUMNS[2])?,
                product: string_at(product_col, i, REQUIRED_COLUMNS[3])?,
                amount: amount_at(amount_col, i, row)?,
                boxes_shipped: boxes_at(boxes_col, i, row)?,
            });
        }
    }

    Ok(SalesTable::from_records(records))
}

// -- Parquet / Arrow helpers --

fn unexpected(column: &'static str, col: &Arc<dyn Array>) -> LoadError {
    LoadError::UnexpectedType {
        column,
        data_type: format!("{:?}", col.data_type()),
    }
}

/// Text value of a Utf8 / LargeUtf8 cell; nulls become empty strings.
fn text_at(col: &Arc<dyn Array>, i: usize) -> Option<String> {
    if col.is_null(i) {
        return Some(String::new());
    }
    match col.data_type() {
        DataType::Utf8 => col.as_string_opt::<i32>().map(|s| s.value(i).to_string()),
        DataType::LargeUtf8 => col.as_string_opt::<i64>().map(|s| s.value(i).to_string()),
        _ => None,
    }
}

fn string_at(col: &Arc<dyn Array>, i: usize, column: &'static str) -> Result<String, LoadError> {
    text_at(col, i)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| unexpected(column, col))
}

fn date_at(col: &Arc<dyn Array>, i: usize, row: usize) -> Result<NaiveDate, LoadError> {
    if col.data_type() == &DataType::Date32 && !col.is_null(i) {
        return col
            .as_primitive_opt::<Date32Type>()
            .and_then(|a| a.value_as_date(i))
            .ok_or_else(|| LoadError::BadDate {
                row,
                value: format!("{:?}", col.data_type()),
            });
    }
    let text = text_at(col, i).ok_or_else(|| unexpected(REQUIRED_COLUMNS[0], col))?;
    parse_date(&text, row)
}

fn amount_at(col: &Arc<dyn Array>, i: usize, row: usize) -> Result<f64, LoadError> {
    let bad = |value: String| LoadError::BadAmount { row, value };
    if col.is_null(i) {
        return Err(bad("<null>".to_string()));
    }
    let value = match col.data_type() {
        DataType::Float64 => col.as_primitive_opt::<Float64Type>().map(|a| a.value(i)),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| a.value(i) as f64),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| a.value(i) as f64),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| a.value(i) as f64),
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = text_at(col, i).unwrap_or_default();
            return parse_amount(&text, row);
        }
        _ => None,
    };
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(bad(v.to_string())),
        None => Err(unexpected(REQUIRED_COLUMNS[4], col)),
    }
}

fn boxes_at(col: &Arc<dyn Array>, i: usize, row: usize) -> Result<u64, LoadError> {
    let bad = |value: String| LoadError::BadBoxes { row, value };
    if col.is_null(i) {
        return Err(bad("<null>".to_string()));
    }
    let value: Option<i128> = match col.data_type() {
        DataType::Int64 => col.as_primitive_opt::<Int64Type>().map(|a| a.value(i) as i128),
        DataType::Int32 => col.as_primitive_opt::<Int32Type>().map(|a| a.value(i) as i128),
        DataType::UInt64 => col.as_primitive_opt::<UInt64Type>().map(|a| a.value(i) as i128),
        DataType::UInt32 => col.as_primitive_opt::<UInt32Type>().map(|a| a.value(i) as i128),
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = text_at(col, i).unwrap_or_default();
            return parse_boxes(&text, row);
        }
        _ => None,
    };
    match value {
        Some(v) => u64::try_from(v).map_err(|_| bad(v.to_string())),
        None => Err(unexpected(REQUIRED_COLUMNS[5], col)),
    }
}
