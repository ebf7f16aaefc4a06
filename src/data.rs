use crate::error::DataError;
use serde_json::{Number, Value};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Cell spellings read as missing values.
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null"];

/// Column-addressable table loaded once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Load a CSV file with a header row
    pub fn from_path(path: impl AsRef<Path>, delimiter: u8) -> Result<Self, DataError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file, delimiter)
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(DataError::MissingHeader);
        }

        let mut rows = Vec::new();
        for (idx, record) in rdr.records().enumerate() {
            let record = record?;
            if record.len() != headers.len() {
                return Err(DataError::RaggedRow {
                    row: idx + 1,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Result<usize, DataError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    /// Full data vector of a column, with numbers inferred per cell
    pub fn column(&self, name: &str) -> Result<Vec<Value>, DataError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| infer_cell(&row[idx])).collect())
    }
}

/// Convert a raw cell into a JSON value: integer, float, null or string
fn infer_cell(cell: &str) -> Value {
    let trimmed = cell.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        // inf has no JSON spelling
        return Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null);
    }
    Value::String(cell.to_string())
}
