//! Tabular datasets
//!
//! A [`Dataset`] is an ordered list of rows. Row order is the join key between
//! the dataset and every matrix derived from it: row `i` of a feature or
//! similarity matrix always describes dataset row `i`.

use crate::{Error, Result, Value};
use ahash::AHashMap;
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// One dataset row, keyed by column name
pub type Row = AHashMap<String, Value>;

static MISSING: Value = Value::Missing;

/// An ordered collection of rows with a known column list
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a dataset from JSON record objects
    ///
    /// Column order is the order in which keys first appear across records.
    pub fn from_records(records: &[serde_json::Value]) -> Result<Self> {
        let mut dataset = Dataset::default();
        for (idx, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| {
                Error::Serialization(format!("record {} is not a JSON object", idx))
            })?;
            let row: Row = object
                .iter()
                .map(|(key, value)| (key.clone(), Value::from_json(value)))
                .collect();
            for key in object.keys() {
                if !dataset.has_column(key) {
                    dataset.columns.push(key.clone());
                }
            }
            dataset.rows.push(row);
        }
        Ok(dataset)
    }

    /// Parse a JSON array of record objects
    pub fn from_json_str(json: &str) -> Result<Self> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        match parsed {
            serde_json::Value::Array(records) => Self::from_records(&records),
            _ => Err(Error::Serialization(
                "expected a JSON array of records".to_string(),
            )),
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Read a CSV table with a header row
    ///
    /// Header order becomes column order. Short records leave their trailing
    /// columns missing.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut dataset = Dataset::new(columns);
        for record in reader.records() {
            let record = record?;
            let row: Row = dataset
                .columns
                .iter()
                .zip(record.iter())
                .map(|(column, cell)| (column.clone(), Value::from_csv_cell(cell)))
                .collect();
            dataset.rows.push(row);
        }
        Ok(dataset)
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[inline]
    pub fn row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    /// Cell value, `Missing` when the row lacks the column
    pub fn value(&self, idx: usize, column: &str) -> &Value {
        self.rows
            .get(idx)
            .and_then(|row| row.get(column))
            .unwrap_or(&MISSING)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<()> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(Error::InvalidColumn(name.to_string()))
        }
    }

    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        names.iter().try_for_each(|name| self.require_column(name.as_ref()))
    }

    /// All values of one column in row order
    pub fn column_values(&self, name: &str) -> Result<Vec<&Value>> {
        self.require_column(name)?;
        Ok((0..self.len()).map(|idx| self.value(idx, name)).collect())
    }

    /// Identifier column coerced to text, in row order
    pub fn identifiers(&self, id_column: &str) -> Result<Vec<String>> {
        Ok(self
            .column_values(id_column)?
            .into_iter()
            .map(|v| v.as_text().into_owned())
            .collect())
    }

    /// Inferred type of a column
    pub fn column_type(&self, name: &str) -> Result<ColumnType> {
        let values = self.column_values(name)?;
        let mut present = values.iter().filter(|v| !v.is_missing()).peekable();
        if present.peek().is_none() {
            return Ok(ColumnType::Empty);
        }
        if present.all(|v| v.is_number()) {
            Ok(ColumnType::Number)
        } else {
            Ok(ColumnType::Text)
        }
    }

    /// Columns whose present values are all numeric
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| matches!(self.column_type(c), Ok(ColumnType::Number)))
            .cloned()
            .collect()
    }

    /// Short summary for display
    pub fn info(&self) -> DatasetInfo {
        let dtypes = self
            .columns
            .iter()
            .map(|c| {
                let ty = self.column_type(c).unwrap_or(ColumnType::Empty);
                (c.clone(), ty)
            })
            .collect();
        DatasetInfo {
            rows: self.len(),
            cols: self.columns.len(),
            columns: self.columns.clone(),
            dtypes,
        }
    }
}

/// Inferred column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    Text,
    Empty,
}

/// Dataset summary
#[derive(Debug, Clone, Serialize)]
pub struct DatasetInfo {
    pub rows: usize,
    pub cols: usize,
    pub columns: Vec<String>,
    pub dtypes: Vec<(String, ColumnType)>,
}
