use thiserror::Error;

/// Errors raised while decoding an uploaded feature file.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("No columns to parse from file")]
    NoHeader,

    #[error("could not convert string to float: '{value}' (row {row}, column {column})")]
    NonNumeric {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("row {row} has {actual} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Rectangular batch of numeric feature rows.
///
/// Every row carries exactly `column_count` values. A table may hold zero rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureTable {
    columns: usize,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    /// Build a table with an explicit width, rejecting rows of any other width.
    pub fn new(columns: usize, rows: Vec<Vec<f64>>) -> Result<Self, TableError> {
        if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns) {
            return Err(TableError::RaggedRow {
                row,
                expected: columns,
                actual: values.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Build a table whose width is taken from the first row.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, TableError> {
        let columns = rows.first().map(Vec::len).unwrap_or(0);
        Self::new(columns, rows)
    }

    /// Decode CSV bytes. The first record is the header and fixes the width;
    /// all following records must be numeric and of the same width.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let columns = reader.headers()?.len();
        if columns == 0 {
            return Err(TableError::NoHeader);
        }

        let mut rows = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let values = record
                .iter()
                .enumerate()
                .map(|(column, cell)| {
                    cell.parse::<f64>().map_err(|_| TableError::NonNumeric {
                        row,
                        column,
                        value: cell.to_string(),
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            rows.push(values);
        }

        Self::new(columns, rows)
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}
