use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Canonical form of a menu key: trimmed and uppercased.
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Immutable square item-by-item similarity matrix.
///
/// Row and column labels are normalized once at load time, so lookups take
/// already-normalized keys and the table is safe to share across concurrent
/// queries without further mutation.
pub struct SimilarityTable {
    row_labels: Vec<String>,
    rows: HashMap<String, usize>,
    columns: HashMap<String, usize>,
    scores: Vec<Vec<f64>>,
}

impl SimilarityTable {
    /// Loads a matrix from a CSV file. The first header cell names the index
    /// column and is ignored; remaining header cells are column labels. Each
    /// record starts with its row label followed by one score per column.
    pub fn from_csv(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let table = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            items = table.row_labels.len(),
            "Loaded similarity matrix"
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        // Flexible so ragged rows reach the length check below and report
        // which row is malformed, rather than a bare csv error.
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column_count = headers.len().saturating_sub(1);
        if column_count == 0 {
            return Err(AppError::Data(
                "similarity matrix has no column labels".to_string(),
            ));
        }

        let mut columns = HashMap::with_capacity(column_count);
        for (position, label) in headers.iter().skip(1).enumerate() {
            columns.insert(normalize_label(label), position);
        }

        let mut row_labels = Vec::new();
        let mut rows = HashMap::new();
        let mut scores = Vec::new();

        for record in csv_reader.records() {
            let record = record?;
            let label = record.get(0).map(normalize_label).unwrap_or_default();
            if record.len() != column_count + 1 {
                return Err(AppError::Data(format!(
                    "row {} has {} scores, expected {}",
                    label,
                    record.len().saturating_sub(1),
                    column_count
                )));
            }

            let mut row = Vec::with_capacity(column_count);
            for field in record.iter().skip(1) {
                let score: f64 = field.trim().parse().map_err(|_| {
                    AppError::Data(format!("non-numeric score {:?} in row {}", field, label))
                })?;
                row.push(score);
            }

            rows.insert(label.clone(), row_labels.len());
            row_labels.push(label);
            scores.push(row);
        }

        Ok(Self {
            row_labels,
            rows,
            columns,
            scores,
        })
    }

    /// Whether `label` (already normalized) appears in the column index.
    pub fn has_column(&self, label: &str) -> bool {
        self.columns.contains_key(label)
    }

    /// Row labels in file order, already normalized.
    pub fn row_labels(&self) -> impl Iterator<Item = &str> {
        self.row_labels.iter().map(String::as_str)
    }

    /// Score at (row, column), both already normalized. `None` when either
    /// label is absent from the table.
    pub fn score(&self, row: &str, column: &str) -> Option<f64> {
        let row_position = *self.rows.get(row)?;
        let column_position = *self.columns.get(column)?;
        self.scores[row_position].get(column_position).copied()
    }

    pub fn len(&self) -> usize {
        self.row_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty()
    }
}
