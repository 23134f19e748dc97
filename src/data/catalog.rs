use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Universe of selectable menu items, loaded once at startup.
///
/// Names are kept verbatim for display; normalization happens at query time
/// inside the scorer.
pub struct MenuCatalog {
    names: Vec<String>,
}

impl MenuCatalog {
    /// Loads the catalog from a CSV file with a `nama` column, matching the
    /// menu master export.
    pub fn from_csv(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let catalog = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            items = catalog.names.len(),
            "Loaded menu catalog"
        );
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let name_position = csv_reader
            .headers()?
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case("nama"))
            .ok_or_else(|| AppError::Data("menu catalog has no 'nama' column".to_string()))?;

        let mut names = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            if let Some(name) = record.get(name_position) {
                let name = name.trim();
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }

        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
