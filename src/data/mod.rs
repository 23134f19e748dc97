pub mod catalog;
pub mod similarity;

pub use catalog::MenuCatalog;
pub use similarity::{normalize_label, SimilarityTable};

use crate::config::Config;
use crate::error::AppResult;

/// All tabular inputs, loaded once at startup and immutable afterwards.
pub struct Dataset {
    pub catalog: MenuCatalog,
    /// Content-based similarity signal
    pub content: SimilarityTable,
    /// Collaborative similarity signal
    pub collaborative: SimilarityTable,
}

impl Dataset {
    pub fn load(config: &Config) -> AppResult<Self> {
        let catalog = MenuCatalog::from_csv(&config.catalog_path)?;
        let content = SimilarityTable::from_csv(&config.content_matrix_path)?;
        let collaborative = SimilarityTable::from_csv(&config.collaborative_matrix_path)?;

        tracing::info!(
            menus = catalog.names().len(),
            content_items = content.len(),
            collaborative_items = collaborative.len(),
            "Dataset ready"
        );

        Ok(Self {
            catalog,
            content,
            collaborative,
        })
    }
}
