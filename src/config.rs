use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the menu catalog CSV (one row per menu item)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Path to the content-based similarity matrix CSV
    #[serde(default = "default_content_matrix_path")]
    pub content_matrix_path: String,

    /// Path to the collaborative similarity matrix CSV
    #[serde(default = "default_collaborative_matrix_path")]
    pub collaborative_matrix_path: String,

    /// Spreadsheet web-app URL that receives evaluation records
    pub sheets_web_app_url: String,

    /// Weight applied to the content-based matrix; (1 - alpha) goes to the
    /// collaborative matrix. Not range-checked, caller obligation.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Number of recommendations returned per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_catalog_path() -> String {
    "data/menu_catalog.csv".to_string()
}

fn default_content_matrix_path() -> String {
    "data/cbf_cosine_sim.csv".to_string()
}

fn default_collaborative_matrix_path() -> String {
    "data/cf_ensemble_sim_matrix.csv".to_string()
}

fn default_alpha() -> f64 {
    0.6
}

fn default_top_k() -> usize {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
