use std::sync::Arc;

use menu_eval_api::api::{create_router, AppState, ScoringParams};
use menu_eval_api::config::Config;
use menu_eval_api::data::Dataset;
use menu_eval_api::services::submission::SheetsWebAppClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "menu_eval_api=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Similarity tables and catalog are loaded and normalized once, then
    // shared immutably for the process lifetime.
    let dataset = Arc::new(Dataset::load(&config)?);

    let sink = Arc::new(SheetsWebAppClient::new(config.sheets_web_app_url.clone()));
    let scoring = ScoringParams {
        alpha: config.alpha,
        top_k: config.top_k,
    };

    let state = AppState::new(dataset, scoring, sink);
    let app = create_router(state);

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(%address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
