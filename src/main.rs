//! Cupcake API server: ensures the database and table exist, then serves the API.

use cupcake_api::{app, ensure_cupcakes_table, ensure_database_exists, AppConfig, AppState, CupcakeService, PgCupcakeStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cupcake_api=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    ensure_database_exists(&config.database_url).await?;
    let store = PgCupcakeStore::connect(&config.database_url, config.max_connections).await?;
    ensure_cupcakes_table(store.pool()).await?;

    let cupcakes = CupcakeService::new(Arc::new(store)).with_default_image(config.default_image.clone());
    let router = app(AppState { cupcakes }, config.body_limit);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
