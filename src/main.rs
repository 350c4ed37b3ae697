mod config;
mod db;
mod entities;
mod error;
mod filter;
mod insights;
mod models;
mod routes;
mod templates;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when the database could not be opened at startup.
    pub db: Option<DatabaseConnection>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,cinedash=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = match db::connect(&config).await {
        Ok(db) => {
            tracing::info!(url = %config.database_url, "database connected");
            Some(db)
        },
        Err(err) => {
            tracing::error!(url = %config.database_url, error = %err, "database connection failed, filtering disabled");
            None
        },
    };

    let state = Arc::new(AppState { config: config.clone(), db });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
