use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub top_movies_limit: u64,
    pub migrate_on_start: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://IMDB.db?mode=ro".to_string());

        let top_movies_limit = top_movies_limit(std::env::var("TOP_MOVIES_LIMIT").ok().as_deref());

        let migrate_on_start = std::env::var("MIGRATE_ON_START")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            top_movies_limit,
            migrate_on_start,
        })
    }
}

/// Defaults to 10 and stays within what SQLite accepts as a `LIMIT`.
fn top_movies_limit(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok()).unwrap_or(10).clamp(1, i64::MAX as u64)
}
