use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{ensure, Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Root of the decorative image assets (`animals/<difficulty>/*.png`, `stars/star-N.png`).
    pub assets_dir: PathBuf,
    /// Answer rows per answer-sheet page. Capacity is this times the question grid's columns.
    pub answer_rows_per_page: u32,
    /// Upper bound on rejection-sampling attempts for a single question.
    pub max_sampling_attempts: u32,
    /// Largest `pages` value a request may ask for.
    pub max_drill_pages: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            assets_dir: std::env::var("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("assets")),
            answer_rows_per_page: env_or("ANSWER_ROWS_PER_PAGE", 12)?,
            max_sampling_attempts: env_or("MAX_SAMPLING_ATTEMPTS", 10_000)?,
            max_drill_pages: env_or("MAX_DRILL_PAGES", 10)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.answer_rows_per_page > 0, "ANSWER_ROWS_PER_PAGE must be at least 1");
        ensure!(self.max_sampling_attempts > 0, "MAX_SAMPLING_ATTEMPTS must be at least 1");
        ensure!(self.max_drill_pages > 0, "MAX_DRILL_PAGES must be at least 1");
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            assets_dir: PathBuf::from("assets"),
            answer_rows_per_page: 12,
            max_sampling_attempts: 10_000,
            max_drill_pages: 10,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
