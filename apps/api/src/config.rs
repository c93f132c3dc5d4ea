use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub scoring_api_url: String,
    pub scoring_timeout: Duration,
    /// Abort superseded in-flight scoring requests instead of letting them finish.
    pub abort_superseded: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            scoring_api_url: env_or("SCORING_API_URL", "http://localhost:8000"),
            scoring_timeout: Duration::from_secs(
                env_or("SCORING_TIMEOUT_SECS", "30")
                    .parse::<u64>()
                    .context("SCORING_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            abort_superseded: parse_bool(&env_or("ABORT_SUPERSEDED", "true"))
                .context("ABORT_SUPERSEDED must be true or false")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognised boolean '{other}'"),
    }
}
