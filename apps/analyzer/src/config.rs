use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default so the analyzer starts with an empty environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub extraction_url: String,
    pub extraction_timeout_secs: u64,
    pub profile_dir: PathBuf,
    pub profile_slot: String,
    /// When set, the skill profile lives in Redis instead of a local file.
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            extraction_url: env_or("EXTRACTION_URL", "http://localhost:8000")
                .trim_end_matches('/')
                .to_string(),
            extraction_timeout_secs: env_or("EXTRACTION_TIMEOUT_SECS", "60")
                .parse::<u64>()
                .context("EXTRACTION_TIMEOUT_SECS must be a whole number of seconds")?,
            profile_dir: PathBuf::from(env_or("PROFILE_DIR", "./data")),
            profile_slot: env_or("PROFILE_SLOT", "user_skills"),
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
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
