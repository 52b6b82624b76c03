use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_SCHEMA_PATH: &str = "./schema.json";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;

/// Application configuration loaded from environment variables.
/// Startup fails if the LLM endpoint or API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_endpoint: String,
    pub llm_timeout_secs: u64,
    pub schema_path: PathBuf,
    pub max_upload_bytes: usize,
    /// Sessions untouched for this long are discarded.
    pub session_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_endpoint = require_env("LLM_ENDPOINT")?;
        if !(llm_endpoint.starts_with("https://") || llm_endpoint.starts_with("http://")) {
            bail!("LLM_ENDPOINT must be an http(s) URL, got '{llm_endpoint}'");
        }

        let session_ttl_secs = parse_env("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;
        if session_ttl_secs == 0 {
            bail!("SESSION_TTL_SECS must be greater than zero");
        }

        Ok(Config {
            llm_api_key: require_env("LLM_API_KEY")?,
            llm_endpoint,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS)?,
            schema_path: std::env::var("SCHEMA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SCHEMA_PATH)),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            session_ttl_secs,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
