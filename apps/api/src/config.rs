use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Per-request timeout for generative service calls.
    pub llm_timeout: Duration,
    /// Total attempts per generative call, including the first one.
    pub llm_max_attempts: u32,
    /// Upper bound on in-flight generative calls within one request.
    pub evaluation_concurrency: usize,
    /// Per-file upload limit.
    pub max_upload_bytes: usize,
    /// Whole-request body limit for multipart submissions.
    pub max_request_bytes: usize,
    pub session_ttl: chrono::Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let google_api_key = lookup("GOOGLE_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .context("Required environment variable 'GOOGLE_API_KEY' is not set")?;

        let llm_max_attempts: u32 = parse_or(&lookup, "LLM_MAX_ATTEMPTS", 2)?;
        if llm_max_attempts == 0 {
            anyhow::bail!("LLM_MAX_ATTEMPTS must be at least 1");
        }
        let evaluation_concurrency: usize = parse_or(&lookup, "EVALUATION_CONCURRENCY", 4)?;
        if evaluation_concurrency == 0 {
            anyhow::bail!("EVALUATION_CONCURRENCY must be at least 1");
        }

        Ok(Config {
            google_api_key,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            llm_timeout: Duration::from_secs(parse_or(&lookup, "LLM_TIMEOUT_SECS", 60)?),
            llm_max_attempts,
            evaluation_concurrency,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            max_request_bytes: parse_or(&lookup, "MAX_REQUEST_BYTES", 50 * 1024 * 1024)?,
            session_ttl: chrono::Duration::minutes(parse_or(&lookup, "SESSION_TTL_MINUTES", 120)?),
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self::from_lookup(|key| (key == "GOOGLE_API_KEY").then(|| "test-key".to_string()))
            .expect("test config")
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}
