use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails early if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub ai_base_url: String,
    pub ai_api_key: String,
    pub ai_model: String,
    pub ai_fallback_model: String,
    pub ai_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            ai_base_url: env_or("AI_BASE_URL", "https://api.openai.com/v1"),
            ai_api_key: require_env("AI_API_KEY")?,
            ai_model: env_or("AI_MODEL", "gpt-4o"),
            ai_fallback_model: env_or("AI_FALLBACK_MODEL", "gpt-4o-mini"),
            ai_timeout_secs: env_or("AI_TIMEOUT_SECS", "30")
                .parse::<u64>()
                .context("AI_TIMEOUT_SECS must be a number of seconds")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
