use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MAX_FILES: usize = 25;
const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Per-file upload limit.
    pub max_file_bytes: usize,
    pub max_files_per_request: usize,
    /// Idle analyzer sessions kept for polling.
    pub max_sessions: usize,
    /// Optional JSON synonym table merged into the built-in skill lexicon.
    pub synonyms_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_file_bytes: parse_env("MAX_FILE_BYTES", DEFAULT_MAX_FILE_BYTES)?,
            max_files_per_request: parse_env("MAX_FILES_PER_REQUEST", DEFAULT_MAX_FILES)?,
            max_sessions: parse_env("MAX_SESSIONS", DEFAULT_MAX_SESSIONS)?,
            synonyms_path: std::env::var_os("SYNONYMS_PATH")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.max_file_bytes > 0, "MAX_FILE_BYTES must be greater than zero");
        anyhow::ensure!(
            self.max_files_per_request > 0,
            "MAX_FILES_PER_REQUEST must be greater than zero"
        );
        Ok(())
    }

    /// Request body limit for multipart uploads: every file at its limit plus
    /// room for the job description and multipart framing.
    pub fn body_limit(&self) -> usize {
        self.max_file_bytes
            .saturating_mul(self.max_files_per_request)
            .saturating_add(1024 * 1024)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_files_per_request: DEFAULT_MAX_FILES,
            max_sessions: DEFAULT_MAX_SESSIONS,
            synonyms_path: None,
        }
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
