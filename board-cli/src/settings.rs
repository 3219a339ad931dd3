use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_TOKEN_FILE: &str = ".board_token";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub token_file: PathBuf,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub log_level: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = normalize_server(
            lookup("BOARD_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        );
        let token_file = PathBuf::from(
            lookup("BOARD_TOKEN_FILE").unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string()),
        );
        let connect_timeout =
            Duration::from_secs(parse_u64(&lookup, "BOARD_CONNECT_TIMEOUT_SECS", 5)?);
        let request_timeout =
            Duration::from_secs(parse_u64(&lookup, "BOARD_REQUEST_TIMEOUT_SECS", 15)?);
        let log_level = lookup("LOG_LEVEL")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or_else(|| "warn".to_string());

        Ok(Self {
            api_url,
            token_file,
            connect_timeout,
            request_timeout,
            log_level,
        })
    }

    /// Флаги командной строки важнее переменных окружения.
    pub fn with_overrides(mut self, server: Option<String>, token_file: Option<PathBuf>) -> Self {
        if let Some(server) = server {
            self.api_url = normalize_server(server);
        }
        if let Some(token_file) = token_file {
            self.token_file = token_file;
        }
        self
    }
}

pub fn normalize_server(server: String) -> String {
    let server = server.trim().to_string();
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    let value = lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}
