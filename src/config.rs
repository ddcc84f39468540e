use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the summarization backend, without a trailing slash.
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub dir: String,
    pub filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            backend: BackendConfig {
                base_url: env::var("TABLESUM_BACKEND_URL")
                    .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            },
            log: LogConfig {
                dir: env::var("TABLESUM_LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
                filter: env::var("TABLESUM_LOG_FILTER")
                    .unwrap_or_else(|_| "tablesum=debug".to_string()),
            },
        })
    }
}
