//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Log source scanned when a request omits `log_path`
    pub log_path: PathBuf,

    /// Persisted model artifact
    pub model_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(7000),

            log_path: env::var("LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/var/log/kitchen/app.log")),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("model.json")),
        }
    }
}
