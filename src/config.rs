//! Configuration loaded from environment variables

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub model_path: PathBuf,
    pub inference_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub record_predictions: bool,
}

impl Config {
    /// Read `.env` (if present) and the process environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; missing optional keys fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,

            model_path: lookup("MODEL_PATH")
                .unwrap_or_else(|| "ml/rent_model.json".to_string())
                .into(),

            inference_timeout: Duration::from_millis(
                lookup("INFERENCE_TIMEOUT_MS")
                    .unwrap_or_else(|| "2000".to_string())
                    .parse()
                    .context("INFERENCE_TIMEOUT_MS must be a whole number of milliseconds")?,
            ),

            bind_addr: lookup("BIND_ADDR")
                .unwrap_or_else(|| "127.0.0.1:3001".to_string())
                .parse()
                .context("BIND_ADDR must be a socket address like 127.0.0.1:3001")?,

            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a valid number")?,

            record_predictions: lookup("RECORD_PREDICTIONS")
                .unwrap_or_else(|| "true".to_string())
                .parse()
                .context("RECORD_PREDICTIONS must be true or false")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/rent")])).unwrap();

        assert_eq!(config.model_path, PathBuf::from("ml/rent_model.json"));
        assert_eq!(config.inference_timeout, Duration::from_secs(2));
        assert_eq!(config.bind_addr, "127.0.0.1:3001".parse::<SocketAddr>().unwrap());
        assert_eq!(config.db_max_connections, 5);
        assert!(config.record_predictions);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/rent"),
            ("MODEL_PATH", "/srv/models/rent.json"),
            ("INFERENCE_TIMEOUT_MS", "250"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("RECORD_PREDICTIONS", "false"),
        ]))
        .unwrap();

        assert_eq!(config.model_path, PathBuf::from("/srv/models/rent.json"));
        assert_eq!(config.inference_timeout, Duration::from_millis(250));
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(!config.record_predictions);
    }

    #[test]
    fn test_missing_database_url() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn test_bad_timeout() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/rent"),
            ("INFERENCE_TIMEOUT_MS", "soon"),
        ]));
        assert!(result.is_err());
    }
}
