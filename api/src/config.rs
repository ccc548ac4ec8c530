//! Process configuration from environment variables.
//!
//! `DATABASE_URL` is the only secret and is never given a default.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MODEL_PATH: &str = "model/model_ai_vs_real.onnx";
const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_INFERENCE_THREADS: usize = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub model_path: PathBuf,
    pub assets_dir: PathBuf,
    pub port: u16,
    pub db_connect_timeout: Duration,
    pub db_max_connections: u32,
    pub inference_threads: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = lookup("STORE_BACKEND").unwrap_or_else(|| "postgres".to_string());
        let store = match backend.as_str() {
            "postgres" => StoreBackend::Postgres {
                database_url: lookup("DATABASE_URL")
                    .filter(|url| !url.trim().is_empty())
                    .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            "memory" => StoreBackend::Memory,
            _ => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: backend,
                });
            }
        };

        let inference_threads: usize =
            parse_or(&lookup, "INFERENCE_THREADS", DEFAULT_INFERENCE_THREADS)?;
        if inference_threads == 0 {
            return Err(ConfigError::Invalid {
                name: "INFERENCE_THREADS",
                value: "0".into(),
            });
        }

        Ok(Self {
            store,
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            assets_dir: lookup("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR)),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            db_connect_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DB_CONNECT_TIMEOUT_SECS",
                DEFAULT_DB_CONNECT_TIMEOUT_SECS,
            )?),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            inference_threads,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn database_url_is_required_for_postgres() {
        assert_eq!(config(&[]), Err(ConfigError::Missing("DATABASE_URL")));
        assert_eq!(
            config(&[("DATABASE_URL", "  ")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
    }

    #[test]
    fn defaults_apply() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/detector")]).unwrap();
        assert_eq!(
            cfg.store,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/detector".into()
            }
        );
        assert_eq!(cfg.model_path, PathBuf::from("model/model_ai_vs_real.onnx"));
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.db_connect_timeout, Duration::from_secs(5));
        assert_eq!(cfg.inference_threads, 1);
    }

    #[test]
    fn memory_backend_needs_no_secret() {
        let cfg = config(&[("STORE_BACKEND", "memory"), ("PORT", "8080")]).unwrap();
        assert_eq!(cfg.store, StoreBackend::Memory);
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            config(&[("STORE_BACKEND", "mongo")]),
            Err(ConfigError::Invalid {
                name: "STORE_BACKEND",
                value: "mongo".into()
            })
        );
        assert!(matches!(
            config(&[("STORE_BACKEND", "memory"), ("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(matches!(
            config(&[("STORE_BACKEND", "memory"), ("INFERENCE_THREADS", "0")]),
            Err(ConfigError::Invalid { name: "INFERENCE_THREADS", .. })
        ));
    }
}
