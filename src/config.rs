//! Server configuration from environment variables.
//!
//! `HOST` (default 0.0.0.0), `PORT` (8080), `MAX_PARTICIPANTS` (128),
//! `DATA_DIR` (JSON storage; in-memory when unset), `ROSTER_CSV` (optional roster export).

use crate::logic::{EngineConfig, DEFAULT_MAX_PARTICIPANTS};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub engine: EngineConfig,
    pub data_dir: Option<PathBuf>,
    pub roster_csv: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            engine: EngineConfig::default(),
            data_dir: None,
            roster_csv: None,
        }
    }
}

/// Parse `value` or keep `default`, warning about values that do not parse.
fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {key}={raw:?}, using default");
            default
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let max_participants = parse_or(
            "MAX_PARTICIPANTS",
            lookup("MAX_PARTICIPANTS"),
            DEFAULT_MAX_PARTICIPANTS,
        );
        Self {
            host: non_empty(lookup("HOST")).unwrap_or(defaults.host),
            port: parse_or("PORT", lookup("PORT"), defaults.port),
            engine: EngineConfig {
                max_participants: max_participants.max(2),
            },
            data_dir: non_empty(lookup("DATA_DIR")).map(PathBuf::from),
            roster_csv: non_empty(lookup("ROSTER_CSV")).map(PathBuf::from),
        }
    }
}
