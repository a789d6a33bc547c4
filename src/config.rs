// Server configuration
// Read from the environment (after dotenv) with defaults for every value

use std::path::PathBuf;
use thiserror::Error;

use crate::costing::auto_increase::{AutoIncreasePolicy, DEFAULT_TRIGGER_DAY};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub auto_increase: AutoIncreasePolicy,
    /// JSON workspace snapshot to start from; the demo salon when absent
    pub seed_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var(&lookup, "PORT", 8080u16)?;

        let enabled = match lookup("AUTO_INCREASE_ENABLED") {
            None => false,
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidValue {
                name: "AUTO_INCREASE_ENABLED",
                value,
            })?,
        };
        let trigger_day = parse_var(&lookup, "AUTO_INCREASE_DAY", DEFAULT_TRIGGER_DAY)?;
        let auto_increase = AutoIncreasePolicy { enabled, trigger_day };
        if auto_increase.ensure_valid().is_err() {
            return Err(ConfigError::InvalidValue {
                name: "AUTO_INCREASE_DAY",
                value: trigger_day.to_string(),
            });
        }

        let seed_path = lookup("SEED_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            auto_increase,
            seed_path,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.auto_increase, AutoIncreasePolicy::default());
        assert!(config.seed_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("AUTO_INCREASE_ENABLED", "true"),
            ("AUTO_INCREASE_DAY", "5"),
            ("SEED_PATH", "/data/salon.json"),
        ])
        .unwrap();

        assert_eq!(config.addr(), "127.0.0.1:3000");
        assert!(config.auto_increase.enabled);
        assert_eq!(config.auto_increase.trigger_day, 5);
        assert_eq!(config.seed_path, Some(PathBuf::from("/data/salon.json")));
    }

    #[test]
    fn test_invalid_port() {
        assert_eq!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidValue {
                name: "PORT",
                value: "eighty".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_flag_and_day() {
        assert!(config(&[("AUTO_INCREASE_ENABLED", "maybe")]).is_err());
        assert!(config(&[("AUTO_INCREASE_DAY", "0")]).is_err());
        assert!(config(&[("AUTO_INCREASE_DAY", "32")]).is_err());
    }

    #[test]
    fn test_blank_seed_path_is_ignored() {
        assert!(config(&[("SEED_PATH", "  ")]).unwrap().seed_path.is_none());
    }
}
