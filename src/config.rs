use crate::domain::MAX_NAME_LEN;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: String,
    /// Name used by the exact-match lookup in the read step.
    pub lookup_name: String,
    /// Clear both tables before seeding.
    pub reset_database: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: "tutorial.db".to_string(),
            lookup_name: "spongebob".to_string(),
            reset_database: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let database_path = match env_map.get("DATABASE_PATH") {
            Some(path) if path.trim().is_empty() => {
                return Err(ConfigError::InvalidValue(
                    "DATABASE_PATH".to_string(),
                    "must not be empty".to_string(),
                ))
            }
            Some(path) => path.clone(),
            None => defaults.database_path,
        };

        let lookup_name = env_map
            .get("LOOKUP_NAME")
            .cloned()
            .unwrap_or(defaults.lookup_name);
        if lookup_name.is_empty() || lookup_name.chars().count() > MAX_NAME_LEN {
            return Err(ConfigError::InvalidValue(
                "LOOKUP_NAME".to_string(),
                format!("must be 1 to {} characters", MAX_NAME_LEN),
            ));
        }

        let reset_database = match env_map
            .get("RESET_DATABASE")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("") | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "RESET_DATABASE".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        Ok(Config {
            database_path,
            lookup_name,
            reset_database,
        })
    }
}
