use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Connection and metadata settings for a [`PathSqlClient`](crate::client::PathSqlClient)
#[derive(Clone, Debug, Validate, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathSqlConfig {
    /// ClickHouse HTTP endpoint
    #[validate(length(min = 1, message = "ClickHouse URL cannot be empty"))]
    pub clickhouse_url: String,

    pub clickhouse_user: String,

    /// Empty for local development
    pub clickhouse_password: String,

    #[validate(length(min = 1, message = "ClickHouse database cannot be empty"))]
    pub clickhouse_database: String,

    /// Introspection dialect: mysql, postgres or clickhouse
    #[validate(length(
        min = 1,
        max = 32,
        message = "Metadata driver must be between 1 and 32 characters"
    ))]
    pub metadata_driver: String,
}

impl Default for PathSqlConfig {
    fn default() -> Self {
        Self {
            clickhouse_url: "http://localhost:8123".to_string(),
            clickhouse_user: "default".to_string(),
            clickhouse_password: String::new(),
            clickhouse_database: "default".to_string(),
            metadata_driver: "clickhouse".to_string(),
        }
    }
}

impl PathSqlConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            clickhouse_url: env_or("CLICKHOUSE_URL", defaults.clickhouse_url),
            clickhouse_user: env_or("CLICKHOUSE_USER", defaults.clickhouse_user),
            clickhouse_password: env_or("CLICKHOUSE_PASSWORD", defaults.clickhouse_password),
            clickhouse_database: env_or("CLICKHOUSE_DATABASE", defaults.clickhouse_database),
            metadata_driver: env_or("PATHSQL_METADATA_DRIVER", defaults.metadata_driver),
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Merge with another configuration (file overrides environment).
    ///
    /// Only fields that differ from the defaults are taken from `other`.
    pub fn merge(&mut self, other: Self) -> Result<(), ConfigError> {
        let defaults = Self::default();
        if other.clickhouse_url != defaults.clickhouse_url {
            self.clickhouse_url = other.clickhouse_url;
        }
        if other.clickhouse_user != defaults.clickhouse_user {
            self.clickhouse_user = other.clickhouse_user;
        }
        if other.clickhouse_password != defaults.clickhouse_password {
            self.clickhouse_password = other.clickhouse_password;
        }
        if other.clickhouse_database != defaults.clickhouse_database {
            self.clickhouse_database = other.clickhouse_database;
        }
        if other.metadata_driver != defaults.metadata_driver {
            self.metadata_driver = other.metadata_driver;
        }

        self.validate()?;
        Ok(())
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}
