//! Configuration errors shared by every crate that reads `Properties`.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read properties file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse properties: {0}")]
    Parse(String),

    #[error("property {key} = '{value}' is not a valid number")]
    InvalidNumber { key: String, value: String },

    #[error("must specify one of {} in properties", .keys.join(" or "))]
    Missing { keys: Vec<String> },

    #[error("property {key} = '{value}' is invalid: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn missing(keys: &[&str]) -> Self {
        ConfigError::Missing {
            keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }
}
