//! Error types for the remote API, the wire mappers and the configuration file.

use std::path::PathBuf;

use thiserror::Error;

/// A wire record that could not be turned into a domain record.
#[derive(Debug, Error, PartialEq)]
pub enum MapError {
    #[error("field `{0}` must not be empty")]
    Empty(&'static str),

    #[error("field `{field}` must not be negative (got {value})")]
    Negative { field: &'static str, value: i64 },

    #[error("field `{field}` has an invalid value '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("field `{field}` is not a valid timestamp: '{value}'")]
    InvalidTimestamp { field: &'static str, value: String },
}

/// Failures of the remote access layer.
///
/// `message` is the fixed, human readable description of the operation that
/// failed, e.g. "Failed to create task".
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message} (HTTP {status})")]
    Request { message: &'static str, status: u16 },

    #[error("{message}: {source}")]
    Transport {
        message: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{message}: malformed response body: {source}")]
    Json {
        message: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{message}: {source}")]
    Decode {
        message: &'static str,
        #[source]
        source: MapError,
    },

    #[error("{message}: invalid id '{id}'")]
    InvalidId { message: &'static str, id: String },

    #[error("invalid API base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// HTTP status of a non-success response, if that is what failed.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
