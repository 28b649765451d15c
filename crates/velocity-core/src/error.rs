//! Error types for Velocity search operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all Velocity crates. Uses `thiserror` for derive macros.
//!
//! Errors fall into two families: client input errors, which the caller can
//! fix by changing the request, and everything else, which means the search
//! infrastructure failed. See [`Error::is_client_error`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in Velocity operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific file.
    #[error("I/O error at {path}: {source}")]
    IoWithPath {
        /// File that could not be read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stored data is malformed (duplicate ids, inconsistent embeddings, ...).
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The caller supplied a missing or malformed argument.
    #[error("{0}")]
    InvalidInput(String),

    /// A search backend failed while executing a query.
    #[error("{backend} search failed: {message}")]
    Search {
        /// Backend that failed.
        backend: String,
        /// Diagnostic detail.
        message: String,
    },

    /// A search backend did not answer in time.
    #[error("{backend} search timed out after {}ms", .elapsed.as_millis())]
    Timeout {
        /// Backend that timed out.
        backend: String,
        /// Configured deadline.
        elapsed: Duration,
    },
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a client input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a backend search failure.
    pub fn search(backend: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Search {
            backend: backend.into(),
            message: msg.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(backend: impl Into<String>, elapsed: Duration) -> Self {
        Self::Timeout {
            backend: backend.into(),
            elapsed,
        }
    }

    /// Wrap an I/O error with the path it happened on.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True when the caller can fix the error by changing the request.
    ///
    /// Everything else is an infrastructure failure and must never be
    /// reported to a caller as "no matches".
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Result type alias using Velocity's Error type.
pub type Result<T> = std::result::Result<T, Error>;
