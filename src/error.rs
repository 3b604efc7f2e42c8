//! Error types for influxdb-admin.

use thiserror::Error;

/// Error type for influxdb-admin operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a status code was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// InfluxDB answered with a non-success status code.
    #[error("{status}\n{body}")]
    Status {
        /// Status line, e.g. `404 Not Found`.
        status: String,
        /// Raw response body as returned by the server.
        body: String,
    },

    /// Failed to serialize a request or deserialize a response.
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to decode a CSV query response.
    #[error("CSV parse error: {0}")]
    Csv(String),

    /// Query failed on the server and was reported inside the CSV body.
    #[error("Query error from InfluxDB: {message}")]
    QueryError {
        /// Error message returned by InfluxDB.
        message: String,
        /// Optional reference code for debugging.
        reference: Option<String>,
    },

    /// Base URL or pagination link could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// I/O error while streaming a response body.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the HTTP status text if this is a [`Error::Status`].
    pub fn status(&self) -> Option<&str> {
        match self {
            Error::Status { status, .. } => Some(status),
            _ => None,
        }
    }
}

/// Result type alias for influxdb-admin operations.
pub type Result<T> = std::result::Result<T, Error>;
