//! Client error types

use shared::{TableError, TableNumber};
use std::fmt;
use thiserror::Error;

/// Remote write kinds, used to phrase user-facing failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Save,
    Clear,
}

impl WriteOp {
    /// Message shown to staff when the write fails
    pub fn user_message(self) -> &'static str {
        match self {
            WriteOp::Save => "Error saving order.",
            WriteOp::Clear => "Error clearing order.",
        }
    }
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOp::Save => write!(f, "save"),
            WriteOp::Clear => write!(f, "clear"),
        }
    }
}

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connect, timeout, transport)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Push frame was not a snapshot
    #[error("Malformed push payload: {0}")]
    MalformedPush(String),

    /// Push channel transport failure
    #[error("Push channel error: {0}")]
    Push(String),

    /// Table number or index outside the configured tables
    #[error(transparent)]
    Table(#[from] TableError),

    /// Remote write failed; displays the user-facing message
    #[error("{}", .op.user_message())]
    WriteFailed {
        op: WriteOp,
        table: TableNumber,
        #[source]
        source: Box<ClientError>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
