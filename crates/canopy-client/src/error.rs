//! Error types for backend access.

use thiserror::Error;

/// Convenience type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Things that can go wrong talking to the catalog backend.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure: connection, timeout, TLS.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {code}: {body}")]
    Status { code: u16, body: String },

    /// The response body could not be (re)serialized.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// Builds a status error, keeping only the leading part of the body
    /// so messages stay readable.
    pub fn status(code: u16, body: String) -> Self {
        Self::Status {
            code,
            body: body.chars().take(200).collect(),
        }
    }
}
