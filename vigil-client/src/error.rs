//! Error types for the Vigil client

use thiserror::Error;
use vigil_core::ParseError;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the monitoring API
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Token endpoint answered with something other than 200
    #[error("authentication failed (status {status}): {body}")]
    Auth {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Events endpoint answered with something other than 200
    #[error("event poll failed (status {status}): {body}")]
    Poll {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// 200 response without the expected fields
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] ParseError),

    /// Request rejected locally before sending
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// HTTP status carried by the error, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Poll { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(status) if (400..500).contains(&status))
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }
}
