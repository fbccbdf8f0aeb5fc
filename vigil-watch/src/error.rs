//! Error types for the watch loop

use thiserror::Error;
use vigil_client::ClientError;
use vigil_core::ParseError;

/// Why a watch did not end in convergence
///
/// Client failures are sorted into the variants callers branch on; only
/// transport and local validation problems stay wrapped.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Token exchange rejected
    #[error("authentication failed (status {status}): {body}")]
    Auth { status: u16, body: String },

    /// Events endpoint rejected a poll
    #[error("event poll failed (status {status}): {body}")]
    Poll { status: u16, body: String },

    /// A 200 response without the expected fields
    #[error("malformed response: {0}")]
    MalformedResponse(ParseError),

    /// Retry budget spent before every expected name was observed
    #[error("timed out after {polls} poll(s); still missing: {}", missing.join(", "))]
    TimeoutExceeded { polls: u32, missing: Vec<String> },

    /// Transport failure or invalid request
    #[error(transparent)]
    Transport(ClientError),
}

impl From<ClientError> for WatchError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Auth { status, body } => Self::Auth { status, body },
            ClientError::Poll { status, body } => Self::Poll { status, body },
            ClientError::MalformedResponse(parse) => Self::MalformedResponse(parse),
            other => Self::Transport(other),
        }
    }
}
