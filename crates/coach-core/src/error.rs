//! Errors surfaced by calls to the game server.

use thiserror::Error;

/// Why a request to the game server did not produce a usable answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never completed (connection refused, timeout, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("server rejected request ({status}): {reason}")]
    ServerRejected { status: u16, reason: String },

    /// The server answered, but the body was not what we expected.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A game-scoped call was made before any game was loaded.
    #[error("no game loaded yet")]
    NoGame,
}

impl ApiError {
    /// True for a `404` from the server, i.e. the game id is unknown.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::ServerRejected { status: 404, .. })
    }
}
