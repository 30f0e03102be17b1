//! Client error types

use thiserror::Error;

/// Failures surfaced by the API client
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the token (or none was held); the local
    /// session has already been reset when this is returned.
    #[error("authentication required")]
    Auth,

    /// The server refused the request with a structured error body
    #[error("server returned {status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Network-level failure after any retry
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected shape
    #[error("invalid response payload: {0}")]
    Decode(String),

    /// The session file could not be read or written
    #[error("session store error: {0}")]
    Session(#[from] std::io::Error),

    /// A coalesced fetch failed in another caller; the original error
    /// text is preserved
    #[error("{0}")]
    Coalesced(String),
}

impl ClientError {
    /// Copy of the error for handing one failure to several coalesced
    /// waiters. Variants that carry non-clonable sources degrade to
    /// their message text.
    pub(crate) fn duplicate(&self) -> ClientError {
        match self {
            ClientError::Auth => ClientError::Auth,
            ClientError::Api {
                status,
                code,
                message,
            } => ClientError::Api {
                status: *status,
                code: code.clone(),
                message: message.clone(),
            },
            other => ClientError::Coalesced(other.to_string()),
        }
    }

    /// Whether this error means the session was thrown away
    pub fn is_auth(&self) -> bool {
        matches!(self, ClientError::Auth)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
