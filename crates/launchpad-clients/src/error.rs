//! Error type shared by every collaborator client.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The named resource does not exist on the remote side.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service understood the request and refused it.
    #[error("{service} rejected request ({code}): {message}")]
    Rejected {
        service: &'static str,
        code: String,
        message: String,
    },

    /// The request never produced a service answer (network, credentials, timeouts).
    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Errors raised by the remote service itself, as opposed to the path to it.
    /// A missing resource or a refused delete falls in this class.
    pub fn is_service_side(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Rejected { .. })
    }
}
