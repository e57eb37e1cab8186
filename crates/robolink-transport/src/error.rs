//! Transport error types.

use thiserror::Error;

/// A result type using `TransportError`.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while talking to the robot server.
///
/// Every variant is retryable: the caller may reissue the command, and the
/// background monitors retry on their next tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never got a response (refused, timed out, DNS failure).
    #[error("connection failed: {0}")]
    Connection(String),

    /// The robot answered with a non-success status code.
    #[error("robot returned status {status}")]
    Protocol {
        /// HTTP status code of the response.
        status: u16,
    },

    /// The robot answered with success but the body was missing or unreadable.
    #[error("empty or unparsable response body: {0}")]
    EmptyBody(String),

    /// No transport can be built for the endpoint.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl TransportError {
    /// HTTP status code for protocol errors.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Protocol { status } => Some(*status),
            Self::Connection(_) | Self::EmptyBody(_) | Self::InvalidEndpoint(_) => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Protocol {
                status: status.as_u16(),
            }
        } else if err.is_decode() || err.is_body() {
            Self::EmptyBody(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_only_for_protocol_errors() {
        assert_eq!(TransportError::Protocol { status: 503 }.status_code(), Some(503));
        assert_eq!(TransportError::Connection("refused".into()).status_code(), None);
        assert_eq!(TransportError::EmptyBody("eof".into()).status_code(), None);
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            TransportError::Protocol { status: 500 }.to_string(),
            "robot returned status 500"
        );
        assert_eq!(
            TransportError::Connection("timed out".into()).to_string(),
            "connection failed: timed out"
        );
    }
}
