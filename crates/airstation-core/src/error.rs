//! Error types for airstation-core.
//!
//! Every failure the client can report is a variant of [`Error`]. Transport
//! failures are passed through as-is; nothing in this crate retries.

use thiserror::Error;

/// Error type for airstation-core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// RSA exponent or modulus scraped from the login page could not be used.
    #[error("invalid key parameters: {0}")]
    InvalidKeyParameters(String),

    /// The credential does not fit in the RSA block.
    #[error("message too long for RSA: {length} bytes, at most {capacity} allowed")]
    MessageTooLong { length: usize, capacity: usize },

    /// The device rendered an error banner (`errortxt`).
    #[error("device error: {0}")]
    DeviceError(String),

    /// The device rejected the supplied credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// An operation needing a session was attempted without one.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A `set` command was answered with something other than `OK`.
    #[error("command rejected: {0}")]
    CommandRejected(String),

    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Operation timed out.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Any other HTTP-level failure.
    #[error("http error: {0}")]
    Http(String),

    /// I/O error outside the HTTP client, such as starting a runtime.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A page lacked an element the protocol depends on.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Failed to parse device response.
    #[error("parse error: {0}")]
    ParseError(String),

    /// The configured form encoding is not a known charset label.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),
}

impl Error {
    /// Returns `true` for failures raised by the network layer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::ConnectionFailed(_) | Error::Timeout(_) | Error::Http(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else if err.is_connect() {
            Error::ConnectionFailed(err.to_string())
        } else {
            Error::Http(err.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ParseError(err.to_string())
    }
}
