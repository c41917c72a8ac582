//! Error types for the ring cache.

use std::io;
use thiserror::Error;

/// Result type alias for ring cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the ring cache.
#[derive(Error, Debug)]
pub enum Error {
    /// A write was attempted while the ring has no owners.
    #[error("no owners available in the cache")]
    NoOwnersAvailable,

    /// Owner name was empty or blank.
    #[error("invalid owner identity: {0:?}")]
    InvalidIdentity(String),

    /// An owner with the same identity is already attached.
    #[error("owner already exists: {0}")]
    AlreadyExists(String),

    /// No owner with this identity is attached.
    #[error("owner not found: {0}")]
    NotFound(String),

    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),

    /// HTTP communication errors.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),
}

/// Errors raised by the HTTP client and server.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// The request could not be sent or its response could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a status the caller did not expect.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Address parse error.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(NetworkError::Request(e.to_string()))
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Network(NetworkError::Io(e))
    }
}
