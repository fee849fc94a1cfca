//! Error type shared by every producer in the crate.

use std::sync::Arc;

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building or pulling a producer tree.
///
/// Streaming failures (`Io`, `Decode`) surface through
/// [`Producer::last_error`](crate::Producer::last_error) and are sticky.
/// Range and configuration failures are returned synchronously by the call
/// that caused them.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Upstream I/O failure
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    /// Upstream decode failure
    #[error("decode error: {0}")]
    Decode(String),

    /// Seek or slice outside `[0, len]`
    #[error("index {index} out of range (length {len})")]
    OutOfRange { index: usize, len: usize },

    /// Invalid construction parameters
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Playback device failure
    #[error("device error: {0}")]
    Device(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(Arc::new(e))
    }
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
