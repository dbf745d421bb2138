//! Error handling for the SSE codec.

use std::io;

use thiserror::Error;

/// The result type used throughout the codec.
pub type SseResult<T> = Result<T, SseError>;

/// Errors surfaced by encoding or decoding.
///
/// Malformed input never produces an error: the decoder skips bad fields and
/// keeps going. Only I/O on the caller's sink or source can fail.
#[derive(Error, Debug)]
pub enum SseError {
    /// Writing to the destination sink failed.
    #[error("SSE write error: {0}")]
    Write(#[source] io::Error),

    /// Reading from the source (or a streamed payload) failed.
    #[error("SSE read error: {0}")]
    Read(#[source] io::Error),

    /// Invalid codec configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SseError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true if the sink rejected a write.
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write(_))
    }

    /// Returns true if draining the source failed.
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read(_))
    }

    /// The underlying I/O error, if any.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Self::Write(e) | Self::Read(e) => Some(e),
            Self::Config { .. } => None,
        }
    }
}
