//! Error types for the TMI client.

use thiserror::Error;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Errors surfaced by the client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// I/O error while connecting, reading, or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid UTF-8 bytes in an inbound line.
    #[error("invalid UTF-8 in line at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// Byte position where UTF-8 validation failed.
        byte_pos: usize,
        /// Detailed error message from the UTF-8 decoder.
        details: String,
    },

    /// Inbound line exceeded the maximum allowed length.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Actual line length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// The server rejected the supplied credentials.
    #[error("authentication rejected by server")]
    AuthenticationFailed,

    /// The session is not running, or its transport has gone away.
    #[error("not connected")]
    NotConnected,
}

impl ClientError {
    /// Whether this error is a droppable line rather than a dead transport.
    ///
    /// The codec swallows these and yields a no-op event so the framed
    /// reader never sees them; everything else is fatal to the session.
    pub(crate) fn is_recoverable_read(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidUtf8 { .. } | ClientError::LineTooLong { .. }
        )
    }
}
