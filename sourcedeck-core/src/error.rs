//! Error types for the fetcher seam.

use thiserror::Error;

/// Failure of an asynchronous fetch, as seen by the coordinator.
///
/// Concrete clients map their transport errors into these variants; the
/// coordinator only ever records the rendered message.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("endpoint returned {status}: {message}")]
    Status { status: u16, message: String },
}
