//! Error types and handling for memo-stream
//!
//! A failure resolving a stream node is cached exactly like a value
//! resolution and replayed identically to every synchronizer.

/// Main error type for stream operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    /// A source iterator failed while producing the next element
    #[error("iterator error: {0}")]
    Iterator(String),
    /// A push source reported an error through its error callback
    #[error("push source error: {0}")]
    Source(String),
    /// A write-once slot was resolved twice.
    /// This is a producer contract violation, unrecoverable locally.
    #[error("write-once slot resolved twice")]
    DuplicateResolution,
    /// The producer went away before resolving the node
    #[error("producer dropped before resolving")]
    Cancelled,
    /// Custom error with message
    #[error("stream error: {0}")]
    Custom(String),
}

/// Result type for memo-stream operations
pub type StreamResult<T> = Result<T, StreamError>;
