//! Error types for book construction.
//!
//! Only construction can fail recoverably. A full side is not an error
//! (inserts return [`NPOS`](crate::NPOS)), and misuse such as an
//! out-of-range position panics.

use thiserror::Error;

/// Result type alias using [`BookError`].
pub type Result<T> = std::result::Result<T, BookError>;

/// Errors raised while building a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BookError {
    /// Requested capacity is outside `0..=127`
    #[error("invalid market book capacity {0}")]
    BadCapacity(i64),
}
