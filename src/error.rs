//! Error types for trie construction and document interchange.
//!
//! Traversal callbacks never surface here: a callback's own error type is
//! returned untouched by `iterate`, `iterate_all` and `walk_prefix`.

use thiserror::Error;

/// Errors raised outside of traversal.
#[derive(Debug, Error)]
pub enum Error {
    /// The document could not be parsed or a value could not be decoded.
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but describes an invalid trie.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// The succinct representation could not be built from its input.
    #[error("succinct build failed: {0}")]
    Build(String),

    /// A mutation was attempted on a read-only representation.
    #[error("trie is read-only; rebuild from a pointer trie to change it")]
    ReadOnly,
}

/// A specialized Result type for trie operations.
pub type Result<T> = std::result::Result<T, Error>;
