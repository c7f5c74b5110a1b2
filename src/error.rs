//! Error types for chunk compression and vector addressing.

use thiserror::Error;

use crate::key::Key;

/// Errors that can occur while building, decoding or addressing chunks.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FvecError {
    /// A row or chunk index outside the valid range.
    #[error("index {index} out of range (len {len})")]
    OutOfRange {
        /// The offending index.
        index: u64,
        /// The exclusive upper bound.
        len: u64,
    },

    /// A derived chunk key has no value in the store.
    #[error("missing chunk for key {0}")]
    MissingChunk(Key),

    /// Mutation attempted on a compressed, read-only chunk.
    #[error("chunk is read-only")]
    ReadOnlyChunk,

    /// A row was appended to a builder out of row order.
    #[error("out-of-order append: expected row {expected}, got {got}")]
    OutOfOrderAppend {
        /// The next row the builder accepts.
        expected: u64,
        /// The row that was offered.
        got: u64,
    },

    /// Builder input arrays are inconsistent.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The encoded chunk bytes are corrupted or truncated.
    #[error("invalid encoded data: {0}")]
    InvalidData(String),

    /// A chunk layout table (or set of vectors) is not usable.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// A key does not have the expected structure or kind.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Global-row access on a chunk that was never attached to a vector.
    #[error("chunk is not bound to a vector")]
    Unbound,
}
