//! Ledger and dictionary error types

use thiserror::Error;

/// Ledger error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Operation not supported by this ledger
    #[error("unsupported ledger operation: {0}")]
    Unsupported(String),

    /// Backend failure
    #[error("ledger backend error: {0}")]
    Backend(String),
}

/// Result type for ledger operations
pub type StateResult<T> = Result<T, StateError>;

/// Contract address dictionary error
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// No index left for a new entry
    #[error("dictionary exhausted: limit of {limit} entries reached")]
    Exhausted {
        /// Maximum number of entries
        limit: u32,
    },

    /// Decode of an index that was never assigned
    #[error("index {index} out of range, dictionary holds {len} entries")]
    OutOfRange {
        /// Requested index
        index: u32,
        /// Current number of entries
        len: usize,
    },

    /// Malformed dictionary file
    #[error("corrupted dictionary file at byte {offset}: {reason}")]
    Corrupted {
        /// Byte offset of the offending record
        offset: usize,
        /// What is wrong with it
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for dictionary operations
pub type DictionaryResult<T> = Result<T, DictionaryError>;
