//! Error types for board construction and tree streams.

use std::io;

/// Invalid board parameters.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A board needs at least one pit per player
    #[error("locations per player must be positive")]
    NoLocations,

    /// A board needs at least one token per pit
    #[error("tokens per location must be positive")]
    NoTokens,

    /// Token supply does not fit into a byte-sized pit
    #[error("board would hold {total} tokens, at most {max} fit in a pit")]
    TooManyTokens { total: usize, max: usize },

    /// Board contents handed to a constructor do not match the configuration
    #[error("invalid board contents: {0}")]
    InvalidBoard(String),
}

/// Errors raised while generating or reading a game tree.
#[derive(thiserror::Error, Debug)]
pub enum TreeError {
    /// Bad board configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failure of the underlying byte sink or source
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Stream ended in the middle of a record
    #[error("truncated record at byte {offset}: expected {expected} bytes, got {actual}")]
    Truncated {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    /// Record bytes that no valid state encodes to
    #[error("corrupt record at byte {offset}: {reason}")]
    CorruptRecord { offset: u64, reason: String },

    /// File name does not follow the `<L>l<T>t.mantree` convention
    #[error("not a tree file name: {0}")]
    FileName(String),
}
