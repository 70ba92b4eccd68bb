use thiserror::Error;

/// Result type used throughout the trie engine.
pub type Result<T, E = TrieError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TrieError {
    /// The serialized trie text could not be parsed.
    #[error("malformed trie data at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// The header of a serialized trie is not a known format.
    #[error("unknown trie format: {0}")]
    UnknownFormat(String),

    /// A binary TrieBlob failed validation.
    #[error("invalid TrieBlob: {0}")]
    InvalidBlob(String),
}

impl TrieError {
    pub(crate) fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        TrieError::Parse {
            line,
            column,
            message: message.into(),
        }
    }
}
