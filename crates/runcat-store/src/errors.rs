use thiserror::Error;

/// Errors produced by store backends and the query engine.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store file header is malformed or from an incompatible version.
    #[error("invalid store file header: {0}")]
    InvalidHeader(String),

    /// A frame header is malformed.
    #[error("invalid frame at offset {offset}: {reason}")]
    InvalidFrame {
        /// Byte offset of the frame in the file.
        offset: u64,
        /// What was wrong with it.
        reason: String,
    },

    /// A frame payload exceeds the maximum allowed size.
    #[error("payload size {size} exceeds maximum {max}")]
    PayloadTooLarge {
        /// Declared payload size.
        size: u32,
        /// Maximum allowed payload size.
        max: u32,
    },

    /// The file ends in the middle of a frame.
    #[error("truncated frame at offset {offset}")]
    TruncatedFrame {
        /// Byte offset where the partial frame starts.
        offset: u64,
    },

    /// An operation payload is not valid UTF-8.
    #[error("invalid UTF-8 in operation payload: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// An operation payload or document failed to (de)serialize.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A document offered for insert is not a JSON object.
    #[error("document is not a JSON object")]
    NotAnObject,

    /// A caller-supplied `_id` is not a valid record identifier.
    #[error("invalid record id: {0}")]
    InvalidId(String),

    /// An insert offered a caller-supplied `_id` that already exists.
    #[error("duplicate record id: {0}")]
    DuplicateId(String),

    /// A pattern condition does not compile as a regular expression.
    #[error("invalid match pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },
}
