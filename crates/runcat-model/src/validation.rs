use thiserror::Error;

/// Errors produced while validating identifier values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A value did not match the grammar required for its field.
    #[error("field '{field}' does not match required pattern: got '{value}'")]
    PatternMismatch {
        /// Name of the offending field or type.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
}
