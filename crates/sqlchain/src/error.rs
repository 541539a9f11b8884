//! Error types for sqlchain

use thiserror::Error;

/// Result type alias for statement building.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors raised while constructing or compiling a statement.
///
/// Every error is a deterministic function of the builder input, so the same
/// builder returns the same error on every `build()` call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// Placeholder count in a fragment does not match its argument count.
    #[error("Malformed expression: {actual} argument(s) given for {expected} placeholder(s) in `{sql}`")]
    MalformedExpression {
        expected: usize,
        actual: usize,
        sql: String,
    },

    /// A value cannot be serialized as a bind parameter.
    #[error("Unsupported value for column '{column}': {message}")]
    UnsupportedValueType { column: String, message: String },

    /// A required clause is missing.
    #[error("Incomplete statement: {0}")]
    IncompleteStatement(String),

    /// An INSERT row does not have one value per declared column.
    #[error("Row {row} has {actual} value(s) but {expected} column(s) are declared")]
    RowShapeMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

impl BuildError {
    /// Create a malformed expression error for `sql`.
    pub fn malformed(sql: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::MalformedExpression {
            expected,
            actual,
            sql: sql.into(),
        }
    }

    /// Create an unsupported value error for a column.
    pub fn unsupported(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsupportedValueType {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an incomplete statement error.
    pub fn incomplete(message: impl Into<String>) -> Self {
        Self::IncompleteStatement(message.into())
    }

    /// Check if this is a malformed expression error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedExpression { .. })
    }

    /// Check if this is an incomplete statement error
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::IncompleteStatement(_))
    }
}
