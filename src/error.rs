//! Error types for the query builder
//!
//! Each stage of the pipeline has its own error enum. The top-level
//! [`Error`] aggregates them so callers can use one `Result` alias across
//! the crate while still matching on the stage that failed.

use thiserror::Error;

use crate::expr::ops::Operator;

/// Main error type for the query builder
#[derive(Error, Debug)]
pub enum Error {
    /// Expression construction error
    #[error("Expression error: {0}")]
    Expression(#[from] ExprError),

    /// Query lowering error
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// Backend boundary error
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Expression construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// A method was invoked on a node kind that does not support it
    #[error("Cannot call {method} on {receiver}")]
    UnsupportedOperation {
        /// Node kind the method was invoked on
        receiver: &'static str,
        /// Name of the rejected method
        method: &'static str,
    },
}

impl ExprError {
    /// Shorthand for the unsupported-operation case
    pub fn unsupported(receiver: &'static str, method: &'static str) -> Self {
        ExprError::UnsupportedOperation { receiver, method }
    }
}

/// Query lowering errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Expression shape not recognized in scalar position
    #[error("Unexpected field expression: {0}")]
    UnexpectedExpression(String),

    /// Expression shape not recognized as a grouping key
    #[error("Unexpected field expression in groupBy: {0}")]
    UnexpectedGroupByExpression(String),

    /// Operator with no wire mapping reached the compiler
    #[error("Unhandled operator: {0}")]
    UnhandledOperator(Operator),
}

/// Backend boundary errors
#[derive(Error, Debug)]
pub enum BackendError {
    /// Table has no backend attached
    #[error("No backend attached to table '{0}'")]
    NotAttached(String),

    /// Transport-level failure reported by a backend implementation
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ops::BooleanOperator;

    #[test]
    fn test_error_display() {
        let err = ExprError::unsupported("LiteralField", "max");
        assert_eq!(err.to_string(), "Cannot call max on LiteralField");

        let err = CompileError::UnhandledOperator(Operator::Boolean(BooleanOperator::InPast));
        assert_eq!(err.to_string(), "Unhandled operator: inPast");

        let err = BackendError::NotAttached("orders".to_string());
        assert_eq!(err.to_string(), "No backend attached to table 'orders'");
    }

    #[test]
    fn test_conversion_to_top_level() {
        let err: Error = ExprError::unsupported("ArrayField", "eq").into();
        assert!(matches!(err, Error::Expression(_)));

        let err: Error = CompileError::UnexpectedExpression("(a and b)".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Compile error: Unexpected field expression: (a and b)"
        );
    }
}
