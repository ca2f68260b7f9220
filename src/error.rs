//! Error handling types for irodori
//!
//! Queries never fail while a language is still loading; they degrade to
//! root-only results instead. The variants here cover the cases that must be
//! surfaced loudly: edits that break the ordering contract, malformed capture
//! data, and grammar/query loading failures.

use thiserror::Error;

/// Error type for language mode operations
#[derive(Debug, Error)]
pub enum HighlightError {
    /// Operation requires a loaded grammar
    #[error("Language mode is not ready")]
    NotReady,

    /// An edit was reported out of order, out of bounds, or without a matching tree update
    #[error("Edit contract violation: {message}")]
    ContractViolation { message: String },

    /// A capture is missing its name or has an inverted range
    #[error("Malformed capture: {message}")]
    MalformedCapture { message: String },

    /// The grammar library could not be loaded
    #[error("Failed to load language {language}: {message}")]
    LanguageLoad { language: String, message: String },

    /// Query reading or compilation failed
    #[error("Query error: {message}")]
    Query { message: String },

    /// The parser produced no tree
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for language mode operations
pub type HighlightResult<T> = Result<T, HighlightError>;

impl HighlightError {
    /// Create a contract violation error
    pub fn contract_violation(message: impl Into<String>) -> Self {
        HighlightError::ContractViolation {
            message: message.into(),
        }
    }

    /// Create a malformed capture error
    pub fn malformed_capture(message: impl Into<String>) -> Self {
        HighlightError::MalformedCapture {
            message: message.into(),
        }
    }

    /// Create a language load error
    pub fn language_load(language: impl Into<String>, message: impl Into<String>) -> Self {
        HighlightError::LanguageLoad {
            language: language.into(),
            message: message.into(),
        }
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        HighlightError::Query {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        HighlightError::Parse {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        HighlightError::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_include_context() {
        let err = HighlightError::language_load("rust", "symbol not found");
        assert_eq!(
            err.to_string(),
            "Failed to load language rust: symbol not found"
        );

        let err = HighlightError::contract_violation("edit starts past end of buffer");
        assert!(err.to_string().contains("edit starts past end of buffer"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: HighlightError = io.into();
        assert!(matches!(err, HighlightError::Io(_)));
    }
}
