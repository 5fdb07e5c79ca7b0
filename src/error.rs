//! This module defines all error types used throughout the generator.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The definition document could not be decoded
    #[error("Definition parsing error in {file:?}: {message}")]
    DefinitionParse { file: PathBuf, message: String },

    /// The decoded definition breaks a model rule
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    /// No events, hence no states to derive
    #[error("Definition has no events, no states can be derived")]
    EmptyStateSet,

    /// Two distinct names mangle to the same generated symbol
    #[error("Symbol collision: '{first}' and '{second}' both map to {symbol}")]
    SymbolCollision {
        symbol: String,
        first: String,
        second: String,
    },

    /// Code synthesis could not produce valid destination source
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// The external formatter rejected the generated document
    #[error("Formatter '{program}' failed: {message}")]
    Format { program: String, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),

    /// Wrapped anyhow errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a custom error with a message
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid definition error
    pub fn invalid_definition(msg: impl Into<String>) -> Self {
        Self::InvalidDefinition(msg.into())
    }

    /// Create a synthesis error
    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::Synthesis(msg.into())
    }

    /// Whether the failure is a defect in the generator rather than in the input
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Synthesis(_) | Error::Format { .. })
    }
}

// Implement From traits for common external error types

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::DefinitionParse {
            file: PathBuf::from("unknown"),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::DefinitionParse {
            file: PathBuf::from("unknown"),
            message: format!("JSON error: {}", err),
        }
    }
}

// Helper macros for creating errors

/// Create a custom error with formatting
#[macro_export]
macro_rules! custom_error {
    ($($arg:tt)*) => {
        $crate::error::Error::Custom(format!($($arg)*))
    };
}

/// Bail with a custom error message
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::custom_error!($($arg)*))
    };
}

/// Ensure a condition is true or return error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::custom("test error");
        assert_eq!(err.to_string(), "test error");

        let err = Error::invalid_definition("event 'go' has no sources");
        assert_eq!(
            err.to_string(),
            "Invalid definition: event 'go' has no sources"
        );
    }

    #[test]
    fn test_symbol_collision_message() {
        let err = Error::SymbolCollision {
            symbol: "STATE_IDLE".to_string(),
            first: "IDLE".to_string(),
            second: "idle".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Symbol collision: 'IDLE' and 'idle' both map to STATE_IDLE"
        );
    }

    #[test]
    fn test_internal_errors() {
        assert!(Error::synthesis("bad").is_internal());
        assert!(
            Error::Format {
                program: "gofmt".to_string(),
                message: "x".to_string()
            }
            .is_internal()
        );
        assert!(!Error::EmptyStateSet.is_internal());
    }

    fn checked(n: usize) -> Result<usize> {
        crate::ensure!(n > 0, "n must be positive, got {}", n);
        Ok(n)
    }

    #[test]
    fn test_ensure_macro() {
        assert_eq!(checked(3).unwrap(), 3);
        assert_eq!(checked(0).unwrap_err().to_string(), "n must be positive, got 0");
    }
}
