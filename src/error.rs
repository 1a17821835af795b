//! Error types for the lightrain client.
//!
//! Crate-level errors are only returned from setup paths (building the
//! agent, spawning the connection). Failures of the connection itself are
//! never returned to a caller: they become [`ConnectionEvent::Errored`]
//! notifications and end up in the diagnostic sink.
//!
//! [`ConnectionEvent::Errored`]: crate::protocol::ConnectionEvent::Errored
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidEndpoint`], [`Error::Runtime`] |
//! | Connection | [`Error::ConnectionClosed`] |
//! | External | [`Error::Io`], [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;
use url::ParseError as UrlError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when the agent builder is given an unusable setting.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Endpoint could not be parsed as a URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] UrlError),

    /// No async runtime is available to drive the connection.
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the runtime problem.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// The connection task ended and no further state will be published.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a runtime error.
    #[inline]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionClosed)
    }

    /// Returns `true` if this error was caused by agent configuration.
    #[inline]
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. } | Self::InvalidEndpoint(_) | Self::Runtime { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::runtime("no reactor running");
        assert_eq!(err.to_string(), "Runtime error: no reactor running");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("unsupported scheme");
        assert_eq!(err.to_string(), "Configuration error: unsupported scheme");
        assert!(err.is_config_error());
        assert!(!err.is_connection_error());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(!Error::ConnectionClosed.is_config_error());
        assert!(!Error::runtime("no reactor").is_connection_error());
    }

    #[test]
    fn test_from_url_error() {
        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = url_err.into();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::ConnectionRefused, "refused");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
