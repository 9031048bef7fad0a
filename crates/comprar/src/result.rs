//! Result and error types for Comprar.

use thiserror::Error;

/// Result type for Comprar operations
pub type ComprarResult<T> = Result<T, ComprarError>;

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum ComprarError {
    /// No strategy in a locator spec matched a live element
    #[error("element not found: '{role}' ({attempts} strategies tried)")]
    ElementNotFound {
        /// Logical UI role of the target
        role: String,
        /// Number of strategies evaluated before giving up
        attempts: usize,
    },

    /// A wait deadline elapsed before the required state was reached
    #[error("timed out after {ms}ms waiting for {waiting_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of what was being waited for
        waiting_for: String,
    },

    /// Page failed to reach the expected URL or state
    #[error("navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Browser launch, connection, or protocol error
    #[error("browser error: {message}")]
    Browser {
        /// Error message
        message: String,
    },

    /// Session artifact could not be read, written, or applied
    #[error("session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Suite configuration error
    #[error("configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// A verification step failed
    #[error("assertion failed: {message}")]
    Assertion {
        /// Error message
        message: String,
    },

    /// Screenshot capture failed
    #[error("screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ComprarError {
    /// True when the error is a locator resolution failure
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }

    /// True when the error is a wait deadline expiry
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
