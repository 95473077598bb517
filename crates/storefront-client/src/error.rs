//! # Client Error Types
//!
//! Error types for network, storage and configuration failures.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │ (a) Auth        │  │ (b) Transport   │  │ (c) Validation          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Unauthorized   │  │  Transport      │  │  Validation             │ │
//! │  │                 │  │  Timeout        │  │                         │ │
//! │  │  → reset the    │  │  Status         │  │  → rejected before any  │ │
//! │  │    session      │  │  Decode         │  │    request is sent      │ │
//! │  │                 │  │  → inline msg,  │  │                         │ │
//! │  │                 │  │    no retry     │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────────────────────────────────┐  │
//! │  │    Storage      │  │   Configuration                             │  │
//! │  │  Storage        │  │   InvalidConfig, ConfigLoad/SaveFailed      │  │
//! │  └─────────────────┘  └─────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these is fatal: every manager converts them into a recoverable
//! state (logged-out session, untouched cart, inline message).

use storefront_core::ValidationError;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering all failures of the storefront client.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never produced a response (DNS, refused, reset).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The backend rejected the credentials or the bearer token.
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// The backend answered with a non-success status.
    #[error("Server returned {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The response body did not match the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Reading or writing durable storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidConfig(format!("invalid URL: {}", err))
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl From<storefront_core::CoreError> for ClientError {
    fn from(err: storefront_core::CoreError) -> Self {
        match err {
            storefront_core::CoreError::Validation(v) => ClientError::Validation(v),
            other => ClientError::Storage(other.to_string()),
        }
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Bad credentials or an invalid/expired token.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    /// Network or server failure that the user sees as an inline message.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            ClientError::Transport(_)
                | ClientError::Timeout
                | ClientError::Status { .. }
                | ClientError::Decode(_)
        )
    }

    /// Input rejected locally; nothing was sent.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert!(ClientError::Unauthorized("expired".into()).is_auth_error());
        assert!(ClientError::Timeout.is_transport_error());
        assert!(ClientError::Status {
            status: 500,
            detail: "boom".into()
        }
        .is_transport_error());
        assert!(ClientError::Validation(ValidationError::PasswordMismatch).is_validation_error());
        assert!(ClientError::InvalidConfig("x".into()).is_config_error());

        assert!(!ClientError::Unauthorized("expired".into()).is_transport_error());
        assert!(!ClientError::Storage("disk full".into()).is_auth_error());
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::Status {
            status: 400,
            detail: "Email already registered".into(),
        };
        assert_eq!(err.to_string(), "Server returned 400: Email already registered");

        let err: ClientError = ValidationError::PasswordMismatch.into();
        assert_eq!(err.to_string(), "Passwords don't match");
    }
}
