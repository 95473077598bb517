//! # CLI Error Type
//!
//! Unified error type for `shop` commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in `shop`                                 │
//! │                                                                         │
//! │  Command Function                                                       │
//! │  Result<(), CliError>                                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ClientError? ──────── Unauthorized / Status / Transport ──┐            │
//! │         │                                                  │            │
//! │         ▼                                                  ▼            │
//! │  ValidationError? ──── quantity < 1, password mismatch ── CliError      │
//! │         │                                                  │            │
//! │         ▼                                                  ▼            │
//! │  Success                                     "error: ..." on stderr     │
//! │                                              exit_code() as status      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use storefront_client::ClientError;
use storefront_core::ValidationError;
use thiserror::Error;

/// Error returned by a `shop` command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid product id '{0}'")]
    InvalidId(String),

    #[error("Login failed. Check your email and password.")]
    LoginFailed,

    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    #[error("Please sign in first: shop login <EMAIL>")]
    SignInRequired,

    #[error("{notice} ({reason})")]
    CheckoutFailed { notice: &'static str, reason: String },

    #[error("Config file {} already exists (pass --force to replace it)", .0.display())]
    ConfigExists(std::path::PathBuf),

    #[error("Could not write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    /// Process exit status for this error.
    ///
    /// | Code | Meaning                                |
    /// |------|----------------------------------------|
    /// | 1    | Request or storage failure             |
    /// | 2    | Input rejected before anything was sent|
    /// | 3    | Authentication required or refused     |
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Validation(_) | CliError::InvalidId(_) => 2,
            CliError::Client(e) if e.is_validation_error() => 2,
            CliError::LoginFailed | CliError::SignInRequired => 3,
            CliError::Client(e) if e.is_auth_error() => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::from(ValidationError::PasswordMismatch).exit_code(), 2);
        assert_eq!(CliError::InvalidId("x".into()).exit_code(), 2);
        assert_eq!(CliError::SignInRequired.exit_code(), 3);
        assert_eq!(
            CliError::from(ClientError::Unauthorized("expired".into())).exit_code(),
            3
        );
        assert_eq!(CliError::from(ClientError::Timeout).exit_code(), 1);
    }
}
