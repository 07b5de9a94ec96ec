//! Authentication error types

use thiserror::Error;

/// Authentication and session errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid credentials provided
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// No session matches the presented token
    #[error("Invalid authentication token")]
    InvalidToken,

    /// Old password did not match on password change
    #[error("Old password does not match")]
    PasswordMismatch,

    /// Email already registered
    #[error("User already exists")]
    UserAlreadyExists,

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}
