//! Domain-specific errors for the ledger.
//!
//! Contains error variants for common failure cases like:
//! - User-related errors (not found, duplicate email, bad credentials)
//! - Statement errors (not found, insufficient funds, invalid amount)
//!
//! Every variant maps to a distinct user-visible failure through
//! [`Error::status_code`]. Hashing and token encoding failures are the only
//! technical errors carried here, since they surface from the same
//! operations as the business failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("User not found")]
    UserNotFound,

    #[error("Statement not found")]
    StatementNotFound,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("User already exists")]
    EmailAlreadyExists,

    #[error("Amount must be positive")]
    AmountMustBePositive,

    /// The balance would leave the representable decimal range.
    #[error("Amount too large")]
    AmountTooLarge,

    #[error("Incorrect email or password")]
    IncorrectEmailOrPassword,

    #[error("Invalid token")]
    InvalidToken,

    /// A batch row omitted a field its operation requires.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Password hashing failed: {0}")]
    PasswordHash(#[from] argon2::Error),

    /// The configured token lifetime puts the expiry out of range.
    #[error("Token lifetime out of range")]
    TokenLifetimeOutOfRange,

    #[error("Token encoding failed: {0}")]
    TokenEncoding(#[from] jsonwebtoken::errors::Error),
}

impl Error {
    /// HTTP-style status code for the failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::UserNotFound | Error::StatementNotFound => 404,
            Error::InsufficientFunds
            | Error::AmountMustBePositive
            | Error::AmountTooLarge
            | Error::MissingField(_) => 400,
            Error::EmailAlreadyExists => 409,
            Error::IncorrectEmailOrPassword | Error::InvalidToken => 401,
            Error::PasswordHash(_) | Error::TokenLifetimeOutOfRange | Error::TokenEncoding(_) => {
                500
            }
        }
    }
}
