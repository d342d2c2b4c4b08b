//! Domain errors

use thiserror::Error;

use crate::forms::FormErrors;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(#[from] FormErrors),

    #[error("No active session")]
    NotAuthenticated,

    #[error("No authentication tokens found")]
    MissingOAuthTokens,

    #[error("No verification token found")]
    MissingVerificationToken,

    #[error("Unexpected response payload: {0}")]
    UnexpectedPayload(String),
}
