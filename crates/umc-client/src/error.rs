//! Client error types
//!
//! Callers branch on [`ApiFailure::status`] and the server payload rather
//! than on error kinds.

use serde_json::Value;
use thiserror::Error;
use umc_core::{DomainError, FormErrors};

/// Outcome of a single backend call.
pub type ApiResult = Result<Value, ApiFailure>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiFailure {
    /// Non-2xx response with whatever body the server sent.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: Value },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiFailure {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiFailure::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiFailure::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<&str> {
        self.body()?.get("error_code")?.as_str()
    }

    /// Server `message`, falling back to `error_code`, then the display form.
    pub fn message(&self) -> String {
        self.body()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .or_else(|| self.error_code())
            .map(str::to_string)
            .unwrap_or_else(|| self.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiFailure),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<FormErrors> for ClientError {
    fn from(errors: FormErrors) -> Self {
        ClientError::Domain(DomainError::Validation(errors))
    }
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(failure) => failure.status(),
            _ => None,
        }
    }
}
