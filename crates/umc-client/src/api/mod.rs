//! REST endpoint bindings
//!
//! Thin typed wrappers over [`Gateway::execute`](crate::gateway::Gateway::execute).

mod auth;
mod users;

pub use auth::AuthApi;
pub use users::{EditPayload, UsersApi};

use serde::de::DeserializeOwned;
use serde_json::Value;
use umc_core::DomainError;

use crate::error::ClientError;

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value)
        .map_err(|e| ClientError::Domain(DomainError::UnexpectedPayload(e.to_string())))
}
