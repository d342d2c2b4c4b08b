//! # UMC Client
//!
//! Authenticated access to the user management REST backend: the request
//! gateway with refresh-and-replay, the endpoint bindings and the session
//! flows built on them.

pub mod error;
pub mod request;
pub mod transport;
pub mod gateway;
pub mod api;
pub mod flows;

pub use api::{AuthApi, EditPayload, UsersApi};
pub use error::{ApiFailure, ApiResult, ClientError};
pub use flows::SessionFlows;
pub use gateway::Gateway;
pub use request::{ApiRequest, FilePart, MultipartBody, RequestBody};
pub use transport::{HttpTransport, Transport};
