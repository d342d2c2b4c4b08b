//! # UMC Core - Domain Module
//!
//! Session, user and query models shared by the store and the client.

pub mod session;
pub mod user;
pub mod query;
pub mod envelope;

pub use session::{AuthSession, SessionUser, TokenPair};
pub use user::{ManagedUser, UserUpdate};
pub use query::{CacheTag, ListUsersQuery};
pub use envelope::{AuthPayload, Envelope, ProfileRecord, TokensRecord};
