//! # UMC Store
//!
//! Persisted client-side state: the session slice, the user-list slice
//! and the tag-invalidated query cache.

pub mod error;
pub mod storage;
pub mod state;
pub mod cache;
pub mod store;

pub use cache::QueryCache;
pub use error::StoreError;
pub use state::{Action, ClientState, UserSlice};
pub use storage::{FileStorage, MemoryStorage, StateStorage};
pub use store::SessionStore;
