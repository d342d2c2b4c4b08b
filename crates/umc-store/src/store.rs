//! Session store: single source of truth for identity and credentials
//!
//! Shared behind `Arc` by the gateway and the console flows. State only
//! changes through [`SessionStore::dispatch`], and every change is written
//! to storage before observers are notified.

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use umc_core::{AuthSession, CacheTag, ManagedUser, TokenPair};
use umc_shared::constants::PERSIST_KEY;

use crate::cache::QueryCache;
use crate::error::StoreError;
use crate::state::{Action, ClientState};
use crate::storage::{MemoryStorage, StateStorage};

pub struct SessionStore {
    state: RwLock<ClientState>,
    cache: Mutex<QueryCache>,
    storage: Arc<dyn StateStorage>,
    key: String,
    session_tx: watch::Sender<AuthSession>,
}

impl SessionStore {
    /// Rehydrates from `storage`. Unreadable or corrupt state is logged
    /// and replaced by the empty state.
    pub fn open(storage: Arc<dyn StateStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = match Self::rehydrate(storage.as_ref(), &key) {
            Ok(Some(state)) => {
                info!("Restored client state from '{}'", key);
                state
            }
            Ok(None) => ClientState::default(),
            Err(e) => {
                warn!("Discarding persisted state under '{}': {}", key, e);
                ClientState::default()
            }
        };
        let (session_tx, _) = watch::channel(state.auth.clone());

        Self {
            state: RwLock::new(state),
            cache: Mutex::new(QueryCache::new()),
            storage,
            key,
            session_tx,
        }
    }

    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStorage::new()), PERSIST_KEY)
    }

    fn rehydrate(storage: &dyn StateStorage, key: &str) -> Result<Option<ClientState>, StoreError> {
        match storage.load(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn persist(&self, state: &ClientState) -> Result<(), StoreError> {
        let raw = serde_json::to_string(state)?;
        self.storage.save(&self.key, &raw)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    // --- Reads ---

    pub fn session(&self) -> AuthSession {
        self.state.read().auth.clone()
    }

    pub fn snapshot(&self) -> ClientState {
        self.state.read().clone()
    }

    pub fn users(&self) -> Vec<ManagedUser> {
        self.state.read().user.users.clone()
    }

    /// Receives the session after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<AuthSession> {
        self.session_tx.subscribe()
    }

    // --- Mutations ---

    /// Applies `action`, persists the result and notifies subscribers.
    /// A storage failure is logged; the in-memory change stands.
    pub fn dispatch(&self, action: Action) {
        let name = action.name();
        let is_logout = matches!(action, Action::Logout);

        let session = {
            let mut state = self.state.write();
            let next = std::mem::take(&mut *state).reduce(action);
            *state = next;
            // Held across the write so storage sees states in dispatch order.
            if let Err(e) = self.persist(&state) {
                error!("Failed to persist client state after {}: {}", name, e);
            }
            state.auth.clone()
        };

        if is_logout {
            self.cache.lock().clear();
        }

        debug!("Dispatched {}", name);
        self.session_tx.send_replace(session);
    }

    pub fn set_user(&self, session: AuthSession) {
        self.dispatch(Action::SetUser(session));
    }

    pub fn set_token(&self, pair: TokenPair) {
        self.dispatch(Action::SetToken(pair));
    }

    pub fn logout(&self) {
        self.dispatch(Action::Logout);
    }

    pub fn set_all_users(&self, users: Vec<ManagedUser>) {
        self.dispatch(Action::SetAllUsers(users));
    }

    // --- Query cache ---

    pub fn cached(&self, key: &str) -> Option<Value> {
        let cache = self.cache.lock();
        let entry = cache.get(key)?;
        debug!("Cache hit for {} ({}s old)", key, entry.age().num_seconds());
        Some(entry.value.clone())
    }

    pub fn cache_response(&self, key: impl Into<String>, value: Value, tags: Vec<CacheTag>) {
        self.cache.lock().insert(key.into(), value, tags);
    }

    pub fn invalidate(&self, tags: &[CacheTag]) {
        let removed = self.cache.lock().invalidate(tags);
        debug!("Invalidated {} cached responses for {:?}", removed, tags);
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }
}
