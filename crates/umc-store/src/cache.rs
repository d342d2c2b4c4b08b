//! Response cache invalidated by tags

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use umc_core::CacheTag;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    pub tags: Vec<CacheTag>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<String, CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, value: Value, tags: Vec<CacheTag>) {
        self.entries.insert(
            key,
            CacheEntry { value, tags, fetched_at: Utc::now() },
        );
    }

    /// Drops every entry providing any of `tags`; returns how many went.
    pub fn invalidate(&mut self, tags: &[CacheTag]) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !entry.tags.iter().any(|t| tags.contains(t)));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
