//! In-memory key-value store.
//!
//! Nothing survives the process. Useful for tests and for hosts that bridge
//! their own persistence by seeding and reading back the map.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{counter_or_zero, KeyValueStore, StoreResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every entry currently stored.
    pub fn entries(&self) -> StoreResult<HashMap<String, String>> {
        Ok(self.entries.lock()?.clone())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.entries.lock()?.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: Mutex::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.lock()?.remove(key);
        Ok(())
    }

    fn increment(&self, key: &str) -> StoreResult<u64> {
        let mut entries = self.entries.lock()?;
        let next = entries
            .get(key)
            .map_or(0, |v| counter_or_zero(key, v))
            .saturating_add(1);
        entries.insert(key.to_string(), next.to_string());
        Ok(next)
    }
}
