//! Key-value persistence seam.
//!
//! Services keep their working state in memory and write JSON snapshots
//! through this trait after every mutation. Swapping the backing store (file,
//! database, browser storage behind an API) only touches implementations of
//! [`KeyValueStore`]; the services never change.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str);
}

/// In-memory store. The default backend for tests and the demo binary.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Handle to a store shared by several services, the way the original
/// storefront shared one browser storage across its page modules. Clones
/// point at the same entries.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<MemoryStore>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryStore> {
        // Recover from poisoning; the store holds plain data.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.lock().set(key, value);
    }

    fn remove(&mut self, key: &str) {
        self.lock().remove(key);
    }
}

/// Loads and decodes `key`, or `None` when absent. Decode failures are logged
/// and treated as absent; persistence problems are never fatal.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let value = store.get(key)?;
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(key, error = %e, "Discarding undecodable stored value");
            None
        }
    }
}

/// Encodes and stores `value` under `key`, logging encode failures.
pub fn persist<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(encoded) => store.set(key, encoded),
        Err(e) => warn!(key, error = %e, "Failed to encode value for storage"),
    }
}
