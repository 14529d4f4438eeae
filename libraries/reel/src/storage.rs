//! Durable per-origin key-value storage, namespaced by a fixed prefix.
//!
//! Values are whole JSON documents. There is no TTL, no size limit, and no
//! compaction: a document that inlines large blobs grows without bound, which
//! is a documented limitation of the snapshot design, not something this layer
//! papers over.

use serde::{Serialize, de::DeserializeOwned};

/// JSON key-value storage over the browser's `localStorage` (a thread-local
/// map on non-wasm targets). All keys are prefixed, so two stores with
/// different prefixes never see each other's documents.
pub struct KeyValueStorage {
    prefix: String,
}

impl KeyValueStorage {
    pub fn new(prefix: impl Into<String>) -> KeyValueStorage {
        KeyValueStorage {
            prefix: prefix.into(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Synchronous write of one serialized document. Serialization and storage
    /// failures are logged and dropped; there is no retry queue to hand them
    /// to, and a failed save must never take the in-memory state down with it.
    pub fn save(&self, key: &str, value: &impl Serialize) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize document for key {key}: {e:?}");
                return;
            }
        };
        backend::set_item(&self.full_key(key), &json);
    }

    /// Reads one document. Absent and unparseable both come back as `None`;
    /// a corrupt document is logged and treated as if it was never saved.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = backend::get_item(&self.full_key(key))?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Discarding unparseable document at key {key}: {e:?}");
                None
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod backend {
    fn local_storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }

    pub(super) fn set_item(key: &str, value: &str) {
        let Some(storage) = local_storage() else {
            log::error!("localStorage unavailable, dropping write to {key}");
            return;
        };
        if let Err(e) = storage.set_item(key, value) {
            log::error!("Failed to write {key} to localStorage: {e:?}");
        }
    }

    pub(super) fn get_item(key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod backend {
    use std::cell::RefCell;
    use std::collections::HashMap;

    thread_local! {
        static STORE: RefCell<HashMap<String, String>> = RefCell::new(HashMap::new());
    }

    pub(super) fn set_item(key: &str, value: &str) {
        STORE.with(|store| {
            store
                .borrow_mut()
                .insert(key.to_string(), value.to_string())
        });
    }

    pub(super) fn get_item(key: &str) -> Option<String> {
        STORE.with(|store| store.borrow().get(key).cloned())
    }

    #[cfg(test)]
    pub(super) fn set_raw(key: &str, value: &str) {
        set_item(key, value)
    }
}
