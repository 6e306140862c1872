//! Local storage adapter.
//!
//! The whole collection lives under one versioned key. Writes overwrite the
//! previous blob (last write wins); reads never fail.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::collection::decode_notes;
use crate::error::StorageError;
use crate::note::{Note, now_millis};

/// Versioned key of the persisted note blob. A future schema gets a new key.
pub const STORAGE_KEY: &str = "map-notes:v1";

/// Durable string key-value store (browser `localStorage` in the client).
pub trait KeyValueBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local backend, used when no durable store exists and in tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(key: &str, value: &str) -> Self {
        let backend = Self::new();
        backend
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        backend
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<B: KeyValueBackend + ?Sized> KeyValueBackend for &B {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

/// Note persistence on top of a [`KeyValueBackend`].
#[derive(Debug)]
pub struct LocalNoteStore<B> {
    backend: B,
    key: String,
}

impl<B: KeyValueBackend> LocalNoteStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: B, key: &str) -> Self {
        Self {
            backend,
            key: key.to_string(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Loads the stored notes, newest first. Missing, unreadable or corrupt
    /// data yields an empty list.
    pub fn load(&self) -> Vec<Note> {
        self.load_at(now_millis())
    }

    /// Like [`load`](Self::load) with an explicit clock for the
    /// `createdAt` fallback.
    pub fn load_at(&self, now_ms: i64) -> Vec<Note> {
        match self.backend.get_item(&self.key) {
            Ok(Some(raw)) => decode_notes(&raw, now_ms),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!("failed to read stored notes: {err}");
                Vec::new()
            }
        }
    }

    /// Persists the full collection, replacing whatever was stored.
    pub fn save(&self, notes: &[Note]) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(notes).map_err(|err| StorageError::Write(err.to_string()))?;
        self.backend.set_item(&self.key, &json)
    }
}
