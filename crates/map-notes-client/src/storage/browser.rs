use map_notes_core::{KeyValueBackend, MemoryBackend, StorageError};

use crate::util::js_error_message;

/// `window.localStorage`.
pub struct BrowserStorage(web_sys::Storage);

impl BrowserStorage {
    pub fn local() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self(storage)),
            _ => Err(StorageError::Unavailable),
        }
    }
}

impl KeyValueBackend for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.0.get_item(key).map_err(|_| StorageError::Unavailable)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0
            .set_item(key, value)
            .map_err(|err| StorageError::Write(js_error_message(&err)))
    }
}

/// Browser storage, or process memory when the browser refuses it (private
/// mode, disabled cookies). Notes then last until the tab closes.
pub enum LocalBackend {
    Browser(BrowserStorage),
    Memory(MemoryBackend),
}

impl LocalBackend {
    pub fn detect() -> Self {
        match BrowserStorage::local() {
            Ok(storage) => LocalBackend::Browser(storage),
            Err(err) => {
                tracing::warn!("{err} Falling back to in-memory notes.");
                LocalBackend::Memory(MemoryBackend::new())
            }
        }
    }
}

impl KeyValueBackend for LocalBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            LocalBackend::Browser(storage) => storage.get_item(key),
            LocalBackend::Memory(memory) => memory.get_item(key),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            LocalBackend::Browser(storage) => storage.set_item(key, value),
            LocalBackend::Memory(memory) => memory.set_item(key, value),
        }
    }
}
