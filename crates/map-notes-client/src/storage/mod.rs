//! Note persistence: browser local storage or the HTTP backend.

mod browser;
mod remote;

use map_notes_core::{LocalNoteStore, Note, StorageError};

pub use browser::{BrowserStorage, LocalBackend};
pub use remote::RemoteNoteStore;

use crate::config::ClientConfig;

pub enum NoteBackend {
    Local(LocalNoteStore<LocalBackend>),
    Remote(RemoteNoteStore),
}

impl NoteBackend {
    pub fn from_config(config: &ClientConfig) -> Self {
        match &config.api_base {
            Some(base) => {
                tracing::info!("using remote notes at {base:?}");
                NoteBackend::Remote(RemoteNoteStore::new(base))
            }
            None => NoteBackend::Local(LocalNoteStore::new(LocalBackend::detect())),
        }
    }

    pub async fn load(&self) -> Result<Vec<Note>, StorageError> {
        match self {
            NoteBackend::Local(store) => Ok(store.load()),
            NoteBackend::Remote(remote) => remote.list().await,
        }
    }
}
