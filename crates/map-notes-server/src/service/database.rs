use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use map_notes_core::{Note, NoteDraft, NoteId, note::now_millis};
use parking_lot::RwLock;
use thiserror::Error;

/// The note table, newest first.
///
/// With a snapshot file every insert rewrites the file while holding the
/// write lock, so the file always matches the table.
#[derive(Clone)]
pub struct Database {
    notes: Arc<RwLock<Vec<Note>>>,
    snapshot: Option<Arc<PathBuf>>,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("note storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("note storage is corrupt: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("note storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    /// In-memory table, lost on restart.
    pub fn new() -> Self {
        Self {
            notes: Arc::new(RwLock::new(Vec::new())),
            snapshot: None,
        }
    }

    /// Table backed by a JSON snapshot at `path`. A missing file is an empty
    /// table; an unreadable one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        let path = path.into();
        let mut notes = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<Vec<Note>>(&raw)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tracing::info!(path = %path.display(), count = notes.len(), "note table loaded");

        Ok(Self {
            notes: Arc::new(RwLock::new(notes)),
            snapshot: Some(Arc::new(path)),
        })
    }

    pub fn list(&self, limit: usize) -> Vec<Note> {
        let notes = self.notes.read();
        notes.iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.notes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.read().is_empty()
    }

    /// [`Database::insert`] on the blocking pool. The snapshot write and the
    /// write lock stay off the async workers.
    pub async fn insert_async(&self, draft: NoteDraft) -> Result<Note, DatabaseError> {
        let database = self.clone();
        tokio::task::spawn_blocking(move || database.insert(draft)).await?
    }

    /// Assigns an id and a creation time and stores the note. Nothing is
    /// kept when the snapshot cannot be written.
    pub fn insert(&self, draft: NoteDraft) -> Result<Note, DatabaseError> {
        let mut notes = self.notes.write();

        let now = now_millis();
        let mut rng = rand::rng();
        let id = loop {
            let id = NoteId::generate(now, &mut rng);
            if !notes.iter().any(|note| note.id == id) {
                break id;
            }
        };
        let note = draft.into_note(id, now);
        notes.insert(0, note.clone());

        if let Some(path) = &self.snapshot {
            if let Err(err) = write_snapshot(path, &notes) {
                notes.remove(0);
                return Err(err);
            }
        }
        Ok(note)
    }
}

fn write_snapshot(path: &Path, notes: &[Note]) -> Result<(), DatabaseError> {
    let raw = serde_json::to_vec(notes)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, raw)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
