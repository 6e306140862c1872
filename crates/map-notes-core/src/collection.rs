//! In-memory note collection and the lenient decoder for persisted blobs.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use crate::note::{LngLat, Note, NoteId};

/// Maximum number of notes kept, most recent first.
pub const MAX_NOTES: usize = 500;

/// Notes ordered newest first, ids unique, at most [`MAX_NOTES`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteCollection {
    notes: Vec<Note>,
}

impl NoteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from notes already ordered newest first.
    /// Later duplicates of an id are dropped, then the list is capped.
    pub fn from_ordered(notes: Vec<Note>) -> Self {
        let mut seen = HashSet::new();
        let mut notes: Vec<Note> = notes
            .into_iter()
            .filter(|note| seen.insert(note.id.clone()))
            .collect();
        notes.truncate(MAX_NOTES);
        Self { notes }
    }

    /// Inserts `note` at the front. An existing note with the same id is
    /// replaced. Returns notes evicted by the cap.
    pub fn prepend(&mut self, note: Note) -> Vec<Note> {
        self.notes.retain(|existing| existing.id != note.id);
        self.notes.insert(0, note);
        if self.notes.len() > MAX_NOTES {
            self.notes.split_off(MAX_NOTES)
        } else {
            Vec::new()
        }
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn into_vec(self) -> Vec<Note> {
        self.notes
    }
}

/// Stored entry before validation. `createdAt` may be missing in blobs
/// written by older versions.
#[derive(Deserialize)]
struct StoredNote {
    id: String,
    note: String,
    lng: f64,
    lat: f64,
    #[serde(rename = "createdAt", default, deserialize_with = "present")]
    created_at: StoredCreatedAt,
}

/// Missing is legacy data; a present `null` is not.
#[derive(Default)]
enum StoredCreatedAt {
    #[default]
    Missing,
    Present(Value),
}

fn present<'de, D>(deserializer: D) -> Result<StoredCreatedAt, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(StoredCreatedAt::Present)
}

impl StoredNote {
    fn into_note(self, now_ms: i64) -> Option<Note> {
        let id = NoteId::from(self.id);
        if self.note.trim().is_empty() {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let created_at = match self.created_at {
            StoredCreatedAt::Present(Value::Number(value)) => value.as_f64()? as i64,
            StoredCreatedAt::Present(_) => return None,
            StoredCreatedAt::Missing => id.timestamp_prefix().unwrap_or(now_ms),
        };
        Some(Note {
            id,
            text: self.note,
            position: LngLat::new(self.lng, self.lat),
            created_at,
        })
    }
}

/// Decodes a persisted note blob. Never fails: anything that is not a JSON
/// array yields an empty list, and malformed entries are skipped.
pub fn decode_notes(raw: &str, now_ms: i64) -> Vec<Note> {
    let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(raw) else {
        tracing::debug!("persisted notes are not a JSON array, ignoring");
        return Vec::new();
    };

    let notes = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<StoredNote>(entry).ok())
        .filter_map(|stored| stored.into_note(now_ms))
        .collect();
    NoteCollection::from_ordered(notes).into_vec()
}
