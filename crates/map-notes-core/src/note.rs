//! Note entity, identifiers and coordinates.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Geographic coordinate pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

impl From<(f64, f64)> for LngLat {
    fn from((lng, lat): (f64, f64)) -> Self {
        Self { lng, lat }
    }
}

/// Opaque note identifier: `<epoch-millis>-<random hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Generates a fresh id. The prefix keeps ids roughly sortable by
    /// creation time; the suffix carries 64 random bits.
    pub fn generate<R: Rng + ?Sized>(now_ms: i64, rng: &mut R) -> Self {
        let suffix: u64 = rng.random();
        Self(format!("{now_ms}-{suffix:016x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric prefix before the first `-`, if it is a positive number.
    pub fn timestamp_prefix(&self) -> Option<i64> {
        let prefix = self.0.split('-').next()?;
        let value: f64 = prefix.trim().parse().ok()?;
        #[allow(clippy::cast_possible_truncation)]
        (value.is_finite() && value > 0.0).then_some(value as i64)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user note pinned to a coordinate. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireNote", into = "WireNote")]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    pub position: LngLat,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl Note {
    pub fn new(
        id: NoteId,
        text: &str,
        position: LngLat,
        created_at: i64,
    ) -> Result<Self, ValidationError> {
        let draft = NoteDraft::new(text, position)?;
        Ok(draft.into_note(id, created_at))
    }
}

/// Validated note content that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDraft {
    text: String,
    position: LngLat,
}

impl NoteDraft {
    pub fn new(text: &str, position: LngLat) -> Result<Self, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if !position.is_finite() {
            return Err(ValidationError::NonFiniteCoordinate);
        }
        Ok(Self {
            text: text.to_string(),
            position,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> LngLat {
        self.position
    }

    pub fn into_note(self, id: NoteId, created_at: i64) -> Note {
        Note {
            id,
            text: self.text,
            position: self.position,
            created_at,
        }
    }
}

/// JSON shape of a note: `{id, note, lng, lat, createdAt}`.
#[derive(Serialize, Deserialize)]
struct WireNote {
    id: NoteId,
    note: String,
    lng: f64,
    lat: f64,
    #[serde(rename = "createdAt")]
    created_at: i64,
}

impl From<WireNote> for Note {
    fn from(wire: WireNote) -> Self {
        Note {
            id: wire.id,
            text: wire.note,
            position: LngLat::new(wire.lng, wire.lat),
            created_at: wire.created_at,
        }
    }
}

impl From<Note> for WireNote {
    fn from(note: Note) -> Self {
        WireNote {
            id: note.id,
            note: note.text,
            lng: note.position.lng,
            lat: note.position.lat,
            created_at: note.created_at,
        }
    }
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `"<lat>, <lng>"` with five decimals.
pub fn format_coords(position: LngLat) -> String {
    format!("{:.5}, {:.5}", position.lat, position.lng)
}

/// Calendar date of a note, `YYYY-MM-DD` (UTC).
pub fn format_created_at(created_at_ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(created_at_ms).map(|dt| dt.format("%Y-%m-%d").to_string())
}
