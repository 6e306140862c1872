//! JSON bodies exchanged with the notes backend.
//!
//! `GET /notes` answers with `Vec<Note>` in wire shape; `POST /notes` takes a
//! [`CreateNoteRequest`] and answers with the stored note. Failures carry an
//! [`ErrorBody`].

use serde::{Deserialize, Serialize};

use crate::note::NoteDraft;

pub const NOTES_PATH: &str = "/notes";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    pub note: String,
    pub lng: f64,
    pub lat: f64,
}

impl From<&NoteDraft> for CreateNoteRequest {
    fn from(draft: &NoteDraft) -> Self {
        Self {
            note: draft.text().to_string(),
            lng: draft.position().lng,
            lat: draft.position().lat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
