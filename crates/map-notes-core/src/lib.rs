//! Map Notes Core Library
//!
//! Note model, persistence adapters and the pin placement workflow.
//!
//! Everything here is engine-agnostic: the workflow drives a
//! [`surface::MapSurface`] and the client supplies the MapLibre binding.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod camera;
pub mod collection;
pub mod error;
pub mod geolocation;
pub mod note;
pub mod popup;
pub mod registry;
pub mod storage;
pub mod surface;
pub mod wire;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use collection::{MAX_NOTES, NoteCollection};
pub use error::{AppError, EnvironmentError, GeolocationError, StorageError, ValidationError};
pub use note::{LngLat, Note, NoteDraft, NoteId};
pub use storage::{KeyValueBackend, LocalNoteStore, MemoryBackend, STORAGE_KEY};
pub use surface::{ClickTarget, MapSurface, MarkerAppearance, PopupContent, PopupKey};
pub use workflow::{
    PendingSubmit, Phase, PlacementState, Session, SubmitTicket, WorkflowConfig, WorkflowEvent,
};
