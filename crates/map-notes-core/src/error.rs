//! Error taxonomy shared by the client and the server.
//!
//! Every user-triggered action converts its failure into a single status
//! string through [`AppError::status_message`].

use thiserror::Error;

/// Bad user input. Recovered locally, no retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("note cannot be empty.")]
    EmptyText,

    #[error("Coordinates must be finite numbers.")]
    NonFiniteCoordinate,

    #[error("No location selected for this note.")]
    NothingPending,

    #[error("A note is already being saved.")]
    SubmitInFlight,

    /// The backend refused the note (HTTP 400).
    #[error("{0}")]
    Rejected(String),
}

/// Persistence failure, local or remote.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage is not available in this browser.")]
    Unavailable,

    #[error("Could not save notes: {0}")]
    Write(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Server error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// The map cannot run here. Fatal to the map feature, reported once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error(
        "Open this page via http:// (e.g. run a local web server and visit http://localhost:8080). file:// often breaks map rendering."
    )]
    FileProtocol,

    #[error("Map library failed to load. Check your internet connection and reload.")]
    MapLibraryMissing,

    #[error("Map library loaded, but Map constructor is missing.")]
    MapConstructorMissing,

    #[error("Your browser does not support WebGL (required to display the map).")]
    WebGlUnsupported,

    #[error("Map error: {0}")]
    MapInit(String),
}

/// Failure to acquire the device position.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("Geolocation is not supported by your browser.")]
    Unsupported,

    #[error("Location access denied. Please enable location permissions in your browser settings.")]
    PermissionDenied,

    #[error("Location information unavailable. Check your GPS/WiFi settings.")]
    PositionUnavailable,

    #[error("Location request timed out. Please try again or check your connection.")]
    Timeout,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),
}

impl AppError {
    /// Human-readable status line for the UI.
    pub fn status_message(&self) -> String {
        self.to_string()
    }
}
