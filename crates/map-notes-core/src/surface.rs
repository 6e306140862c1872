//! The map surface: the seam between the workflow and the rendering engine.

use crate::camera::{CameraTarget, ScreenPoint};
use crate::note::{LngLat, NoteId};

/// Semantic marker look. How each state is drawn is up to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerAppearance {
    /// Committed or pending-submit pin.
    Default,
    /// Pointer over a committed pin.
    Hover,
    /// Unconfirmed placement.
    Preview,
}

/// Identifies one popup instance for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopupKey(pub u64);

/// What a popup shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PopupContent {
    /// Text entry bound to the pending point.
    Compose,
    /// Read-only note display.
    Note {
        text: String,
        created_at: Option<String>,
    },
}

/// What the user hit with a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    EmptyMap,
    Preview,
    Marker(NoteId),
}

/// Rendering engine operations needed by the workflow.
///
/// Implementations must not call back into the session synchronously from
/// these methods; engine events are delivered separately.
pub trait MapSurface {
    type Marker;
    type Popup;

    fn zoom(&self) -> f64;

    /// Geographic coordinate to container pixels.
    fn project(&self, position: LngLat) -> ScreenPoint;

    /// Container pixels to a geographic coordinate.
    fn unproject(&self, point: ScreenPoint) -> LngLat;

    /// Starts an animated camera flight. Supersedes any flight in progress.
    fn fly_to(&mut self, target: CameraTarget);

    fn add_marker(&mut self, position: LngLat, appearance: MarkerAppearance) -> Self::Marker;

    fn set_marker_appearance(&mut self, marker: &Self::Marker, appearance: MarkerAppearance);

    /// Associates a marker with a committed note so clicks on it report
    /// [`ClickTarget::Marker`].
    fn tag_marker(&mut self, marker: &Self::Marker, id: &NoteId);

    fn remove_marker(&mut self, marker: Self::Marker);

    /// Opens a popup anchored above `anchor`. Closing it from the engine side
    /// must be reported with the same `key`.
    fn open_popup(&mut self, key: PopupKey, anchor: LngLat, content: PopupContent) -> Self::Popup;

    /// Removes a popup without reporting a close event.
    fn close_popup(&mut self, popup: Self::Popup);

    /// Disables or re-enables a compose popup's submit control.
    fn set_popup_busy(&mut self, popup: &Self::Popup, busy: bool);
}
