//! Single active popup.
//!
//! At most one popup is open at any time. Opening one always closes the
//! previous one first.

use crate::note::{LngLat, NoteId};
use crate::surface::{MapSurface, PopupContent, PopupKey};

/// What the active popup is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupKind {
    Compose,
    Note(NoteId),
}

#[derive(Debug)]
struct OpenPopup<P> {
    key: PopupKey,
    kind: PopupKind,
    handle: P,
}

#[derive(Debug)]
pub struct PopupController<P> {
    active: Option<OpenPopup<P>>,
    next_key: u64,
    suppress_next_recenter: bool,
}

impl<P> Default for PopupController<P> {
    fn default() -> Self {
        Self {
            active: None,
            next_key: 1,
            suppress_next_recenter: false,
        }
    }
}

impl<P> PopupController<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_kind(&self) -> Option<&PopupKind> {
        self.active.as_ref().map(|popup| &popup.kind)
    }

    pub fn active_key(&self) -> Option<PopupKey> {
        self.active.as_ref().map(|popup| popup.key)
    }

    pub fn is_note_open(&self, id: &NoteId) -> bool {
        matches!(self.active_kind(), Some(PopupKind::Note(open)) if open == id)
    }

    pub fn is_compose_open(&self) -> bool {
        matches!(self.active_kind(), Some(PopupKind::Compose))
    }

    /// Skip the camera recenter of the next note popup that opens.
    pub fn suppress_next_recenter(&mut self) {
        self.suppress_next_recenter = true;
    }

    /// Returns whether the next open should recenter, consuming the
    /// suppression flag.
    pub fn take_recenter(&mut self) -> bool {
        !std::mem::replace(&mut self.suppress_next_recenter, false)
    }

    /// Closes the active popup, if any, and reports what it was bound to.
    pub fn close_active<S>(&mut self, surface: &mut S) -> Option<PopupKind>
    where
        S: MapSurface<Popup = P>,
    {
        let popup = self.active.take()?;
        surface.close_popup(popup.handle);
        Some(popup.kind)
    }

    /// Forgets the active popup when the engine reports it closed on its own.
    /// Late reports for popups that are no longer active are ignored.
    pub fn closed_by_surface(&mut self, key: PopupKey) -> Option<PopupKind> {
        if self.active_key() != Some(key) {
            return None;
        }
        self.active.take().map(|popup| popup.kind)
    }

    /// Opens a popup. The caller must have closed the previous one.
    pub fn open<S>(&mut self, surface: &mut S, kind: PopupKind, anchor: LngLat, content: PopupContent)
    where
        S: MapSurface<Popup = P>,
    {
        debug_assert!(self.active.is_none(), "popup opened over an active popup");
        let key = PopupKey(self.next_key);
        self.next_key += 1;
        let handle = surface.open_popup(key, anchor, content);
        self.active = Some(OpenPopup { key, kind, handle });
    }

    pub fn set_busy<S>(&self, surface: &mut S, busy: bool)
    where
        S: MapSurface<Popup = P>,
    {
        if let Some(popup) = &self.active {
            surface.set_popup_busy(&popup.handle, busy);
        }
    }
}
