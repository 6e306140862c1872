//! Pin placement workflow.
//!
//! One [`Session`] owns the map surface, the note collection, the marker
//! registry, the active popup and the placement state. UI event handlers get
//! it by reference and feed it events; nothing else holds transient state.
//!
//! ```text
//! Idle --click empty--> PreviewPlaced --click preview--> AwaitingNote
//!  ^                      |  click empty: move preview      |
//!  |                      v                                 |
//!  +------------------ submit / cancel ---------------------+
//! ```

use crate::camera::{self, CameraTarget, ScreenPoint};
use crate::collection::NoteCollection;
use crate::error::{AppError, StorageError, ValidationError};
use crate::note::{LngLat, Note, NoteDraft, NoteId, format_coords, format_created_at, now_millis};
use crate::popup::{PopupController, PopupKind};
use crate::registry::MarkerRegistry;
use crate::storage::{KeyValueBackend, LocalNoteStore};
use crate::surface::{ClickTarget, MapSurface, MarkerAppearance, PopupContent, PopupKey};

/// Camera choreography constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkflowConfig {
    /// Pixels a centred marker sits below the visual centre.
    pub marker_offset_px: f64,
    /// Minimum zoom after a commit. The camera never zooms out.
    pub detail_zoom: f64,
    /// Minimum zoom after a geolocation fix.
    pub locate_zoom: f64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            marker_offset_px: camera::MARKER_OFFSET_BELOW_CENTER,
            detail_zoom: camera::DETAIL_ZOOM,
            locate_zoom: camera::LOCATE_ZOOM,
        }
    }
}

/// The coordinate waiting for a note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingPoint {
    pub position: LngLat,
}

/// Identifies one create request, so its answer only ever lands on the
/// compose it was sent from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmitTicket(u64);

/// A validated draft waiting for the notes backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmit {
    pub ticket: SubmitTicket,
    pub draft: NoteDraft,
}

/// Placement state. The compose popup is open exactly while in
/// `AwaitingNote`.
#[derive(Debug)]
pub enum PlacementState<M> {
    Idle,
    PreviewPlaced {
        preview: M,
        position: LngLat,
    },
    AwaitingNote {
        pending: PendingPoint,
        /// Pending-submit marker, promoted into the registry on commit.
        marker: M,
        /// The create request in flight for this compose. The submit control
        /// is disabled while it is set.
        submitting: Option<SubmitTicket>,
    },
}

impl<M> PlacementState<M> {
    pub fn phase(&self) -> Phase {
        match self {
            PlacementState::Idle => Phase::Idle,
            PlacementState::PreviewPlaced { .. } => Phase::PreviewPlaced,
            PlacementState::AwaitingNote { .. } => Phase::AwaitingNote,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    PreviewPlaced,
    AwaitingNote,
}

/// UI events delivered by the surface or the page.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    Click {
        target: ClickTarget,
        position: LngLat,
    },
    /// Cancel button or Escape.
    Cancel,
    /// The engine closed a popup by itself (close button, click-away).
    PopupClosed(PopupKey),
    /// A geolocation fix arrived.
    Located(LngLat),
    /// The pointer entered or left a committed marker.
    Hover { id: NoteId, hovered: bool },
}

/// Inputs of the placement state machine.
#[derive(Debug, Clone, Copy)]
enum Input {
    PlacePreview(LngLat),
    ConfirmPreview { zoom: f64 },
    Cancel,
}

pub struct Session<S: MapSurface> {
    surface: S,
    config: WorkflowConfig,
    notes: NoteCollection,
    registry: MarkerRegistry<S::Marker>,
    popups: PopupController<S::Popup>,
    state: PlacementState<S::Marker>,
    status: Option<String>,
    next_ticket: u64,
}

impl<S: MapSurface> Session<S> {
    pub fn new(surface: S, config: WorkflowConfig) -> Self {
        Self {
            surface,
            config,
            notes: NoteCollection::new(),
            registry: MarkerRegistry::new(),
            popups: PopupController::new(),
            state: PlacementState::Idle,
            status: None,
            next_ticket: 1,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn notes(&self) -> &NoteCollection {
        &self.notes
    }

    pub fn registry(&self) -> &MarkerRegistry<S::Marker> {
        &self.registry
    }

    pub fn popups(&self) -> &PopupController<S::Popup> {
        &self.popups
    }

    pub fn state(&self) -> &PlacementState<S::Marker> {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn pending_point(&self) -> Option<PendingPoint> {
        match &self.state {
            PlacementState::AwaitingNote { pending, .. } => Some(*pending),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(
            self.state,
            PlacementState::AwaitingNote {
                submitting: Some(_),
                ..
            }
        )
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn report(&mut self, err: &AppError) {
        tracing::warn!("{err}");
        self.status = Some(err.status_message());
    }

    /// Replaces the note collection and redraws every marker.
    pub fn load_notes(&mut self, notes: Vec<Note>) {
        if matches!(self.popups.active_kind(), Some(PopupKind::Note(_))) {
            self.popups.close_active(&mut self.surface);
        }
        self.registry.remove_all(&mut self.surface);
        self.notes = NoteCollection::from_ordered(notes);
        for note in self.notes.iter() {
            self.registry.add(&mut self.surface, &note.id, note.position);
        }
        self.status = (!self.notes.is_empty())
            .then(|| format!("Loaded {} pin(s).", self.notes.len()));
        tracing::info!(count = self.notes.len(), "notes loaded");
    }

    pub fn handle(&mut self, event: WorkflowEvent) {
        tracing::debug!(?event, phase = ?self.phase(), "workflow event");
        match event {
            WorkflowEvent::Click { target, position } => self.click(target, position),
            WorkflowEvent::Cancel => self.transition(Input::Cancel),
            WorkflowEvent::PopupClosed(key) => self.popup_closed(key),
            WorkflowEvent::Located(position) => self.place_at_location(position),
            WorkflowEvent::Hover { id, hovered } => self.hover(&id, hovered),
        }
    }

    /// Routes a map click by what was hit.
    pub fn click(&mut self, target: ClickTarget, position: LngLat) {
        match target {
            ClickTarget::Marker(id) => self.open_or_toggle(&id),
            ClickTarget::Preview => {
                let zoom = self.surface.zoom();
                self.transition(Input::ConfirmPreview { zoom });
            }
            ClickTarget::EmptyMap => self.transition(Input::PlacePreview(position)),
        }
    }

    /// Geolocation entry: drop a preview at the fix and confirm it straight
    /// away, flying in to at least the locate zoom.
    pub fn place_at_location(&mut self, position: LngLat) {
        let zoom = self.surface.zoom().max(self.config.locate_zoom);
        self.transition(Input::PlacePreview(position));
        self.transition(Input::ConfirmPreview { zoom });
        self.status = Some(format!(
            "Centered on your location: {}",
            format_coords(position)
        ));
    }

    /// Swaps a committed marker between its default and hover look.
    pub fn hover(&mut self, id: &NoteId, hovered: bool) {
        let appearance = if hovered {
            MarkerAppearance::Hover
        } else {
            MarkerAppearance::Default
        };
        if let Some(marker) = self.registry.get(id) {
            self.surface.set_marker_appearance(&marker.handle, appearance);
        }
    }

    /// Cancels an open compose. No-op in other states.
    pub fn cancel_compose(&mut self) {
        self.transition(Input::Cancel);
    }

    /// Toggles the note popup of `id`. Any other popup is closed first.
    pub fn open_or_toggle(&mut self, id: &NoteId) {
        let Some(note) = self.notes.get(id) else {
            tracing::debug!(%id, "no note for popup");
            return;
        };
        let Some(position) = self.registry.get(id).map(|marker| marker.position) else {
            tracing::debug!(%id, "no marker for popup");
            return;
        };
        if self.popups.is_note_open(id) {
            self.popups.close_active(&mut self.surface);
            return;
        }

        let content = PopupContent::Note {
            text: note.text.clone(),
            created_at: format_created_at(note.created_at),
        };
        self.close_active();
        self.popups
            .open(&mut self.surface, PopupKind::Note(id.clone()), position, content);
        if self.popups.take_recenter() {
            let zoom = self.surface.zoom();
            self.recenter_below(position, zoom);
        }
    }

    /// Closes whichever popup is open. Closing the compose popup also drops
    /// the pending point and its marker.
    pub fn close_active(&mut self) {
        if let Some(PopupKind::Compose) = self.popups.close_active(&mut self.surface) {
            self.transition(Input::Cancel);
        }
    }

    fn popup_closed(&mut self, key: PopupKey) {
        if let Some(PopupKind::Compose) = self.popups.closed_by_surface(key) {
            self.transition(Input::Cancel);
        }
    }

    /// Validates `text` against the pending point and marks the compose as
    /// submitting. Blank text and double submits leave the state untouched.
    pub fn begin_submit(&mut self, text: &str) -> Result<PendingSubmit, ValidationError> {
        let PlacementState::AwaitingNote {
            pending,
            submitting,
            ..
        } = &mut self.state
        else {
            return Err(ValidationError::NothingPending);
        };
        if submitting.is_some() {
            return Err(ValidationError::SubmitInFlight);
        }
        let draft = NoteDraft::new(text, pending.position)?;
        let ticket = SubmitTicket(self.next_ticket);
        self.next_ticket += 1;
        *submitting = Some(ticket);
        self.popups.set_busy(&mut self.surface, true);
        self.status = None;
        Ok(PendingSubmit { ticket, draft })
    }

    /// Applies a successful create.
    pub fn complete_submit(&mut self, ticket: SubmitTicket, note: Note) {
        self.commit(ticket, note, |_| Ok(()));
    }

    /// Applies a failed create. When its compose is still open it is
    /// re-enabled for another try.
    pub fn fail_submit(&mut self, ticket: SubmitTicket, err: &AppError) {
        if let PlacementState::AwaitingNote { submitting, .. } = &mut self.state
            && *submitting == Some(ticket)
        {
            *submitting = None;
            if self.popups.is_compose_open() {
                self.popups.set_busy(&mut self.surface, false);
            }
        }
        self.report(err);
    }

    /// Submits against the local store: the note is created here, prepended
    /// and persisted. A failed save is reported but not rolled back.
    pub fn submit_local<B: KeyValueBackend>(
        &mut self,
        text: &str,
        store: &LocalNoteStore<B>,
    ) -> Result<NoteId, ValidationError> {
        let PendingSubmit { ticket, draft } = self.begin_submit(text)?;
        let now = now_millis();
        let mut rng = rand::rng();
        let mut id = NoteId::generate(now, &mut rng);
        while self.notes.contains(&id) {
            id = NoteId::generate(now, &mut rng);
        }
        let note = draft.into_note(id.clone(), now);
        self.commit(ticket, note, |notes| store.save(notes));
        Ok(id)
    }

    fn commit<F>(&mut self, ticket: SubmitTicket, note: Note, persist: F)
    where
        F: FnOnce(&[Note]) -> Result<(), StorageError>,
    {
        let id = note.id.clone();
        let position = note.position;

        for evicted in self.notes.prepend(note) {
            self.registry.remove(&mut self.surface, &evicted.id);
        }
        if let Err(err) = persist(self.notes.as_slice()) {
            self.report(&AppError::from(err));
        }

        match std::mem::replace(&mut self.state, PlacementState::Idle) {
            PlacementState::AwaitingNote {
                marker,
                submitting: Some(current),
                ..
            } if current == ticket => {
                self.registry
                    .adopt(&mut self.surface, &id, marker, position);
                if self.popups.is_compose_open() {
                    self.popups.close_active(&mut self.surface);
                }
            }
            // The compose this note came from is gone, possibly replaced by a
            // newer one. Draw the marker and leave the camera and popups to
            // whatever the user does now.
            other => {
                self.state = other;
                self.registry.add(&mut self.surface, &id, position);
                tracing::info!(%id, "note committed after its compose closed");
                return;
            }
        }
        tracing::info!(%id, "note committed");

        let zoom = self.surface.zoom().max(self.config.detail_zoom);
        self.surface.fly_to(CameraTarget {
            center: camera::center_with_marker_below(position, zoom, self.config.marker_offset_px),
            zoom,
        });
        self.popups.suppress_next_recenter();
        self.open_or_toggle(&id);
    }

    fn transition(&mut self, input: Input) {
        let state = std::mem::replace(&mut self.state, PlacementState::Idle);
        let from = state.phase();
        self.state = self.next_state(state, input);
        tracing::debug!(?input, ?from, to = ?self.state.phase(), "placement transition");
    }

    fn next_state(
        &mut self,
        state: PlacementState<S::Marker>,
        input: Input,
    ) -> PlacementState<S::Marker> {
        match (state, input) {
            (PlacementState::Idle, Input::PlacePreview(position)) => self.place_preview(position),
            (PlacementState::PreviewPlaced { preview, .. }, Input::PlacePreview(position)) => {
                self.surface.remove_marker(preview);
                self.place_preview(position)
            }
            (state @ PlacementState::AwaitingNote { .. }, Input::PlacePreview(position)) => {
                let idle = self.next_state(state, Input::Cancel);
                self.next_state(idle, Input::PlacePreview(position))
            }

            (PlacementState::PreviewPlaced { preview, position }, Input::ConfirmPreview { zoom }) => {
                self.surface.remove_marker(preview);
                let marker = self
                    .surface
                    .add_marker(position, MarkerAppearance::Default);
                self.close_note_popup();
                self.popups.open(
                    &mut self.surface,
                    PopupKind::Compose,
                    position,
                    PopupContent::Compose,
                );
                self.recenter_below(position, zoom);
                PlacementState::AwaitingNote {
                    pending: PendingPoint { position },
                    marker,
                    submitting: None,
                }
            }

            (PlacementState::AwaitingNote { marker, .. }, Input::Cancel) => {
                if self.popups.is_compose_open() {
                    self.popups.close_active(&mut self.surface);
                }
                self.surface.remove_marker(marker);
                PlacementState::Idle
            }

            (state, _) => state,
        }
    }

    fn place_preview(&mut self, position: LngLat) -> PlacementState<S::Marker> {
        let preview = self
            .surface
            .add_marker(position, MarkerAppearance::Preview);
        PlacementState::PreviewPlaced { preview, position }
    }

    fn close_note_popup(&mut self) {
        if matches!(self.popups.active_kind(), Some(PopupKind::Note(_))) {
            self.popups.close_active(&mut self.surface);
        }
    }

    /// Flies so that `position` ends up below the visual centre at `zoom`.
    fn recenter_below(&mut self, position: LngLat, zoom: f64) {
        let offset = self.config.marker_offset_px;
        let center = if (zoom - self.surface.zoom()).abs() < f64::EPSILON {
            let point = self.surface.project(position);
            self.surface
                .unproject(ScreenPoint::new(point.x, point.y - offset))
        } else {
            camera::center_with_marker_below(position, zoom, offset)
        };
        self.surface.fly_to(CameraTarget { center, zoom });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use crate::testing::{FakeMarker, RecordingSurface};
    use proptest::prelude::*;

    type TestSession = Session<RecordingSurface>;

    const SPOT: LngLat = LngLat::new(13.40, 52.52);

    fn session() -> TestSession {
        Session::new(RecordingSurface::new(), WorkflowConfig::default())
    }

    fn store() -> LocalNoteStore<MemoryBackend> {
        LocalNoteStore::new(MemoryBackend::new())
    }

    fn click_empty(session: &mut TestSession, position: LngLat) {
        session.handle(WorkflowEvent::Click {
            target: ClickTarget::EmptyMap,
            position,
        });
    }

    fn click_preview(session: &mut TestSession) {
        session.handle(WorkflowEvent::Click {
            target: ClickTarget::Preview,
            position: SPOT,
        });
    }

    fn click_marker(session: &mut TestSession, id: &NoteId) {
        session.handle(WorkflowEvent::Click {
            target: ClickTarget::Marker(id.clone()),
            position: SPOT,
        });
    }

    fn compose_at(session: &mut TestSession, position: LngLat) {
        click_empty(session, position);
        click_preview(session);
    }

    /// The engine drops the active popup and then reports it.
    fn surface_closes_popup(session: &mut TestSession) {
        if let Some(key) = session.popups().active_key() {
            session.surface_mut().engine_close(key);
            session.handle(WorkflowEvent::PopupClosed(key));
        }
    }

    fn drawn_position(session: &TestSession, id: &NoteId) -> Option<LngLat> {
        let handle = session.registry().get(id)?.handle;
        session.surface().marker(handle).map(|m| m.position)
    }

    fn note_text_of_open_popup(session: &TestSession) -> Option<String> {
        match &session.surface().open_popups().first()?.content {
            PopupContent::Note { text, .. } => Some(text.clone()),
            PopupContent::Compose => None,
        }
    }

    fn seeded(ids: &[&str]) -> TestSession {
        let mut session = session();
        let notes = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                Note::new(
                    (*id).into(),
                    &format!("note {id}"),
                    LngLat::new(13.0 + i as f64 / 100.0, 52.5),
                    i as i64,
                )
                .unwrap()
            })
            .collect();
        session.load_notes(notes);
        session
    }

    #[test]
    fn test_click_empty_places_preview() {
        let mut session = session();
        click_empty(&mut session, SPOT);

        assert_eq!(session.phase(), Phase::PreviewPlaced);
        let previews = session.surface().markers_with(MarkerAppearance::Preview);
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].position, SPOT);
    }

    #[test]
    fn test_click_empty_again_moves_preview() {
        let mut session = session();
        click_empty(&mut session, SPOT);
        click_empty(&mut session, LngLat::new(13.5, 52.6));

        let previews = session.surface().markers_with(MarkerAppearance::Preview);
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].position, LngLat::new(13.5, 52.6));
    }

    #[test]
    fn test_confirm_preview_opens_compose() {
        let mut session = session();
        compose_at(&mut session, SPOT);

        assert_eq!(session.phase(), Phase::AwaitingNote);
        assert_eq!(session.pending_point(), Some(PendingPoint { position: SPOT }));
        assert!(session.surface().markers_with(MarkerAppearance::Preview).is_empty());

        let pending = session.surface().untagged_markers();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].position, SPOT);

        let popups = session.surface().open_popups();
        assert_eq!(popups.len(), 1);
        assert_eq!(popups[0].content, PopupContent::Compose);
        assert_eq!(popups[0].anchor, SPOT);

        // marker sits below the new visual centre
        let flight = session.surface().last_flight().unwrap();
        assert!(flight.center.lat > SPOT.lat);
        let on_screen = session.surface().viewport.project(SPOT);
        assert!((on_screen.y - (300.0 + camera::MARKER_OFFSET_BELOW_CENTER)).abs() < 1e-6);
    }

    #[test]
    fn test_submit_great_spot() {
        let mut session = session();
        let store = store();
        compose_at(&mut session, SPOT);

        let id = session.submit_local("  Great spot ", &store).unwrap();

        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.pending_point(), None);

        let note = session.notes().get(&id).unwrap();
        assert_eq!(note.text, "Great spot");
        assert_eq!(note.position, SPOT);

        let stored = store.load();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);

        // pending marker promoted, not duplicated
        assert_eq!(session.surface().live_markers().len(), 1);
        let handle = session.registry().get(&id).unwrap().handle;
        assert_eq!(session.surface().marker_tag(handle), Some(id.clone()));

        let flight = session.surface().last_flight().unwrap();
        assert!(flight.zoom >= 14.0);

        assert_eq!(session.surface().open_popups().len(), 1);
        assert_eq!(note_text_of_open_popup(&session).as_deref(), Some("Great spot"));
        assert!(session.popups().is_note_open(&id));
        assert!(session.surface().max_open_popups() <= 1);
    }

    #[test]
    fn test_commit_never_zooms_out() {
        let mut session = session();
        session.surface_mut().viewport.zoom = 17.0;
        compose_at(&mut session, SPOT);
        session.submit_local("deep", &store()).unwrap();
        assert!((session.surface().last_flight().unwrap().zoom - 17.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_commit_does_not_recenter_twice() {
        let mut session = session();
        compose_at(&mut session, SPOT);
        let before = session.surface().flights.len();
        session.submit_local("once", &store()).unwrap();
        assert_eq!(session.surface().flights.len(), before + 1);
    }

    #[test]
    fn test_blank_submit_is_noop() {
        let mut session = session();
        let store = store();
        compose_at(&mut session, SPOT);

        assert_eq!(
            session.submit_local("   \n", &store),
            Err(ValidationError::EmptyText)
        );
        assert_eq!(session.phase(), Phase::AwaitingNote);
        assert!(session.notes().is_empty());
        assert!(store.load().is_empty());
        assert!(!session.is_submitting());
    }

    #[test]
    fn test_submit_without_pending_point() {
        let mut session = session();
        assert_eq!(
            session.begin_submit("hello"),
            Err(ValidationError::NothingPending)
        );
    }

    #[test]
    fn test_cancel_discards_pending() {
        let mut session = session();
        compose_at(&mut session, SPOT);
        session.handle(WorkflowEvent::Cancel);

        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.surface().live_markers().is_empty());
        assert!(session.surface().open_popups().is_empty());
        assert!(session.notes().is_empty());
    }

    #[test]
    fn test_compose_closed_by_surface_cancels() {
        let mut session = session();
        compose_at(&mut session, SPOT);
        surface_closes_popup(&mut session);

        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.surface().live_markers().is_empty());
        assert!(session.surface().open_popups().is_empty());
        assert_eq!(session.popups().active_kind(), None);
    }

    #[test]
    fn test_located_after_surface_close_keeps_one_popup() {
        let mut session = session();
        let origin = LngLat::new(0.0, 0.0);
        session.handle(WorkflowEvent::Located(origin));
        surface_closes_popup(&mut session);
        session.handle(WorkflowEvent::Located(origin));

        assert_eq!(session.surface().open_popups().len(), 1);
        assert!(session.popups().is_compose_open());
    }

    #[test]
    fn test_click_empty_while_composing_moves_to_preview() {
        let mut session = session();
        compose_at(&mut session, SPOT);
        click_empty(&mut session, LngLat::new(13.1, 52.4));

        assert_eq!(session.phase(), Phase::PreviewPlaced);
        assert!(session.surface().open_popups().is_empty());
        assert!(session.surface().untagged_markers().is_empty());
        assert_eq!(session.surface().live_markers().len(), 1);
    }

    #[test]
    fn test_open_or_toggle_twice_closes() {
        let mut session = seeded(&["1-a"]);
        let a = NoteId::from("1-a");

        session.open_or_toggle(&a);
        assert!(session.popups().is_note_open(&a));
        session.open_or_toggle(&a);
        assert_eq!(session.popups().active_kind(), None);
        assert!(session.surface().open_popups().is_empty());
    }

    #[test]
    fn test_marker_b_closes_popup_a_first() {
        let mut session = seeded(&["1-a", "2-b"]);
        let a = NoteId::from("1-a");
        let b = NoteId::from("2-b");

        click_marker(&mut session, &a);
        click_marker(&mut session, &b);

        assert!(session.popups().is_note_open(&b));
        assert_eq!(note_text_of_open_popup(&session).as_deref(), Some("note 2-b"));
        assert_eq!(session.surface().open_popups().len(), 1);
        assert_eq!(session.surface().max_open_popups(), 1);
    }

    #[test]
    fn test_marker_click_keeps_preview() {
        let mut session = seeded(&["1-a"]);
        click_empty(&mut session, SPOT);
        click_marker(&mut session, &NoteId::from("1-a"));

        assert_eq!(session.phase(), Phase::PreviewPlaced);
        assert_eq!(session.surface().markers_with(MarkerAppearance::Preview).len(), 1);
    }

    #[test]
    fn test_marker_click_while_composing_cancels_compose() {
        let mut session = seeded(&["1-a"]);
        compose_at(&mut session, SPOT);
        click_marker(&mut session, &NoteId::from("1-a"));

        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.popups().is_note_open(&NoteId::from("1-a")));
        assert!(session.surface().untagged_markers().is_empty());
    }

    #[test]
    fn test_unknown_marker_is_ignored() {
        let mut session = seeded(&["1-a"]);
        click_marker(&mut session, &NoteId::from("nope"));
        assert_eq!(session.popups().active_kind(), None);
    }

    #[test]
    fn test_located_opens_compose_at_fix() {
        let mut session = session();
        let here = LngLat::new(2.35, 48.85);
        session.handle(WorkflowEvent::Located(here));

        assert_eq!(session.phase(), Phase::AwaitingNote);
        assert_eq!(session.pending_point().map(|p| p.position), Some(here));
        assert!(session.popups().is_compose_open());
        assert!(session.surface().markers_with(MarkerAppearance::Preview).is_empty());
        assert!(session.surface().last_flight().unwrap().zoom >= 15.0);
        assert_eq!(
            session.status(),
            Some("Centered on your location: 48.85000, 2.35000")
        );
    }

    #[test]
    fn test_remote_submit_two_phase() {
        let mut session = session();
        compose_at(&mut session, SPOT);

        let submit = session.begin_submit("Remote").unwrap();
        assert!(session.is_submitting());
        assert!(session.surface().open_popups()[0].busy);
        assert_eq!(
            session.begin_submit("Remote"),
            Err(ValidationError::SubmitInFlight)
        );
        // nothing prepended before the server answers
        assert!(session.notes().is_empty());

        let note = submit
            .draft
            .into_note("1700000000000-abcd".into(), 1_700_000_000_000);
        session.complete_submit(submit.ticket, note);
        assert_eq!(session.notes().len(), 1);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.surface().live_markers().len(), 1);
    }

    #[test]
    fn test_remote_failure_keeps_compose() {
        let mut session = session();
        compose_at(&mut session, SPOT);
        let submit = session.begin_submit("Remote").unwrap();

        session.fail_submit(
            submit.ticket,
            &AppError::from(StorageError::Request("offline".into())),
        );

        assert_eq!(session.phase(), Phase::AwaitingNote);
        assert!(!session.is_submitting());
        assert!(!session.surface().open_popups()[0].busy);
        assert_eq!(session.status(), Some("Request failed: offline"));
        assert!(session.notes().is_empty());
    }

    #[test]
    fn test_remote_completion_after_cancel_adds_fresh_marker() {
        let mut session = session();
        compose_at(&mut session, SPOT);
        let submit = session.begin_submit("late").unwrap();
        session.handle(WorkflowEvent::Cancel);
        assert!(session.surface().live_markers().is_empty());

        click_empty(&mut session, LngLat::new(1.0, 1.0));
        click_preview(&mut session);

        session.complete_submit(submit.ticket, submit.draft.into_note("5-late".into(), 5));
        assert!(session.registry().contains(&NoteId::from("5-late")));
        assert_eq!(drawn_position(&session, &NoteId::from("5-late")), Some(SPOT));
        // the newer compose is left alone
        assert_eq!(session.phase(), Phase::AwaitingNote);
        assert!(session.popups().is_compose_open());
        assert_eq!(session.surface().live_markers().len(), 2);
    }

    #[test]
    fn test_overlapping_remote_submits_land_on_their_own_coordinates() {
        let paris = LngLat::new(2.35, 48.85);
        let mut session = session();

        compose_at(&mut session, SPOT);
        let first = session.begin_submit("A").unwrap();
        // the user moves on while A is in flight
        click_empty(&mut session, paris);
        click_preview(&mut session);
        let second = session.begin_submit("B").unwrap();
        assert_ne!(first.ticket, second.ticket);

        let a = NoteId::from("1-a");
        session.complete_submit(first.ticket, first.draft.into_note(a.clone(), 1));

        assert_eq!(drawn_position(&session, &a), Some(SPOT));
        // B is still composing and still busy
        assert_eq!(session.phase(), Phase::AwaitingNote);
        assert_eq!(session.pending_point().map(|p| p.position), Some(paris));
        assert!(session.is_submitting());
        assert!(session.popups().is_compose_open());

        let b = NoteId::from("2-b");
        session.complete_submit(second.ticket, second.draft.into_note(b.clone(), 2));

        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(drawn_position(&session, &b), Some(paris));
        assert_eq!(drawn_position(&session, &a), Some(SPOT));
        assert_eq!(session.surface().live_markers().len(), 2);
        assert!(session.popups().is_note_open(&b));
    }

    #[test]
    fn test_stale_failure_does_not_release_newer_submit() {
        let mut session = session();
        compose_at(&mut session, SPOT);
        let first = session.begin_submit("A").unwrap();
        session.handle(WorkflowEvent::Cancel);
        compose_at(&mut session, LngLat::new(1.0, 1.0));
        session.begin_submit("B").unwrap();

        session.fail_submit(
            first.ticket,
            &AppError::from(StorageError::Request("offline".into())),
        );

        assert!(session.is_submitting());
        assert!(session.surface().open_popups()[0].busy);
        assert_eq!(session.status(), Some("Request failed: offline"));
    }

    #[test]
    fn test_hover_swaps_committed_marker_appearance() {
        let mut session = seeded(&["1-a"]);
        let a = NoteId::from("1-a");
        let handle = session.registry().get(&a).unwrap().handle;

        session.handle(WorkflowEvent::Hover {
            id: a.clone(),
            hovered: true,
        });
        assert_eq!(
            session.surface().marker(handle).map(|m| m.appearance),
            Some(MarkerAppearance::Hover)
        );

        session.handle(WorkflowEvent::Hover {
            id: a,
            hovered: false,
        });
        assert_eq!(
            session.surface().marker(handle).map(|m| m.appearance),
            Some(MarkerAppearance::Default)
        );

        // unknown ids are ignored
        session.hover(&NoteId::from("nope"), true);
    }

    #[test]
    fn test_local_save_failure_is_reported_not_rolled_back() {
        struct Full;
        impl KeyValueBackend for Full {
            fn get_item(&self, _: &str) -> Result<Option<String>, StorageError> {
                Ok(None)
            }
            fn set_item(&self, _: &str, _: &str) -> Result<(), StorageError> {
                Err(StorageError::Write("quota exceeded".into()))
            }
        }

        let mut session = session();
        compose_at(&mut session, SPOT);
        session.submit_local("kept", &LocalNoteStore::new(Full)).unwrap();

        assert_eq!(session.notes().len(), 1);
        assert_eq!(session.status(), Some("Could not save notes: quota exceeded"));
    }

    #[test]
    fn test_load_notes_replaces_markers() {
        let mut session = seeded(&["1-a", "2-b"]);
        assert_eq!(session.status(), Some("Loaded 2 pin(s)."));
        session.load_notes(Vec::new());
        assert!(session.surface().live_markers().is_empty());
        assert_eq!(session.status(), None);
    }

    #[derive(Debug, Clone)]
    enum Op {
        ClickEmpty(f64, f64),
        ClickPreview,
        ClickMarker(usize),
        Submit(String),
        Cancel,
        SurfaceClosesPopup,
        Located(f64, f64),
        BeginRemote(String),
        FinishRemote(usize, bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-180.0..180.0f64, -85.0..85.0f64).prop_map(|(x, y)| Op::ClickEmpty(x, y)),
            Just(Op::ClickPreview),
            (0usize..8).prop_map(Op::ClickMarker),
            "[ a-z]{0,6}".prop_map(Op::Submit),
            Just(Op::Cancel),
            Just(Op::SurfaceClosesPopup),
            (-180.0..180.0f64, -85.0..85.0f64).prop_map(|(x, y)| Op::Located(x, y)),
            "[ a-z]{0,6}".prop_map(Op::BeginRemote),
            (0usize..4, any::<bool>()).prop_map(|(i, ok)| Op::FinishRemote(i, ok)),
        ]
    }

    fn check_invariants(session: &TestSession) {
        let surface = session.surface();
        assert!(surface.markers_with(MarkerAppearance::Preview).len() <= 1);
        assert!(surface.untagged_markers().len() <= 1);
        assert!(surface.open_popups().len() <= 1);
        assert!(surface.max_open_popups() <= 1);

        let awaiting = session.phase() == Phase::AwaitingNote;
        assert_eq!(session.popups().is_compose_open(), awaiting);
        assert_eq!(surface.untagged_markers().len() == 1, awaiting);
        assert_eq!(
            surface.markers_with(MarkerAppearance::Preview).len() == 1,
            session.phase() == Phase::PreviewPlaced
        );

        let mut ids: Vec<_> = session.notes().iter().map(|n| n.id.clone()).collect();
        assert!(session.notes().iter().all(|n| !n.text.trim().is_empty()));
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), session.notes().len());
        assert_eq!(session.registry().len(), session.notes().len());
        for note in session.notes().iter() {
            assert_eq!(drawn_position(session, &note.id), Some(note.position));
        }
    }

    proptest! {
        #[test]
        fn prop_click_sequences_keep_invariants(ops in prop::collection::vec(op(), 1..40)) {
            let store = store();
            let mut session = session();
            let mut in_flight: Vec<PendingSubmit> = Vec::new();
            let mut remote_seq = 0;

            for op in ops {
                match op {
                    Op::ClickEmpty(lng, lat) => click_empty(&mut session, LngLat::new(lng, lat)),
                    Op::ClickPreview => click_preview(&mut session),
                    Op::ClickMarker(i) => {
                        let id = session.notes().iter().nth(i).map(|n| n.id.clone());
                        if let Some(id) = id {
                            click_marker(&mut session, &id);
                        }
                    }
                    Op::Submit(text) => {
                        let _ = session.submit_local(&text, &store);
                    }
                    Op::Cancel => session.handle(WorkflowEvent::Cancel),
                    Op::SurfaceClosesPopup => surface_closes_popup(&mut session),
                    Op::Located(lng, lat) => session.handle(WorkflowEvent::Located(LngLat::new(lng, lat))),
                    Op::BeginRemote(text) => {
                        if let Ok(submit) = session.begin_submit(&text) {
                            in_flight.push(submit);
                        }
                    }
                    Op::FinishRemote(i, ok) => {
                        if !in_flight.is_empty() {
                            let PendingSubmit { ticket, draft } = in_flight.remove(i % in_flight.len());
                            if ok {
                                remote_seq += 1;
                                let id = NoteId::from(format!("{remote_seq}-remote"));
                                session.complete_submit(ticket, draft.into_note(id, remote_seq));
                            } else {
                                session.fail_submit(ticket, &AppError::from(StorageError::Request("down".into())));
                            }
                        }
                    }
                }
                check_invariants(&session);
            }
        }
    }

    #[test]
    fn test_fake_marker_handles_are_distinct() {
        let mut surface = RecordingSurface::new();
        let a: FakeMarker = surface.add_marker(SPOT, MarkerAppearance::Default);
        let b = surface.add_marker(SPOT, MarkerAppearance::Default);
        assert_ne!(a, b);
    }
}
