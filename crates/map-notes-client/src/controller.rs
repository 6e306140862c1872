//! Glue between the Yew UI, the map surface and the workflow session.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use map_notes_core::{
    AppError, Session, ValidationError, WorkflowEvent,
    geolocation::{LOCATING_STATUS, RETRYING_STATUS},
    wire::CreateNoteRequest,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlElement;
use yew::Callback;

use crate::config::ClientConfig;
use crate::geolocation;
use crate::map::{MapLibreSurface, SurfaceEvent};
use crate::storage::NoteBackend;

/// UI state sinks.
pub struct UiCallbacks {
    pub on_status: Callback<Option<String>>,
    /// The map and notes are ready; locating is possible.
    pub on_ready: Callback<bool>,
    pub on_locating: Callback<bool>,
}

pub struct Controller {
    session: RefCell<Option<Session<MapLibreSurface>>>,
    backend: Rc<NoteBackend>,
    ui: UiCallbacks,
}

impl Controller {
    pub fn new(backend: NoteBackend, ui: UiCallbacks) -> Self {
        Self {
            session: RefCell::new(None),
            backend: Rc::new(backend),
            ui,
        }
    }

    /// Creates the map in `container` and the session around it. When the
    /// environment cannot run the map, the reason is shown and no session
    /// exists.
    pub fn mount(self: &Rc<Self>, container: &HtmlElement, config: &ClientConfig) {
        if self.session.borrow().is_some() {
            return;
        }

        let events = {
            let this = Rc::downgrade(self);
            Callback::from(move |event: SurfaceEvent| {
                let this: Weak<Self> = this.clone();
                spawn_local(async move {
                    if let Some(this) = this.upgrade() {
                        this.handle(event);
                    }
                });
            })
        };

        match MapLibreSurface::create(container, config, events) {
            Ok(surface) => {
                *self.session.borrow_mut() = Some(Session::new(surface, config.workflow));
                self.ui.on_status.emit(Some("Loading map…".to_string()));
            }
            Err(err) => {
                let err = AppError::from(err);
                tracing::error!("{err}");
                self.ui.on_status.emit(Some(err.status_message()));
            }
        }
    }

    /// Runs `f` on the session and publishes the resulting status.
    fn update<R>(&self, f: impl FnOnce(&mut Session<MapLibreSurface>) -> R) -> Option<R> {
        let (result, status) = {
            let mut session = self.session.borrow_mut();
            let session = session.as_mut()?;
            let result = f(session);
            (result, session.status().map(str::to_owned))
        };
        self.ui.on_status.emit(status);
        Some(result)
    }

    fn handle(self: &Rc<Self>, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Workflow(event) => {
                self.update(|session| session.handle(event));
            }
            SurfaceEvent::Submit(text) => self.submit(&text),
            SurfaceEvent::Loaded => spawn_local(Rc::clone(self).load_notes()),
            SurfaceEvent::MapError(message) => {
                self.update(|session| session.set_status(format!("Map error: {message}")));
            }
        }
    }

    async fn load_notes(self: Rc<Self>) {
        let backend = Rc::clone(&self.backend);
        match backend.load().await {
            Ok(notes) => {
                self.update(|session| session.load_notes(notes));
            }
            Err(err) => {
                self.update(|session| session.report(&AppError::from(err)));
            }
        }
        self.ui.on_ready.emit(true);
    }

    fn submit(self: &Rc<Self>, text: &str) {
        match self.backend.as_ref() {
            NoteBackend::Local(store) => {
                match self.update(|session| session.submit_local(text, store)) {
                    Some(Ok(id)) => {
                        tracing::debug!(%id, "note saved locally");
                        blur_active_element();
                    }
                    Some(Err(err)) => self.reject(err),
                    None => {}
                }
            }
            NoteBackend::Remote(remote) => {
                let pending = match self.update(|session| session.begin_submit(text)) {
                    Some(Ok(pending)) => pending,
                    Some(Err(err)) => return self.reject(err),
                    None => return,
                };
                let this = Rc::clone(self);
                let remote = remote.clone();
                spawn_local(async move {
                    let result = remote.create(&CreateNoteRequest::from(&pending.draft)).await;
                    this.update(|session| match result {
                        Ok(note) => session.complete_submit(pending.ticket, note),
                        Err(err) => session.fail_submit(pending.ticket, &err),
                    });
                    blur_active_element();
                });
            }
        }
    }

    /// Blank text is dropped silently; the form keeps its focus.
    fn reject(&self, err: ValidationError) {
        if err != ValidationError::EmptyText {
            self.update(|session| session.report(&AppError::from(err)));
        }
    }

    pub fn locate(self: &Rc<Self>) {
        if self.session.borrow().is_none() {
            self.ui.on_status.emit(Some("Map is not ready yet.".to_string()));
            return;
        }
        self.ui.on_locating.emit(true);
        self.update(|session| session.set_status(LOCATING_STATUS));

        let this = Rc::clone(self);
        spawn_local(async move {
            let result = geolocation::locate(|| {
                this.update(|session| session.set_status(RETRYING_STATUS));
            })
            .await;
            match result {
                Ok(position) => {
                    this.update(|session| session.handle(WorkflowEvent::Located(position)));
                }
                Err(err) => {
                    this.update(|session| session.report(&AppError::from(err)));
                }
            }
            this.ui.on_locating.emit(false);
        });
    }

    /// Escape: drop an open compose.
    pub fn escape(&self) {
        self.update(Session::cancel_compose);
    }
}

fn blur_active_element() {
    if let Some(active) = gloo::utils::document().active_element() {
        if let Ok(active) = active.dyn_into::<HtmlElement>() {
            let _ = active.blur();
        }
    }
}
