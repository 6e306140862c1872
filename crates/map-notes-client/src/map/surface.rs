//! MapLibre GL implementation of [`MapSurface`].
//!
//! Engine callbacks never touch the session directly. They are turned into
//! [`SurfaceEvent`]s and emitted on a callback that defers delivery, so the
//! session is never re-entered while it is already borrowed.

use gloo::events::{EventListener, EventListenerOptions};
use gloo::timers::callback::Timeout;
use map_notes_core::{
    ClickTarget, EnvironmentError, LngLat, MapSurface, MarkerAppearance, NoteId, PopupContent,
    PopupKey, WorkflowEvent,
    camera::{CameraTarget, GAP_ABOVE_MARKER, ScreenPoint},
};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue, prelude::Closure};
use web_sys::{Element, HtmlButtonElement, HtmlElement, HtmlTextAreaElement};
use yew::Callback;

use super::maplibre::{
    JsAttributionControl, JsErrorEvent, JsMap, JsMapMouseEvent, JsMarker, JsNavigationControl,
    JsPopup,
};
use crate::config::ClientConfig;
use crate::util::{js_error_message, js_object, lng_lat_array};

const MARKER_ATTR: &str = "data-marker";
const PREVIEW_ATTR: &str = "data-preview-marker";
const NOTE_ID_ATTR: &str = "data-note-id";
const APPEARANCE_ATTR: &str = "data-appearance";

const PIN_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10.24 20.23"><polygon points="5.1 17.95 8.63 10.13 8.63 8.12 5.1 8.12 8.63 5.37 9.61 1.83 2.38 .57 1.85 2.13 7.12 3.13 6.6 4.76 .5 6.57 .5 9.26 5.05 11.13 5.1 17.95"/></svg>"#;

/// Extra clickable strip below a preview pin, in pixels.
const PREVIEW_HITBOX_EXTRA: u32 = 12;

/// Everything the map reports back to the app.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Workflow(WorkflowEvent),
    /// The compose form was submitted with this raw text.
    Submit(String),
    /// The style finished loading; notes can be drawn.
    Loaded,
    MapError(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FlyToOptions {
    center: [f64; 2],
    zoom: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PopupOptions {
    anchor: &'static str,
    offset: [f64; 2],
    close_button: bool,
    close_on_click: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NavigationOptions {
    show_compass: bool,
    visualize_pitch: bool,
}

#[derive(Serialize)]
struct AttributionOptions {
    compact: bool,
}

fn to_js<T: Serialize>(options: &T) -> JsValue {
    serde_wasm_bindgen::to_value(options).unwrap_or_else(|err| {
        tracing::warn!("failed to encode map options: {err}");
        JsValue::UNDEFINED
    })
}

pub struct MapLibreSurface {
    map: JsMap,
    events: Callback<SurfaceEvent>,
    _click: Closure<dyn FnMut(JsMapMouseEvent)>,
    _load: Closure<dyn FnMut()>,
    _error: Closure<dyn FnMut(JsErrorEvent)>,
    _resize: EventListener,
    _orientation: EventListener,
}

pub struct MapLibreMarker {
    marker: JsMarker,
    element: HtmlElement,
    _hover: Option<(EventListener, EventListener)>,
}

pub struct MapLibrePopup {
    popup: JsPopup,
    on_close: Closure<dyn FnMut()>,
    submit_button: Option<HtmlButtonElement>,
    _listeners: Vec<EventListener>,
}

impl MapLibreSurface {
    /// Creates the map inside `container`. `events` must defer delivery.
    pub fn create(
        container: &HtmlElement,
        config: &ClientConfig,
        events: Callback<SurfaceEvent>,
    ) -> Result<Self, EnvironmentError> {
        super::environment::check()?;

        let options = js_object(&[
            ("container", container.clone().into()),
            ("style", config.style_url.as_str().into()),
            ("center", lng_lat_array(config.center).into()),
            ("zoom", config.zoom.into()),
            ("attributionControl", false.into()),
        ]);
        let map = JsMap::new(&options)
            .map_err(|err| EnvironmentError::MapInit(js_error_message(&err)))?;

        map.add_control(
            &JsAttributionControl::new(&to_js(&AttributionOptions { compact: true })),
            "bottom-left",
        );
        map.add_control(
            &JsNavigationControl::new(&to_js(&NavigationOptions {
                show_compass: false,
                visualize_pitch: false,
            })),
            "bottom-right",
        );

        let click = {
            let events = events.clone();
            Closure::<dyn FnMut(JsMapMouseEvent)>::new(move |event: JsMapMouseEvent| {
                let lng_lat = event.lng_lat();
                let position = LngLat::new(lng_lat.lng(), lng_lat.lat());
                if let Some(target) = classify_click(event.original_event()) {
                    events.emit(SurfaceEvent::Workflow(WorkflowEvent::Click { target, position }));
                }
            })
        };
        map.on("click", click.as_ref().unchecked_ref());

        let load = {
            let events = events.clone();
            let map = map.clone();
            Closure::<dyn FnMut()>::new(move || {
                resize_when_idle(&map);
                events.emit(SurfaceEvent::Loaded);
            })
        };
        map.once("load", load.as_ref().unchecked_ref());

        let error = {
            let events = events.clone();
            Closure::<dyn FnMut(JsErrorEvent)>::new(move |event: JsErrorEvent| {
                let message = js_sys::Reflect::get(&event.error(), &JsValue::from_str("message"))
                    .ok()
                    .and_then(|message| message.as_string());
                if let Some(message) = message {
                    tracing::error!("map error: {message}");
                    events.emit(SurfaceEvent::MapError(message));
                }
            })
        };
        map.on("error", error.as_ref().unchecked_ref());

        let window = gloo::utils::window();
        let resize = {
            let map = map.clone();
            EventListener::new(&window, "resize", move |_| resize_when_idle(&map))
        };
        let orientation = {
            let map = map.clone();
            EventListener::new(&window, "orientationchange", move |_| {
                let map = map.clone();
                Timeout::new(100, move || resize_when_idle(&map)).forget();
            })
        };

        Ok(Self {
            map,
            events,
            _click: click,
            _load: load,
            _error: error,
            _resize: resize,
            _orientation: orientation,
        })
    }
}

/// Resizes now, or once the current camera animation ends.
fn resize_when_idle(map: &JsMap) {
    if map.is_moving() {
        let deferred = map.clone();
        let on_end = Closure::once_into_js(move || deferred.resize());
        map.once("moveend", on_end.unchecked_ref());
    } else {
        map.resize();
    }
}

/// Decides what a map click hit from the DOM element under the pointer.
/// `None` means the click is ignored (a pin that has no note yet).
fn classify_click(event: Option<web_sys::Event>) -> Option<ClickTarget> {
    let element = event
        .and_then(|event| event.target())
        .and_then(|target| target.dyn_into::<Element>().ok());
    let Some(element) = element else {
        return Some(ClickTarget::EmptyMap);
    };

    if closest(&element, PREVIEW_ATTR).is_some() {
        return Some(ClickTarget::Preview);
    }
    if let Some(marker) = closest(&element, MARKER_ATTR) {
        return marker
            .get_attribute(NOTE_ID_ATTR)
            .map(|id| ClickTarget::Marker(NoteId::from(id)));
    }
    Some(ClickTarget::EmptyMap)
}

fn closest(element: &Element, flag: &str) -> Option<Element> {
    element.closest(&format!("[{flag}=\"true\"]")).ok().flatten()
}

fn create<T: JsCast>(tag: &str) -> Result<T, JsValue> {
    gloo::utils::document()
        .create_element(tag)?
        .dyn_into::<T>()
        .map_err(JsValue::from)
}

fn pin_element(appearance: MarkerAppearance) -> Result<HtmlElement, JsValue> {
    let element: HtmlElement = create("div")?;
    element.set_class_name("pin");

    let base: HtmlElement = create("div")?;
    base.set_class_name("pin__layer pin__layer--base");
    base.set_inner_html(PIN_SVG);
    element.append_child(&base)?;

    if appearance == MarkerAppearance::Preview {
        let hitbox: HtmlElement = create("div")?;
        hitbox.set_class_name("pin__hitbox");
        hitbox.set_attribute(PREVIEW_ATTR, "true")?;
        hitbox
            .style()
            .set_property("height", &format!("{PREVIEW_HITBOX_EXTRA}px"))?;
        element.append_child(&hitbox)?;
    } else {
        let hover: HtmlElement = create("div")?;
        hover.set_class_name("pin__layer pin__layer--hover");
        hover.set_inner_html(PIN_SVG);
        element.append_child(&hover)?;
    }
    Ok(element)
}

fn apply_appearance(element: &HtmlElement, appearance: MarkerAppearance) {
    let (value, preview) = match appearance {
        MarkerAppearance::Default => ("default", false),
        MarkerAppearance::Hover => ("hover", false),
        MarkerAppearance::Preview => ("preview", true),
    };
    let _ = element.set_attribute(APPEARANCE_ATTR, value);
    if preview {
        let _ = element.remove_attribute(MARKER_ATTR);
        let _ = element.set_attribute(PREVIEW_ATTR, "true");
    } else {
        let _ = element.remove_attribute(PREVIEW_ATTR);
        let _ = element.set_attribute(MARKER_ATTR, "true");
    }
}

/// Hover is reported to the session, which owns marker appearance. Markers
/// without a note id yet have no hover look.
fn hover_listeners(
    element: &HtmlElement,
    events: &Callback<SurfaceEvent>,
) -> (EventListener, EventListener) {
    let listener = |kind: &'static str, hovered: bool| {
        let target = element.clone();
        let events = events.clone();
        EventListener::new(element, kind, move |_| {
            if let Some(id) = target.get_attribute(NOTE_ID_ATTR) {
                events.emit(SurfaceEvent::Workflow(WorkflowEvent::Hover {
                    id: NoteId::from(id),
                    hovered,
                }));
            }
        })
    };
    (listener("mouseenter", true), listener("mouseleave", false))
}

struct PopupBody {
    root: HtmlElement,
    submit_button: Option<HtmlButtonElement>,
    listeners: Vec<EventListener>,
}

fn note_body(text: &str, created_at: Option<&str>) -> Result<PopupBody, JsValue> {
    let root: HtmlElement = create("div")?;
    root.set_class_name("notePopup");

    let paragraph: HtmlElement = create("p")?;
    paragraph.set_class_name("notePopup__text");
    paragraph.set_text_content(Some(text));
    root.append_child(&paragraph)?;

    if let Some(created_at) = created_at {
        let date: HtmlElement = create("time")?;
        date.set_class_name("notePopup__date");
        date.set_text_content(Some(created_at));
        root.append_child(&date)?;
    }

    Ok(PopupBody {
        root,
        submit_button: None,
        listeners: Vec::new(),
    })
}

fn compose_body(events: &Callback<SurfaceEvent>) -> Result<PopupBody, JsValue> {
    let form: HtmlElement = create("form")?;
    form.set_class_name("addNotePopupForm");

    let textarea: HtmlTextAreaElement = create("textarea")?;
    textarea.set_name("note");
    textarea.set_rows(5);
    textarea.set_required(true);
    form.append_child(&textarea)?;

    let button: HtmlButtonElement = create("button")?;
    button.set_type("submit");
    button.set_text_content(Some("+"));
    form.append_child(&button)?;

    // Clicks inside the form must not reach the map, or closeOnClick would
    // close the popup before the submit lands.
    let click = EventListener::new(&form, "click", |event| event.stop_propagation());

    let submit = {
        let events = events.clone();
        let textarea = textarea.clone();
        EventListener::new_with_options(
            &form,
            "submit",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                event.prevent_default();
                events.emit(SurfaceEvent::Submit(textarea.value()));
            },
        )
    };

    Timeout::new(0, move || {
        textarea.set_value("");
        let _ = textarea.focus();
        let _ = textarea.set_selection_range(0, 0);
    })
    .forget();

    Ok(PopupBody {
        root: form,
        submit_button: Some(button),
        listeners: vec![click, submit],
    })
}

impl MapSurface for MapLibreSurface {
    type Marker = MapLibreMarker;
    type Popup = MapLibrePopup;

    fn zoom(&self) -> f64 {
        self.map.get_zoom()
    }

    fn project(&self, position: LngLat) -> ScreenPoint {
        let point = self.map.project(&lng_lat_array(position));
        ScreenPoint::new(point.x(), point.y())
    }

    fn unproject(&self, point: ScreenPoint) -> LngLat {
        let lng_lat = self
            .map
            .unproject(&js_sys::Array::of2(&point.x.into(), &point.y.into()));
        LngLat::new(lng_lat.lng(), lng_lat.lat())
    }

    fn fly_to(&mut self, target: CameraTarget) {
        self.map.fly_to(&to_js(&FlyToOptions {
            center: [target.center.lng, target.center.lat],
            zoom: target.zoom,
        }));
    }

    fn add_marker(&mut self, position: LngLat, appearance: MarkerAppearance) -> MapLibreMarker {
        let options = match pin_element(appearance) {
            Ok(element) => js_object(&[("element", element.into()), ("anchor", "bottom".into())]),
            Err(err) => {
                tracing::warn!("falling back to the default pin: {}", js_error_message(&err));
                js_object(&[("anchor", "bottom".into())])
            }
        };
        let marker = JsMarker::new(&options)
            .set_lng_lat(&lng_lat_array(position))
            .add_to(&self.map);
        let element = marker.get_element();
        apply_appearance(&element, appearance);

        let hover = (appearance != MarkerAppearance::Preview).then(|| hover_listeners(&element, &self.events));
        MapLibreMarker {
            marker,
            element,
            _hover: hover,
        }
    }

    fn set_marker_appearance(&mut self, marker: &MapLibreMarker, appearance: MarkerAppearance) {
        apply_appearance(&marker.element, appearance);
    }

    fn tag_marker(&mut self, marker: &MapLibreMarker, id: &NoteId) {
        let _ = marker.element.set_attribute(NOTE_ID_ATTR, id.as_str());
    }

    fn remove_marker(&mut self, marker: MapLibreMarker) {
        marker.marker.remove();
    }

    fn open_popup(&mut self, key: PopupKey, anchor: LngLat, content: PopupContent) -> MapLibrePopup {
        let popup = JsPopup::new(&to_js(&PopupOptions {
            anchor: "bottom",
            offset: [0.0, -GAP_ABOVE_MARKER],
            close_button: true,
            close_on_click: true,
        }))
        .set_lng_lat(&lng_lat_array(anchor));

        let body = match &content {
            PopupContent::Compose => compose_body(&self.events),
            PopupContent::Note { text, created_at } => note_body(text, created_at.as_deref()),
        };
        let (submit_button, listeners) = match body {
            Ok(body) => {
                popup.set_dom_content(&body.root);
                (body.submit_button, body.listeners)
            }
            Err(err) => {
                tracing::warn!("failed to build popup content: {}", js_error_message(&err));
                if let PopupContent::Note { text, .. } = &content {
                    popup.set_text(text);
                }
                (None, Vec::new())
            }
        };
        popup.add_to(&self.map);

        let on_close = {
            let events = self.events.clone();
            Closure::<dyn FnMut()>::new(move || {
                events.emit(SurfaceEvent::Workflow(WorkflowEvent::PopupClosed(key)));
            })
        };
        popup.on("close", on_close.as_ref().unchecked_ref());

        MapLibrePopup {
            popup,
            on_close,
            submit_button,
            _listeners: listeners,
        }
    }

    fn close_popup(&mut self, popup: MapLibrePopup) {
        popup.popup.off("close", popup.on_close.as_ref().unchecked_ref());
        popup.popup.remove();
    }

    fn set_popup_busy(&mut self, popup: &MapLibrePopup, busy: bool) {
        if let Some(button) = &popup.submit_button {
            button.set_disabled(busy);
        }
    }
}
