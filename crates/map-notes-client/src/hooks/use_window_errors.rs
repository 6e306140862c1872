//! Uncaught page errors as status lines.

use gloo::events::EventListener;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{ErrorEvent, PromiseRejectionEvent};
use yew::prelude::*;

/// Calls `on_error` with `Error: <message>` for uncaught errors and
/// unhandled promise rejections that carry a message.
#[hook]
pub fn use_window_errors(on_error: Callback<String>) {
    let listeners_ref = use_mut_ref(Vec::<EventListener>::new);

    use_effect_with(on_error, move |on_error| {
        let window = gloo::utils::window();

        let error = {
            let on_error = on_error.clone();
            EventListener::new(&window, "error", move |event| {
                let message = event
                    .dyn_ref::<ErrorEvent>()
                    .map(ErrorEvent::message)
                    .filter(|message| !message.is_empty());
                if let Some(message) = message {
                    on_error.emit(format!("Error: {message}"));
                }
            })
        };
        let rejection = {
            let on_error = on_error.clone();
            EventListener::new(&window, "unhandledrejection", move |event| {
                let message = event
                    .dyn_ref::<PromiseRejectionEvent>()
                    .and_then(|event| rejection_message(&event.reason()));
                if let Some(message) = message {
                    on_error.emit(format!("Error: {message}"));
                }
            })
        };
        *listeners_ref.borrow_mut() = vec![error, rejection];

        move || {
            listeners_ref.borrow_mut().clear();
        }
    });
}

/// The message of a rejection reason: an `Error`'s message or a plain string.
pub fn rejection_message(reason: &JsValue) -> Option<String> {
    reason
        .dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| reason.as_string())
        .filter(|message| !message.is_empty())
}
