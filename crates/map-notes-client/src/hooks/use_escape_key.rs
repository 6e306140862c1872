//! Escape key hook.

use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;
use yew::prelude::*;

/// Calls `on_escape` whenever Escape is pressed anywhere on the page,
/// including inside text fields.
#[hook]
pub fn use_escape_key(on_escape: Callback<()>) {
    let listener_ref = use_mut_ref(|| None::<EventListener>);

    use_effect_with(on_escape, move |on_escape| {
        let on_escape = on_escape.clone();
        let document = gloo::utils::document();

        let listener = EventListener::new(&document, "keydown", move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if event.key() == "Escape" {
                on_escape.emit(());
            }
        });
        *listener_ref.borrow_mut() = Some(listener);

        move || {
            *listener_ref.borrow_mut() = None;
        }
    });
}
