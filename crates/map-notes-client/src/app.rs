//! Main application component.

use web_sys::HtmlElement;
use yew::prelude::*;

use crate::components::{LocateButton, MapView, Menu, StatusBar};
use crate::config::ClientConfig;
use crate::controller::{Controller, UiCallbacks};
use crate::hooks::{use_escape_key, use_window_errors};
use crate::storage::NoteBackend;

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| ClientConfig::from_build_env());
    let status = use_state(|| None::<AttrValue>);
    let ready = use_state(|| false);
    let locating = use_state(|| false);
    let menu_open = use_state(|| false);
    let container = use_node_ref();

    let controller = {
        let config = config.clone();
        let status = status.clone();
        let ready = ready.clone();
        let locating = locating.clone();
        use_memo((), move |_| {
            let ui = UiCallbacks {
                on_status: Callback::from(move |text: Option<String>| {
                    status.set(text.map(AttrValue::from));
                }),
                on_ready: Callback::from(move |value| ready.set(value)),
                on_locating: Callback::from(move |value| locating.set(value)),
            };
            Controller::new(NoteBackend::from_config(&config), ui)
        })
    };

    {
        let controller = controller.clone();
        let container = container.clone();
        let config = config.clone();
        use_effect_with((), move |_| {
            match container.cast::<HtmlElement>() {
                Some(element) => controller.mount(&element, &config),
                None => tracing::error!("map container missing"),
            }
        });
    }

    let on_toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |()| menu_open.set(!*menu_open))
    };

    let on_escape = {
        let controller = controller.clone();
        let menu_open = menu_open.clone();
        Callback::from(move |()| {
            controller.escape();
            menu_open.set(false);
        })
    };
    use_escape_key(on_escape);

    let on_page_error = {
        let status = status.clone();
        Callback::from(move |message: String| status.set(Some(AttrValue::from(message))))
    };
    use_window_errors(on_page_error);

    let on_locate = {
        let controller = controller.clone();
        Callback::from(move |()| controller.locate())
    };

    html! {
        <main class="app">
            <MapView container={container} />
            <div class="leftControls">
                <Menu open={*menu_open} on_toggle={on_toggle_menu} />
                <LocateButton onclick={on_locate} disabled={!*ready || *locating} />
            </div>
            <StatusBar status={(*status).clone()} />
        </main>
    }
}
