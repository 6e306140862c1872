//! Hamburger menu with a full-screen overlay.

use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct MenuProps {
    pub open: bool,
    pub on_toggle: Callback<()>,
}

#[function_component(Menu)]
pub fn menu(props: &MenuProps) -> Html {
    let onclick = {
        let on_toggle = props.on_toggle.clone();
        Callback::from(move |_: MouseEvent| on_toggle.emit(()))
    };
    let label = if props.open { "Close menu" } else { "Open menu" };

    html! {
        <>
            <button
                id="hamburgerBtn"
                class={classes!("hamburgerBtn", props.open.then_some("menuOpen"))}
                type="button"
                aria-label={label}
                aria-expanded={props.open.to_string()}
                {onclick}
            >
                <span class="hamburgerIcon">
                    if props.open {
                        <svg viewBox="0 0 18 18" xmlns="http://www.w3.org/2000/svg">
                            <path d="M1 1 L17 17 M17 1 L1 17" stroke="black" stroke-width="1" stroke-linecap="round" />
                        </svg>
                    } else {
                        <svg viewBox="0 0 24 18" xmlns="http://www.w3.org/2000/svg">
                            <rect y="0" width="24" height="1" fill="black" />
                            <rect y="8.5" width="24" height="1" fill="black" />
                            <rect y="17" width="24" height="1" fill="black" />
                        </svg>
                    }
                </span>
            </button>

            <div
                id="menuOverlay"
                class={classes!("menuOverlay", props.open.then_some("open"))}
                aria-hidden={(!props.open).to_string()}
            >
                <div class="menuContent">
                    <h1>{ "Map Notes" }</h1>
                    <p>{ "Click the map to drop a pin. Click the pin again to write a note." }</p>
                    <p>{ "Click any pin to read its note." }</p>
                </div>
            </div>
        </>
    }
}
