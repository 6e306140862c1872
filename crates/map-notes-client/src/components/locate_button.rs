use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct LocateButtonProps {
    pub onclick: Callback<()>,
    /// Disabled until the map is ready and while a lookup runs.
    pub disabled: bool,
}

#[function_component(LocateButton)]
pub fn locate_button(props: &LocateButtonProps) -> Html {
    let onclick = {
        let onclick = props.onclick.clone();
        Callback::from(move |_: MouseEvent| onclick.emit(()))
    };

    html! {
        <button
            id="locationBtn"
            class="iconBtn"
            type="button"
            title="Use my location"
            aria-label="Use my location"
            disabled={props.disabled}
            {onclick}
        >
            <svg viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg" aria-hidden="true">
                <circle cx="12" cy="12" r="4" fill="none" stroke="black" stroke-width="1" />
                <path d="M12 1 V6 M12 18 V23 M1 12 H6 M18 12 H23" stroke="black" stroke-width="1" />
            </svg>
        </button>
    }
}
