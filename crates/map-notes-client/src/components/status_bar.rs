use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct StatusBarProps {
    pub status: Option<AttrValue>,
}

/// Single status line. Hidden while there is nothing to say.
#[function_component(StatusBar)]
pub fn status_bar(props: &StatusBarProps) -> Html {
    let Some(status) = props.status.clone() else {
        return html! {};
    };
    html! {
        <div class="status" role="status" aria-live="polite">{ status }</div>
    }
}
