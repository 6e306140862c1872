use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct MapViewProps {
    /// Receives the container element the map is created in.
    pub container: NodeRef,
}

#[function_component(MapView)]
pub fn map_view(props: &MapViewProps) -> Html {
    html! {
        <div id="map" class="map" ref={props.container.clone()} />
    }
}
