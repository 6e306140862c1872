//! Bindings to the global `maplibregl` namespace loaded from the page.

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = maplibregl, js_name = Map)]
    #[derive(Clone)]
    pub type JsMap;

    #[wasm_bindgen(catch, constructor, js_namespace = maplibregl, js_class = "Map")]
    pub fn new(options: &JsValue) -> Result<JsMap, JsValue>;

    #[wasm_bindgen(method, js_name = getZoom)]
    pub fn get_zoom(this: &JsMap) -> f64;

    #[wasm_bindgen(method)]
    pub fn project(this: &JsMap, lng_lat: &JsValue) -> JsPoint;

    #[wasm_bindgen(method)]
    pub fn unproject(this: &JsMap, point: &JsValue) -> JsLngLat;

    #[wasm_bindgen(method, js_name = flyTo)]
    pub fn fly_to(this: &JsMap, options: &JsValue);

    #[wasm_bindgen(method, js_name = addControl)]
    pub fn add_control(this: &JsMap, control: &JsValue, position: &str);

    #[wasm_bindgen(method, js_name = isMoving)]
    pub fn is_moving(this: &JsMap) -> bool;

    #[wasm_bindgen(method)]
    pub fn resize(this: &JsMap);

    #[wasm_bindgen(method)]
    pub fn on(this: &JsMap, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method)]
    pub fn once(this: &JsMap, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(js_namespace = maplibregl, js_name = Marker)]
    pub type JsMarker;

    #[wasm_bindgen(constructor, js_namespace = maplibregl, js_class = "Marker")]
    pub fn new(options: &JsValue) -> JsMarker;

    #[wasm_bindgen(method, js_name = setLngLat)]
    pub fn set_lng_lat(this: &JsMarker, lng_lat: &JsValue) -> JsMarker;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &JsMarker, map: &JsMap) -> JsMarker;

    #[wasm_bindgen(method)]
    pub fn remove(this: &JsMarker);

    #[wasm_bindgen(method, js_name = getElement)]
    pub fn get_element(this: &JsMarker) -> web_sys::HtmlElement;

    #[wasm_bindgen(js_namespace = maplibregl, js_name = Popup)]
    pub type JsPopup;

    #[wasm_bindgen(constructor, js_namespace = maplibregl, js_class = "Popup")]
    pub fn new(options: &JsValue) -> JsPopup;

    #[wasm_bindgen(method, js_name = setLngLat)]
    pub fn set_lng_lat(this: &JsPopup, lng_lat: &JsValue) -> JsPopup;

    #[wasm_bindgen(method, js_name = setDOMContent)]
    pub fn set_dom_content(this: &JsPopup, content: &web_sys::Node) -> JsPopup;

    #[wasm_bindgen(method, js_name = setText)]
    pub fn set_text(this: &JsPopup, text: &str) -> JsPopup;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &JsPopup, map: &JsMap) -> JsPopup;

    #[wasm_bindgen(method)]
    pub fn remove(this: &JsPopup);

    #[wasm_bindgen(method)]
    pub fn on(this: &JsPopup, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(method)]
    pub fn off(this: &JsPopup, event: &str, listener: &js_sys::Function);

    #[wasm_bindgen(js_namespace = maplibregl, js_name = AttributionControl)]
    pub type JsAttributionControl;

    #[wasm_bindgen(constructor, js_namespace = maplibregl, js_class = "AttributionControl")]
    pub fn new(options: &JsValue) -> JsAttributionControl;

    #[wasm_bindgen(js_namespace = maplibregl, js_name = NavigationControl)]
    pub type JsNavigationControl;

    #[wasm_bindgen(constructor, js_namespace = maplibregl, js_class = "NavigationControl")]
    pub fn new(options: &JsValue) -> JsNavigationControl;

    pub type JsLngLat;

    #[wasm_bindgen(method, getter)]
    pub fn lng(this: &JsLngLat) -> f64;

    #[wasm_bindgen(method, getter)]
    pub fn lat(this: &JsLngLat) -> f64;

    pub type JsPoint;

    #[wasm_bindgen(method, getter)]
    pub fn x(this: &JsPoint) -> f64;

    #[wasm_bindgen(method, getter)]
    pub fn y(this: &JsPoint) -> f64;

    pub type JsMapMouseEvent;

    #[wasm_bindgen(method, getter, js_name = lngLat)]
    pub fn lng_lat(this: &JsMapMouseEvent) -> JsLngLat;

    #[wasm_bindgen(method, getter, js_name = originalEvent)]
    pub fn original_event(this: &JsMapMouseEvent) -> Option<web_sys::Event>;

    pub type JsErrorEvent;

    #[wasm_bindgen(method, getter)]
    pub fn error(this: &JsErrorEvent) -> JsValue;
}
