use js_sys::{Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};

/// Best-effort message of a thrown JS value.
pub fn js_error_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "unknown error".to_string())
}

/// Plain JS object from key/value pairs, for options that hold DOM nodes.
pub fn js_object(entries: &[(&str, JsValue)]) -> Object {
    let object = Object::new();
    for (key, value) in entries {
        // Setting a property on a fresh plain object cannot fail.
        let _ = Reflect::set(&object, &JsValue::from_str(key), value);
    }
    object
}

/// `[lng, lat]` as MapLibre expects a `LngLatLike`.
pub fn lng_lat_array(position: map_notes_core::LngLat) -> js_sys::Array {
    js_sys::Array::of2(&position.lng.into(), &position.lat.into())
}
