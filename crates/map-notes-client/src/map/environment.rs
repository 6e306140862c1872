//! Checks that the map can run before it is created.

use js_sys::Reflect;
use map_notes_core::EnvironmentError;
use wasm_bindgen::{JsCast, JsValue};

pub fn check() -> Result<(), EnvironmentError> {
    let window = gloo::utils::window();

    if window.location().protocol().is_ok_and(|p| p == "file:") {
        return Err(EnvironmentError::FileProtocol);
    }

    let library = Reflect::get(&window, &JsValue::from_str("maplibregl"))
        .map_err(|_| EnvironmentError::MapLibraryMissing)?;
    if library.is_undefined() || library.is_null() {
        return Err(EnvironmentError::MapLibraryMissing);
    }

    let constructor = Reflect::get(&library, &JsValue::from_str("Map"))
        .map_err(|_| EnvironmentError::MapConstructorMissing)?;
    if !constructor.is_function() {
        return Err(EnvironmentError::MapConstructorMissing);
    }

    if !webgl_supported() {
        return Err(EnvironmentError::WebGlUnsupported);
    }
    Ok(())
}

fn webgl_supported() -> bool {
    let Ok(canvas) = gloo::utils::document().create_element("canvas") else {
        return false;
    };
    let Ok(canvas) = canvas.dyn_into::<web_sys::HtmlCanvasElement>() else {
        return false;
    };
    ["webgl", "experimental-webgl"]
        .iter()
        .any(|kind| matches!(canvas.get_context(kind), Ok(Some(_))))
}
