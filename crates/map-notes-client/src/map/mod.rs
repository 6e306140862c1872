//! MapLibre GL map surface.

mod environment;
mod maplibre;
mod surface;

pub use surface::{MapLibreMarker, MapLibrePopup, MapLibreSurface, SurfaceEvent};
