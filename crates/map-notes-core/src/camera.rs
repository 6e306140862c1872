//! Camera math on the Web Mercator plane.
//!
//! Used to compute fly-to targets that keep a marker a fixed number of
//! pixels below the visual centre, including at a zoom the map is not at yet.

use serde::{Deserialize, Serialize};

use crate::note::LngLat;

/// Tile size of the rendering engine in pixels.
pub const TILE_SIZE: f64 = 512.0;

/// Pixels between a centred marker and the visual centre (marker below).
pub const MARKER_OFFSET_BELOW_CENTER: f64 = 200.0;

/// Gap between a popup's tip and the top of its marker.
pub const GAP_ABOVE_MARKER: f64 = 80.0;

/// Minimum zoom after committing a note.
pub const DETAIL_ZOOM: f64 = 14.0;

/// Minimum zoom after locating the device.
pub const LOCATE_ZOOM: f64 = 15.0;

/// Screen or world pixel position, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Where a camera flight ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraTarget {
    pub center: LngLat,
    pub zoom: f64,
}

pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

/// Geographic coordinate to world pixels at `zoom`.
pub fn project(position: LngLat, zoom: f64) -> ScreenPoint {
    let size = world_size(zoom);
    let x = (180.0 + position.lng) / 360.0 * size;
    let merc_y = (std::f64::consts::FRAC_PI_4 + position.lat.to_radians() / 2.0)
        .tan()
        .ln()
        .to_degrees();
    let y = (180.0 - merc_y) / 360.0 * size;
    ScreenPoint::new(x, y)
}

/// World pixels at `zoom` back to a geographic coordinate.
pub fn unproject(point: ScreenPoint, zoom: f64) -> LngLat {
    let size = world_size(zoom);
    let lng = point.x / size * 360.0 - 180.0;
    let merc_y = 180.0 - point.y / size * 360.0;
    let lat = 2.0 * merc_y.to_radians().exp().atan().to_degrees() - 90.0;
    LngLat::new(lng, lat)
}

/// Camera centre at `zoom` that shows `position` `offset_px` pixels below
/// the visual centre.
pub fn center_with_marker_below(position: LngLat, zoom: f64, offset_px: f64) -> LngLat {
    let point = project(position, zoom);
    unproject(ScreenPoint::new(point.x, point.y - offset_px), zoom)
}

/// A rectangular view onto the Mercator plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LngLat,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: LngLat, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            zoom,
            width,
            height,
        }
    }

    /// Geographic coordinate to container pixels.
    pub fn project(&self, position: LngLat) -> ScreenPoint {
        let origin = project(self.center, self.zoom);
        let point = project(position, self.zoom);
        ScreenPoint::new(
            point.x - origin.x + self.width / 2.0,
            point.y - origin.y + self.height / 2.0,
        )
    }

    /// Container pixels to a geographic coordinate.
    pub fn unproject(&self, point: ScreenPoint) -> LngLat {
        let origin = project(self.center, self.zoom);
        unproject(
            ScreenPoint::new(
                point.x + origin.x - self.width / 2.0,
                point.y + origin.y - self.height / 2.0,
            ),
            self.zoom,
        )
    }

    pub fn jump_to(&mut self, target: CameraTarget) {
        self.center = target.center;
        self.zoom = target.zoom;
    }
}
