//! In-memory map surface that records everything the workflow does.

use std::collections::BTreeMap;

use crate::camera::{CameraTarget, ScreenPoint, Viewport};
use crate::note::{LngLat, NoteId};
use crate::surface::{MapSurface, MarkerAppearance, PopupContent, PopupKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FakeMarker(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FakePopup(pub PopupKey);

/// Marker calls in the order the surface received them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerOp {
    Add(FakeMarker),
    Tag(FakeMarker),
    Remove(FakeMarker),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRecord {
    pub position: LngLat,
    pub appearance: MarkerAppearance,
    pub tag: Option<NoteId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupRecord {
    pub key: PopupKey,
    pub anchor: LngLat,
    pub content: PopupContent,
    pub busy: bool,
}

#[derive(Debug)]
pub struct RecordingSurface {
    pub viewport: Viewport,
    pub flights: Vec<CameraTarget>,
    pub marker_ops: Vec<MarkerOp>,
    markers: BTreeMap<FakeMarker, MarkerRecord>,
    popups: Vec<PopupRecord>,
    next_marker: u32,
    max_open_popups: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            viewport: Viewport::new(LngLat::new(13.405, 52.52), 11.2, 800.0, 600.0),
            flights: Vec::new(),
            marker_ops: Vec::new(),
            markers: BTreeMap::new(),
            popups: Vec::new(),
            next_marker: 0,
            max_open_popups: 0,
        }
    }

    pub fn live_markers(&self) -> Vec<(FakeMarker, &MarkerRecord)> {
        self.markers.iter().map(|(k, v)| (*k, v)).collect()
    }

    pub fn markers_with(&self, appearance: MarkerAppearance) -> Vec<&MarkerRecord> {
        self.markers
            .values()
            .filter(|m| m.appearance == appearance)
            .collect()
    }

    /// Default-looking markers that no note owns yet.
    pub fn untagged_markers(&self) -> Vec<&MarkerRecord> {
        self.markers
            .values()
            .filter(|m| m.appearance != MarkerAppearance::Preview && m.tag.is_none())
            .collect()
    }

    pub fn marker(&self, marker: FakeMarker) -> Option<&MarkerRecord> {
        self.markers.get(&marker)
    }

    pub fn marker_tag(&self, marker: FakeMarker) -> Option<NoteId> {
        self.markers.get(&marker).and_then(|m| m.tag.clone())
    }

    pub fn open_popups(&self) -> &[PopupRecord] {
        &self.popups
    }

    /// The engine removes a popup on its own (close button, click-away).
    /// The session learns about it separately through a close event.
    pub fn engine_close(&mut self, key: PopupKey) {
        self.popups.retain(|p| p.key != key);
    }

    pub fn max_open_popups(&self) -> usize {
        self.max_open_popups
    }

    pub fn last_flight(&self) -> Option<CameraTarget> {
        self.flights.last().copied()
    }
}

impl MapSurface for RecordingSurface {
    type Marker = FakeMarker;
    type Popup = FakePopup;

    fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    fn project(&self, position: LngLat) -> ScreenPoint {
        self.viewport.project(position)
    }

    fn unproject(&self, point: ScreenPoint) -> LngLat {
        self.viewport.unproject(point)
    }

    fn fly_to(&mut self, target: CameraTarget) {
        self.flights.push(target);
        self.viewport.jump_to(target);
    }

    fn add_marker(&mut self, position: LngLat, appearance: MarkerAppearance) -> FakeMarker {
        let marker = FakeMarker(self.next_marker);
        self.next_marker += 1;
        self.marker_ops.push(MarkerOp::Add(marker));
        self.markers.insert(
            marker,
            MarkerRecord {
                position,
                appearance,
                tag: None,
            },
        );
        marker
    }

    fn set_marker_appearance(&mut self, marker: &FakeMarker, appearance: MarkerAppearance) {
        if let Some(record) = self.markers.get_mut(marker) {
            record.appearance = appearance;
        }
    }

    fn tag_marker(&mut self, marker: &FakeMarker, id: &NoteId) {
        self.marker_ops.push(MarkerOp::Tag(*marker));
        if let Some(record) = self.markers.get_mut(marker) {
            record.tag = Some(id.clone());
        }
    }

    fn remove_marker(&mut self, marker: FakeMarker) {
        self.marker_ops.push(MarkerOp::Remove(marker));
        assert!(
            self.markers.remove(&marker).is_some(),
            "marker {marker:?} removed twice"
        );
    }

    fn open_popup(&mut self, key: PopupKey, anchor: LngLat, content: PopupContent) -> FakePopup {
        self.popups.push(PopupRecord {
            key,
            anchor,
            content,
            busy: false,
        });
        self.max_open_popups = self.max_open_popups.max(self.popups.len());
        FakePopup(key)
    }

    fn close_popup(&mut self, popup: FakePopup) {
        let before = self.popups.len();
        self.popups.retain(|p| p.key != popup.0);
        assert_eq!(before, self.popups.len() + 1, "popup {popup:?} closed twice");
    }

    fn set_popup_busy(&mut self, popup: &FakePopup, busy: bool) {
        if let Some(record) = self.popups.iter_mut().find(|p| p.key == popup.0) {
            record.busy = busy;
        }
    }
}
