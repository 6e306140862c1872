//! Marker registry: one on-map marker per committed note.
//!
//! Preview and pending-submit markers are not tracked here; they belong to
//! the placement state until a note id exists.

use std::collections::HashMap;

use crate::note::{LngLat, NoteId};
use crate::surface::{MapSurface, MarkerAppearance};

#[derive(Debug)]
pub struct RegisteredMarker<M> {
    pub handle: M,
    pub position: LngLat,
}

#[derive(Debug)]
pub struct MarkerRegistry<M> {
    markers: HashMap<NoteId, RegisteredMarker<M>>,
}

impl<M> Default for MarkerRegistry<M> {
    fn default() -> Self {
        Self {
            markers: HashMap::new(),
        }
    }
}

impl<M> MarkerRegistry<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a marker for `id`, replacing any existing one.
    pub fn add<S>(&mut self, surface: &mut S, id: &NoteId, position: LngLat)
    where
        S: MapSurface<Marker = M>,
    {
        let handle = surface.add_marker(position, MarkerAppearance::Default);
        self.adopt(surface, id, handle, position);
    }

    /// Takes ownership of an existing marker handle for `id`, replacing any
    /// marker already registered under it.
    pub fn adopt<S>(&mut self, surface: &mut S, id: &NoteId, handle: M, position: LngLat)
    where
        S: MapSurface<Marker = M>,
    {
        if let Some(old) = self.markers.remove(id) {
            surface.remove_marker(old.handle);
        }
        surface.tag_marker(&handle, id);
        self.markers
            .insert(id.clone(), RegisteredMarker { handle, position });
    }

    pub fn remove<S>(&mut self, surface: &mut S, id: &NoteId) -> bool
    where
        S: MapSurface<Marker = M>,
    {
        match self.markers.remove(id) {
            Some(old) => {
                surface.remove_marker(old.handle);
                true
            }
            None => false,
        }
    }

    pub fn remove_all<S>(&mut self, surface: &mut S)
    where
        S: MapSurface<Marker = M>,
    {
        for (_, marker) in self.markers.drain() {
            surface.remove_marker(marker.handle);
        }
    }

    pub fn get(&self, id: &NoteId) -> Option<&RegisteredMarker<M>> {
        self.markers.get(id)
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.markers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
