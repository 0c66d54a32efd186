//! In-memory mirror of the place collection for the UI.
//!
//! Loaded once from [`PlaceStore::list_places`], then kept current by the
//! three notifications the writing code path emits right after a successful
//! store write. Nothing watches the medium: after an import or a clear, call
//! [`PlaceProjection::reload`].

use crate::model::Place;
use crate::store::{PlaceStore, RecordBackend};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceProjection {
    places: Vec<Place>,
}

impl PlaceProjection {
    pub fn load<B: RecordBackend>(store: &PlaceStore<B>) -> Self {
        Self {
            places: store.list_places(),
        }
    }

    pub fn reload<B: RecordBackend>(&mut self, store: &PlaceStore<B>) {
        self.places = store.list_places();
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn get(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn place_added(&mut self, place: Place) {
        self.places.push(place);
    }

    /// Replace by id; unknown ids are ignored, mirroring the store.
    pub fn place_updated(&mut self, place: Place) {
        if let Some(slot) = self.places.iter_mut().find(|p| p.id == place.id) {
            *slot = place;
        }
    }

    pub fn place_deleted(&mut self, id: &str) {
        self.places.retain(|p| p.id != id);
    }
}
