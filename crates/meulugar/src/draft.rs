//! Form-layer input for creating and editing places.
//!
//! The stores accept whatever they are given; validation happens here, before
//! a [`PlaceDraft`] turns into a [`Place`].

use crate::error::{LugarError, Result};
use crate::model::{coordinates_in_range, Emotion, Place};
use chrono::{DateTime, Utc};

/// Raw values from the place form, plus any captured attachments.
#[derive(Debug, Clone)]
pub struct PlaceDraft {
    pub title: String,
    pub description: String,
    pub emotion: Emotion,
    pub(crate) tags: Vec<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub critical_characteristics: String,
    pub what_would_change: String,
    pub space_perception: String,
    pub photo: Option<Vec<u8>>,
    pub audio: Option<Vec<u8>>,
}

impl Default for PlaceDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            emotion: Emotion::Joy,
            tags: Vec::new(),
            lat: None,
            lng: None,
            critical_characteristics: String::new(),
            what_would_change: String::new(),
            space_perception: String::new(),
            photo: None,
            audio: None,
        }
    }
}

impl PlaceDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill the form from an existing place, for editing.
    /// Attachments are not loaded; leaving them `None` keeps the stored ones.
    pub fn from_place(place: &Place) -> Self {
        Self {
            title: place.title.clone(),
            description: place.description.clone(),
            emotion: place.emotion,
            tags: place.tags.clone(),
            lat: Some(place.lat),
            lng: Some(place.lng),
            critical_characteristics: place.critical_characteristics.clone().unwrap_or_default(),
            what_would_change: place.what_would_change.clone(),
            space_perception: place.space_perception.clone().unwrap_or_default(),
            photo: None,
            audio: None,
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Add a trimmed tag. Blank input and duplicates are ignored.
    /// Returns whether the tag was added.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    /// Check required fields and coordinates.
    pub fn validate(&self) -> Result<(f64, f64)> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if self.what_would_change.trim().is_empty() {
            missing.push("whatWouldChange");
        }
        let coords = self.lat.zip(self.lng);
        if coords.is_none() {
            missing.push("coordinates");
        }
        if !missing.is_empty() {
            return Err(LugarError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let (lat, lng) = coords.unwrap_or_default();
        if !coordinates_in_range(lat, lng) {
            return Err(LugarError::Validation(format!(
                "coordinates out of range: {}, {}",
                lat, lng
            )));
        }
        Ok((lat, lng))
    }

    /// Build the place record. Attachment references are supplied by the
    /// caller once the blobs are safely stored.
    pub fn into_place(
        self,
        id: String,
        created_at: DateTime<Utc>,
        photo_ref: Option<String>,
        audio_ref: Option<String>,
    ) -> Result<Place> {
        let (lat, lng) = self.validate()?;
        Ok(Place {
            id,
            title: self.title.trim().to_string(),
            lat,
            lng,
            emotion: self.emotion,
            description: self.description.trim().to_string(),
            photo_ref,
            audio_ref,
            tags: self.tags,
            created_at,
            critical_characteristics: optional_text(&self.critical_characteristics),
            what_would_change: self.what_would_change.trim().to_string(),
            space_perception: optional_text(&self.space_perception),
        })
    }
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
