//! # Domain Model: Places, Emotions and the Portfolio Slot
//!
//! This module defines the records persisted by the journal: [`Place`],
//! [`Emotion`], [`Portfolio`] and the attachment key scheme ([`MediaRole`],
//! [`media_key`]).
//!
//! ## Schema Drift
//!
//! The place schema grew three reflective fields after the first release
//! (`criticalCharacteristics`, `whatWouldChange`, `spacePerception`). Stored
//! collections are never migrated in place, so older records keep lacking them.
//! Instead every deserialization goes through [`normalize`]:
//!
//! | Field | Absent / `null` | `""` |
//! |-------|-----------------|------|
//! | `whatWouldChange` | `""` | `""` |
//! | `criticalCharacteristics` | `None` | `None` |
//! | `spacePerception` | `None` | `None` |
//! | `photoRef` / `audioRef` | `None` | `None` |
//! | `tags` | `[]` | n/a |
//! | `lat` / `lng` | NaN | n/a |
//!
//! `Place` implements `Deserialize` through [`PlaceRecord`] + [`normalize`],
//! which means store reads and imports cannot skip the defaulting step.
//!
//! ## Coordinates
//!
//! The store accepts whatever coordinates the producer hands it. JSON has no
//! representation for non-finite numbers (serde_json writes them as `null`),
//! so a `null` coordinate reads back as NaN instead of failing the whole
//! collection. Consumers check [`Place::has_valid_coordinates`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::LugarError;

/// Format version written into portfolios and exported datasets.
pub const FORMAT_VERSION: &str = "1.0";

/// How a child feels about a place. Serialized with the Portuguese wire names
/// used by exported files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    #[serde(rename = "alegria")]
    Joy,
    #[serde(rename = "calma")]
    Calm,
    #[serde(rename = "curiosidade")]
    Curiosity,
    #[serde(rename = "medo")]
    Fear,
    #[serde(rename = "saudade")]
    Longing,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Joy,
        Emotion::Calm,
        Emotion::Curiosity,
        Emotion::Fear,
        Emotion::Longing,
    ];

    /// The wire name, as stored and exported.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "alegria",
            Emotion::Calm => "calma",
            Emotion::Curiosity => "curiosidade",
            Emotion::Fear => "medo",
            Emotion::Longing => "saudade",
        }
    }

    /// Display label shown next to map markers and cards.
    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Joy => "Alegria",
            Emotion::Calm => "Calma",
            Emotion::Curiosity => "Curiosidade",
            Emotion::Fear => "Medo",
            Emotion::Longing => "Saudade",
        }
    }

    /// Marker colour as a hex string.
    pub fn color(&self) -> &'static str {
        match self {
            Emotion::Joy => "#fbbf24",
            Emotion::Calm => "#34d399",
            Emotion::Curiosity => "#60a5fa",
            Emotion::Fear => "#f87171",
            Emotion::Longing => "#a78bfa",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = LugarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str() == wanted)
            .ok_or_else(|| {
                LugarError::Validation(format!(
                    "unknown emotion `{}`; expected alegria|calma|curiosidade|medo|saudade",
                    s.trim()
                ))
            })
    }
}

/// A favorite place recorded by the student.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    pub emotion: Emotion,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_ref: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_characteristics: Option<String>,
    pub what_would_change: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_perception: Option<String>,
}

impl Place {
    /// Latitude and longitude are finite and within geographic range.
    pub fn has_valid_coordinates(&self) -> bool {
        coordinates_in_range(self.lat, self.lng)
    }

    /// The attachment key recorded for `role`, if any.
    pub fn media_ref(&self, role: MediaRole) -> Option<&str> {
        match role {
            MediaRole::Photo => self.photo_ref.as_deref(),
            MediaRole::Audio => self.audio_ref.as_deref(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

pub(crate) fn coordinates_in_range(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

/// A place exactly as found in storage, before defaulting.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    pub emotion: Emotion,
    pub description: String,
    #[serde(default)]
    pub photo_ref: Option<String>,
    #[serde(default)]
    pub audio_ref: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub critical_characteristics: Option<String>,
    #[serde(default)]
    pub what_would_change: Option<String>,
    #[serde(default)]
    pub space_perception: Option<String>,
}

/// Fills every field an older schema may lack with its defined default.
pub fn normalize(raw: PlaceRecord) -> Place {
    Place {
        id: raw.id,
        title: raw.title,
        lat: raw.lat.unwrap_or(f64::NAN),
        lng: raw.lng.unwrap_or(f64::NAN),
        emotion: raw.emotion,
        description: raw.description,
        photo_ref: non_empty(raw.photo_ref),
        audio_ref: non_empty(raw.audio_ref),
        tags: raw.tags.unwrap_or_default(),
        created_at: raw.created_at,
        critical_characteristics: non_empty(raw.critical_characteristics),
        what_would_change: raw.what_would_change.unwrap_or_default(),
        space_perception: non_empty(raw.space_perception),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl<'de> Deserialize<'de> for Place {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        PlaceRecord::deserialize(deserializer).map(normalize)
    }
}

/// Lightweight student metadata kept next to the place collection.
///
/// Unknown fields are carried in `extra` so that a portfolio written by a
/// newer release survives an import/export cycle untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    #[serde(default)]
    pub student_alias: String,
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

impl Portfolio {
    pub fn new(student_alias: impl Into<String>) -> Self {
        Self {
            student_alias: student_alias.into(),
            places: Vec::new(),
            quiz_result: None,
            created_at: Some(Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
            version: default_version(),
            extra: Map::new(),
        }
    }
}

/// Which kind of attachment a key points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaRole {
    Photo,
    Audio,
}

impl MediaRole {
    pub const ALL: [MediaRole; 2] = [MediaRole::Photo, MediaRole::Audio];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaRole::Photo => "photo",
            MediaRole::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attachment key for a place: `<role>_<placeId>`.
pub fn media_key(role: MediaRole, place_id: &str) -> String {
    format!("{}_{}", role.as_str(), place_id)
}

/// Splits an attachment key back into its role and owning place id.
pub fn parse_media_key(key: &str) -> Option<(MediaRole, &str)> {
    MediaRole::ALL.into_iter().find_map(|role| {
        key.strip_prefix(role.as_str())
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|id| !id.is_empty())
            .map(|id| (role, id))
    })
}

/// A fresh, never-reused place id.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}
