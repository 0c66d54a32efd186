//! Filtering, sorting and summaries over a place list.
//!
//! These work on any slice of places (usually [`PlaceProjection::places`]) and
//! never touch storage.
//!
//! [`PlaceProjection::places`]: crate::projection::PlaceProjection::places

use crate::model::{Emotion, Place};
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceFilter {
    /// Only places with this emotion. None means every emotion.
    pub emotion: Option<Emotion>,
    /// Places carrying at least one of these tags. Empty means no tag filter.
    pub tags: Vec<String>,
    /// Case-insensitive substring of title or description.
    pub search: Option<String>,
}

impl PlaceFilter {
    pub fn matches(&self, place: &Place) -> bool {
        let emotion_match = self.emotion.map_or(true, |e| place.emotion == e);
        let tag_match = self.tags.is_empty() || self.tags.iter().any(|t| place.has_tag(t));
        let search_match = match &self.search {
            Some(term) if !term.trim().is_empty() => {
                let term = term.trim().to_lowercase();
                place.title.to_lowercase().contains(&term)
                    || place.description.to_lowercase().contains(&term)
            }
            _ => true,
        };
        emotion_match && tag_match && search_match
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Date,
    Title,
    Emotion,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter then sort. The sort is stable, so ties keep insertion order.
pub fn query<'a>(
    places: &'a [Place],
    filter: &PlaceFilter,
    sort_by: SortBy,
    order: SortOrder,
) -> Vec<&'a Place> {
    let mut matched: Vec<&Place> = places.iter().filter(|p| filter.matches(p)).collect();
    matched.sort_by(|a, b| {
        let ordering = compare(a, b, sort_by);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    matched
}

fn compare(a: &Place, b: &Place, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Date => a.created_at.cmp(&b.created_at),
        SortBy::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortBy::Emotion => a.emotion.as_str().cmp(b.emotion.as_str()),
    }
}

/// Every tag in use, in order of first appearance.
pub fn all_tags(places: &[Place]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for tag in places.iter().flat_map(|p| p.tags.iter()) {
        if seen.insert(tag.as_str()) {
            tags.push(tag.clone());
        }
    }
    tags
}

/// Counts shown above the emotion map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceStats {
    pub places: usize,
    pub emotions: usize,
    pub tags: usize,
}

pub fn stats<'a, I>(places: I) -> PlaceStats
where
    I: IntoIterator<Item = &'a Place>,
{
    let mut count = 0;
    let mut emotions = HashSet::new();
    let mut tags = HashSet::new();
    for place in places {
        count += 1;
        emotions.insert(place.emotion);
        tags.extend(place.tags.iter().map(String::as_str));
    }
    PlaceStats {
        places: count,
        emotions: emotions.len(),
        tags: tags.len(),
    }
}
