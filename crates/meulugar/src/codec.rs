//! # Import / Export
//!
//! A single JSON document carries the whole user dataset between devices:
//!
//! ```json
//! {
//!   "places": [ { "id": "…", "title": "…", … } ],
//!   "portfolio": { "studentAlias": "…" } | null,
//!   "exportDate": "2024-03-01T10:00:00.000Z",
//!   "version": "1.0"
//! }
//! ```
//!
//! Attachment bytes are not embedded. Places keep their `photoRef`/`audioRef`
//! keys, so on another device those references dangle until the blobs are
//! copied by other means.
//!
//! ## Import Rules
//!
//! The document is validated in full before anything is written:
//!
//! - The top level must be an object.
//! - `places`, when present, must be an array of valid place records.
//! - `portfolio`, when present and not `null`, must be a valid portfolio object.
//! - At least one of the two must be present.
//! - Place ids must be unique within the document.
//!
//! `places` replaces the stored collection wholesale (no merge by id) and
//! `portfolio` replaces the stored slot. If the second write fails the first
//! is rolled back to its previous raw value.

use crate::error::{LugarError, Result};
use crate::model::{Place, Portfolio, FORMAT_VERSION};
use crate::store::{PlaceStore, RecordBackend, PLACES_KEY, PORTFOLIO_KEY};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{info, warn};

/// Snapshot document produced by [`export_data`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedDataset {
    pub places: Vec<Place>,
    pub portfolio: Option<Portfolio>,
    pub export_date: String,
    pub version: String,
}

impl ExportedDataset {
    pub fn new(places: Vec<Place>, portfolio: Option<Portfolio>, at: DateTime<Utc>) -> Self {
        Self {
            places,
            portfolio,
            export_date: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: FORMAT_VERSION.to_string(),
        }
    }
}

/// Serialize every place and the portfolio slot to pretty-printed JSON.
pub fn export_data<B: RecordBackend>(store: &PlaceStore<B>) -> Result<String> {
    export_data_at(store, Utc::now())
}

pub fn export_data_at<B: RecordBackend>(
    store: &PlaceStore<B>,
    at: DateTime<Utc>,
) -> Result<String> {
    let dataset = ExportedDataset::new(store.list_places(), store.get_portfolio(), at);
    let text = serde_json::to_string_pretty(&dataset)?;
    info!(
        places = dataset.places.len(),
        portfolio = dataset.portfolio.is_some(),
        "codec: export built"
    );
    Ok(text)
}

/// Suggested download name, e.g. `meu-lugar-2024-03-01.json`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("meu-lugar-{}.json", date.format("%Y-%m-%d"))
}

/// Restore a document produced by [`export_data`]. Returns `false`, with
/// nothing written, when the document is malformed or a write fails.
pub fn import_data<B: RecordBackend>(store: &PlaceStore<B>, text: &str) -> bool {
    match try_import_data(store, text) {
        Ok(summary) => {
            info!(
                places = ?summary.places,
                portfolio = summary.portfolio,
                "codec: import applied"
            );
            true
        }
        Err(e) => {
            warn!(error = %e, "codec: import rejected");
            false
        }
    }
}

/// What an import replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Number of places written, if the collection was replaced.
    pub places: Option<usize>,
    pub portfolio: bool,
}

struct ValidatedImport {
    places: Option<Vec<Place>>,
    portfolio: Option<Portfolio>,
}

pub fn try_import_data<B: RecordBackend>(
    store: &PlaceStore<B>,
    text: &str,
) -> Result<ImportSummary> {
    let validated = validate_document(text)?;
    commit(store, &validated)?;
    Ok(ImportSummary {
        places: validated.places.as_ref().map(Vec::len),
        portfolio: validated.portfolio.is_some(),
    })
}

fn validate_document(text: &str) -> Result<ValidatedImport> {
    let doc: Value = serde_json::from_str(text)?;
    let Value::Object(mut fields) = doc else {
        return Err(invalid("top level is not an object"));
    };

    let places = match fields.remove("places") {
        None => None,
        Some(value @ Value::Array(_)) => Some(serde_json::from_value::<Vec<Place>>(value)?),
        Some(_) => return Err(invalid("`places` is not an array")),
    };

    let portfolio = match fields.remove("portfolio") {
        None | Some(Value::Null) => None,
        Some(value @ Value::Object(_)) => Some(serde_json::from_value::<Portfolio>(value)?),
        Some(_) => return Err(invalid("`portfolio` is not an object")),
    };

    if let Some(places) = &places {
        let mut seen = HashSet::new();
        for place in places {
            if !seen.insert(place.id.as_str()) {
                return Err(invalid(&format!("duplicate place id `{}`", place.id)));
            }
        }
    }

    if places.is_none() && portfolio.is_none() {
        return Err(invalid("document has neither `places` nor `portfolio`"));
    }

    Ok(ValidatedImport { places, portfolio })
}

fn invalid(reason: &str) -> LugarError {
    LugarError::Store(format!("invalid import document: {}", reason))
}

fn commit<B: RecordBackend>(store: &PlaceStore<B>, import: &ValidatedImport) -> Result<()> {
    let backend = store.backend();
    let previous_places = backend.get_item(PLACES_KEY)?;

    if let Some(places) = &import.places {
        store.save_places(places)?;
    }

    if let Some(portfolio) = &import.portfolio {
        let written = serde_json::to_string(portfolio)
            .map_err(LugarError::from)
            .and_then(|raw| backend.set_item(PORTFOLIO_KEY, &raw));
        if let Err(e) = written {
            if import.places.is_some() {
                rollback(backend, PLACES_KEY, previous_places.as_deref());
            }
            return Err(e);
        }
    }

    Ok(())
}

fn rollback<B: RecordBackend>(backend: &B, key: &str, previous: Option<&str>) {
    let restored = match previous {
        Some(raw) => backend.set_item(key, raw),
        None => backend.remove_item(key),
    };
    if let Err(e) = restored {
        warn!(key, error = %e, "codec: rollback failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use crate::test_utils::sample_place;
    use chrono::TimeZone;
    use serde_json::json;

    fn make_store() -> PlaceStore<MemBackend> {
        PlaceStore::with_backend(MemBackend::new())
    }

    #[test]
    fn test_export_shape() {
        let store = make_store();
        store.add_place(&sample_place("a"));
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

        let text = export_data_at(&store, at).unwrap();
        let doc: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["version"], json!("1.0"));
        assert_eq!(doc["exportDate"], json!("2024-03-01T10:00:00.000Z"));
        assert_eq!(doc["portfolio"], Value::Null);
        assert_eq!(doc["places"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_export_is_deterministic_apart_from_timestamp() {
        let store = make_store();
        store.add_place(&sample_place("a"));
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(
            export_data_at(&store, at).unwrap(),
            export_data_at(&store, at).unwrap()
        );
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(export_filename(date), "meu-lugar-2024-03-01.json");
    }

    #[test]
    fn test_import_replaces_instead_of_merging() {
        let store = make_store();
        store.add_place(&sample_place("old"));

        let incoming = json!({ "places": [serde_json::to_value(sample_place("new")).unwrap()] });
        assert!(import_data(&store, &incoming.to_string()));

        let ids: Vec<String> = store.list_places().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["new"]);
    }

    #[test]
    fn test_import_portfolio_only_keeps_places() {
        let store = make_store();
        store.add_place(&sample_place("keep"));

        let doc = json!({ "portfolio": { "studentAlias": "Bia" } });
        assert!(import_data(&store, &doc.to_string()));
        assert_eq!(store.list_places().len(), 1);
        assert_eq!(store.get_portfolio().unwrap().student_alias, "Bia");
    }

    #[test]
    fn test_import_null_portfolio_leaves_slot() {
        let store = make_store();
        store.save_portfolio(&Portfolio::new("Ana"));

        let doc = json!({ "places": [], "portfolio": null });
        assert!(import_data(&store, &doc.to_string()));
        assert!(store.list_places().is_empty());
        assert_eq!(store.get_portfolio().unwrap().student_alias, "Ana");
    }

    #[test]
    fn test_import_rejects_malformed_documents_without_mutation() {
        let bad_docs = [
            "not json".to_string(),
            json!([1, 2, 3]).to_string(),
            json!({ "places": "nope" }).to_string(),
            json!({ "places": [{ "id": "x" }] }).to_string(),
            json!({ "version": "1.0" }).to_string(),
            json!({
                "places": [
                    serde_json::to_value(sample_place("dup")).unwrap(),
                    serde_json::to_value(sample_place("dup")).unwrap()
                ]
            })
            .to_string(),
            json!({ "places": [], "portfolio": "broken" }).to_string(),
            json!({ "places": [], "portfolio": { "studentAlias": 42 } }).to_string(),
        ];

        for doc in bad_docs {
            let store = make_store();
            store.add_place(&sample_place("a"));
            store.save_portfolio(&Portfolio::new("Ana"));
            let before_places = store.list_places();
            let before_portfolio = store.get_portfolio();

            assert!(!import_data(&store, &doc), "accepted: {doc}");
            assert_eq!(store.list_places(), before_places, "places mutated by: {doc}");
            assert_eq!(store.get_portfolio(), before_portfolio);
        }
    }

    #[test]
    fn test_failed_portfolio_write_rolls_back_places() {
        let store = make_store();
        store.add_place(&sample_place("a"));
        store.backend.set_simulate_write_error_for(PORTFOLIO_KEY, true);

        let doc = json!({
            "places": [serde_json::to_value(sample_place("b")).unwrap()],
            "portfolio": { "studentAlias": "Bia" }
        });
        assert!(!import_data(&store, &doc.to_string()));

        let ids: Vec<String> = store.list_places().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["a"]);
        assert!(store.get_portfolio().is_none());
    }

    #[test]
    fn test_rollback_removes_places_that_did_not_exist() {
        let store = make_store();
        store.backend.set_simulate_write_error_for(PORTFOLIO_KEY, true);

        let doc = json!({
            "places": [serde_json::to_value(sample_place("b")).unwrap()],
            "portfolio": { "studentAlias": "Bia" }
        });
        assert!(!import_data(&store, &doc.to_string()));
        assert_eq!(store.backend.get_item(PLACES_KEY).unwrap(), None);
    }

    #[test]
    fn test_import_defaults_legacy_records() {
        let store = make_store();
        let doc = json!({
            "places": [{
                "id": "legacy", "title": "Escola", "lat": -8.05, "lng": -34.9,
                "emotion": "curiosidade", "description": "Pátio", "tags": [],
                "createdAt": "2022-08-10T09:30:00.000Z"
            }]
        });
        let summary = try_import_data(&store, &doc.to_string()).unwrap();
        assert_eq!(summary.places, Some(1));
        assert!(!summary.portfolio);
        assert_eq!(store.list_places()[0].what_would_change, "");
    }
}
