use super::backend::RecordBackend;
use crate::error::{LugarError, Result};
use crate::model::{Place, Portfolio};
use serde_json::Value;
use tracing::{debug, warn};

/// Key holding the place collection.
pub const PLACES_KEY: &str = "meu-lugar-places";
/// Key holding the portfolio slot.
pub const PORTFOLIO_KEY: &str = "meu-lugar-portfolio";
/// Key holding UI settings.
pub const SETTINGS_KEY: &str = "meu-lugar-settings";

/// The place collection on top of a [`RecordBackend`].
///
/// Public operations never return `Err`: failures of the medium are logged and
/// turned into `false`/`None`, so a full disk or a corrupt value cannot take the
/// UI down. The `try_*` methods keep the error for callers that need it.
pub struct PlaceStore<B: RecordBackend> {
    pub(crate) backend: B,
}

impl<B: RecordBackend> PlaceStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// All places in insertion order, normalized. Empty on absence or corruption.
    pub fn list_places(&self) -> Vec<Place> {
        match self.try_list_places() {
            Ok(places) => places,
            Err(e) => {
                warn!(key = PLACES_KEY, error = %e, "place_store: failed to load places");
                Vec::new()
            }
        }
    }

    pub fn try_list_places(&self) -> Result<Vec<Place>> {
        match self.backend.get_item(PLACES_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn get_place(&self, id: &str) -> Option<Place> {
        self.list_places().into_iter().find(|p| p.id == id)
    }

    /// Append `place` and persist the collection.
    pub fn add_place(&self, place: &Place) -> bool {
        report("add_place", self.try_add_place(place))
    }

    // Writes start from `list_places`, so a corrupt collection is replaced
    // rather than blocking every later write.
    pub fn try_add_place(&self, place: &Place) -> Result<()> {
        let mut places = self.list_places();
        places.push(place.clone());
        self.save_places(&places)?;
        debug!(id = %place.id, total = places.len(), "place_store: place added");
        Ok(())
    }

    /// Replace the place with the same id, keeping its position.
    ///
    /// An unknown id is a no-op returning `false`: update never inserts, so a
    /// stale edit form cannot resurrect or duplicate a place.
    pub fn update_place(&self, place: &Place) -> bool {
        report("update_place", self.try_update_place(place))
    }

    pub fn try_update_place(&self, place: &Place) -> Result<()> {
        let mut places = self.list_places();
        let slot = places
            .iter_mut()
            .find(|p| p.id == place.id)
            .ok_or_else(|| LugarError::NotFound(place.id.clone()))?;
        *slot = place.clone();
        self.save_places(&places)?;
        debug!(id = %place.id, "place_store: place updated");
        Ok(())
    }

    /// Remove the place with `id`. Returns `false` if nothing was removed.
    ///
    /// Attachments referenced by the place are left alone.
    pub fn delete_place(&self, id: &str) -> bool {
        report("delete_place", self.try_delete_place(id))
    }

    pub fn try_delete_place(&self, id: &str) -> Result<()> {
        let mut places = self.list_places();
        let before = places.len();
        places.retain(|p| p.id != id);
        if places.len() == before {
            return Err(LugarError::NotFound(id.to_string()));
        }
        self.save_places(&places)?;
        debug!(id = %id, remaining = places.len(), "place_store: place deleted");
        Ok(())
    }

    /// Remove the place collection, the portfolio and the settings. Irreversible.
    pub fn clear_all(&self) -> bool {
        report("clear_all", self.try_clear_all())
    }

    pub fn try_clear_all(&self) -> Result<()> {
        self.backend.remove_item(PLACES_KEY)?;
        self.backend.remove_item(PORTFOLIO_KEY)?;
        self.backend.remove_item(SETTINGS_KEY)?;
        debug!("place_store: all data cleared");
        Ok(())
    }

    pub fn get_portfolio(&self) -> Option<Portfolio> {
        match self.read_json::<Portfolio>(PORTFOLIO_KEY) {
            Ok(portfolio) => portfolio,
            Err(e) => {
                warn!(key = PORTFOLIO_KEY, error = %e, "place_store: failed to load portfolio");
                None
            }
        }
    }

    pub fn save_portfolio(&self, portfolio: &Portfolio) -> bool {
        report("save_portfolio", self.write_json(PORTFOLIO_KEY, portfolio))
    }

    pub fn get_settings(&self) -> Option<Value> {
        match self.read_json::<Value>(SETTINGS_KEY) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(key = SETTINGS_KEY, error = %e, "place_store: failed to load settings");
                None
            }
        }
    }

    pub fn save_settings(&self, settings: &Value) -> bool {
        report("save_settings", self.write_json(SETTINGS_KEY, settings))
    }

    pub(crate) fn save_places(&self, places: &[Place]) -> Result<()> {
        self.write_json(PLACES_KEY, places)
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get_item(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write_json<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.set_item(key, &raw)
    }
}

fn report(op: &'static str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(LugarError::NotFound(id)) => {
            debug!(op, id = %id, "place_store: no matching place");
            false
        }
        Err(e) => {
            warn!(op, error = %e, "place_store: write failed");
            false
        }
    }
}
