//! # API Facade
//!
//! [`MeuLugarApi`] is the application context: built once at startup, it owns
//! both storage media and is passed to whatever front end drives the journal.
//! No module-level singletons; tests build their own with in-memory backends.
//!
//! ## Two Kinds of Operation
//!
//! - **Delegates** (`list_places`, `add_place`, `export_data`, `save_media`, ...)
//!   forward to a single store and keep that store's return convention.
//! - **Workflows** (`submit_place`, `remove_place`, `import_into`, `clear_into`,
//!   `sweep_orphan_media`) span both media and keep a [`PlaceProjection`] in
//!   step with what was written.
//!
//! ## Ordering Across Media
//!
//! The two media have no shared transaction. `submit_place` writes attachments
//! first and the place record last, so a record never points at a blob that
//! failed to save. Attachment keys are derived from the place id, so an edit
//! overwrites the blob the stored record already points at. When the record
//! write then fails, the previous blobs are put back (or removed, for a new
//! place). A rollback that itself fails is logged; leftover blobs with no
//! record are what [`MeuLugarApi::sweep_orphan_media`] cleans up.
//!
//! ## What the API Does NOT Do
//!
//! - **I/O to the user**: no stdout, no prompts. Destructive calls
//!   (`clear_all`, `remove_place`) are confirmed by the caller.
//! - **Formatting**: returns data, not strings (export text aside).
//!
//! ## Generic Over Both Media
//!
//! - Production: `MeuLugarApi<FsBackend, FsMediaStore>` via [`MeuLugarApi::open`]
//! - Testing: `MeuLugarApi<MemBackend, MemMediaStore>`

use crate::codec::{self, ImportSummary};
use crate::config::MeuLugarConfig;
use crate::draft::PlaceDraft;
use crate::error::Result;
use crate::model::{self, media_key, parse_media_key, MediaRole, Place, Portfolio};
use crate::projection::PlaceProjection;
use crate::store::fs_backend::FsBackend;
use crate::store::fs_media::FsMediaStore;
use crate::store::{MediaStore, PlaceStore, RecordBackend, MEDIA_DIR, RECORDS_DIR};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub struct MeuLugarApi<B: RecordBackend, M: MediaStore> {
    store: PlaceStore<B>,
    media: M,
    cascade_media_delete: bool,
}

impl MeuLugarApi<FsBackend, FsMediaStore> {
    /// Open the filesystem-backed stores under the configured data directory.
    pub fn open(config: &MeuLugarConfig) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let records = FsBackend::new(data_dir.join(RECORDS_DIR), config.record_quota_bytes);
        let media = FsMediaStore::new(data_dir.join(MEDIA_DIR))
            .with_max_blob_bytes(config.media_max_bytes);
        info!(data_dir = %data_dir.display(), "api: opened stores");
        Ok(Self::new(records, media).with_cascade_media_delete(config.cascade_media_delete))
    }
}

impl<B: RecordBackend, M: MediaStore> MeuLugarApi<B, M> {
    pub fn new(records: B, media: M) -> Self {
        Self {
            store: PlaceStore::with_backend(records),
            media,
            cascade_media_delete: false,
        }
    }

    /// When set, [`remove_place`](Self::remove_place) also deletes the
    /// place's attachments.
    pub fn with_cascade_media_delete(mut self, cascade: bool) -> Self {
        self.cascade_media_delete = cascade;
        self
    }

    pub fn store(&self) -> &PlaceStore<B> {
        &self.store
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// A projection loaded from the current record store.
    pub fn load_projection(&self) -> PlaceProjection {
        PlaceProjection::load(&self.store)
    }

    // --- Record delegates ---

    pub fn list_places(&self) -> Vec<Place> {
        self.store.list_places()
    }

    pub fn get_place(&self, id: &str) -> Option<Place> {
        self.store.get_place(id)
    }

    pub fn add_place(&self, place: &Place) -> bool {
        self.store.add_place(place)
    }

    pub fn update_place(&self, place: &Place) -> bool {
        self.store.update_place(place)
    }

    pub fn delete_place(&self, id: &str) -> bool {
        self.store.delete_place(id)
    }

    pub fn clear_all(&self) -> bool {
        self.store.clear_all()
    }

    pub fn get_portfolio(&self) -> Option<Portfolio> {
        self.store.get_portfolio()
    }

    pub fn save_portfolio(&self, portfolio: &Portfolio) -> bool {
        self.store.save_portfolio(portfolio)
    }

    pub fn get_settings(&self) -> Option<Value> {
        self.store.get_settings()
    }

    pub fn save_settings(&self, settings: &Value) -> bool {
        self.store.save_settings(settings)
    }

    // --- Codec delegates ---

    pub fn export_data(&self) -> Result<String> {
        codec::export_data(&self.store)
    }

    pub fn import_data(&self, text: &str) -> bool {
        codec::import_data(&self.store, text)
    }

    pub fn try_import_data(&self, text: &str) -> Result<ImportSummary> {
        codec::try_import_data(&self.store, text)
    }

    // --- Attachment delegates ---

    pub async fn save_media(&self, key: &str, data: &[u8]) -> Result<()> {
        self.media.save_media(key, data).await
    }

    pub async fn get_media(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.media.get_media(key).await
    }

    pub async fn delete_media(&self, key: &str) -> Result<()> {
        self.media.delete_media(key).await
    }

    pub fn generate_id(&self) -> String {
        model::generate_id()
    }

    // --- Workflows ---

    /// Create a place from `draft`, or update `editing` with it.
    ///
    /// Attachments in the draft are saved before the record. A draft without a
    /// new photo or audio keeps the reference already on `editing`. If an
    /// attachment save or the record write fails, the attachments revert.
    pub async fn submit_place(
        &self,
        mut draft: PlaceDraft,
        editing: Option<&Place>,
        projection: &mut PlaceProjection,
    ) -> Result<Place> {
        draft.validate()?;

        let (id, created_at) = match editing {
            Some(existing) => (existing.id.clone(), existing.created_at),
            None => (model::generate_id(), Utc::now()),
        };

        let mut photo_ref = editing.and_then(|p| p.photo_ref.clone());
        let mut audio_ref = editing.and_then(|p| p.audio_ref.clone());

        // Blobs overwritten so far, with what they held before.
        let mut replaced: Vec<(String, Option<Vec<u8>>)> = Vec::new();
        let uploads = [
            (MediaRole::Photo, draft.photo.take()),
            (MediaRole::Audio, draft.audio.take()),
        ];
        for (role, bytes) in uploads {
            let Some(bytes) = bytes else { continue };
            match self.save_attachment(role, &id, &bytes).await {
                Ok((key, previous)) => {
                    match role {
                        MediaRole::Photo => photo_ref = Some(key.clone()),
                        MediaRole::Audio => audio_ref = Some(key.clone()),
                    }
                    replaced.push((key, previous));
                }
                Err(e) => {
                    self.restore_attachments(replaced).await;
                    return Err(e);
                }
            }
        }

        let written = draft
            .into_place(id, created_at, photo_ref, audio_ref)
            .and_then(|place| {
                if editing.is_some() {
                    self.store.try_update_place(&place)?;
                } else {
                    self.store.try_add_place(&place)?;
                }
                Ok(place)
            });
        let place = match written {
            Ok(place) => place,
            Err(e) => {
                self.restore_attachments(replaced).await;
                return Err(e);
            }
        };

        if editing.is_some() {
            projection.place_updated(place.clone());
        } else {
            projection.place_added(place.clone());
        }
        info!(id = %place.id, edit = editing.is_some(), "api: place submitted");
        Ok(place)
    }

    /// Save an attachment under its derived key, returning the key and the
    /// bytes it replaced.
    async fn save_attachment(
        &self,
        role: MediaRole,
        place_id: &str,
        bytes: &[u8],
    ) -> Result<(String, Option<Vec<u8>>)> {
        let key = media_key(role, place_id);
        let previous = self.media.get_media(&key).await?;
        self.media.save_media(&key, bytes).await?;
        debug!(key = %key, size = bytes.len(), "api: attachment saved");
        Ok((key, previous))
    }

    async fn restore_attachments(&self, replaced: Vec<(String, Option<Vec<u8>>)>) {
        for (key, previous) in replaced {
            let restored = match previous {
                Some(bytes) => self.media.save_media(&key, &bytes).await,
                None => self.media.delete_media(&key).await,
            };
            match restored {
                Ok(()) => debug!(key = %key, "api: attachment rolled back"),
                Err(e) => warn!(key = %key, error = %e, "api: attachment rollback failed"),
            }
        }
    }

    /// Delete a place and drop it from `projection`. Returns `false` when
    /// nothing was deleted.
    ///
    /// Attachments are deleted too when cascading is configured; a failed
    /// attachment delete is logged and leaves an orphan for the sweep.
    pub async fn remove_place(&self, id: &str, projection: &mut PlaceProjection) -> bool {
        let existing = self.store.get_place(id);
        if !self.store.delete_place(id) {
            return false;
        }
        projection.place_deleted(id);

        if self.cascade_media_delete {
            if let Some(place) = existing {
                for role in MediaRole::ALL {
                    if let Some(key) = place.media_ref(role) {
                        if let Err(e) = self.media.delete_media(key).await {
                            warn!(key, error = %e, "api: attachment delete failed");
                        }
                    }
                }
            }
        }
        true
    }

    /// Import a document and reload `projection` from the result.
    pub fn import_into(&self, text: &str, projection: &mut PlaceProjection) -> bool {
        let imported = codec::import_data(&self.store, text);
        projection.reload(&self.store);
        imported
    }

    /// Wipe every record slot and reload `projection`. Attachments stay.
    pub fn clear_into(&self, projection: &mut PlaceProjection) -> bool {
        let cleared = self.store.clear_all();
        projection.reload(&self.store);
        cleared
    }

    /// Delete attachments whose place no longer exists or no longer refers to
    /// them. Keys that do not follow the `<role>_<placeId>` scheme are left
    /// alone. Returns the deleted keys.
    pub async fn sweep_orphan_media(&self) -> Result<Vec<String>> {
        let places = self.store.try_list_places()?;
        let referenced: HashSet<&str> = places
            .iter()
            .flat_map(|p| MediaRole::ALL.into_iter().filter_map(move |r| p.media_ref(r)))
            .collect();

        let mut removed = Vec::new();
        for key in self.media.list_keys().await? {
            if parse_media_key(&key).is_none() || referenced.contains(key.as_str()) {
                continue;
            }
            self.media.delete_media(&key).await?;
            removed.push(key);
        }
        if !removed.is_empty() {
            info!(count = removed.len(), "api: orphan attachments removed");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Emotion;
    use crate::store::mem_backend::MemBackend;
    use crate::store::mem_media::MemMediaStore;
    use crate::test_utils::{sample_place, TestEnv};

    fn make_api() -> MeuLugarApi<MemBackend, MemMediaStore> {
        MeuLugarApi::new(MemBackend::new(), MemMediaStore::new())
    }

    fn draft() -> PlaceDraft {
        PlaceDraft {
            title: "Praia".to_string(),
            description: "Areia".to_string(),
            what_would_change: "Mais sombra".to_string(),
            emotion: Emotion::Calm,
            lat: Some(-9.64),
            lng: Some(-35.70),
            ..PlaceDraft::default()
        }
    }

    #[tokio::test]
    async fn test_submit_new_place_saves_media_then_record() {
        let api = make_api();
        let mut projection = api.load_projection();
        let mut d = draft();
        d.photo = Some(vec![1, 2, 3]);

        let place = api.submit_place(d, None, &mut projection).await.unwrap();
        let key = media_key(MediaRole::Photo, &place.id);
        assert_eq!(place.photo_ref.as_deref(), Some(key.as_str()));
        assert!(place.audio_ref.is_none());
        assert_eq!(api.get_media(&key).await.unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(api.list_places(), vec![place.clone()]);
        assert_eq!(projection.places(), &[place]);
    }

    #[tokio::test]
    async fn test_edit_without_new_media_keeps_refs() {
        let api = make_api();
        let mut projection = api.load_projection();
        let mut d = draft();
        d.photo = Some(vec![9]);
        d.audio = Some(vec![8]);
        let original = api.submit_place(d, None, &mut projection).await.unwrap();

        let mut edit = PlaceDraft::from_place(&original);
        edit.title = "Praia do Francês".to_string();
        let edited = api
            .submit_place(edit, Some(&original), &mut projection)
            .await
            .unwrap();

        assert_eq!(edited.id, original.id);
        assert_eq!(edited.created_at, original.created_at);
        assert_eq!(edited.photo_ref, original.photo_ref);
        assert_eq!(edited.audio_ref, original.audio_ref);
        assert_eq!(api.list_places().len(), 1);
        assert_eq!(projection.get(&original.id).unwrap().title, "Praia do Francês");
    }

    #[tokio::test]
    async fn test_failed_media_save_writes_no_record() {
        let api = make_api();
        let mut projection = api.load_projection();
        api.media().set_simulate_write_error(true);
        let mut d = draft();
        d.audio = Some(vec![1]);

        assert!(api.submit_place(d, None, &mut projection).await.is_err());
        assert!(api.list_places().is_empty());
        assert!(projection.is_empty());
    }

    #[tokio::test]
    async fn test_failed_edit_restores_previous_attachment() {
        let api = make_api();
        let mut projection = api.load_projection();
        let mut d = draft();
        d.photo = Some(vec![1, 1]);
        let original = api.submit_place(d, None, &mut projection).await.unwrap();
        let key = media_key(MediaRole::Photo, &original.id);

        // The record goes away underneath a pending edit.
        assert!(api.store().delete_place(&original.id));
        let mut edit = PlaceDraft::from_place(&original);
        edit.photo = Some(vec![2, 2]);
        edit.audio = Some(vec![3]);

        let result = api.submit_place(edit, Some(&original), &mut projection).await;
        assert!(result.is_err());
        assert_eq!(api.get_media(&key).await.unwrap(), Some(vec![1, 1]));
        let audio_key = media_key(MediaRole::Audio, &original.id);
        assert_eq!(api.get_media(&audio_key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_add_removes_new_attachments() {
        let api = MeuLugarApi::new(MemBackend::with_quota(10), MemMediaStore::new());
        let mut projection = api.load_projection();
        let mut d = draft();
        d.photo = Some(vec![4, 5, 6]);

        assert!(api.submit_place(d, None, &mut projection).await.is_err());
        assert!(api.list_places().is_empty());
        assert!(api.media().list_keys().await.unwrap().is_empty());
        assert!(projection.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_draft_writes_nothing() {
        let api = make_api();
        let mut projection = api.load_projection();
        let mut d = draft();
        d.title = "  ".to_string();
        d.photo = Some(vec![1]);

        assert!(api.submit_place(d, None, &mut projection).await.is_err());
        assert!(api.media().list_keys().await.unwrap().is_empty());
        assert!(api.list_places().is_empty());
    }

    #[tokio::test]
    async fn test_remove_place_keeps_media_by_default() {
        let api = make_api();
        let mut projection = api.load_projection();
        let mut d = draft();
        d.photo = Some(vec![1]);
        let place = api.submit_place(d, None, &mut projection).await.unwrap();

        assert!(api.remove_place(&place.id, &mut projection).await);
        assert!(projection.is_empty());
        let key = place.photo_ref.unwrap();
        assert!(api.get_media(&key).await.unwrap().is_some());

        assert!(!api.remove_place(&place.id, &mut projection).await);
    }

    #[tokio::test]
    async fn test_remove_place_cascades_when_configured() {
        let api = make_api().with_cascade_media_delete(true);
        let mut projection = api.load_projection();
        let mut d = draft();
        d.photo = Some(vec![1]);
        d.audio = Some(vec![2]);
        let place = api.submit_place(d, None, &mut projection).await.unwrap();

        assert!(api.remove_place(&place.id, &mut projection).await);
        assert!(api.media().list_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_removes_only_unreferenced_keys() {
        let api = make_api();
        let mut kept = sample_place("kept");
        kept.photo_ref = Some(media_key(MediaRole::Photo, "kept"));
        api.add_place(&kept);

        api.save_media("photo_kept", b"a").await.unwrap();
        api.save_media("audio_kept", b"b").await.unwrap();
        api.save_media("photo_gone", b"c").await.unwrap();
        api.save_media("thumbnail", b"d").await.unwrap();

        let removed = api.sweep_orphan_media().await.unwrap();
        assert_eq!(removed, vec!["audio_kept", "photo_gone"]);
        assert_eq!(
            api.media().list_keys().await.unwrap(),
            vec!["photo_kept", "thumbnail"]
        );
    }

    #[test]
    fn test_import_into_and_clear_into_reload_projection() {
        let api = make_api();
        api.add_place(&sample_place("old"));
        let mut projection = api.load_projection();

        let doc = serde_json::json!({
            "places": [serde_json::to_value(sample_place("new")).unwrap()]
        });
        assert!(api.import_into(&doc.to_string(), &mut projection));
        assert_eq!(projection.places(), api.list_places().as_slice());
        assert_eq!(projection.places()[0].id, "new");

        assert!(!api.import_into("{}", &mut projection));
        assert_eq!(projection.len(), 1);

        assert!(api.clear_into(&mut projection));
        assert!(projection.is_empty());
    }

    #[tokio::test]
    async fn test_submit_on_filesystem_stores() {
        let env = TestEnv::new();
        let root = env.root.clone();
        let api = MeuLugarApi::new(env.records, env.media);
        let mut projection = api.load_projection();
        let mut d = draft();
        d.audio = Some(b"OggS".to_vec());

        let place = api.submit_place(d, None, &mut projection).await.unwrap();
        let blob = root.join(MEDIA_DIR).join(format!("audio_{}.bin", place.id));
        assert!(blob.exists());
        assert!(root.join(RECORDS_DIR).join("meu-lugar-places.json").exists());
        assert_eq!(api.list_places(), vec![place]);
    }

    #[test]
    fn test_generate_id_is_unique() {
        let api = make_api();
        assert_ne!(api.generate_id(), api.generate_id());
    }
}
