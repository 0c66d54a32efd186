use crate::model::{Emotion, Place};
use crate::store::fs_backend::FsBackend;
use crate::store::fs_media::FsMediaStore;
use crate::store::mem_backend::DEFAULT_MEM_QUOTA;
use crate::store::{MEDIA_DIR, RECORDS_DIR};
use chrono::{TimeZone, Utc};
use std::path::PathBuf;
use tempfile::TempDir;

/// A complete place with no attachments. Serializes to well under 400 bytes.
pub fn sample_place(id: &str) -> Place {
    Place {
        id: id.to_string(),
        title: "Praia".to_string(),
        lat: -9.64,
        lng: -35.70,
        emotion: Emotion::Joy,
        description: "Areia e mar".to_string(),
        photo_ref: None,
        audio_ref: None,
        tags: vec!["mar".to_string(), "sol".to_string()],
        created_at: Utc
            .with_ymd_and_hms(2024, 3, 1, 10, 0, 0)
            .single()
            .unwrap_or_default(),
        critical_characteristics: None,
        what_would_change: "Mais sombra".to_string(),
        space_perception: None,
    }
}

pub struct TestEnv {
    // Kept so the directory outlives the test.
    pub _temp_dir: TempDir,
    pub root: PathBuf,
    pub records: FsBackend,
    pub media: FsMediaStore,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let records = FsBackend::new(root.join(RECORDS_DIR), DEFAULT_MEM_QUOTA);
        let media = FsMediaStore::new(root.join(MEDIA_DIR));
        Self {
            _temp_dir: temp_dir,
            root,
            records,
            media,
        }
    }
}
