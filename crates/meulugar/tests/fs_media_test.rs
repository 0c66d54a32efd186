use meulugar::error::LugarError;
use meulugar::store::fs_media::FsMediaStore;
use meulugar::store::MediaStore;
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, FsMediaStore) {
    let dir = TempDir::new().unwrap();
    let store = FsMediaStore::new(dir.path().join("media"));
    (dir, store)
}

#[tokio::test]
async fn test_fs_media_round_trip_is_byte_exact() {
    let (_dir, store) = setup();
    let blob: Vec<u8> = (0..=255).collect();

    store.save_media("photo_abc", &blob).await.unwrap();
    assert_eq!(store.get_media("photo_abc").await.unwrap(), Some(blob));
}

#[tokio::test]
async fn test_fs_media_absent_key_is_none() {
    let (_dir, store) = setup();
    assert_eq!(store.get_media("audio_nope").await.unwrap(), None);
    store.delete_media("audio_nope").await.unwrap();
    assert!(store.list_keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fs_media_overwrite_and_delete() {
    let (dir, store) = setup();
    store.save_media("photo_a", b"first").await.unwrap();
    store.save_media("photo_a", b"second").await.unwrap();
    assert_eq!(
        store.get_media("photo_a").await.unwrap(),
        Some(b"second".to_vec())
    );

    let on_disk = dir.path().join("media").join("photo_a.bin");
    assert!(on_disk.exists());
    store.delete_media("photo_a").await.unwrap();
    assert!(!on_disk.exists());
}

#[tokio::test]
async fn test_fs_media_leaves_no_temp_files() {
    let (dir, store) = setup();
    store.save_media("audio_x", &[7; 4096]).await.unwrap();

    for entry in fs::read_dir(dir.path().join("media")).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[tokio::test]
async fn test_fs_media_lists_sorted_keys() {
    let (_dir, store) = setup();
    for key in ["photo_b", "audio_a", "photo_a"] {
        store.save_media(key, b"x").await.unwrap();
    }
    assert_eq!(
        store.list_keys().await.unwrap(),
        vec!["audio_a", "photo_a", "photo_b"]
    );
}

#[tokio::test]
async fn test_fs_media_blob_ceiling() {
    let dir = TempDir::new().unwrap();
    let store = FsMediaStore::new(dir.path().join("media")).with_max_blob_bytes(8);

    store.save_media("photo_ok", &[0; 8]).await.unwrap();
    let err = store.save_media("photo_big", &[0; 9]).await.unwrap_err();
    assert!(matches!(err, LugarError::QuotaExceeded { needed: 9, quota: 8 }));
    assert_eq!(store.get_media("photo_big").await.unwrap(), None);
}

#[tokio::test]
async fn test_fs_media_rejects_traversal_keys() {
    let (_dir, store) = setup();
    assert!(matches!(
        store.save_media("../photo_x", b"x").await,
        Err(LugarError::InvalidKey(_))
    ));
}
