use gcx_cms::{
    LocalDiskStorage, MockStorageService,
    storage::{
        PUBLIC_PREFIX, StorageError, StorageService, content_type_for, generate_name,
        validate_name,
    },
};
use tempfile::tempdir;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[test]
fn test_validate_name_rejects_path_tricks() {
    assert!(validate_name("3f2a.png").is_ok());
    for bad in ["", "..", "../etc/passwd", "a/b.png", "a\\b.png", "x..png"] {
        assert!(
            matches!(validate_name(bad), Err(StorageError::InvalidName(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn test_generated_names_keep_a_safe_extension() {
    let from_file = generate_name(Some("Logo.PNG"), "image/png");
    assert!(from_file.ends_with(".png"));
    assert_eq!(from_file.len(), 36 + ".png".len());

    assert!(generate_name(None, "image/svg+xml").ends_with(".svg"));
    assert!(generate_name(Some("weird.p?g"), "image/jpeg").ends_with(".bin"));
    assert_ne!(
        generate_name(Some("a.png"), "image/png"),
        generate_name(Some("a.png"), "image/png")
    );
}

#[test]
fn test_content_type_from_extension() {
    assert_eq!(content_type_for("a.JPG"), "image/jpeg");
    assert_eq!(content_type_for("a.webp"), "image/webp");
    assert_eq!(content_type_for("noext"), "application/octet-stream");
}

#[tokio::test]
async fn test_disk_storage_round_trip() {
    let dir = tempdir().expect("temp dir");
    let storage = LocalDiskStorage::new(dir.path());
    storage.ensure_directories().await.unwrap();
    assert!(storage.images_dir().is_dir());

    let saved = storage
        .save(Some("chart.png"), "image/png", PNG_BYTES)
        .await
        .unwrap();
    assert_eq!(saved.id, saved.name);
    assert_eq!(saved.url, format!("{PUBLIC_PREFIX}/{}", saved.name));
    assert_eq!(saved.size, PNG_BYTES.len() as u64);
    assert_eq!(
        std::fs::read(storage.images_dir().join(&saved.name)).unwrap(),
        PNG_BYTES
    );

    let stat = storage.stat(&saved.name).await.unwrap();
    assert_eq!(stat.content_type, "image/png");
    assert_eq!(stat.size, saved.size);

    let listed = storage.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, saved.name);

    storage.delete(&saved.name).await.unwrap();
    assert!(storage.list().await.unwrap().is_empty());
    assert!(matches!(
        storage.delete(&saved.name).await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_disk_listing_skips_directories_and_tolerates_missing_root() {
    let dir = tempdir().expect("temp dir");
    let storage = LocalDiskStorage::new(dir.path().join("not-created-yet"));
    assert!(storage.list().await.unwrap().is_empty());

    storage.ensure_directories().await.unwrap();
    std::fs::create_dir(storage.images_dir().join("thumbs")).unwrap();
    storage.save(None, "image/gif", b"GIF89a").await.unwrap();

    let listed = storage.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].name.ends_with(".gif"));

    assert!(matches!(
        storage.stat("thumbs").await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_disk_storage_refuses_escaping_names() {
    let dir = tempdir().expect("temp dir");
    std::fs::write(dir.path().join("secret.txt"), b"keep out").unwrap();
    let storage = LocalDiskStorage::new(dir.path());
    storage.ensure_directories().await.unwrap();

    assert!(matches!(
        storage.stat("../secret.txt").await,
        Err(StorageError::InvalidName(_))
    ));
    assert!(matches!(
        storage.delete("../secret.txt").await,
        Err(StorageError::InvalidName(_))
    ));
    assert!(dir.path().join("secret.txt").exists());
}

#[tokio::test]
async fn test_mock_storage_behaves_like_disk() {
    let storage = MockStorageService::new();
    let saved = storage.save(Some("a.jpg"), "image/jpeg", b"jpeg").await.unwrap();

    assert_eq!(storage.stat(&saved.id).await.unwrap().size, 4);
    assert_eq!(storage.list().await.unwrap().len(), 1);
    storage.delete(&saved.id).await.unwrap();
    assert!(matches!(
        storage.stat(&saved.id).await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_failing_mock_reports_unavailable() {
    let storage = MockStorageService::new_failing();
    assert!(matches!(
        storage.save(None, "image/png", PNG_BYTES).await,
        Err(StorageError::Unavailable(_))
    ));
    assert!(matches!(
        storage.list().await,
        Err(StorageError::Unavailable(_))
    ));
}
