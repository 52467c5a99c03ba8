use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

use crate::models::MediaFile;

/// Public URL prefix under which stored images are served.
pub const PUBLIC_PREFIX: &str = "/uploads/images";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid file name: {0}")]
    InvalidName(String),
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// StorageService
///
/// Contract for the media store. Handlers only ever see this trait, so the disk-backed
/// store used in deployments and the in-memory mock used in tests are interchangeable.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the directories the store writes into. Safe to call repeatedly.
    async fn ensure_directories(&self) -> Result<(), StorageError>;

    /// Stores an image under a freshly generated unique name.
    ///
    /// `original_name` only contributes its extension; `content_type` is the
    /// already-validated `image/*` type of the upload.
    async fn save(
        &self,
        original_name: Option<&str>,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<MediaFile, StorageError>;

    /// Every stored file, newest first.
    async fn list(&self) -> Result<Vec<MediaFile>, StorageError>;

    async fn stat(&self, name: &str) -> Result<MediaFile, StorageError>;

    async fn delete(&self, name: &str) -> Result<(), StorageError>;
}

/// StorageState
///
/// The storage service as shared through `AppState`.
pub type StorageState = Arc<dyn StorageService>;

/// validate_name
///
/// Stored names are flat: anything that could walk out of the images directory is
/// rejected rather than cleaned up.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Builds `<uuid>.<ext>`, taking the extension from the client's file name and falling
/// back to the MIME subtype.
pub fn generate_name(original_name: Option<&str>, content_type: &str) -> String {
    let from_name = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let from_type = content_type
        .split_once('/')
        .map(|(_, subtype)| subtype.split(['+', ';']).next().unwrap_or(subtype))
        .map(str::to_ascii_lowercase);

    let extension = from_name
        .or(from_type)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string());
    format!("{}.{}", Uuid::new_v4(), extension)
}

/// Best-effort MIME type from a stored name.
pub fn content_type_for(name: &str) -> &'static str {
    let extension = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

fn media_file(name: &str, size: u64, content_type: &str, created_at: DateTime<Utc>) -> MediaFile {
    MediaFile {
        id: name.to_string(),
        name: name.to_string(),
        url: format!("{PUBLIC_PREFIX}/{name}"),
        size,
        content_type: content_type.to_string(),
        created_at,
    }
}

/// LocalDiskStorage
///
/// Writes uploads to `<upload_dir>/images`. The router serves `<upload_dir>` at
/// `/uploads`, which makes every stored file reachable at its `url`.
#[derive(Clone, Debug)]
pub struct LocalDiskStorage {
    images_dir: PathBuf,
}

impl LocalDiskStorage {
    pub fn new(upload_dir: impl AsRef<Path>) -> Self {
        Self {
            images_dir: upload_dir.as_ref().join("images"),
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    async fn describe(&self, name: &str) -> Result<MediaFile, StorageError> {
        let metadata = match fs::metadata(self.images_dir.join(name)).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Err(StorageError::NotFound(name.to_string())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(name.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        let created_at = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        Ok(media_file(
            name,
            metadata.len(),
            content_type_for(name),
            created_at,
        ))
    }
}

#[async_trait]
impl StorageService for LocalDiskStorage {
    async fn ensure_directories(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.images_dir).await?;
        Ok(())
    }

    async fn save(
        &self,
        original_name: Option<&str>,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<MediaFile, StorageError> {
        let name = generate_name(original_name, content_type);
        fs::create_dir_all(&self.images_dir).await?;
        fs::write(self.images_dir.join(&name), bytes).await?;
        tracing::info!(file = %name, size = bytes.len(), "stored upload");
        Ok(media_file(&name, bytes.len() as u64, content_type, Utc::now()))
    }

    async fn list(&self) -> Result<Vec<MediaFile>, StorageError> {
        let mut entries = match fs::read_dir(&self.images_dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            match self.describe(&name).await {
                Ok(file) => files.push(file),
                // Subdirectories and files that vanished mid-listing.
                Err(StorageError::NotFound(_)) => continue,
                Err(err) => return Err(err),
            }
        }
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.name.cmp(&b.name)));
        Ok(files)
    }

    async fn stat(&self, name: &str) -> Result<MediaFile, StorageError> {
        validate_name(name)?;
        self.describe(name).await
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        validate_name(name)?;
        match fs::remove_file(self.images_dir.join(name)).await {
            Ok(()) => {
                tracing::info!(file = %name, "deleted upload");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// MockStorageService
///
/// In-memory `StorageService` for tests. `new_failing` makes every operation fail
/// as if the disk were unavailable.
#[derive(Default)]
pub struct MockStorageService {
    pub should_fail: bool,
    files: Mutex<BTreeMap<String, MediaFile>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    fn files(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, MediaFile>>, StorageError> {
        if self.should_fail {
            return Err(StorageError::Unavailable(
                "Mock Storage Error: Simulation requested".to_string(),
            ));
        }
        self.files
            .lock()
            .map_err(|_| StorageError::Unavailable("mock storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_directories(&self) -> Result<(), StorageError> {
        self.files().map(|_| ())
    }

    async fn save(
        &self,
        original_name: Option<&str>,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<MediaFile, StorageError> {
        let mut files = self.files()?;
        let name = generate_name(original_name, content_type);
        let file = media_file(&name, bytes.len() as u64, content_type, Utc::now());
        files.insert(name, file.clone());
        Ok(file)
    }

    async fn list(&self) -> Result<Vec<MediaFile>, StorageError> {
        let mut files: Vec<MediaFile> = self.files()?.values().cloned().collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.name.cmp(&b.name)));
        Ok(files)
    }

    async fn stat(&self, name: &str) -> Result<MediaFile, StorageError> {
        validate_name(name)?;
        self.files()?
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        validate_name(name)?;
        self.files()?
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }
}
