//! Blob store for uploaded audio
//!
//! Objects are addressed by bucket + relative path. The local implementation
//! keeps them under `<root>/<bucket>/<path>` and hands out URLs served by the
//! `/storage` route.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("The resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Object storage seam used by the upload handler
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write a new object; never overwrites an existing one
    async fn put(&self, bucket: &str, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError>;

    /// Delete an object; deleting a missing object succeeds
    async fn remove(&self, bucket: &str, path: &str) -> Result<(), StorageError>;

    /// Public URL under which the object can be fetched
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Directory to serve at `/storage`, when the store is local
    fn local_root(&self) -> Option<&Path> {
        None
    }
}

/// Filesystem-backed blob store
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn object_path(&self, bucket: &str, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let is_plain = |p: &Path| {
            !p.as_os_str().is_empty() && p.components().all(|c| matches!(c, Component::Normal(_)))
        };
        if !is_plain(Path::new(bucket)) || !is_plain(relative) {
            return Err(StorageError::InvalidPath(format!("{bucket}/{path}")));
        }
        Ok(self.root.join(bucket).join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, bucket: &str, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StorageError> {
        let target = self.object_path(bucket, path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(format!("{bucket}/{path}")));
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = write_all(&mut file, bytes).await {
            drop(file);
            let _ = tokio::fs::remove_file(&target).await;
            return Err(e.into());
        }

        debug!("Stored {}/{} ({} bytes, {})", bucket, path, bytes.len(), content_type);
        Ok(())
    }

    async fn remove(&self, bucket: &str, path: &str) -> Result<(), StorageError> {
        let target = self.object_path(bucket, path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/{}/{}", self.public_base_url, bucket, path)
    }

    fn local_root(&self) -> Option<&Path> {
        Some(&self.root)
    }
}

async fn write_all(file: &mut tokio::fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

/// Storage path of a new upload: `uploads/<unix-millis>_<sanitized name>`
pub fn upload_path(file_name: &str, unix_millis: i64) -> String {
    format!("uploads/{}_{}", unix_millis, sanitize_file_name(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("my clip (1).wav"), "my_clip__1_.wav");
        assert_eq!(sanitize_file_name("ok-name.MP3"), "ok-name.MP3");
        assert_eq!(sanitize_file_name("ږغ.wav"), "__.wav");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
    }

    #[test]
    fn test_upload_path_is_timestamp_prefixed() {
        assert_eq!(upload_path("a b.wav", 1700000000123), "uploads/1700000000123_a_b.wav");
    }

    #[tokio::test]
    async fn test_put_remove_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:5740/");

        store.put("audio-files", "uploads/1_a.wav", b"RIFF", "audio/wav").await.unwrap();
        let stored = dir.path().join("audio-files/uploads/1_a.wav");
        assert_eq!(std::fs::read(&stored).unwrap(), b"RIFF");
        assert_eq!(
            store.public_url("audio-files", "uploads/1_a.wav"),
            "http://localhost:5740/storage/audio-files/uploads/1_a.wav"
        );

        store.remove("audio-files", "uploads/1_a.wav").await.unwrap();
        assert!(!stored.exists());
        // Removing again is fine
        store.remove("audio-files", "uploads/1_a.wav").await.unwrap();
    }

    #[tokio::test]
    async fn test_put_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost");

        store.put("b", "uploads/x.wav", b"first", "audio/wav").await.unwrap();
        let err = store.put("b", "uploads/x.wav", b"second", "audio/wav").await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
        assert_eq!(std::fs::read(dir.path().join("b/uploads/x.wav")).unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost");

        let err = store.put("b", "../outside.wav", b"x", "audio/wav").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
        let err = store.put("b", "/abs.wav", b"x", "audio/wav").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
    }
}
