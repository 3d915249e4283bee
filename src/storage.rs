//! Ephemeral blob store for uploaded sources.
//!
//! One file per caller under a single directory, overwritten on each new
//! upload and removed on reset. The key is sanitized before it touches the
//! filesystem, so an opaque caller identifier can never traverse outside
//! the store's root.

use crate::error::RelayError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Caller-keyed file storage rooted at one directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, RelayError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| RelayError::Storage {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// The path a key's upload is stored at, whether or not it exists yet.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.pdf", sanitize(key)))
    }

    /// Write (or overwrite) the upload for `key`; returns the stored path.
    pub async fn put(&self, key: &str, bytes: &[u8]) -> Result<PathBuf, RelayError> {
        let path = self.path_for(key);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| RelayError::Storage {
                path: path.clone(),
                source,
            })?;
        debug!("stored {} bytes at {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Remove the upload for `key`. Absence is not an error.
    pub async fn remove(&self, key: &str) -> Result<(), RelayError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(RelayError::Storage { path, source }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Replace anything but `[A-Za-z0-9._-]` so a key stays a single path
/// component.
fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path()).unwrap();
        let path = store.put("caller-1", b"%PDF-1.4 test").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn put_overwrites_previous_upload() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path()).unwrap();
        store.put("c", b"first").await.unwrap();
        let path = store.put("c", b"second").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path()).unwrap();
        store.put("c", b"data").await.unwrap();
        store.remove("c").await.unwrap();
        store.remove("c").await.unwrap();
        assert!(!store.path_for("c").exists());
    }

    #[test]
    fn keys_cannot_escape_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path()).unwrap();
        let path = store.path_for("../../etc/passwd");
        // separators are replaced, so the key stays one component under root
        assert_eq!(path.parent(), Some(dir.path()));
    }

    #[test]
    fn sanitize_keeps_opaque_ids_readable() {
        assert_eq!(sanitize("user_42-abc.7"), "user_42-abc.7");
        assert_eq!(sanitize("a/b\\c"), "a-b-c");
    }
}
