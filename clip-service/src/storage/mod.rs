//! Local filesystem blob store.
//!
//! Blobs are opaque byte sequences stored one-per-file under a generated
//! storage key. The store knows nothing about ownership or metadata. Writes
//! go to a hidden temp file first and are renamed into place, so a reader
//! never observes partially written content and replacement is atomic.
use std::path::PathBuf;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Open a store rooted at `root`, creating the directory if absent
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Whether `key` is a safe single-component file name.
    ///
    /// All stored keys are server-generated and pass this by construction;
    /// the check also guards the public blob route, which receives the key
    /// from the URL path.
    pub fn valid_key(key: &str) -> bool {
        !key.is_empty()
            && !key.starts_with('.')
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'_'))
    }

    /// Absolute path of the blob for `key`. Used by the thumbnail deriver,
    /// which hands paths to the extraction tool.
    pub fn content_path(&self, key: &str) -> Result<PathBuf> {
        if !Self::valid_key(key) {
            return Err(AppError::Storage(format!("invalid storage key {key:?}")));
        }
        Ok(self.root.join(key))
    }

    /// Write a chunk stream to `key`.
    ///
    /// Existing content at `key` stays fully readable until the new content
    /// is complete; a failed write leaves no temp file behind and never
    /// touches the previous blob. Returns the number of bytes written.
    pub async fn put<S>(&self, key: &str, mut stream: S) -> Result<u64>
    where
        S: Stream<Item = Result<Bytes>> + Unpin,
    {
        let final_path = self.content_path(key)?;
        let tmp_path = self.root.join(format!(".{key}.part"));

        let mut file = fs::File::create(&tmp_path).await?;
        let mut written: u64 = 0;

        let outcome = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            file.sync_all().await?;
            Ok::<(), AppError>(())
        }
        .await;

        drop(file);

        match outcome {
            Ok(()) => {
                if let Err(e) = fs::rename(&tmp_path, &final_path).await {
                    let _ = fs::remove_file(&tmp_path).await;
                    return Err(e.into());
                }
                Ok(written)
            }
            Err(e) => {
                let _ = fs::remove_file(&tmp_path).await;
                Err(e)
            }
        }
    }

    /// Read the full blob at `key`
    pub async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.content_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the blob at `key`. Deleting a non-existent key is not an error.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let path = self.content_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunks(parts: &[&[u8]]) -> impl Stream<Item = Result<Bytes>> + Unpin {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::copy_from_slice(p)))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(dir.path()).await.unwrap();

        let written = store
            .put("1700000000000-000000001", chunks(&[b"hello ", b"world"]))
            .await
            .unwrap();
        assert_eq!(written, 11);

        let data = store.get("1700000000000-000000001").await.unwrap();
        assert_eq!(&data[..], b"hello world");
    }

    #[tokio::test]
    async fn test_put_replaces_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(dir.path()).await.unwrap();

        store.put("key-1", chunks(&[b"old"])).await.unwrap();
        store.put("key-1", chunks(&[b"new content"])).await.unwrap();

        assert_eq!(&store.get("key-1").await.unwrap()[..], b"new content");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(dir.path()).await.unwrap();
        assert!(matches!(store.get("absent").await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(dir.path()).await.unwrap();

        store.put("key-2", chunks(&[b"data"])).await.unwrap();
        store.delete("key-2").await.unwrap();
        store.delete("key-2").await.unwrap();
        assert!(matches!(store.get("key-2").await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_failed_stream_leaves_no_residue() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::open(dir.path()).await.unwrap();

        let failing = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(AppError::Validation("client disconnected".to_string())),
        ]);
        assert!(store.put("key-3", failing).await.is_err());

        assert!(matches!(store.get("key-3").await, Err(AppError::NotFound)));
        let mut entries = std::fs::read_dir(dir.path()).unwrap();
        assert!(entries.next().is_none(), "temp file left behind");
    }

    #[test]
    fn test_key_validation() {
        assert!(BlobStore::valid_key("1700000000000-000000001"));
        assert!(BlobStore::valid_key("1700000000000-000000001.jpg"));
        assert!(!BlobStore::valid_key(""));
        assert!(!BlobStore::valid_key("../etc/passwd"));
        assert!(!BlobStore::valid_key("a/b"));
        assert!(!BlobStore::valid_key("a\\b"));
        assert!(!BlobStore::valid_key(".hidden"));
        assert!(!BlobStore::valid_key("spaced name"));
    }
}
