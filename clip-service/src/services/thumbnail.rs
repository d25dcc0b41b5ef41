//! Thumbnail derivation.
//!
//! Extracts a single representative frame from a stored clip by invoking an
//! external `ffmpeg` process, writing the result as a sibling blob. This is
//! the only place in the system that shells out; everything else does its
//! I/O in-process. The child is awaited asynchronously under a bounded
//! timeout, so a wedged extraction never stalls unrelated requests.
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::config::ThumbnailConfig;
use crate::error::{AppError, Result};
use crate::storage::BlobStore;

/// Deterministic thumbnail key for a source key
pub fn thumbnail_key(source_key: &str) -> String {
    format!("{source_key}.jpg")
}

pub struct ThumbnailService {
    config: ThumbnailConfig,
    store: Arc<BlobStore>,
}

impl ThumbnailService {
    pub fn new(config: ThumbnailConfig, store: Arc<BlobStore>) -> Self {
        Self { config, store }
    }

    /// Extract one frame from the blob at `source_key` and store it under
    /// the derived key, which is returned.
    ///
    /// Any failure mode — undecodable or empty source, abnormal exit, spawn
    /// failure, timeout — yields [`AppError::Transcode`] carrying the tool's
    /// trailing diagnostic. A partial output blob is removed best-effort.
    pub async fn derive(&self, source_key: &str) -> Result<String> {
        let source = self.store.content_path(source_key)?;
        let key = thumbnail_key(source_key);
        let target = self.store.content_path(&key)?;

        let mut cmd = Command::new(&self.config.ffmpeg_bin);
        cmd.arg("-y")
            .arg("-i")
            .arg(&source)
            .arg("-frames:v")
            .arg("1")
            .arg("-vf")
            .arg(format!("scale={}:{}", self.config.width, self.config.height))
            .arg(&target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            AppError::Transcode(format!("failed to spawn {}: {e}", self.config.ffmpeg_bin))
        })?;

        let wait = timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await;

        let output = match wait {
            Ok(result) => {
                result.map_err(|e| AppError::Transcode(format!("extraction failed: {e}")))?
            }
            Err(_) => {
                // Dropping the wait future kills the child (kill_on_drop).
                let _ = self.store.delete(&key).await;
                return Err(AppError::Transcode(format!(
                    "extraction timed out after {}s",
                    self.config.timeout_secs
                )));
            }
        };

        if !output.status.success() {
            let _ = self.store.delete(&key).await;
            return Err(AppError::Transcode(format!(
                "{} exited with {}: {}",
                self.config.ffmpeg_bin,
                output.status,
                stderr_tail(&output.stderr)
            )));
        }

        debug!(%source_key, thumbnail_key = %key, "thumbnail derived");
        Ok(key)
    }
}

/// Last non-empty stderr line, the part of ffmpeg's output worth keeping
fn stderr_tail(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no diagnostic output")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;

    #[test]
    fn test_thumbnail_key_is_deterministic() {
        assert_eq!(thumbnail_key("1700000000000-000000001"), "1700000000000-000000001.jpg");
        assert_eq!(thumbnail_key("k"), "k.jpg");
    }

    #[test]
    fn test_stderr_tail_takes_last_line() {
        let tail = stderr_tail(b"frame info\nmore info\nInvalid data found\n\n");
        assert_eq!(tail, "Invalid data found");
        assert_eq!(stderr_tail(b""), "no diagnostic output");
    }

    #[tokio::test]
    async fn test_undecodable_source_is_transcode_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(BlobStore::open(dir.path()).await.unwrap());
        store
            .put(
                "garbage-clip",
                stream::iter(vec![Ok(Bytes::from_static(b"not a video stream"))]),
            )
            .await
            .unwrap();

        let service = ThumbnailService::new(
            ThumbnailConfig {
                ffmpeg_bin: "ffmpeg".to_string(),
                width: 320,
                height: 180,
                timeout_secs: 30,
            },
            store.clone(),
        );

        // Fails the same way whether ffmpeg rejects the stream or is absent.
        let err = service.derive("garbage-clip").await.unwrap_err();
        assert!(matches!(err, AppError::Transcode(_)));
        // No thumbnail blob may survive the failure.
        assert!(matches!(
            store.get("garbage-clip.jpg").await,
            Err(AppError::NotFound)
        ));
    }
}
