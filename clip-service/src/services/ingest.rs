//! Upload ingestion pipeline.
//!
//! Orchestrates one upload: store the blob, derive a thumbnail, commit the
//! catalog record — in that order, so a committed record always points at a
//! durably written blob. Session verification has already happened in the
//! auth middleware before any of this runs.
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use rand::Rng;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::media;
use crate::error::{AppError, Result};
use crate::models::MediaAsset;
use crate::services::thumbnail::ThumbnailService;
use crate::storage::BlobStore;

pub struct IngestService {
    pool: PgPool,
    store: Arc<BlobStore>,
    thumbnails: Arc<ThumbnailService>,
}

impl IngestService {
    pub fn new(pool: PgPool, store: Arc<BlobStore>, thumbnails: Arc<ThumbnailService>) -> Self {
        Self {
            pool,
            store,
            thumbnails,
        }
    }

    /// Run one upload through store → derive → commit.
    ///
    /// A thumbnail-derivation failure does not fail the upload: the clip is
    /// valid without it, so the record commits with `thumbnail_key = None`
    /// and the failure is logged. Every other failure aborts without a
    /// partial commit; blobs already written are cleaned up best-effort
    /// (an orphan blob is recoverable residue, a dangling record is not).
    pub async fn ingest<S>(
        &self,
        owner_id: Uuid,
        original_name: &str,
        body: S,
    ) -> Result<MediaAsset>
    where
        S: Stream<Item = Result<Bytes>> + Unpin,
    {
        let storage_key = generate_storage_key();

        let written = self.store.put(&storage_key, body).await?;

        let derived = absorb_transcode(self.thumbnails.derive(&storage_key).await, &storage_key);
        let thumbnail_key = match derived {
            Ok(key) => key,
            Err(e) => {
                let _ = self.store.delete(&storage_key).await;
                return Err(e);
            }
        };

        match media::insert_asset(
            &self.pool,
            owner_id,
            &storage_key,
            original_name,
            thumbnail_key.as_deref(),
        )
        .await
        {
            Ok(asset) => {
                info!(
                    asset_id = %asset.id,
                    %storage_key,
                    bytes = written,
                    has_thumbnail = asset.thumbnail_key.is_some(),
                    "upload committed"
                );
                Ok(asset)
            }
            Err(e) => {
                if let Some(key) = &thumbnail_key {
                    let _ = self.store.delete(key).await;
                }
                let _ = self.store.delete(&storage_key).await;
                Err(e)
            }
        }
    }
}

/// Thumbnail failure policy: a failed extraction does not sink the upload.
/// `Transcode` becomes `None` (commit without thumbnail); anything else
/// still aborts.
fn absorb_transcode(result: Result<String>, storage_key: &str) -> Result<Option<String>> {
    match result {
        Ok(key) => Ok(Some(key)),
        Err(AppError::Transcode(diag)) => {
            warn!(%storage_key, diagnostic = %diag, "thumbnail derivation failed, committing without thumbnail");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Generate a collision-resistant, filesystem-safe storage key.
///
/// Unix millis plus a random 9-digit suffix. Never derived from the
/// client-supplied filename.
pub fn generate_storage_key() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{millis}-{suffix:09}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BlobStore;
    use std::collections::HashSet;

    #[test]
    fn test_storage_key_is_filesystem_safe() {
        let key = generate_storage_key();
        assert!(BlobStore::valid_key(&key));
        assert!(BlobStore::valid_key(&crate::services::thumbnail::thumbnail_key(&key)));
    }

    #[test]
    fn test_storage_keys_are_distinct() {
        let keys: HashSet<String> = (0..100).map(|_| generate_storage_key()).collect();
        assert_eq!(keys.len(), 100);
    }

    #[test]
    fn test_transcode_failure_commits_without_thumbnail() {
        let ok = absorb_transcode(Ok("k.jpg".to_string()), "k").unwrap();
        assert_eq!(ok, Some("k.jpg".to_string()));

        let absorbed =
            absorb_transcode(Err(AppError::Transcode("bad stream".to_string())), "k").unwrap();
        assert_eq!(absorbed, None);

        // Only transcode failures are absorbed
        assert!(absorb_transcode(Err(AppError::Storage("disk full".to_string())), "k").is_err());
    }
}
