//! Media handlers - upload, listing, deletion
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::db::media;
use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::models::{MediaAssetResponse, UploadResponse};
use crate::services::IngestService;
use crate::storage::BlobStore;

/// Accept a clip upload from the multipart `video` field.
///
/// The session was verified by the middleware before this runs, so no disk
/// I/O happens for unauthenticated callers. The client filename is carried
/// as display metadata only; the storage key is generated server-side.
pub async fn upload(
    ingest: web::Data<Arc<IngestService>>,
    config: web::Data<Config>,
    user: AuthenticatedUser,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    while let Some(item) = payload.next().await {
        let field =
            item.map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?;

        if field.name() != Some("video") {
            continue;
        }

        let original_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or("upload")
            .to_string();

        let max_bytes = config.storage.max_upload_bytes;
        let mut received: u64 = 0;
        let body = field.map(move |chunk| match chunk {
            Ok(bytes) => {
                received += bytes.len() as u64;
                if received > max_bytes {
                    Err(AppError::Validation(format!(
                        "Upload exceeds {max_bytes} bytes"
                    )))
                } else {
                    Ok(bytes)
                }
            }
            Err(e) => Err(AppError::Validation(format!("Upload interrupted: {e}"))),
        });

        let asset = ingest.ingest(user.id, &original_name, body).await?;
        return Ok(HttpResponse::Ok().json(UploadResponse::from(asset)));
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}

/// List the caller's clips, most recent first
pub async fn list_files(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let assets = media::list_by_owner(pool.get_ref(), user.id).await?;

    let responses: Vec<MediaAssetResponse> = assets.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(responses))
}

/// Delete one of the caller's clips.
///
/// Lookup is ownership-scoped: a missing id and another user's asset fail
/// identically. Blobs go before the record, so an interrupted deletion can
/// leave an orphan blob but never metadata pointing at nothing; a blob
/// removal that cannot be confirmed aborts with the record intact.
pub async fn delete_file(
    pool: web::Data<PgPool>,
    store: web::Data<Arc<BlobStore>>,
    user: AuthenticatedUser,
    asset_id: web::Path<String>,
) -> Result<HttpResponse> {
    let asset_uuid = Uuid::parse_str(&asset_id).map_err(|_| AppError::NotFound)?;

    let asset = media::find_owned(pool.get_ref(), asset_uuid, user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(thumbnail_key) = &asset.thumbnail_key {
        store.delete(thumbnail_key).await?;
    }
    store.delete(&asset.storage_key).await?;

    media::delete_asset(pool.get_ref(), asset.id).await?;

    tracing::info!(asset_id = %asset.id, owner_id = %user.id, "asset deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "ok": true })))
}
