//! Media catalog - database operations for stored clips.
//!
//! Every read is scoped by owner. `find_owned` folds non-existence and
//! foreign ownership into the same `None`, so callers cannot distinguish
//! the two; keep it that way.
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::MediaAsset;

/// Insert one immutable catalog record, after the blob is durably stored
pub async fn insert_asset(
    pool: &PgPool,
    owner_id: Uuid,
    storage_key: &str,
    original_name: &str,
    thumbnail_key: Option<&str>,
) -> Result<MediaAsset> {
    let asset = sqlx::query_as::<_, MediaAsset>(
        "INSERT INTO media_assets (id, storage_key, original_name, owner_id, thumbnail_key, uploaded_at) \
         VALUES (gen_random_uuid(), $1, $2, $3, $4, CURRENT_TIMESTAMP) \
         RETURNING id, storage_key, original_name, owner_id, thumbnail_key, uploaded_at",
    )
    .bind(storage_key)
    .bind(original_name)
    .bind(owner_id)
    .bind(thumbnail_key)
    .fetch_one(pool)
    .await?;

    Ok(asset)
}

/// All assets for one owner, most recent first
pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<MediaAsset>> {
    let assets = sqlx::query_as::<_, MediaAsset>(
        "SELECT id, storage_key, original_name, owner_id, thumbnail_key, uploaded_at \
         FROM media_assets WHERE owner_id = $1 \
         ORDER BY uploaded_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(assets)
}

/// Ownership-scoped lookup. `None` for a missing id and for someone else's
/// asset alike.
pub async fn find_owned(
    pool: &PgPool,
    asset_id: Uuid,
    owner_id: Uuid,
) -> Result<Option<MediaAsset>> {
    let asset = sqlx::query_as::<_, MediaAsset>(
        "SELECT id, storage_key, original_name, owner_id, thumbnail_key, uploaded_at \
         FROM media_assets WHERE id = $1 AND owner_id = $2",
    )
    .bind(asset_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(asset)
}

/// Remove a catalog record. Callers delete the blobs first.
pub async fn delete_asset(pool: &PgPool, asset_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM media_assets WHERE id = $1")
        .bind(asset_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
