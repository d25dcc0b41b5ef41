//! Data models for clip-service.
//!
//! Entities map 1:1 to the `users` / `media_assets` tables; the response
//! DTOs use the wire field names clients already depend on (`filename` is
//! the storage key, `originalname` the display name).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Stored clip metadata. Immutable after creation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MediaAsset {
    pub id: Uuid,
    pub storage_key: String,
    pub original_name: String,
    pub owner_id: Uuid,
    pub thumbnail_key: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

// ========================================
// Request DTOs
// ========================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub password: String,
}

// ========================================
// Response DTOs
// ========================================

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Upload result returned to the client
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub id: Uuid,
    pub filename: String,
    pub originalname: String,
    pub thumbnail: Option<String>,
}

impl From<MediaAsset> for UploadResponse {
    fn from(asset: MediaAsset) -> Self {
        Self {
            ok: true,
            id: asset.id,
            filename: asset.storage_key,
            originalname: asset.original_name,
            thumbnail: asset.thumbnail_key,
        }
    }
}

/// Catalog listing entry
#[derive(Debug, Serialize)]
pub struct MediaAssetResponse {
    pub id: Uuid,
    pub filename: String,
    pub originalname: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<MediaAsset> for MediaAssetResponse {
    fn from(asset: MediaAsset) -> Self {
        Self {
            id: asset.id,
            filename: asset.storage_key,
            originalname: asset.original_name,
            uploaded_at: asset.uploaded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_wire_field_names() {
        let asset = MediaAsset {
            id: Uuid::new_v4(),
            storage_key: "1700000000000-123456789".to_string(),
            original_name: "holiday.mp4".to_string(),
            owner_id: Uuid::new_v4(),
            thumbnail_key: None,
            uploaded_at: Utc::now(),
        };
        let json = serde_json::to_value(MediaAssetResponse::from(asset)).unwrap();
        assert_eq!(json["filename"], "1700000000000-123456789");
        assert_eq!(json["originalname"], "holiday.mp4");
        assert!(json.get("uploaded_at").is_some());
    }

    #[test]
    fn test_upload_response_without_thumbnail() {
        let asset = MediaAsset {
            id: Uuid::new_v4(),
            storage_key: "k".to_string(),
            original_name: "n".to_string(),
            owner_id: Uuid::new_v4(),
            thumbnail_key: None,
            uploaded_at: Utc::now(),
        };
        let json = serde_json::to_value(UploadResponse::from(asset)).unwrap();
        assert_eq!(json["ok"], true);
        assert!(json["thumbnail"].is_null());
    }
}
