//! Raw blob serving for stored clips and thumbnails
use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::storage::BlobStore;

/// Serve the blob at `key`. The key arrives from the URL path, so it goes
/// through the same validation as generated keys before touching the
/// filesystem; anything else is a plain 404.
pub async fn serve_blob(
    store: web::Data<Arc<BlobStore>>,
    key: web::Path<String>,
) -> Result<HttpResponse> {
    if !BlobStore::valid_key(&key) {
        return Err(AppError::NotFound);
    }

    let data = store.get(&key).await?;

    let content_type = if key.ends_with(".jpg") {
        mime::IMAGE_JPEG
    } else {
        mime::APPLICATION_OCTET_STREAM
    };

    Ok(HttpResponse::Ok().content_type(content_type).body(data))
}
