//! Clip Service - HTTP server
//!
//! Wires configuration, database pool, blob store, and the ingestion
//! pipeline into the actix application.
use actix_web::{middleware as actix_middleware, web, App, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

use clip_service::handlers;
use clip_service::middleware::AuthMiddleware;
use clip_service::security::token::TokenKeys;
use clip_service::services::{IngestService, ThumbnailService};
use clip_service::storage::BlobStore;
use clip_service::Config;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Initialize database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("Failed to verify database connection")?;
    info!("✅ Database pool created and verified");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    info!("✅ Database migrations completed");

    let store = Arc::new(
        BlobStore::open(&config.storage.root)
            .await
            .context("Failed to open blob store")?,
    );
    info!(root = %config.storage.root, "✅ Blob store ready");

    let token_keys = Arc::new(TokenKeys::new(&config.auth));
    let thumbnails = Arc::new(ThumbnailService::new(config.thumbnail.clone(), store.clone()));
    let ingest = Arc::new(IngestService::new(
        pool.clone(),
        store.clone(),
        thumbnails.clone(),
    ));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    info!("🎬 Clip service starting on {}", bind_address);

    let app_config = config.clone();
    HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_config.clone()))
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(ingest.clone()))
            .app_data(web::Data::new(token_keys.clone()))
            .wrap(actix_middleware::Logger::default())
            .wrap(cors)
            .route("/", web::get().to(|| async { HttpResponse::Ok().body("OK") }))
            .route("/uploads/{key}", web::get().to(handlers::serve_blob))
            .service(
                web::scope("/api")
                    .route("/register", web::post().to(handlers::register))
                    .route("/login", web::post().to(handlers::login))
                    .service(
                        web::scope("")
                            .wrap(AuthMiddleware::new(token_keys.clone()))
                            .route("/change-password", web::post().to(handlers::change_password))
                            .route("/upload", web::post().to(handlers::upload))
                            .route("/files", web::get().to(handlers::list_files))
                            .route("/files/{id}", web::delete().to(handlers::delete_file)),
                    ),
            )
            .default_service(web::route().to(|| async {
                HttpResponse::NotFound()
                    .json(serde_json::json!({ "error": "Not found", "status": 404 }))
            }))
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {bind_address}"))?
    .run()
    .await
    .context("HTTP server failed")?;

    info!("Clip service shut down");
    Ok(())
}
