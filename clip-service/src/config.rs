//! Configuration management for clip-service.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The token signing secret has no default: the process refuses to start
//! without `CLIP_JWT_SECRET`.
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub thumbnail: ThumbnailConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one file per storage key
    pub root: String,
    /// Upload body cap, enforced while streaming
    pub max_upload_bytes: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ThumbnailConfig {
    pub ffmpeg_bin: String,
    pub width: u32,
    pub height: u32,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let jwt_secret = std::env::var("CLIP_JWT_SECRET")
            .map_err(|_| "CLIP_JWT_SECRET must be set (no built-in signing secret)")?;

        Ok(Config {
            app: AppConfig {
                host: std::env::var("CLIP_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("CLIP_SERVICE_PORT")
                    .unwrap_or_else(|_| "5050".to_string())
                    .parse()
                    .unwrap_or(5050),
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_secs: std::env::var("CLIP_TOKEN_TTL_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()
                    .unwrap_or(3600),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/clips".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },
            storage: StorageConfig {
                root: std::env::var("CLIP_STORAGE_ROOT").unwrap_or_else(|_| "uploads".to_string()),
                max_upload_bytes: std::env::var("CLIP_MAX_UPLOAD_BYTES")
                    .unwrap_or_else(|_| (100 * 1024 * 1024).to_string())
                    .parse()
                    .unwrap_or(100 * 1024 * 1024),
            },
            thumbnail: ThumbnailConfig {
                ffmpeg_bin: std::env::var("CLIP_FFMPEG_BIN")
                    .unwrap_or_else(|_| "ffmpeg".to_string()),
                width: 320,
                height: 180,
                timeout_secs: std::env::var("CLIP_THUMBNAIL_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
            },
        })
    }
}
