//! HTTP request handlers
mod auth;
mod blobs;
mod media;

pub use auth::{change_password, login, register};
pub use blobs::serve_blob;
pub use media::{delete_file, list_files, upload};
