pub mod ingest;
pub mod thumbnail;

pub use ingest::IngestService;
pub use thumbnail::ThumbnailService;
