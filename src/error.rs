use thiserror::Error;

use crate::config::ConfigError;

/// Failures of the playback primitive. These never reach the page: the engine
/// logs them and the artwork simply stays silent.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("failed to read audio source {uri}: {source}")]
    Read {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode audio source {uri}: {reason}")]
    Decode { uri: String, reason: String },
}

/// Failures while turning an asset locator into a local file.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("asset I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to download asset: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("asset not found: {0}")]
    NotFound(String),
}

/// Key-value persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Artwork catalog errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("artwork {artwork} has duplicate segment id {segment}")]
    DuplicateSegment { artwork: String, segment: String },

    #[error("artwork not found: {0}")]
    UnknownArtwork(String),
}

/// Top-level error returned by [`crate::run`].
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("usage: {0}")]
    Usage(String),
}
