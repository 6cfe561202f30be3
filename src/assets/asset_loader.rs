use crate::error::AssetError;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Information about a resolved asset
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AssetInfo {
    /// Local path the playback backend can read
    pub path: PathBuf,
    /// Whether a remote asset was served from cache (true) or freshly downloaded (false).
    /// Always true for local assets.
    pub cached: bool,
}

/// Turns audio locators from artwork data into local files.
///
/// `http(s)://` locators are downloaded once and kept under the cache
/// directory; anything else is a path under the static assets directory
/// (a leading `/` is the web root, as in the artwork JSON).
#[derive(Clone)]
pub struct AssetLoader {
    assets_dir: PathBuf,
    cache_dir: PathBuf,
    client: reqwest::Client,
}

impl AssetLoader {
    pub fn new(assets_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            cache_dir: cache_dir.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Resolve a locator, downloading remote assets on first use.
    pub async fn resolve(&self, uri: &str) -> Result<AssetInfo, AssetError> {
        if !is_remote(uri) {
            let path = self.local_path(uri);
            if !tokio::fs::try_exists(&path).await? {
                return Err(AssetError::NotFound(path.display().to_string()));
            }
            return Ok(AssetInfo { path, cached: true });
        }

        let file_path = self.cache_path(uri);
        if tokio::fs::try_exists(&file_path).await? {
            log::debug!("Asset cache hit: {}", uri);
            return Ok(AssetInfo {
                path: file_path,
                cached: true,
            });
        }

        tokio::fs::create_dir_all(&self.cache_dir).await?;

        let response = self.client.get(uri).send().await?;
        if !response.status().is_success() {
            return Err(AssetError::Status {
                url: uri.to_string(),
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await?;

        tokio::fs::write(&file_path, &bytes).await?;
        log::info!("Downloaded {} ({} bytes)", uri, bytes.len());

        Ok(AssetInfo {
            path: file_path,
            cached: false,
        })
    }

    /// Where a remote locator is (or would be) cached.
    pub fn cache_path(&self, uri: &str) -> PathBuf {
        self.cache_dir.join(url_to_filename(uri))
    }

    pub async fn is_cached(&self, uri: &str) -> bool {
        is_remote(uri)
            && tokio::fs::try_exists(self.cache_path(uri))
                .await
                .unwrap_or(false)
    }

    /// Remove every downloaded asset.
    pub async fn clear_cache(&self) -> Result<(), AssetError> {
        if tokio::fs::try_exists(&self.cache_dir).await? {
            tokio::fs::remove_dir_all(&self.cache_dir).await?;
            log::info!("Cleared asset cache at {}", self.cache_dir.display());
        }
        Ok(())
    }

    fn local_path(&self, uri: &str) -> PathBuf {
        let path = Path::new(uri);
        if path.is_absolute() && path.exists() {
            return path.to_path_buf();
        }
        self.assets_dir.join(uri.trim_start_matches('/'))
    }
}

fn is_remote(uri: &str) -> bool {
    uri.starts_with("http://") || uri.starts_with("https://")
}

/// Hash-based cache filename, keeping the locator's extension for the decoder.
fn url_to_filename(url: &str) -> String {
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    let hash = hasher.finish();
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5)
        .unwrap_or("mp3");
    format!("{:x}.{}", hash, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_filename_is_stable_and_keeps_extension() {
        let a = url_to_filename("https://cdn.example.com/audio/amb.ogg?v=2");
        let b = url_to_filename("https://cdn.example.com/audio/amb.ogg?v=2");
        assert_eq!(a, b);
        assert!(a.ends_with(".ogg"));
        assert!(url_to_filename("https://cdn.example.com/stream").ends_with(".mp3"));
    }

    #[tokio::test]
    async fn resolves_web_root_paths_under_assets_dir() {
        let dir = tempfile::tempdir().unwrap();
        let layers = dir.path().join("audio/layers");
        std::fs::create_dir_all(&layers).unwrap();
        std::fs::write(layers.join("strings.mp3"), b"id3").unwrap();

        let loader = AssetLoader::new(dir.path(), dir.path().join("cache"));
        let info = loader.resolve("/audio/layers/strings.mp3").await.unwrap();
        assert_eq!(info.path, layers.join("strings.mp3"));
        assert!(info.cached);
    }

    #[tokio::test]
    async fn missing_local_asset_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = AssetLoader::new(dir.path(), dir.path().join("cache"));
        let err = loader.resolve("/audio/nope.mp3").await.unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
    }

    #[tokio::test]
    async fn remote_asset_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("cache");
        let loader = AssetLoader::new(dir.path(), &cache);
        let uri = "https://cdn.example.invalid/audio/amb.mp3";

        assert!(!loader.is_cached(uri).await);
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(loader.cache_path(uri), b"id3").unwrap();
        assert!(loader.is_cached(uri).await);

        let info = loader.resolve(uri).await.unwrap();
        assert!(info.cached);
        assert_eq!(info.path, loader.cache_path(uri));

        loader.clear_cache().await.unwrap();
        assert!(!loader.is_cached(uri).await);
    }
}
