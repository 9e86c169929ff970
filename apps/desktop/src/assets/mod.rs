//! Download-once cache for remote card artwork.
//!
//! Assets are stored under the application data directory at paths derived
//! deterministically from the card name and the remote asset id, so a file
//! that already exists is never fetched again. The database only ever holds
//! the relative path.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::warn;

use cardvault_core::naming::asset_file_name;

pub const IMAGES_DIR: &str = "card_images";
pub const BUCKET_MAIN: &str = "artworks_main";
pub const BUCKET_ALTERNATES: &str = "artworks_alternates";

pub struct AssetCache {
    data_dir: PathBuf,
    // Built lazily, on the blocking import thread.
    client: OnceLock<reqwest::blocking::Client>,
}

impl AssetCache {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> &reqwest::blocking::Client {
        self.client.get_or_init(reqwest::blocking::Client::new)
    }

    /// Absolute path for a stored relative asset path.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.data_dir.join(relative)
    }

    /// Fetch an asset once and return its stored relative path.
    ///
    /// Failures are logged and yield `None`; the import treats a missing
    /// asset as "no artwork" instead of failing the whole batch.
    pub fn fetch_and_cache(
        &self,
        url: &str,
        display_name: &str,
        asset_id: i64,
        bucket: &str,
    ) -> Option<String> {
        if url.is_empty() {
            return None;
        }

        let extension = url_extension(url);
        let file_name = asset_file_name(display_name, asset_id, &extension);
        let relative = format!("{IMAGES_DIR}/{bucket}/{file_name}");
        let target = self.data_dir.join(IMAGES_DIR).join(bucket).join(&file_name);

        if target.exists() {
            return Some(relative);
        }

        if let Some(parent) = target.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("failed to create asset directory {}: {e}", parent.display());
                return None;
            }
        }

        let response = match self.client().get(url).send() {
            Ok(response) => response,
            Err(e) => {
                warn!("failed to download {url}: {e}");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!("failed to download {url}: HTTP {}", response.status());
            return None;
        }
        let bytes = match response.bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("failed to read body of {url}: {e}");
                return None;
            }
        };
        if let Err(e) = fs::write(&target, &bytes) {
            warn!("failed to write {}: {e}", target.display());
            return None;
        }
        Some(relative)
    }
}

/// File extension taken from the URL path, `.jpg` when absent.
fn url_extension(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            Path::new(parsed.path())
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
        })
        .unwrap_or_else(|| ".jpg".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extension_comes_from_the_url_path() {
        assert_eq!(url_extension("https://host/images/cards/123.png"), ".png");
        assert_eq!(url_extension("https://host/images/cards/123"), ".jpg");
        assert_eq!(url_extension("not a url"), ".jpg");
    }

    #[test]
    fn cached_assets_are_not_refetched() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(dir.path());

        let bucket_dir = dir.path().join(IMAGES_DIR).join(BUCKET_MAIN);
        fs::create_dir_all(&bucket_dir).unwrap();
        fs::write(bucket_dir.join("dark_magician_46986414.jpg"), b"jpeg").unwrap();

        // The URL is unreachable; only the existing file can satisfy this.
        let path = cache.fetch_and_cache(
            "http://invalid.invalid/46986414.jpg",
            "Dark Magician",
            46986414,
            BUCKET_MAIN,
        );
        assert_eq!(
            path.as_deref(),
            Some("card_images/artworks_main/dark_magician_46986414.jpg")
        );
    }

    #[test]
    fn resolve_joins_the_data_directory() {
        let cache = AssetCache::new("/tmp/cardvault");
        assert_eq!(
            cache.resolve("card_images/artworks_main/a_1.jpg"),
            PathBuf::from("/tmp/cardvault/card_images/artworks_main/a_1.jpg")
        );
    }
}
