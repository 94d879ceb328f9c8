//! Album resolver
//!
//! Resolves an album identifier into its ordered member images via the
//! imgur ajax endpoint, and synthesizes direct content URLs for both album
//! members and bare image paths hosted on the same service.

use crate::RipError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

/// Host serving direct image content; also used by the fetcher to detect
/// the "removed" placeholder redirect.
pub const IMAGE_HOST: &str = "i.imgur.com";

/// Extension applied when a direct image URL carries none
const DEFAULT_EXT: &str = ".png";

/// One resolved member of an album, in resolution order
#[derive(Debug, Clone, Deserialize)]
pub struct AlbumEntry {
    /// Content identifier on the image host
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub title: String,
    /// File extension hint, including the leading dot
    #[serde(default)]
    pub ext: String,
}

/// A resolver from album identifiers to ordered entry sequences
#[async_trait]
pub trait AlbumSource {
    async fn resolve_album(&self, album_id: &str) -> Result<Vec<AlbumEntry>, RipError>;
}

#[derive(Deserialize)]
struct RawAlbum {
    data: RawAlbumData,
}

#[derive(Deserialize)]
struct RawAlbumData {
    #[serde(default)]
    images: Vec<AlbumEntry>,
}

/// Album client for the imgur ajax API
pub struct ImgurClient {
    http: reqwest::Client,
    base_url: String,
    image_base: String,
}

impl ImgurClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_urls(http, "https://imgur.com", format!("https://{}", IMAGE_HOST))
    }

    /// Creates a client against non-default bases (used by tests)
    pub fn with_base_urls(
        http: reqwest::Client,
        base_url: impl Into<String>,
        image_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            image_base: image_base.into(),
        }
    }

    /// Direct content URL for a resolved album entry
    pub fn entry_url(&self, entry: &AlbumEntry) -> String {
        format!("{}/{}{}", self.image_base, entry.hash, entry.ext)
    }

    /// Direct content URL for a bare (non-album) image path
    ///
    /// The default extension is appended when the path carries none.
    pub fn direct_image_url(&self, path: &str) -> String {
        let has_ext = Path::new(path)
            .extension()
            .is_some_and(|e| !e.is_empty());
        if has_ext {
            format!("{}{}", self.image_base, path)
        } else {
            format!("{}{}{}", self.image_base, path, DEFAULT_EXT)
        }
    }
}

#[async_trait]
impl AlbumSource for ImgurClient {
    async fn resolve_album(&self, album_id: &str) -> Result<Vec<AlbumEntry>, RipError> {
        let url = format!("{}/ajaxalbums/getimages/{}", self.base_url, album_id);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| RipError::Album {
                album_id: album_id.to_string(),
                message: e.to_string(),
            })?;

        let body = response.bytes().await.map_err(|e| RipError::Album {
            album_id: album_id.to_string(),
            message: e.to_string(),
        })?;

        let raw: RawAlbum = serde_json::from_slice(&body).map_err(|e| RipError::Album {
            album_id: album_id.to_string(),
            message: e.to_string(),
        })?;

        Ok(raw.data.images)
    }
}

/// Extracts the album identifier from an album URL path
///
/// Returns `None` when the path does not match the album pattern, in which
/// case the item is a single direct image on the same service.
pub fn album_id_from_path(path: &str) -> Option<&str> {
    path.strip_prefix("/a/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> ImgurClient {
        ImgurClient::new(reqwest::Client::new())
    }

    #[test]
    fn test_album_id_from_path() {
        assert_eq!(album_id_from_path("/a/abc123"), Some("abc123"));
        assert_eq!(album_id_from_path("/abc123"), None);
        assert_eq!(album_id_from_path("/gallery/abc"), None);
    }

    #[test]
    fn test_entry_url() {
        let entry = AlbumEntry {
            hash: "h4sh".to_string(),
            title: String::new(),
            ext: ".jpg".to_string(),
        };
        assert_eq!(test_client().entry_url(&entry), "https://i.imgur.com/h4sh.jpg");
    }

    #[test]
    fn test_direct_image_url_appends_default_ext() {
        assert_eq!(
            test_client().direct_image_url("/abc123"),
            "https://i.imgur.com/abc123.png"
        );
    }

    #[test]
    fn test_direct_image_url_keeps_existing_ext() {
        assert_eq!(
            test_client().direct_image_url("/abc123.gif"),
            "https://i.imgur.com/abc123.gif"
        );
    }

    #[test]
    fn test_album_decode_preserves_order() {
        let body = r#"{
            "data": {
                "count": 2,
                "images": [
                    {"hash": "one", "title": "", "ext": ".jpg", "datetime": "2020-01-01"},
                    {"hash": "two", "title": "second", "ext": ".png", "datetime": "2020-01-02"}
                ]
            },
            "success": true,
            "status": 200
        }"#;

        let raw: RawAlbum = serde_json::from_str(body).unwrap();
        assert_eq!(raw.data.images.len(), 2);
        assert_eq!(raw.data.images[0].hash, "one");
        assert_eq!(raw.data.images[1].hash, "two");
    }
}
