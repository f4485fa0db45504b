//! Best-effort cover art lookup via the Google Books volumes API.
//!
//! A missing cover is a normal outcome: every failure path (network error,
//! non-success status, absent fields) degrades to `None` and is only logged.

use crate::config::CoverSettings;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Client for fetching book cover thumbnails.
pub struct CoverClient {
    http: reqwest::Client,
    endpoint: String,
    enabled: bool,
}

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Deserialize, Default)]
struct VolumeInfo {
    #[serde(rename = "imageLinks", default)]
    image_links: ImageLinks,
}

#[derive(Debug, Deserialize, Default)]
struct ImageLinks {
    thumbnail: Option<String>,
}

impl CoverClient {
    /// Create a cover client from settings.
    pub fn new(settings: &CoverSettings) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            http,
            endpoint: settings.endpoint.clone(),
            enabled: settings.enabled,
        }
    }

    /// A disabled client that never performs lookups (useful for testing).
    pub fn disabled() -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: String::new(),
            enabled: false,
        }
    }

    /// Fetch the thumbnail URL for the best-matching volume, if any.
    pub async fn fetch_cover_url(&self, title: &str, author: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let query = format!("intitle:{}+inauthor:{}", title, author);
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("q", query.as_str()), ("maxResults", "1")])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                debug!("Cover lookup for '{}' failed: {}", title, e);
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(
                "Cover lookup for '{}' returned status {}",
                title,
                response.status()
            );
            return None;
        }

        match response.json::<VolumesResponse>().await {
            Ok(body) => extract_thumbnail(body),
            Err(e) => {
                debug!("Cover lookup for '{}' returned bad body: {}", title, e);
                None
            }
        }
    }
}

fn extract_thumbnail(body: VolumesResponse) -> Option<String> {
    body.items
        .into_iter()
        .next()
        .and_then(|v| v.volume_info.image_links.thumbnail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_thumbnail() {
        let body: VolumesResponse = serde_json::from_str(
            r#"{
                "items": [
                    {"volumeInfo": {"imageLinks": {"thumbnail": "http://example.com/cover.jpg"}}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(
            extract_thumbnail(body).as_deref(),
            Some("http://example.com/cover.jpg")
        );
    }

    #[test]
    fn test_missing_fields_degrade_to_none() {
        let no_items: VolumesResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(extract_thumbnail(no_items).is_none());

        let no_links: VolumesResponse =
            serde_json::from_str(r#"{"items": [{"volumeInfo": {}}]}"#).unwrap();
        assert!(extract_thumbnail(no_links).is_none());

        let no_info: VolumesResponse = serde_json::from_str(r#"{"items": [{}]}"#).unwrap();
        assert!(extract_thumbnail(no_info).is_none());
    }

    #[tokio::test]
    async fn test_disabled_client_skips_lookup() {
        let client = CoverClient::disabled();
        assert!(client.fetch_cover_url("Dune", "Frank Herbert").await.is_none());
    }
}
