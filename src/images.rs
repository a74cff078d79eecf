//! Image provider for city photos
//!
//! Searches Pexels for one landscape photo per derived keyword when an API
//! key is configured. Without a key, or whenever the service comes up
//! short, deterministic placeholder URLs fill the list — [`fetch_images`]
//! always returns exactly the requested number of references.

use crate::config::ImageConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Seam for the photo search service
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Search for up to `count` photo URLs for a city.
    ///
    /// May return fewer than `count` results; the caller pads the list.
    async fn search(&self, city: &str, count: usize) -> Result<Vec<String>>;
}

/// Pexels HTTP client
pub struct PexelsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PexelsClient {
    /// Create a new client with the configured timeout.
    ///
    /// Returns `None` when no API key is configured; the placeholder
    /// generator covers that case without a network call.
    pub fn from_config(config: &ImageConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.pexels_api_key.clone() else {
            return Ok(None);
        };

        let timeout = Duration::from_secs(config.timeout_seconds.into());
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("citybrief/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Some(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }))
    }

    /// One photo for a single search term
    async fn search_one(&self, term: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/search?query={}&per_page=1&orientation=landscape",
            self.base_url,
            urlencoding::encode(term)
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.api_key)
            .send()
            .await?
            .error_for_status()?;

        let search_response: PexelsSearchResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse Pexels search response")?;

        Ok(search_response
            .photos
            .into_iter()
            .next()
            .map(|photo| photo.src.large))
    }
}

#[async_trait]
impl ImageProvider for PexelsClient {
    #[instrument(skip(self))]
    async fn search(&self, city: &str, count: usize) -> Result<Vec<String>> {
        let mut urls = Vec::with_capacity(count);
        for term in search_terms(city, count) {
            match self.search_one(&term).await {
                Ok(Some(url)) => {
                    debug!("Found photo for '{}'", term);
                    urls.push(url);
                }
                Ok(None) => debug!("No photo for '{}'", term),
                Err(e) => warn!("Photo search failed for '{}': {:#}", term, e),
            }
        }
        Ok(urls)
    }
}

/// Pexels search response
#[derive(Debug, Deserialize)]
struct PexelsSearchResponse {
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    src: PexelsPhotoSrc,
}

#[derive(Debug, Deserialize)]
struct PexelsPhotoSrc {
    large: String,
}

/// Per-image search terms derived from the city name.
///
/// Cycles through the facet list when more images are requested than
/// there are facets.
fn search_terms(city: &str, count: usize) -> Vec<String> {
    const FACETS: [&str; 4] = ["landmark", "cityscape", "architecture", "street"];
    (0..count)
        .map(|i| format!("{city} {}", FACETS[i % FACETS.len()]))
        .collect()
}

/// Deterministic placeholder URLs for a city.
///
/// Seeded by the city slug and slot index so repeated runs produce the
/// same list.
#[must_use]
pub fn placeholder_urls(city: &str, count: usize) -> Vec<String> {
    let slug: String = city
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    (0..count)
        .map(|i| format!("https://picsum.photos/seed/{slug}-{i}/800/600"))
        .collect()
}

/// Fetch exactly `count` image URLs for a city, fail-safe.
///
/// Provider results come first, in order; placeholders pad the tail. With
/// no provider, or a provider that errors, the whole list is placeholders.
pub async fn fetch_images(
    provider: Option<&dyn ImageProvider>,
    city: &str,
    count: usize,
) -> Vec<String> {
    let mut urls = match provider {
        Some(provider) => match provider.search(city, count).await {
            Ok(urls) => urls,
            Err(e) => {
                warn!("Image search failed for '{}': {:#}", city, e);
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    if urls.len() < count {
        debug!(
            "Padding image list for '{}' with {} placeholder(s)",
            city,
            count - urls.len()
        );
        let placeholders = placeholder_urls(city, count);
        urls.extend_from_slice(&placeholders[urls.len()..]);
    }
    urls.truncate(count);
    urls
}
