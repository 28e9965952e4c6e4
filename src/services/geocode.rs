// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nominatim client for address search and reverse geocoding.
//!
//! Handles:
//! - Free-text search bounded to the visible map area
//! - Reverse lookup of a clicked point into a short street address
//! - Caching of recent search results, bounded to `SEARCH_CACHE_CAPACITY` entries

use crate::models::Bounds;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Shortest query forwarded to the geocoder.
pub const MIN_QUERY_CHARS: usize = 3;

/// Shown when a search query is too short.
pub const QUERY_TOO_SHORT_MESSAGE: &str = "Παρακαλώ εισάγετε 3 ή περισσότερους χαρακτήρες";

/// Zoom level for reverse lookups (building-level detail).
const REVERSE_ZOOM: u8 = 18;

/// Most search results kept before the cache is cleared.
pub const SEARCH_CACHE_CAPACITY: usize = 1024;

type SearchCache = Arc<DashMap<(String, Option<String>), Vec<Candidate>>>;

/// Nominatim API client.
#[derive(Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
    language: String,
    cache: SearchCache,
}

/// A search hit offered to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Candidate {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub text: String,
    pub lat: f64,
    pub lon: f64,
}

/// Search result as returned by Nominatim (coordinates are strings).
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub place_id: u64,
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

/// Reverse lookup response.
#[derive(Debug, Clone, Deserialize)]
pub struct ReverseResponse {
    #[serde(default)]
    pub address: AddressDetails,
}

/// Address breakdown from `addressdetails=1`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressDetails {
    pub road: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
}

impl NominatimClient {
    /// Create a client for the Nominatim instance at `base_url`.
    ///
    /// `language` is sent as `accept-language` on searches.
    pub fn new(base_url: &str, language: &str) -> Result<Self, GeocodeError> {
        // Nominatim's usage policy requires an identifying User-Agent.
        let http = reqwest::Client::builder()
            .user_agent(concat!("catchment-locator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
            cache: Arc::new(DashMap::new()),
        })
    }

    /// Search for addresses matching `query`, optionally bounded to `viewbox`.
    pub async fn search(
        &self,
        query: &str,
        viewbox: Option<Bounds>,
    ) -> Result<Vec<Candidate>, GeocodeError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(GeocodeError::QueryTooShort);
        }

        let viewbox_param = viewbox.map(format_viewbox);
        let key = (query.to_string(), viewbox_param.clone());
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(query, "Search cache hit");
            return Ok(cached.clone());
        }

        let mut params = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("accept-language", self.language.clone()),
        ];
        if let Some(viewbox) = viewbox_param {
            params.push(("bounded", "1".to_string()));
            params.push(("viewbox", viewbox));
        }

        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&params)
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let places: Vec<NominatimPlace> = check_response_json(response).await?;
        let candidates = to_candidates(places);

        tracing::debug!(query, count = candidates.len(), "Address search completed");
        self.remember(key, candidates.clone());
        Ok(candidates)
    }

    /// Cache a search result, starting over once the cache is full.
    fn remember(&self, key: (String, Option<String>), candidates: Vec<Candidate>) {
        if self.cache.len() >= SEARCH_CACHE_CAPACITY && !self.cache.contains_key(&key) {
            tracing::debug!(entries = self.cache.len(), "Search cache full, clearing");
            self.cache.clear();
        }
        self.cache.insert(key, candidates);
    }

    /// Look up a short human-readable address for a point.
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<String, GeocodeError> {
        let response = self
            .http
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("format", "json".to_string()),
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("zoom", REVERSE_ZOOM.to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let reverse: ReverseResponse = check_response_json(response).await?;
        Ok(shorten_address(&reverse.address))
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, GeocodeError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 429 {
            tracing::warn!("Nominatim rate limit hit (429)");
        }
        return Err(GeocodeError::Status(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| GeocodeError::Parse(e.to_string()))
}

/// Convert raw places to candidates, dropping those with unparseable coordinates.
pub fn to_candidates(places: Vec<NominatimPlace>) -> Vec<Candidate> {
    places
        .into_iter()
        .filter_map(|place| {
            let lat = place.lat.parse::<f64>().ok()?;
            let lon = place.lon.parse::<f64>().ok()?;
            Some(Candidate {
                id: place.place_id,
                text: place.display_name,
                lat,
                lon,
            })
        })
        .collect()
}

/// Join road, postcode and city, skipping the parts that are missing.
pub fn shorten_address(address: &AddressDetails) -> String {
    [&address.road, &address.postcode, &address.city]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a `west,south,east,north` view box.
pub fn parse_viewbox(raw: &str) -> Option<Bounds> {
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;

    match parts.as_slice() {
        &[west, south, east, north] if parts.iter().all(|v| v.is_finite()) => Some(Bounds {
            west,
            south,
            east,
            north,
        }),
        _ => None,
    }
}

fn format_viewbox(bounds: Bounds) -> String {
    format!(
        "{},{},{},{}",
        bounds.west, bounds.south, bounds.east, bounds.north
    )
}

/// Errors from geocoding operations.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Search query must have at least 3 characters")]
    QueryTooShort,

    #[error("Geocoder request failed: {0}")]
    Request(String),

    #[error("Geocoder returned an error: {0}")]
    Status(String),

    #[error("Failed to parse geocoder response: {0}")]
    Parse(String),
}
