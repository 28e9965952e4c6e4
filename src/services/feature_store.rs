// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Catchment area loading and the shared feature store.
//!
//! Feature documents are fetched once at startup by a background task. Until
//! that task finishes the store reads as empty, so lookups simply find nothing.

use crate::models::{
    CatchmentFeature, CatchmentGeometry, CatchmentProperties, FeatureCollection, SchoolLocation,
};
use crate::services::selection::SelectionTable;
use geo::{MultiPolygon, Polygon};
use geojson::{Feature, GeoJson};
use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;

/// Alternate display-name key used by some source documents.
const TITLE_KEY: &str = "geozone_title";

static EMPTY_COLLECTION: FeatureCollection = FeatureCollection::empty();

/// Where a feature document lives.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureSource {
    File(PathBuf),
    Url(String),
}

impl FeatureSource {
    /// Interpret a configured location: `http(s)://` URLs are fetched, anything
    /// else is a filesystem path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            FeatureSource::Url(location.to_string())
        } else {
            FeatureSource::File(PathBuf::from(location))
        }
    }

    async fn fetch(&self, http: &reqwest::Client) -> Result<String, LoadError> {
        match self {
            FeatureSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| LoadError::IoError(format!("{}: {}", path.display(), e))),
            FeatureSource::Url(url) => {
                let response = http
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| LoadError::FetchError(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::FetchError(format!("HTTP {} from {}", status, url)));
                }

                response
                    .text()
                    .await
                    .map_err(|e| LoadError::FetchError(e.to_string()))
            }
        }
    }
}

impl std::fmt::Display for FeatureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureSource::File(path) => write!(f, "{}", path.display()),
            FeatureSource::Url(url) => f.write_str(url),
        }
    }
}

/// Load catchment areas, degrading to an empty collection on any failure.
pub async fn load(source: &FeatureSource, http: &reqwest::Client) -> FeatureCollection {
    match try_load(source, http).await {
        Ok(collection) => collection,
        Err(e) => {
            tracing::error!(source = %source, error = %e, "Failed to load catchment areas");
            FeatureCollection::default()
        }
    }
}

/// Load catchment areas, reporting why loading failed.
pub async fn try_load(
    source: &FeatureSource,
    http: &reqwest::Client,
) -> Result<FeatureCollection, LoadError> {
    let json_data = source.fetch(http).await?;
    parse_catchments(&json_data)
}

/// Load school markers, degrading to no markers on any failure.
pub async fn load_schools(source: &FeatureSource, http: &reqwest::Client) -> Vec<SchoolLocation> {
    let result = source
        .fetch(http)
        .await
        .and_then(|json_data| parse_schools(&json_data));

    result.unwrap_or_else(|e| {
        tracing::error!(source = %source, error = %e, "Failed to load school locations");
        Vec::new()
    })
}

/// Parse a catchment feature collection document.
///
/// Features without a display name are dropped and the rest are ordered by
/// name using Greek collation rules.
pub fn parse_catchments(json_data: &str) -> Result<FeatureCollection, LoadError> {
    let mut features: Vec<CatchmentFeature> = feature_list(json_data)?
        .into_iter()
        .filter_map(convert_catchment)
        .collect();

    sort_by_display_name(&mut features);

    tracing::info!(count = features.len(), "Loaded catchment areas");
    Ok(FeatureCollection::new(features))
}

/// Parse a school location (point) feature collection document.
pub fn parse_schools(json_data: &str) -> Result<Vec<SchoolLocation>, LoadError> {
    let schools: Vec<SchoolLocation> = feature_list(json_data)?
        .into_iter()
        .filter_map(convert_school)
        .collect();

    tracing::info!(count = schools.len(), "Loaded school locations");
    Ok(schools)
}

fn feature_list(json_data: &str) -> Result<Vec<Feature>, LoadError> {
    let geojson: GeoJson = json_data
        .parse()
        .map_err(|e: geojson::Error| LoadError::ParseError(e.to_string()))?;

    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection.features),
        _ => Err(LoadError::NotACollection),
    }
}

/// Non-empty string property.
fn string_property(feature: &Feature, key: &str) -> Option<String> {
    feature
        .property(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn convert_catchment(feature: Feature) -> Option<CatchmentFeature> {
    let name = string_property(&feature, "name").or_else(|| string_property(&feature, TITLE_KEY))?;

    // A zero id counts as missing.
    let id = ["cartodb_id", "polygon_id"]
        .into_iter()
        .filter_map(|key| feature.property(key).and_then(|v| v.as_u64()))
        .find(|id| *id != 0);

    let properties = CatchmentProperties {
        address: string_property(&feature, "address"),
        phone: string_property(&feature, "telephone"),
        email: string_property(&feature, "email"),
        id,
        name,
    };

    let geometry = feature
        .geometry
        .map(|geom| convert_geometry(geom.value))
        .unwrap_or(CatchmentGeometry::Other);

    if !geometry.is_area() {
        tracing::debug!(name = %properties.name, "Catchment feature has no area geometry");
    }

    Some(CatchmentFeature {
        geometry,
        properties,
    })
}

/// Convert GeoJSON geometry to our internal format.
fn convert_geometry(value: geojson::Value) -> CatchmentGeometry {
    let converted = match value {
        geojson::Value::Polygon(_) => {
            TryInto::<Polygon<f64>>::try_into(value).map(CatchmentGeometry::Polygon)
        }
        geojson::Value::MultiPolygon(_) => {
            TryInto::<MultiPolygon<f64>>::try_into(value).map(CatchmentGeometry::MultiPolygon)
        }
        _ => return CatchmentGeometry::Other,
    };

    converted.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Invalid area geometry");
        CatchmentGeometry::Other
    })
}

fn convert_school(feature: Feature) -> Option<SchoolLocation> {
    let name = string_property(&feature, TITLE_KEY).or_else(|| string_property(&feature, "name"))?;

    match feature.geometry.map(|g| g.value) {
        Some(geojson::Value::Point(coords)) if coords.len() >= 2 => Some(SchoolLocation {
            name,
            lon: coords[0],
            lat: coords[1],
        }),
        _ => None,
    }
}

/// Stable ascending sort by display name using Greek collation.
fn sort_by_display_name(features: &mut [CatchmentFeature]) {
    match Collator::try_new(&locale!("el").into(), CollatorOptions::new()) {
        Ok(collator) => features.sort_by(|a, b| collator.compare(a.name(), b.name())),
        Err(e) => {
            tracing::warn!(error = %e, "Collator unavailable, falling back to code point order");
            features.sort_by(|a, b| a.name().cmp(b.name()));
        }
    }
}

/// Catchment areas together with the table rows rendered for them.
#[derive(Debug)]
struct Catalog {
    collection: FeatureCollection,
    table: SelectionTable,
}

/// Shared store of loaded features, populated exactly once.
pub struct FeatureStore {
    catalog: OnceLock<Catalog>,
    schools: OnceLock<Vec<SchoolLocation>>,
    ready: watch::Sender<bool>,
}

impl Default for FeatureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureStore {
    /// Create an empty, not yet loaded store.
    pub fn new() -> Self {
        Self {
            catalog: OnceLock::new(),
            schools: OnceLock::new(),
            ready: watch::Sender::new(false),
        }
    }

    /// Create a store that is already loaded.
    pub fn loaded(collection: FeatureCollection, schools: Vec<SchoolLocation>) -> Self {
        let store = Self::new();
        store.populate(collection, schools);
        store
    }

    /// Install the loaded features. Only the first call has any effect.
    pub fn populate(&self, collection: FeatureCollection, schools: Vec<SchoolLocation>) {
        let table = SelectionTable::from_collection(&collection);
        let _ = self.schools.set(schools);
        if self.catalog.set(Catalog { collection, table }).is_err() {
            tracing::warn!("Feature store already populated, ignoring reload");
            return;
        }
        self.ready.send_replace(true);
    }

    /// Whether the load task has completed.
    pub fn is_loaded(&self) -> bool {
        self.catalog.get().is_some()
    }

    /// Wait until the store has been populated.
    pub async fn wait_loaded(&self) {
        let mut rx = self.ready.subscribe();
        rx.wait_for(|ready| *ready).await.ok();
    }

    /// Loaded catchment areas; empty before loading completes.
    pub fn collection(&self) -> &FeatureCollection {
        self.catalog
            .get()
            .map(|c| &c.collection)
            .unwrap_or(&EMPTY_COLLECTION)
    }

    /// Table rows for the loaded catchment areas.
    pub fn table(&self) -> Option<&SelectionTable> {
        self.catalog.get().map(|c| &c.table)
    }

    pub fn schools(&self) -> &[SchoolLocation] {
        self.schools.get().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Load both feature documents in the background and populate the store.
pub fn spawn_load(
    store: Arc<FeatureStore>,
    polygons: FeatureSource,
    locations: FeatureSource,
    http: reqwest::Client,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(polygons = %polygons, locations = %locations, "Loading feature documents");
        let (collection, schools) =
            tokio::join!(load(&polygons, &http), load_schools(&locations, &http));
        store.populate(collection, schools);
        tracing::info!(
            catchments = store.collection().len(),
            schools = store.schools().len(),
            "Feature store ready"
        );
    })
}

/// Errors from feature loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to fetch feature document: {0}")]
    FetchError(String),

    #[error("Failed to parse GeoJSON: {0}")]
    ParseError(String),

    #[error("Document is not a feature collection")]
    NotACollection,
}
