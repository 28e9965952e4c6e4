// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON API used by the map frontend.

use crate::error::{AppError, Result};
use crate::models::{Point, SchoolLocation};
use crate::services::geocode::{parse_viewbox, Candidate};
use crate::services::selection::RowId;
use crate::services::{ResultSummary, Selection, TableRow};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/config", get(get_map_config))
        .route("/api/catchments", get(get_catchments))
        .route("/api/catchments/{row}", get(get_catchment))
        .route("/api/schools", get(get_schools))
        .route("/api/locate", get(locate))
        .route("/api/search", get(search))
        .route("/api/reverse", get(reverse))
}

/// Query parameters carrying a point.
#[derive(Deserialize)]
struct PointQuery {
    lat: f64,
    lon: f64,
}

impl PointQuery {
    /// Validate WGS84 ranges and convert to a `(lon, lat)` point.
    fn to_point(&self) -> Result<Point> {
        let valid = self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon);

        if !valid {
            return Err(AppError::BadRequest(format!(
                "Invalid coordinates: lat={}, lon={}",
                self.lat, self.lon
            )));
        }
        Ok(Point::new(self.lon, self.lat))
    }
}

// ─── Map Config ──────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MapConfigResponse {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

/// Initial map view.
async fn get_map_config(State(state): State<Arc<AppState>>) -> Json<MapConfigResponse> {
    Json(MapConfigResponse {
        lat: state.config.initial_lat,
        lon: state.config.initial_long,
        zoom: state.config.initial_zoom,
    })
}

// ─── Catchment Table ─────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CatchmentsResponse {
    pub loaded: bool,
    pub rows: Vec<TableRow>,
}

/// List the catchment table rows in display order.
async fn get_catchments(State(state): State<Arc<AppState>>) -> Json<CatchmentsResponse> {
    let store = &state.feature_store;
    let rows = store
        .table()
        .map(|t| t.rows().to_vec())
        .unwrap_or_default();

    Json(CatchmentsResponse {
        loaded: store.is_loaded(),
        rows,
    })
}

/// Get a single row, including the bounds to fit the map to.
async fn get_catchment(
    State(state): State<Arc<AppState>>,
    Path(row): Path<RowId>,
) -> Result<Json<TableRow>> {
    state
        .feature_store
        .table()
        .and_then(|t| t.row(row))
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Catchment row {} not found", row)))
}

// ─── School Markers ──────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SchoolsResponse {
    pub loaded: bool,
    pub schools: Vec<SchoolLocation>,
}

/// School locations for map markers.
async fn get_schools(State(state): State<Arc<AppState>>) -> Json<SchoolsResponse> {
    Json(SchoolsResponse {
        loaded: state.feature_store.is_loaded(),
        schools: state.feature_store.schools().to_vec(),
    })
}

// ─── Locate ──────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LocateResponse {
    /// False if the lookup ran before catchment areas finished loading
    pub loaded: bool,
    pub result: ResultSummary,
    /// Table row to highlight
    pub selected_row: Option<RowId>,
    pub message: String,
}

/// Find the catchment area containing a point.
async fn locate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointQuery>,
) -> Result<Json<LocateResponse>> {
    let point = params.to_point()?;
    let store = &state.feature_store;

    let mut selection = Selection::default();
    let outcome = selection.handle_point(point, store.collection(), store.table());

    tracing::debug!(
        lat = params.lat,
        lon = params.lon,
        found = ?outcome.summary.name(),
        loaded = store.is_loaded(),
        "Resolved point"
    );

    Ok(Json(LocateResponse {
        loaded: store.is_loaded(),
        message: outcome.summary.message(),
        result: outcome.summary,
        selected_row: outcome.selected_row,
    }))
}

// ─── Geocoding ───────────────────────────────────────────────

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    /// `west,south,east,north` of the visible map
    viewbox: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SearchResponse {
    pub results: Vec<Candidate>,
}

/// Address search, bounded to the visible map area.
async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    let viewbox = params
        .viewbox
        .as_deref()
        .map(|raw| {
            parse_viewbox(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid 'viewbox' parameter: {}", raw)))
        })
        .transpose()?;

    let results = state.geocoder.search(&params.q, viewbox).await?;
    Ok(Json(SearchResponse { results }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ReverseResponse {
    pub address: String,
}

/// Short street address for a clicked point.
async fn reverse(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointQuery>,
) -> Result<Json<ReverseResponse>> {
    params.to_point()?;
    let address = state.geocoder.reverse(params.lat, params.lon).await?;
    Ok(Json(ReverseResponse { address }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_query_ranges() {
        let point = PointQuery {
            lat: 37.98,
            lon: 23.72,
        }
        .to_point()
        .unwrap();
        assert_eq!(point.x(), 23.72);
        assert_eq!(point.y(), 37.98);

        for (lat, lon) in [(91.0, 0.0), (0.0, -180.5), (f64::NAN, 0.0), (0.0, f64::INFINITY)] {
            let err = PointQuery { lat, lon }.to_point().unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }
}
