// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use catchment_locator::config::Config;
use catchment_locator::routes::create_router;
use catchment_locator::services::{feature_store, FeatureStore, NominatimClient};
use catchment_locator::AppState;
use std::sync::Arc;
use tower::ServiceExt;

pub const CATCHMENTS_FIXTURE: &str = "tests/fixtures/catchments.geojson";
pub const SCHOOLS_FIXTURE: &str = "tests/fixtures/schools.geojson";

/// Build a store from the fixture documents.
#[allow(dead_code)]
pub fn fixture_store() -> FeatureStore {
    let catchments = std::fs::read_to_string(CATCHMENTS_FIXTURE).expect("catchments fixture");
    let schools = std::fs::read_to_string(SCHOOLS_FIXTURE).expect("schools fixture");

    FeatureStore::loaded(
        feature_store::parse_catchments(&catchments).expect("valid catchments fixture"),
        feature_store::parse_schools(&schools).expect("valid schools fixture"),
    )
}

/// Create a test app around `store`.
/// The geocoder points at a closed local port so no request leaves the machine.
#[allow(dead_code)]
pub fn create_test_app(store: FeatureStore) -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let geocoder = NominatimClient::new("http://127.0.0.1:9", &config.geocode_language)
        .expect("Failed to build geocoder");

    let state = Arc::new(AppState {
        config,
        feature_store: Arc::new(store),
        geocoder,
    });

    (create_router(state.clone()), state)
}

/// GET `uri` and return the status with the parsed JSON body.
#[allow(dead_code)]
pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}
