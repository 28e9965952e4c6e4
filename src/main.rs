// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Catchment Locator API Server
//!
//! Serves school catchment areas and resolves map points to the school
//! whose catchment area contains them.

use anyhow::Context;
use catchment_locator::{
    config::Config,
    services::{feature_store, FeatureSource, FeatureStore, NominatimClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(port = config.port, "Starting Catchment Locator API");

    // Load feature documents in the background; lookups find nothing until done
    let store = Arc::new(FeatureStore::new());
    feature_store::spawn_load(
        store.clone(),
        FeatureSource::parse(&config.polygons_file),
        FeatureSource::parse(&config.locations_file),
        reqwest::Client::new(),
    );

    let geocoder = NominatimClient::new(&config.nominatim_url, &config.geocode_language)
        .context("Failed to create geocoder client")?;
    tracing::info!(url = %config.nominatim_url, "Geocoder initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        feature_store: store,
        geocoder,
    });

    // Build router
    let app = catchment_locator::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into())
        .add_directive(
            "catchment_locator=debug"
                .parse()
                .unwrap_or_else(|_| tracing::Level::DEBUG.into()),
        );

    tracing_subscriber::registry().with(filter).with(format).init();
}
