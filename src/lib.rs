// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Catchment Locator: find the school catchment area containing a point
//!
//! This crate provides the backend API for the school catchment map. It
//! loads catchment polygons once, resolves clicked or searched points to the
//! containing area, and proxies address lookups to Nominatim.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use services::{FeatureStore, NominatimClient};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub feature_store: Arc<FeatureStore>,
    pub geocoder: NominatimClient,
}
