// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! School location markers.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A school building shown as a map marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SchoolLocation {
    /// Popup label (`geozone_title`, falling back to `name`)
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}
