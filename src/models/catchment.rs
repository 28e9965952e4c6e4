// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! School catchment area model and geometry handling.

use geo::{BoundingRect, Contains, MultiPolygon, Polygon, Rect};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A geographic point as `(longitude, latitude)` in WGS84 degrees.
pub type Point = geo::Point<f64>;

/// Fill colours for catchment areas, selected by `id % PALETTE.len()`.
pub const PALETTE: [&str; 12] = [
    "#ff0000", "#00ff00", "#0000ff", "#ffff00", "#ff00ff", "#00ffff", "#ff8000", "#008000",
    "#800080", "#808080", "#ff0080", "#00ff80",
];

/// A school catchment area with its contact details.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchmentFeature {
    pub geometry: CatchmentGeometry,
    pub properties: CatchmentProperties,
}

/// Properties carried by a catchment feature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatchmentProperties {
    /// Display name, taken from `name` or `geozone_title`
    pub name: String,
    pub address: Option<String>,
    /// Source key is `telephone`
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Styling identifier (`cartodb_id` or `polygon_id`)
    pub id: Option<u64>,
}

/// Catchment geometry. Only the area variants take part in containment.
#[derive(Debug, Clone, PartialEq)]
pub enum CatchmentGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    /// Points, lines, collections or a missing geometry.
    Other,
}

impl CatchmentGeometry {
    /// Whether this geometry bounds an area.
    pub fn is_area(&self) -> bool {
        !matches!(self, CatchmentGeometry::Other)
    }

    /// Check if a point lies strictly inside this geometry.
    ///
    /// Points on the boundary are not contained. Non-area geometries never
    /// contain anything.
    pub fn contains(&self, point: &Point) -> bool {
        match self {
            CatchmentGeometry::Polygon(p) => p.contains(point),
            CatchmentGeometry::MultiPolygon(mp) => mp.contains(point),
            CatchmentGeometry::Other => false,
        }
    }

    /// Bounding box of an area geometry.
    pub fn bounds(&self) -> Option<Bounds> {
        let rect = match self {
            CatchmentGeometry::Polygon(p) => p.bounding_rect(),
            CatchmentGeometry::MultiPolygon(mp) => mp.bounding_rect(),
            CatchmentGeometry::Other => None,
        }?;
        Some(Bounds::from(rect))
    }
}

impl CatchmentFeature {
    pub fn name(&self) -> &str {
        &self.properties.name
    }

    /// Fill colour used when drawing this area.
    pub fn color(&self) -> &'static str {
        let id = self.properties.id.unwrap_or(0);
        PALETTE[(id % PALETTE.len() as u64) as usize]
    }
}

/// Ordered, read-only set of catchment features.
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    features: Vec<CatchmentFeature>,
}

impl FeatureCollection {
    pub const fn empty() -> Self {
        Self {
            features: Vec::new(),
        }
    }

    /// Wrap features as-is, keeping their order.
    pub fn new(features: Vec<CatchmentFeature>) -> Self {
        Self { features }
    }

    pub fn features(&self) -> &[CatchmentFeature] {
        &self.features
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatchmentFeature> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a CatchmentFeature;
    type IntoIter = std::slice::Iter<'a, CatchmentFeature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

/// Geographic bounding box, used by the front-end to fit the map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl From<Rect<f64>> for Bounds {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            west: rect.min().x,
            south: rect.min().y,
            east: rect.max().x,
            north: rect.max().y,
        }
    }
}
