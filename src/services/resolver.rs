// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Point-in-catchment membership resolution.
//!
//! Overlapping areas are not disambiguated: the first area in collection order
//! that contains the point wins.

use crate::models::{CatchmentFeature, FeatureCollection, Point};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Placeholder for contact details a school does not publish.
pub const NOT_AVAILABLE: &str = "N/A";

/// Find the first catchment area that contains `point`.
pub fn resolve<'a>(
    point: &Point,
    collection: &'a FeatureCollection,
) -> Option<&'a CatchmentFeature> {
    resolve_position(point, collection).map(|i| &collection.features()[i])
}

/// Position in `collection` of the first area that contains `point`.
pub fn resolve_position(point: &Point, collection: &FeatureCollection) -> Option<usize> {
    collection
        .iter()
        .position(|f| f.geometry.is_area() && f.geometry.contains(point))
}

/// Resolve `point` and project the match into display-ready fields.
pub fn resolve_and_annotate(point: &Point, collection: &FeatureCollection) -> ResultSummary {
    resolve(point, collection).map_or(ResultSummary::NotFound, ResultSummary::from)
}

/// Outcome of a membership lookup, as consumed by the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ResultSummary {
    Found(SchoolContact),
    NotFound,
}

/// Contact details of the school whose catchment area matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SchoolContact {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl From<&CatchmentFeature> for ResultSummary {
    fn from(feature: &CatchmentFeature) -> Self {
        let or_na = |value: &Option<String>| {
            value
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        ResultSummary::Found(SchoolContact {
            name: feature.properties.name.clone(),
            address: or_na(&feature.properties.address),
            phone: or_na(&feature.properties.phone),
            email: or_na(&feature.properties.email),
        })
    }
}

impl ResultSummary {
    /// Name of the matched school, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            ResultSummary::Found(contact) => Some(&contact.name),
            ResultSummary::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ResultSummary::Found(_))
    }

    /// User-facing result text, one line per field.
    pub fn message(&self) -> String {
        match self {
            ResultSummary::Found(c) => format!(
                "Η επιλεγμένη τοποθεσία ανήκει στο σχολείο:\n{}\nΔ/νση: {}\nΤηλ.: {}\nemail: {}",
                c.name, c.address, c.phone, c.email
            ),
            ResultSummary::NotFound => {
                "H επιλεγμένη τοποθεσία δεν ανήκει σε κάποιο σχολείο...".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatchmentGeometry, CatchmentProperties};
    use geo::polygon;

    fn square(name: &str, min: f64, max: f64) -> CatchmentFeature {
        CatchmentFeature {
            geometry: CatchmentGeometry::Polygon(polygon![
                (x: min, y: min),
                (x: min, y: max),
                (x: max, y: max),
                (x: max, y: min),
            ]),
            properties: CatchmentProperties {
                name: name.to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_empty_collection_resolves_nothing() {
        let collection = FeatureCollection::default();
        assert!(resolve(&Point::new(0.5, 0.5), &collection).is_none());
        assert_eq!(
            resolve_and_annotate(&Point::new(0.5, 0.5), &collection),
            ResultSummary::NotFound
        );
    }

    #[test]
    fn test_non_area_features_are_skipped() {
        let mut line = square("Line", 0.0, 1.0);
        line.geometry = CatchmentGeometry::Other;
        let collection = FeatureCollection::new(vec![line, square("Area", 0.0, 1.0)]);

        let found = resolve(&Point::new(0.5, 0.5), &collection).unwrap();
        assert_eq!(found.name(), "Area");
        assert_eq!(resolve_position(&Point::new(0.5, 0.5), &collection), Some(1));
        assert_eq!(resolve_position(&Point::new(7.0, 7.0), &collection), None);
    }

    #[test]
    fn test_first_match_wins() {
        let collection =
            FeatureCollection::new(vec![square("Outer", 0.0, 10.0), square("Inner", 0.0, 1.0)]);

        let found = resolve(&Point::new(0.5, 0.5), &collection).unwrap();
        assert_eq!(found.name(), "Outer");
    }

    #[test]
    fn test_missing_contact_fields_are_na() {
        let collection = FeatureCollection::new(vec![square("Σχολείο Α", 0.0, 1.0)]);
        let summary = resolve_and_annotate(&Point::new(0.5, 0.5), &collection);

        assert_eq!(
            summary,
            ResultSummary::Found(SchoolContact {
                name: "Σχολείο Α".to_string(),
                address: "N/A".to_string(),
                phone: "N/A".to_string(),
                email: "N/A".to_string(),
            })
        );
        assert_eq!(summary.name(), Some("Σχολείο Α"));
    }

    #[test]
    fn test_messages() {
        let mut feature = square("Σχολείο Α", 0.0, 1.0);
        feature.properties.phone = Some("210 1234567".to_string());

        let message = ResultSummary::from(&feature).message();
        assert!(message.contains("Σχολείο Α"));
        assert!(message.contains("Τηλ.: 210 1234567"));
        assert!(message.contains("Δ/νση: N/A"));

        assert!(ResultSummary::NotFound.message().contains("δεν ανήκει"));
    }

    #[test]
    fn test_summary_serializes_with_status_tag() {
        let json = serde_json::to_value(ResultSummary::NotFound).unwrap();
        assert_eq!(json, serde_json::json!({"status": "not_found"}));

        let feature = square("A", 0.0, 1.0);
        let json = serde_json::to_value(ResultSummary::from(&feature)).unwrap();
        assert_eq!(json["status"], "found");
        assert_eq!(json["name"], "A");
        assert_eq!(json["email"], "N/A");
    }
}
