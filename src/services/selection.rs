// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Table rows for catchment areas and the lookup state machine that selects them.

use crate::models::{Bounds, FeatureCollection, Point};
use crate::services::resolver::{resolve_position, ResultSummary};
use serde::Serialize;
use std::collections::HashMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Position of a row in the catchment table.
pub type RowId = usize;

/// One row of the catchment table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TableRow {
    pub row: RowId,
    pub name: String,
    pub color: String,
    /// Extent to fit the map to when the row is activated
    pub bounds: Option<Bounds>,
}

/// Catchment table, built once when the collection is loaded.
#[derive(Debug, Clone, Default)]
pub struct SelectionTable {
    rows: Vec<TableRow>,
    /// Feature position in the collection -> row
    by_feature: HashMap<usize, RowId>,
}

impl SelectionTable {
    /// Build one row per area feature, in collection order.
    pub fn from_collection(collection: &FeatureCollection) -> Self {
        let mut table = Self::default();

        for (position, feature) in collection
            .iter()
            .enumerate()
            .filter(|(_, f)| f.geometry.is_area())
        {
            let row = table.rows.len();
            table.by_feature.insert(position, row);
            table.rows.push(TableRow {
                row,
                name: feature.name().to_string(),
                color: feature.color().to_string(),
                bounds: feature.geometry.bounds(),
            });
        }

        table
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row(&self, row: RowId) -> Option<&TableRow> {
        self.rows.get(row)
    }

    /// Row drawn for the feature at `position` in the collection.
    pub fn row_for(&self, position: usize) -> Option<RowId> {
        self.by_feature.get(&position).copied()
    }
}

/// Where a single point lookup is in its lifecycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    PointReceived(Point),
    Resolved {
        summary: ResultSummary,
        /// Position of the matched feature in the collection
        feature: Option<usize>,
    },
}

/// Result of a completed interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub summary: ResultSummary,
    /// Row to highlight, if the match has one
    pub selected_row: Option<RowId>,
}

/// Lookup state machine for one interaction.
///
/// `Idle -> PointReceived -> Resolved -> Idle`. Every step is synchronous and
/// an interaction always returns to `Idle`.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    state: InteractionState,
}

impl Selection {
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// A click or geocode selection delivered a point.
    pub fn receive(&mut self, point: Point) {
        if !matches!(self.state, InteractionState::Idle) {
            tracing::debug!(state = ?self.state, "New point replaces unfinished lookup");
        }
        self.state = InteractionState::PointReceived(point);
    }

    /// Resolve the pending point against the collection.
    pub fn resolve(&mut self, collection: &FeatureCollection) -> Option<&ResultSummary> {
        let InteractionState::PointReceived(point) = self.state else {
            return None;
        };

        let feature = resolve_position(&point, collection);
        let summary = feature
            .and_then(|i| collection.features().get(i))
            .map_or(ResultSummary::NotFound, ResultSummary::from);
        self.state = InteractionState::Resolved { summary, feature };

        match &self.state {
            InteractionState::Resolved { summary, .. } => Some(summary),
            _ => None,
        }
    }

    /// Map the resolved feature to its table row and return to `Idle`.
    pub fn apply(&mut self, table: Option<&SelectionTable>) -> Option<Outcome> {
        let InteractionState::Resolved { summary, feature } = std::mem::take(&mut self.state)
        else {
            return None;
        };

        let selected_row = table.zip(feature).and_then(|(t, i)| t.row_for(i));
        Some(Outcome {
            summary,
            selected_row,
        })
    }

    /// Run a full interaction for `point`.
    pub fn handle_point(
        &mut self,
        point: Point,
        collection: &FeatureCollection,
        table: Option<&SelectionTable>,
    ) -> Outcome {
        self.receive(point);
        self.resolve(collection);
        self.apply(table).unwrap_or(Outcome {
            summary: ResultSummary::NotFound,
            selected_row: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatchmentFeature, CatchmentGeometry, CatchmentProperties};
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

    fn collection() -> FeatureCollection {
        let mut no_area = square("No Area", 0.0, 1.0);
        no_area.geometry = CatchmentGeometry::Other;
        FeatureCollection::new(vec![
            square("A", 0.0, 1.0),
            no_area,
            square("B", 5.0, 6.0),
        ])
    }

    #[test]
    fn test_table_has_rows_for_areas_only() {
        let table = SelectionTable::from_collection(&collection());
        let names: Vec<&str> = table.rows().iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(table.rows()[1].row, 1);
        assert_eq!(table.rows()[1].bounds.unwrap().west, 5.0);
        assert_eq!(table.row_for(0), Some(0));
        assert_eq!(table.row_for(1), None);
        assert_eq!(table.row_for(2), Some(1));
    }

    #[test]
    fn test_state_machine_returns_to_idle() {
        let collection = collection();
        let table = SelectionTable::from_collection(&collection);
        let mut selection = Selection::default();

        selection.receive(Point::new(5.5, 5.5));
        assert_eq!(
            selection.state(),
            &InteractionState::PointReceived(Point::new(5.5, 5.5))
        );

        assert_eq!(selection.resolve(&collection).and_then(|s| s.name()), Some("B"));
        assert!(matches!(
            selection.state(),
            InteractionState::Resolved {
                feature: Some(2),
                ..
            }
        ));

        let outcome = selection.apply(Some(&table)).unwrap();
        assert_eq!(outcome.selected_row, Some(1));
        assert_eq!(selection.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_out_of_order_steps_are_ignored() {
        let collection = collection();
        let mut selection = Selection::default();

        assert!(selection.resolve(&collection).is_none());
        assert!(selection.apply(None).is_none());
        assert_eq!(selection.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_no_match_selects_nothing() {
        let collection = collection();
        let table = SelectionTable::from_collection(&collection);
        let mut selection = Selection::default();

        let outcome = selection.handle_point(Point::new(50.0, 50.0), &collection, Some(&table));
        assert_eq!(outcome.summary, ResultSummary::NotFound);
        assert_eq!(outcome.selected_row, None);
        assert_eq!(selection.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_match_before_table_is_built() {
        let collection = collection();
        let mut selection = Selection::default();

        let outcome = selection.handle_point(Point::new(0.5, 0.5), &collection, None);
        assert!(outcome.summary.is_found());
        assert_eq!(outcome.selected_row, None);
    }

    #[test]
    fn test_shared_name_selects_matched_row() {
        let collection = FeatureCollection::new(vec![
            square("Σχολείο", 0.0, 1.0),
            square("Σχολείο", 5.0, 6.0),
        ]);
        let table = SelectionTable::from_collection(&collection);
        let mut selection = Selection::default();

        let outcome = selection.handle_point(Point::new(5.5, 5.5), &collection, Some(&table));
        assert_eq!(outcome.summary.name(), Some("Σχολείο"));
        assert_eq!(outcome.selected_row, Some(1));
        assert_eq!(table.rows()[1].bounds.unwrap().west, 5.0);

        let outcome = selection.handle_point(Point::new(0.5, 0.5), &collection, Some(&table));
        assert_eq!(outcome.selected_row, Some(0));
    }
}
