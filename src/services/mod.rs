// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod feature_store;
pub mod geocode;
pub mod resolver;
pub mod selection;

pub use feature_store::{FeatureSource, FeatureStore, LoadError};
pub use geocode::{GeocodeError, NominatimClient};
pub use resolver::{
    resolve, resolve_and_annotate, resolve_position, ResultSummary, SchoolContact,
};
pub use selection::{Selection, SelectionTable, TableRow};
