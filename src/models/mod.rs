// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod catchment;
pub mod school;

pub use catchment::{
    Bounds, CatchmentFeature, CatchmentGeometry, CatchmentProperties, FeatureCollection, Point,
};
pub use school::SchoolLocation;
