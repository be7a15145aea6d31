//! # Coreg Core
//!
//! This library provides the shared types for GCP-based polynomial image
//! co-registration. Registration aligns a "slave" raster onto the pixel grid
//! of a "master" raster: a sparse set of named ground control points (GCPs)
//! is observed in both rasters, a low-degree 2-D polynomial mapping master
//! coordinates to slave coordinates is fitted to the correspondences, and the
//! slave raster is resampled through that mapping.
//!
//! This crate holds only the data model — control points, correspondences,
//! the per-band [`WarpModel`] with its residual statistics, the structured
//! per-iteration [`IterationReport`], and the [`Error`] enum. The fitting,
//! refinement, and resampling algorithms live in the `coreg` crate, which
//! builds on these types. The split keeps the types cheap to depend on for
//! any crate that only needs to consume fit results.

mod degree;
mod error;
mod matches;
mod model;
mod point;
mod report;

pub use degree::*;
pub use error::*;
pub use matches::*;
pub use model::*;
pub use nalgebra;
pub use point::*;
pub use report::*;
