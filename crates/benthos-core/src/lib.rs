//! Seabed morphology engine: attribute computation and classification of
//! candidate bathymetric feature polygons.
//!
//! The pipeline takes a bathymetry grid, a slope-gradient grid, and a set of
//! candidate polygons, and runs in three stages: consolidate slivers into
//! their neighbours, compute an attribute record per polygon (cross-section
//! profiles, planimetric shape, zonal topography), and classify each record
//! through a fixed decision tree for bathymetric highs or lows. Everything a
//! run needs travels in an explicit [`config::ExecutionContext`].

pub mod attributes;
pub mod classify;
pub mod config;
pub mod consolidate;
pub mod error;
pub mod grid;
pub mod polygon;
pub mod profile;

pub use attributes::{compute_attribute_record, compute_attributes, AttributeRecord};
pub use classify::{classify, FeatureType, HighFeatureType, LowFeatureType};
pub use config::{ExecutionContext, FeaturePolarity, ThresholdConfig};
pub use consolidate::{consolidate, ConsolidationOutcome};
pub use error::{AttributeError, ConfigError};
pub use grid::BathyGrid;
