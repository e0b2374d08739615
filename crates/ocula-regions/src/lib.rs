#![deny(missing_docs)]
//! # Ocula Regions
//!
//! Labels the connected foreground regions of a binary image, describes each region with the
//! seven Hu moment invariants and classifies regions against learned class prototypes.

/// Error types for region processing.
pub mod errors;

/// Connected-region labeling.
pub mod labeling;

/// Geometric moments of labeled regions.
pub mod moments;

/// Shape descriptors built from moments.
pub mod features;

/// Learned classes and their prototypes.
pub mod registry;

/// Nearest-value voting classifier.
pub mod classifier;

/// Stage configuration and the segmentation pipeline.
pub mod pipeline;

pub use errors::RegionsError;
pub use labeling::{label_regions, Region, Segmentation};
