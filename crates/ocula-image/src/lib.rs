#![deny(missing_docs)]
//! Image types for segmentation and region analysis

/// image representation for region analysis purposes.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
