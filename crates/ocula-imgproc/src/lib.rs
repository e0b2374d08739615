#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// utilities to draw on images.
pub mod draw;

/// image filtering module.
pub mod filter;

/// compute image histogram module.
pub mod histogram;

/// binary morphology module.
pub mod morphology;

/// operations to threshold images.
pub mod threshold;
