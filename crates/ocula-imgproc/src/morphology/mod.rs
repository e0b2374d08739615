//! Binary morphology on single-channel images.
//!
//! The operators stamp a fixed 3x3 kernel over the neighborhood of every interior pixel whose
//! value differs from a check value. They expect binary images holding only [`FOREGROUND`] and
//! [`BACKGROUND`] pixels.

/// Error types used for morphological operations.
mod error;
pub use error::MorphologyError;

/// Morphological operators.
mod ops;
pub use ops::*;

/// Pixel value of foreground pixels in a binary image.
pub const FOREGROUND: u8 = 255;

/// Pixel value of background pixels in a binary image.
pub const BACKGROUND: u8 = 0;
