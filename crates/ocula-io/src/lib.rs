#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access, decoding failures and malformed text
/// files.
pub mod error;

/// High-level image reading and writing functions.
///
/// Reads any format supported by the image crate. See [`functional::read_image_any_mono8`].
pub mod functional;

/// Learned class feature files.
pub mod features;

/// Intensity histogram dumps.
pub mod histogram;

/// Mask (kernel) files.
pub mod mask;

/// Shape scripts for the drawing tools.
pub mod shapes;

/// Training image lists.
pub mod training;

mod text;

pub use error::IoError;
