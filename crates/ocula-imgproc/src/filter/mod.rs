//! Filter operations
//!
//! This module provides the weighted kernel filter used for smoothing intensity images and the
//! interior scan shared with the morphology operators.

/// Filter kernels
mod kernel;
pub use kernel::{Kernel, KernelError};

/// Filter operations
mod ops;
pub use ops::*;
