use ocula_imgproc::{morphology::MorphologyError, threshold::ThresholdError};

/// Errors that can occur while labeling, describing or classifying regions.
#[derive(Debug, thiserror::Error)]
pub enum RegionsError {
    /// Error related to image.
    #[error(transparent)]
    ImageError(#[from] ocula_image::ImageError),

    /// Error raised by the thresholding stage.
    #[error(transparent)]
    ThresholdError(#[from] ThresholdError),

    /// Error raised by the morphology stage.
    #[error(transparent)]
    MorphologyError(#[from] MorphologyError),

    /// The smoothing kernel could not be built.
    #[error(transparent)]
    KernelError(#[from] ocula_imgproc::filter::KernelError),

    /// The binary image holds no labelable foreground region.
    #[error("No foreground region found")]
    NoRegions,

    /// The number of distinct labels disagrees with the merge bookkeeping.
    #[error("Found {found} distinct labels but expected {expected}")]
    LabelCountMismatch {
        /// Distinct labels seen while compacting.
        found: usize,
        /// Labels left after merging.
        expected: usize,
    },

    /// A parameter is outside its valid range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The number of feature vectors does not match the number of regions.
    #[error("Got {features} feature vectors for {regions} regions")]
    FeatureCountMismatch {
        /// Number of regions.
        regions: usize,
        /// Number of feature vectors.
        features: usize,
    },

    /// A class index does not exist in the registry.
    #[error("Class index {0} is out of bounds")]
    ClassIndexOutOfBounds(usize),

    /// A class with this name is already registered.
    #[error("Class {0} is already registered")]
    DuplicateClass(String),

    /// The pipeline configuration could not be parsed.
    #[error("Invalid pipeline configuration: {0}")]
    ConfigError(#[from] serde_json::Error),

    /// The pipeline configuration could not be read.
    #[error("Failed to read the pipeline configuration")]
    ConfigIoError(#[from] std::io::Error),
}
