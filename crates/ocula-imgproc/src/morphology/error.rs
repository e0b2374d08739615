/// Errors related to morphological operations.
#[derive(Debug, thiserror::Error)]
pub enum MorphologyError {
    /// Error related to the input image.
    #[error(transparent)]
    ImageError(#[from] ocula_image::ImageError),

    /// The operation name is not one of `dilation`, `erosion`, `open` or `close`.
    #[error("Morphology '{0}' is not supported")]
    UnknownOperation(String),
}
