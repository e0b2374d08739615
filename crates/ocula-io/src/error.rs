use std::path::PathBuf;

/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(PathBuf),

    /// Error to open the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] ocula_image::ImageError),

    /// Error to decode or encode the image.
    #[error("Failed to decode the image. {0}")]
    ImageDecodeError(#[from] image::ImageError),

    /// The image has a channel layout that cannot be stored.
    #[error("Unsupported image format")]
    UnsupportedImageFormat,

    /// A line of a text file could not be parsed.
    #[error("{}:{line}: {reason}", path.display())]
    Parse {
        /// The file being parsed.
        path: PathBuf,
        /// One based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// A text file ended before its `EOF` marker.
    #[error("{}: unexpected end of file", .0.display())]
    UnexpectedEof(PathBuf),

    /// A shape script names an unknown shape.
    #[error("{}:{line}: unsupported shape {name}", path.display())]
    UnsupportedShape {
        /// The script being parsed.
        path: PathBuf,
        /// One based line number.
        line: usize,
        /// The unknown shape keyword.
        name: String,
    },

    /// A mask file describes an invalid kernel.
    #[error("Invalid mask. {0}")]
    KernelError(#[from] ocula_imgproc::filter::KernelError),

    /// A shape has invalid dimensions.
    #[error("Invalid shape. {0}")]
    DrawError(#[from] ocula_imgproc::draw::DrawError),

    /// A learned class file could not be turned into a registry.
    #[error("Invalid class file. {0}")]
    RegionsError(#[from] ocula_regions::RegionsError),
}
