use std::fmt;
use std::str::FromStr;

use ocula_image::{Image, ImageError};

use super::{MorphologyError, BACKGROUND, FOREGROUND};
use crate::filter::{interior_pixels, Kernel};

/// A morphological operation on a binary image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphOp {
    /// Grow the foreground.
    Dilation,
    /// Shrink the foreground.
    Erosion,
    /// Erosion followed by dilation.
    Open,
    /// Dilation followed by erosion.
    Close,
}

impl FromStr for MorphOp {
    type Err = MorphologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dilation" => Ok(MorphOp::Dilation),
            "erosion" => Ok(MorphOp::Erosion),
            "open" => Ok(MorphOp::Open),
            "close" => Ok(MorphOp::Close),
            other => Err(MorphologyError::UnknownOperation(other.to_string())),
        }
    }
}

impl fmt::Display for MorphOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MorphOp::Dilation => "dilation",
            MorphOp::Erosion => "erosion",
            MorphOp::Open => "open",
            MorphOp::Close => "close",
        };
        f.write_str(name)
    }
}

impl MorphOp {
    /// Apply the operation from `src` into `dst`.
    pub fn apply(&self, src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
        match self {
            MorphOp::Dilation => dilate(src, dst),
            MorphOp::Erosion => erode(src, dst),
            MorphOp::Open => open(src, dst),
            MorphOp::Close => close(src, dst),
        }
    }
}

/// Stamp a kernel over the neighborhood of every interior pixel not equal to `check_value`.
///
/// The destination starts as a copy of the source. For each pixel a kernel can be centered on,
/// if the source value at the center differs from `check_value`, every destination pixel under
/// the kernel is overwritten with the kernel weight at that position (clamped to `u8`). Centers
/// are always read from the unmodified source.
///
/// # Arguments
///
/// * `src` - The source binary image.
/// * `dst` - The destination image.
/// * `kernel` - The stamp.
/// * `check_value` - The center value that leaves a pixel untouched.
pub fn stamp(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    kernel: &Kernel,
    check_value: u8,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (radius_rows, radius_cols) = kernel.radius();
    let width = src.width();
    let src_data = src.as_slice();

    dst.as_slice_mut().copy_from_slice(src_data);
    let dst_data = dst.as_slice_mut();

    for (row, col) in interior_pixels(src.size(), kernel.radius()) {
        if src_data[row * width + col] == check_value {
            continue;
        }

        for kr in 0..kernel.height() {
            let dst_row = row + kr - radius_rows;
            for kc in 0..kernel.width() {
                let dst_col = col + kc - radius_cols;
                let value = kernel.data()[kr * kernel.width() + kc];
                dst_data[dst_row * width + dst_col] = value.clamp(0, 255) as u8;
            }
        }
    }

    Ok(())
}

/// Dilate a binary image with a 3x3 foreground stamp.
///
/// Every interior pixel that is not background paints its 3x3 neighborhood as foreground.
///
/// # Example
///
/// ```
/// use ocula_image::{Image, ImageSize};
/// use ocula_imgproc::morphology::dilate;
///
/// let mut data = vec![0u8; 25];
/// data[12] = 255;
/// let src = Image::<u8, 1>::new(ImageSize { width: 5, height: 5 }, data).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0).unwrap();
///
/// dilate(&src, &mut dst).unwrap();
/// assert_eq!(dst.as_slice().iter().filter(|&&v| v == 255).count(), 9);
/// ```
pub fn dilate(src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    stamp(src, dst, &Kernel::square3(FOREGROUND as i16), BACKGROUND)
}

/// Erode a binary image with a 3x3 background stamp.
///
/// Every interior pixel that is not foreground paints its 3x3 neighborhood as background.
pub fn erode(src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    stamp(src, dst, &Kernel::square3(BACKGROUND as i16), FOREGROUND)
}

/// Opening: erosion followed by dilation.
///
/// Removes small foreground specks and smooths object boundaries.
pub fn open(src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    let mut eroded = Image::from_size_val(src.size(), BACKGROUND)?;
    erode(src, &mut eroded)?;
    dilate(&eroded, dst)
}

/// Closing: dilation followed by erosion.
///
/// Fills small background holes and gaps inside objects.
pub fn close(src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    let mut dilated = Image::from_size_val(src.size(), BACKGROUND)?;
    dilate(src, &mut dilated)?;
    erode(&dilated, dst)
}

/// Apply a sequence of operations, returning the cleaned image.
///
/// An empty sequence returns a copy of the source.
pub fn apply_morphology(
    src: &Image<u8, 1>,
    ops: &[MorphOp],
) -> Result<Image<u8, 1>, MorphologyError> {
    let mut current = src.clone();
    let mut scratch = Image::from_size_val(src.size(), BACKGROUND)?;

    for op in ops {
        log::debug!("applying {op}");
        op.apply(&current, &mut scratch)?;
        std::mem::swap(&mut current, &mut scratch);
    }

    Ok(current)
}
