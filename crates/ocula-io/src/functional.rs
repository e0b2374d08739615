use std::path::Path;

use ocula_image::{Image, ImageSize};
use ocula_imgproc::color::gray_from_rgb_u8;

use crate::error::IoError;

/// Reads an RGB8 image from the given file path.
///
/// The method tries to read from any image format supported by the image crate and converts the
/// pixels to 8-bit RGB.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Example
///
/// ```no_run
/// use ocula_image::Image;
/// use ocula_io::functional as F;
///
/// let image: Image<u8, 3> = F::read_image_any_rgb8("parts/bolt.bmp").unwrap();
/// assert_eq!(image.num_channels(), 3);
/// ```
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::open(file_path)?.into_rgb8();
    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    log::debug!("decoded {} ({size})", file_path.display());

    Ok(Image::new(size, img.into_raw())?)
}

/// Reads an intensity image from the given file path.
///
/// The pixels are decoded as RGB8 and reduced to the channel average `(R + G + B) / 3`.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
pub fn read_image_any_mono8(file_path: impl AsRef<Path>) -> Result<Image<u8, 1>, IoError> {
    let rgb = read_image_any_rgb8(file_path)?;
    let mut gray = Image::from_size_val(rgb.size(), 0)?;
    gray_from_rgb_u8(&rgb, &mut gray)?;
    Ok(gray)
}

/// Writes an 8-bit image with one or three channels to the given file path.
///
/// The format is chosen from the file extension.
///
/// # Arguments
///
/// * `file_path` - The destination path.
/// * `image` - The image to write.
pub fn write_image<const C: usize>(
    file_path: impl AsRef<Path>,
    image: &Image<u8, C>,
) -> Result<(), IoError> {
    let color = match C {
        1 => image::ColorType::L8,
        3 => image::ColorType::Rgb8,
        _ => return Err(IoError::UnsupportedImageFormat),
    };

    image::save_buffer(
        file_path.as_ref(),
        image.as_slice(),
        image.width() as u32,
        image.height() as u32,
        color,
    )?;

    Ok(())
}
