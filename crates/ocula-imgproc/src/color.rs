use ocula_image::{Image, ImageError};

/// Convert an RGB8 image to an intensity image using the channel average:
///
/// Y = (R + G + B) / 3
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output intensity image.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use ocula_image::{Image, ImageSize};
/// use ocula_imgproc::color::gray_from_rgb_u8;
///
/// let image = Image::<u8, 3>::new(
///     ImageSize {
///         width: 2,
///         height: 1,
///     },
///     vec![30, 60, 90, 255, 255, 255],
/// )
/// .unwrap();
///
/// let mut gray = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// gray_from_rgb_u8(&image, &mut gray).unwrap();
/// assert_eq!(gray.as_slice(), &[60, 255]);
/// ```
pub fn gray_from_rgb_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    src.as_slice()
        .chunks_exact(3)
        .zip(dst.as_slice_mut().iter_mut())
        .for_each(|(src_pixel, dst_pixel)| {
            let sum = src_pixel[0] as u16 + src_pixel[1] as u16 + src_pixel[2] as u16;
            *dst_pixel = (sum / 3) as u8;
        });

    Ok(())
}

/// Replicate an intensity image into the three channels of an RGB8 image.
///
/// # Arguments
///
/// * `src` - The input intensity image.
/// * `dst` - The output RGB8 image.
///
/// Precondition: the input and output images must have the same size.
pub fn rgb_from_gray_u8(src: &Image<u8, 1>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    src.as_slice()
        .iter()
        .zip(dst.as_slice_mut().chunks_exact_mut(3))
        .for_each(|(&src_pixel, dst_pixel)| {
            dst_pixel.fill(src_pixel);
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use ocula_image::{Image, ImageError, ImageSize};

    #[test]
    fn gray_from_rgb_u8() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 1,
                height: 2,
            },
            vec![0, 128, 255, 1, 1, 2],
        )?;

        let mut gray = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::gray_from_rgb_u8(&image, &mut gray)?;

        assert_eq!(gray.as_slice(), &[127, 1]);

        Ok(())
    }

    #[test]
    fn rgb_from_gray_u8() -> Result<(), ImageError> {
        let gray = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![7, 200],
        )?;

        let mut rgb = Image::<u8, 3>::from_size_val(gray.size(), 0)?;
        super::rgb_from_gray_u8(&gray, &mut rgb)?;

        assert_eq!(rgb.as_slice(), &[7, 7, 7, 200, 200, 200]);

        let mut wrong = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 1,
                height: 1,
            },
            0,
        )?;
        assert!(super::rgb_from_gray_u8(&gray, &mut wrong).is_err());

        Ok(())
    }
}
