use ocula_image::{Image, ImageError, ImageSize};

use super::Kernel;

/// Iterate the `(row, col)` coordinates of the pixels a kernel can be centered on.
///
/// Pixels closer to the image border than the kernel radius are skipped, so a kernel centered on
/// any yielded pixel lies fully inside the image.
///
/// # Arguments
///
/// * `size` - The image size.
/// * `radius` - The kernel half sizes `(rows, cols)`.
pub fn interior_pixels(
    size: ImageSize,
    radius: (usize, usize),
) -> impl Iterator<Item = (usize, usize)> {
    let (radius_rows, radius_cols) = radius;
    let row_end = size.height.saturating_sub(radius_rows);
    let col_end = size.width.saturating_sub(radius_cols);
    (radius_rows..row_end).flat_map(move |row| (radius_cols..col_end).map(move |col| (row, col)))
}

/// Filter an image with a weighted kernel.
///
/// Each interior pixel is replaced by the weighted sum of its neighborhood divided by the sum of
/// the kernel weights (one if the weights sum to zero), clamped to the `u8` range. Border pixels
/// within the kernel radius are copied from the source unchanged.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel` - The filter kernel.
///
/// # Example
///
/// ```
/// use ocula_image::{Image, ImageSize};
/// use ocula_imgproc::filter::{filter2d, Kernel};
///
/// let src = Image::<u8, 1>::new(
///     ImageSize { width: 3, height: 3 },
///     vec![0, 0, 0, 0, 90, 0, 0, 0, 0],
/// ).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0).unwrap();
///
/// filter2d(&src, &mut dst, &Kernel::box_kernel(3).unwrap()).unwrap();
/// assert_eq!(dst.as_slice(), &[0, 0, 0, 0, 10, 0, 0, 0, 0]);
/// ```
pub fn filter2d<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel: &Kernel,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let norm = match kernel.weight_sum() {
        0 => 1,
        sum => sum,
    };

    let (radius_rows, radius_cols) = kernel.radius();
    let width = src.width();
    let src_data = src.as_slice();

    dst.as_slice_mut().copy_from_slice(src_data);
    let dst_data = dst.as_slice_mut();

    for (row, col) in interior_pixels(src.size(), kernel.radius()) {
        for ch in 0..C {
            let mut acc = 0i32;
            for kr in 0..kernel.height() {
                let src_row = row + kr - radius_rows;
                for kc in 0..kernel.width() {
                    let src_col = col + kc - radius_cols;
                    let weight = kernel.data()[kr * kernel.width() + kc] as i32;
                    acc += weight * src_data[(src_row * width + src_col) * C + ch] as i32;
                }
            }
            dst_data[(row * width + col) * C + ch] = (acc / norm).clamp(0, 255) as u8;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_pixels_skips_border() {
        let size = ImageSize {
            width: 5,
            height: 4,
        };
        let pixels = interior_pixels(size, (1, 1)).collect::<Vec<_>>();
        assert_eq!(
            pixels,
            vec![(1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (2, 3)]
        );

        let tiny = ImageSize {
            width: 2,
            height: 2,
        };
        assert_eq!(interior_pixels(tiny, (1, 1)).count(), 0);
        assert_eq!(interior_pixels(tiny, (3, 3)).count(), 0);
    }

    #[test]
    fn filter2d_box_blur_keeps_border() -> Result<(), Box<dyn std::error::Error>> {
        let size = ImageSize {
            width: 4,
            height: 4,
        };
        #[rustfmt::skip]
        let src = Image::<u8, 1>::new(size, vec![
            9, 9, 9, 9,
            9, 0, 0, 9,
            9, 0, 0, 9,
            9, 9, 9, 9,
        ])?;
        let mut dst = Image::<u8, 1>::from_size_val(size, 0)?;
        filter2d(&src, &mut dst, &Kernel::box_kernel(3)?)?;

        #[rustfmt::skip]
        let expected = vec![
            9, 9, 9, 9,
            9, 5, 5, 9,
            9, 5, 5, 9,
            9, 9, 9, 9,
        ];
        assert_eq!(dst.as_slice(), expected.as_slice());

        Ok(())
    }

    #[test]
    fn filter2d_zero_sum_kernel_clamps() -> Result<(), Box<dyn std::error::Error>> {
        let size = ImageSize {
            width: 3,
            height: 3,
        };
        let src = Image::<u8, 1>::new(size, vec![10, 10, 10, 10, 100, 10, 10, 10, 10])?;
        let mut dst = Image::<u8, 1>::from_size_val(size, 0)?;

        // laplacian-like kernel, weights sum to zero
        let kernel = Kernel::new(3, 3, vec![-1, -1, -1, -1, 8, -1, -1, -1, -1])?;
        filter2d(&src, &mut dst, &kernel)?;
        assert_eq!(dst.get_pixel(1, 1, 0)?, 255);

        let inverted = Kernel::new(3, 3, vec![1, 1, 1, 1, -8, 1, 1, 1, 1])?;
        filter2d(&src, &mut dst, &inverted)?;
        assert_eq!(dst.get_pixel(1, 1, 0)?, 0);

        Ok(())
    }

    #[test]
    fn filter2d_per_channel() -> Result<(), Box<dyn std::error::Error>> {
        let size = ImageSize {
            width: 3,
            height: 1,
        };
        let src = Image::<u8, 3>::new(size, vec![0, 30, 60, 3, 30, 60, 6, 30, 60])?;
        let mut dst = Image::<u8, 3>::from_size_val(size, 0)?;
        filter2d(&src, &mut dst, &Kernel::new(3, 1, vec![1, 1, 1])?)?;
        assert_eq!(dst.as_slice()[3..6], [3, 30, 60]);

        Ok(())
    }
}
