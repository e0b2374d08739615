use ocula_image::Image;

use crate::labeling::Region;

/// Highest moment order kept by [`Moments`].
pub const MAX_ORDER: usize = 3;

/// Iterate the `(row, col)` of the pixels of `region` inside its bounding box.
fn region_pixels<'a>(
    labels: &'a Image<u32, 1>,
    region: &'a Region,
) -> impl Iterator<Item = (f64, f64)> + 'a {
    let width = labels.width();
    let data = labels.as_slice();
    let label = region.index as u32;

    region
        .bbox
        .rows()
        .flat_map(move |row| region.bbox.cols().map(move |col| (row, col)))
        .filter(move |&(row, col)| data[row * width + col] == label)
        .map(|(row, col)| (row as f64, col as f64))
}

/// Raw geometric moment `M(p, q) = Σ row^p · col^q` over the pixels of a region.
pub fn raw_moment(labels: &Image<u32, 1>, region: &Region, p: i32, q: i32) -> f64 {
    region_pixels(labels, region)
        .map(|(row, col)| row.powi(p) * col.powi(q))
        .sum()
}

/// Central moment `μ(p, q)` around the region centroid.
pub fn central_moment(labels: &Image<u32, 1>, region: &Region, p: i32, q: i32) -> f64 {
    let (row_mean, col_mean) = centroid(labels, region);
    region_pixels(labels, region)
        .map(|(row, col)| (row - row_mean).powi(p) * (col - col_mean).powi(q))
        .sum()
}

/// Normalized central moment `η(p, q) = μ(p, q) / μ(0, 0)^(1 + (p + q) / 2)`.
pub fn normalized_moment(labels: &Image<u32, 1>, region: &Region, p: i32, q: i32) -> f64 {
    let mu00 = central_moment(labels, region, 0, 0);
    central_moment(labels, region, p, q) / normalization(mu00, p, q)
}

/// Centroid `(M10 / M00, M01 / M00)` of a region.
pub fn centroid(labels: &Image<u32, 1>, region: &Region) -> (f64, f64) {
    let (m00, m10, m01) = region_pixels(labels, region).fold(
        (0.0, 0.0, 0.0),
        |(m00, m10, m01), (row, col)| (m00 + 1.0, m10 + row, m01 + col),
    );
    (m10 / m00, m01 / m00)
}

fn normalization(mu00: f64, p: i32, q: i32) -> f64 {
    mu00.powf(1.0 + (p + q) as f64 / 2.0)
}

/// Central moments of a region up to order three.
///
/// Computes every moment in two passes over the bounding box instead of one pass per moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    mu: [[f64; MAX_ORDER + 1]; MAX_ORDER + 1],
}

impl Moments {
    /// Compute the central moments of `region`.
    pub fn new(labels: &Image<u32, 1>, region: &Region) -> Self {
        let (row_mean, col_mean) = centroid(labels, region);

        let mut mu = [[0.0; MAX_ORDER + 1]; MAX_ORDER + 1];
        for (row, col) in region_pixels(labels, region) {
            let (dr, dc) = (row - row_mean, col - col_mean);
            let mut dr_p = 1.0;
            for mu_p in mu.iter_mut() {
                let mut dc_q = 1.0;
                for value in mu_p.iter_mut() {
                    *value += dr_p * dc_q;
                    dc_q *= dc;
                }
                dr_p *= dr;
            }
        }

        Self { mu }
    }

    /// Number of pixels of the region.
    pub fn area(&self) -> f64 {
        self.mu[0][0]
    }

    /// Central moment `μ(p, q)`, zero above order three.
    pub fn central(&self, p: usize, q: usize) -> f64 {
        if p + q > MAX_ORDER {
            return 0.0;
        }
        self.mu[p][q]
    }

    /// Normalized central moment `η(p, q)`.
    pub fn eta(&self, p: usize, q: usize) -> f64 {
        self.central(p, q) / normalization(self.area(), p as i32, q as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeling::BoundingBox;
    use approx::assert_relative_eq;
    use ocula_image::{ImageError, ImageSize};

    // a 2x3 block at rows 1..3, cols 2..5 of a 4x6 label image
    fn block() -> Result<(Image<u32, 1>, Region), ImageError> {
        let size = ImageSize {
            width: 6,
            height: 4,
        };
        let mut labels = Image::from_size_val(size, u32::MAX)?;
        for row in 1..3 {
            for col in 2..5 {
                labels.set_pixel(col, row, 0, 0)?;
            }
        }
        let region = Region {
            index: 0,
            raw_label: 2,
            bbox: BoundingBox {
                row: 1,
                col: 2,
                width: 3,
                height: 2,
            },
        };
        Ok((labels, region))
    }

    #[test]
    fn test_raw_and_central() -> Result<(), ImageError> {
        let (labels, region) = block()?;

        assert_relative_eq!(raw_moment(&labels, &region, 0, 0), 6.0);
        assert_relative_eq!(raw_moment(&labels, &region, 1, 0), 9.0);
        assert_relative_eq!(raw_moment(&labels, &region, 0, 1), 18.0);
        assert_eq!(centroid(&labels, &region), (1.5, 3.0));

        assert_relative_eq!(central_moment(&labels, &region, 1, 0), 0.0);
        assert_relative_eq!(central_moment(&labels, &region, 2, 0), 1.5);
        assert_relative_eq!(central_moment(&labels, &region, 0, 2), 4.0);
        assert_relative_eq!(central_moment(&labels, &region, 1, 1), 0.0);
        assert_relative_eq!(normalized_moment(&labels, &region, 0, 2), 4.0 / 36.0);
        Ok(())
    }

    #[test]
    fn test_moments_match_direct_sums() -> Result<(), ImageError> {
        let (mut labels, mut region) = block()?;
        // make the region asymmetric
        labels.set_pixel(1, 3, 0, 0)?;
        region.bbox = BoundingBox {
            row: 1,
            col: 1,
            width: 4,
            height: 3,
        };

        let moments = Moments::new(&labels, &region);
        assert_relative_eq!(moments.area(), 7.0);
        for p in 0..=3 {
            for q in 0..=(3 - p) {
                assert_relative_eq!(
                    moments.central(p, q),
                    central_moment(&labels, &region, p as i32, q as i32),
                    epsilon = 1e-9
                );
                assert_relative_eq!(
                    moments.eta(p, q),
                    normalized_moment(&labels, &region, p as i32, q as i32),
                    epsilon = 1e-12
                );
            }
        }
        assert_eq!(moments.central(2, 2), 0.0);
        Ok(())
    }

    #[test]
    fn test_other_labels_are_ignored() -> Result<(), ImageError> {
        let (mut labels, region) = block()?;
        labels.set_pixel(2, 1, 0, 7)?;
        assert_relative_eq!(raw_moment(&labels, &region, 0, 0), 5.0);
        Ok(())
    }
}
