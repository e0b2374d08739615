use num_traits::Zero;
use rand::{rngs::StdRng, Rng, SeedableRng};

use ocula_image::{Image, ImageError};

use crate::histogram::compute_histogram;

/// Number of intensity levels of an 8-bit image.
pub const HISTOGRAM_LENGTH: usize = 256;

/// Errors that can occur while computing an automatic threshold.
#[derive(Debug, thiserror::Error)]
pub enum ThresholdError {
    /// Error related to the input image.
    #[error(transparent)]
    ImageError(#[from] ImageError),

    /// The number of clusters must be at least two.
    #[error("k-means needs at least 2 clusters, got {0}")]
    InvalidClusterCount(usize),

    /// The iteration cap must allow at least one iteration.
    #[error("k-means needs at least one iteration")]
    InvalidMaxIterations,
}

/// Options for the histogram k-means thresholder.
#[derive(Debug, Clone)]
pub struct KMeansOptions {
    /// Number of clusters. The threshold uses the first two.
    pub n_clusters: usize,
    /// Maximum centroid movement, in intensity levels, considered converged.
    pub tolerance: u8,
    /// Iteration cap. When reached the last centroids are used.
    pub max_iter: usize,
    /// Seed for the random centroid initialization.
    pub seed: Option<u64>,
}

impl Default for KMeansOptions {
    fn default() -> Self {
        Self {
            n_clusters: 2,
            tolerance: 2,
            max_iter: 256,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Cluster {
    /// centroid used to assign the bins of the current iteration
    centroid: u8,
    /// centroid computed from the current assignment
    next: u8,
    weighted_sum: u64,
    count: u64,
}

impl Cluster {
    fn reset(&mut self) {
        self.centroid = self.next;
        self.weighted_sum = 0;
        self.count = 0;
    }

    fn update(&mut self) {
        let count = if self.count == 0 { 1 } else { self.count };
        self.next = (self.weighted_sum / count) as u8;
    }

    fn shift(&self) -> u8 {
        self.centroid.abs_diff(self.next)
    }
}

/// Index of the cluster closest to `value`. Ties keep the lower index.
fn nearest_cluster(clusters: &[Cluster], value: u8) -> usize {
    let mut min_index = 0;
    let mut min_distance = clusters[0].centroid.abs_diff(value);
    for (i, cluster) in clusters.iter().enumerate().skip(1) {
        let distance = cluster.centroid.abs_diff(value);
        if distance < min_distance {
            min_distance = distance;
            min_index = i;
        }
    }
    min_index
}

/// Cluster the bins of an intensity histogram with k-means.
///
/// Every bin is assigned to the nearest centroid and the centroids are moved to the weighted mean
/// of their bins until no centroid moves more than `options.tolerance` levels, or until
/// `options.max_iter` iterations have run.
///
/// # Arguments
///
/// * `hist` - A histogram with [`HISTOGRAM_LENGTH`] bins.
/// * `options` - The clustering options.
///
/// # Returns
///
/// The centroids the last assignment was made with, one per cluster, in cluster order.
pub fn kmeans_centroids(hist: &[usize], options: &KMeansOptions) -> Result<Vec<u8>, ThresholdError> {
    if hist.len() != HISTOGRAM_LENGTH {
        return Err(ImageError::InvalidHistogramBins(hist.len()).into());
    }

    if options.n_clusters < 2 {
        return Err(ThresholdError::InvalidClusterCount(options.n_clusters));
    }

    if options.max_iter == 0 {
        return Err(ThresholdError::InvalidMaxIterations);
    }

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut clusters = (0..options.n_clusters)
        .map(|_| Cluster {
            next: rng.random::<u8>(),
            ..Default::default()
        })
        .collect::<Vec<_>>();

    log::debug!(
        "k-means initial centroids: {:?}",
        clusters.iter().map(|c| c.next).collect::<Vec<_>>()
    );

    for iteration in 1..=options.max_iter {
        clusters.iter_mut().for_each(Cluster::reset);

        for (value, &count) in hist.iter().enumerate() {
            let nearest = nearest_cluster(&clusters, value as u8);
            clusters[nearest].weighted_sum += (value * count) as u64;
            clusters[nearest].count += count as u64;
        }

        clusters.iter_mut().for_each(Cluster::update);

        if clusters.iter().all(|c| c.shift() <= options.tolerance) {
            log::debug!("k-means converged after {iteration} iterations");
            return Ok(clusters.iter().map(|c| c.centroid).collect());
        }
    }

    log::warn!(
        "k-means did not converge within {} iterations, using the last centroids",
        options.max_iter
    );

    Ok(clusters.iter().map(|c| c.centroid).collect())
}

/// Compute a binarization threshold with 2-cluster k-means over the intensity histogram.
///
/// # Arguments
///
/// * `src` - The input intensity image.
/// * `options` - The clustering options.
///
/// # Returns
///
/// The average of the first two cluster centroids.
///
/// # Example
///
/// ```
/// use ocula_image::{Image, ImageSize};
/// use ocula_imgproc::threshold::{threshold_kmeans, KMeansOptions};
///
/// let mut data = vec![10u8; 50];
/// data.extend(vec![200u8; 50]);
/// let image = Image::<u8, 1>::new(ImageSize { width: 10, height: 10 }, data).unwrap();
///
/// let options = KMeansOptions { seed: Some(7), ..Default::default() };
/// let threshold = threshold_kmeans(&image, &options).unwrap();
/// assert!(threshold > 10 && threshold < 200);
/// ```
pub fn threshold_kmeans(src: &Image<u8, 1>, options: &KMeansOptions) -> Result<u8, ThresholdError> {
    let mut hist = vec![0usize; HISTOGRAM_LENGTH];
    compute_histogram(src, &mut hist, HISTOGRAM_LENGTH)?;

    let centroids = kmeans_centroids(&hist, options)?;
    let threshold = ((centroids[0] as u16 + centroids[1] as u16) / 2) as u8;

    log::debug!(
        "k-means centroids {} and {} -> threshold {}",
        centroids[0],
        centroids[1],
        threshold
    );

    Ok(threshold)
}

/// Apply a binary threshold to an image.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `dst` - The output image of an arbitrary number of channels and type.
/// * `threshold` - The threshold value. Must be the same type as the image.
/// * `max_value` - The maximum value to use when the input value is greater than the threshold.
///
/// # Examples
///
/// ```
/// use ocula_image::{Image, ImageSize};
/// use ocula_imgproc::threshold::threshold_binary;
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_binary(&image, &mut thresholded, 100, 255).unwrap();
/// assert_eq!(thresholded.as_slice(), &[0, 255, 0, 255, 255, 255]);
/// ```
pub fn threshold_binary<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    threshold: T,
    max_value: T,
) -> Result<(), ImageError>
where
    T: Copy + PartialOrd + Zero,
{
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
        .zip(dst.as_slice_mut().iter_mut())
        .for_each(|(src_pixel, dst_pixel)| {
            *dst_pixel = if *src_pixel > threshold {
                max_value
            } else {
                T::zero()
            };
        });

    Ok(())
}

/// Apply an inverse binary threshold to an image.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `dst` - The output image of an arbitrary number of channels and type.
/// * `threshold` - The threshold value. Must be the same type as the image.
/// * `max_value` - The maximum value to use when the input value is less or equal than the threshold.
///
/// # Examples
///
/// ```
/// use ocula_image::{Image, ImageSize};
/// use ocula_imgproc::threshold::threshold_binary_inverse;
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_binary_inverse(&image, &mut thresholded, 100, 255).unwrap();
/// assert_eq!(thresholded.as_slice(), &[255, 0, 255, 0, 0, 0]);
/// ```
pub fn threshold_binary_inverse<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    threshold: T,
    max_value: T,
) -> Result<(), ImageError>
where
    T: Copy + PartialOrd + Zero,
{
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
        .zip(dst.as_slice_mut().iter_mut())
        .for_each(|(src_pixel, dst_pixel)| {
            *dst_pixel = if *src_pixel > threshold {
                T::zero()
            } else {
                max_value
            };
        });

    Ok(())
}
