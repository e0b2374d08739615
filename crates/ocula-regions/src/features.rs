use ocula_image::Image;
use serde::{Deserialize, Serialize};

use crate::{errors::RegionsError, labeling::Region, moments::Moments};

/// Number of shape descriptors per region.
pub const FEATURE_COUNT: usize = 7;

/// An averaged set of shape descriptors.
///
/// `count` is the number of regions that went into the average, so vectors can be merged with
/// [`FeatureVector::accumulate`] without keeping the individual samples.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    /// The descriptor values.
    pub values: [f64; FEATURE_COUNT],
    /// Number of samples averaged into `values`.
    pub count: u64,
}

impl FeatureVector {
    /// Create a feature vector from an average over `count` samples.
    pub fn new(values: [f64; FEATURE_COUNT], count: u64) -> Self {
        Self { values, count }
    }

    /// Merge another average into this one, weighting both by their sample counts.
    ///
    /// # Example
    ///
    /// ```
    /// use ocula_regions::features::FeatureVector;
    ///
    /// let mut avg = FeatureVector::new([1.0; 7], 3);
    /// avg.accumulate(&FeatureVector::new([5.0; 7], 1));
    /// assert_eq!(avg.values, [2.0; 7]);
    /// assert_eq!(avg.count, 4);
    /// ```
    pub fn accumulate(&mut self, other: &FeatureVector) {
        if other.count == 0 {
            return;
        }

        let total = self.count + other.count;
        for (value, incoming) in self.values.iter_mut().zip(other.values.iter()) {
            *value = (*value * self.count as f64 + incoming * other.count as f64) / total as f64;
        }
        self.count = total;
    }

    /// Unweighted mean of several vectors; its count is the number of vectors.
    ///
    /// Returns `None` for an empty slice.
    pub fn mean(vectors: &[FeatureVector]) -> Option<FeatureVector> {
        if vectors.is_empty() {
            return None;
        }

        let mut values = [0.0; FEATURE_COUNT];
        for vector in vectors {
            for (sum, value) in values.iter_mut().zip(vector.values.iter()) {
                *sum += value;
            }
        }
        values
            .iter_mut()
            .for_each(|v| *v /= vectors.len() as f64);

        Some(FeatureVector::new(values, vectors.len() as u64))
    }
}

/// The seven Hu invariants of a region.
///
/// Invariant to translation, scale and rotation of the region.
pub fn hu_invariants(moments: &Moments) -> [f64; FEATURE_COUNT] {
    let n20 = moments.eta(2, 0);
    let n02 = moments.eta(0, 2);
    let n11 = moments.eta(1, 1);
    let n30 = moments.eta(3, 0);
    let n03 = moments.eta(0, 3);
    let n21 = moments.eta(2, 1);
    let n12 = moments.eta(1, 2);

    let a = n30 - 3.0 * n12;
    let b = 3.0 * n21 - n03;
    let c = n30 + n12;
    let d = n21 + n03;

    [
        n20 + n02,
        (n20 - n02).powi(2) + 4.0 * n11.powi(2),
        a.powi(2) + b.powi(2),
        c.powi(2) + d.powi(2),
        a * c * (c.powi(2) - 3.0 * d.powi(2)) + b * d * (3.0 * c.powi(2) - d.powi(2)),
        (n20 - n02) * (c.powi(2) - d.powi(2)) + 4.0 * n11 * c * d,
        b * c * (c.powi(2) - 3.0 * d.powi(2)) - a * d * (3.0 * c.powi(2) - d.powi(2)),
    ]
}

/// Shape descriptors of a single region.
pub fn region_features(labels: &Image<u32, 1>, region: &Region) -> FeatureVector {
    FeatureVector::new(hu_invariants(&Moments::new(labels, region)), 1)
}

/// Shape descriptors of every region, in region order.
pub fn extract_region_features(labels: &Image<u32, 1>, regions: &[Region]) -> Vec<FeatureVector> {
    regions
        .iter()
        .map(|region| {
            let features = region_features(labels, region);
            log::debug!("region {}: {:?}", region.index, features.values);
            features
        })
        .collect()
}

/// Average shape descriptors of all regions of an image.
///
/// The result counts one sample per region.
///
/// # Errors
///
/// Returns [`RegionsError::NoRegions`] if `regions` is empty.
pub fn extract_features(
    labels: &Image<u32, 1>,
    regions: &[Region],
) -> Result<FeatureVector, RegionsError> {
    FeatureVector::mean(&extract_region_features(labels, regions)).ok_or(RegionsError::NoRegions)
}
