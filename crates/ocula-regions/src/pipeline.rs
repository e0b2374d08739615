use std::path::Path;

use ocula_image::Image;
use ocula_imgproc::{
    filter::{filter2d, Kernel},
    morphology::{apply_morphology, MorphOp, MorphologyError, FOREGROUND},
    threshold::{threshold_binary, threshold_binary_inverse, threshold_kmeans, KMeansOptions},
};
use serde::{Deserialize, Serialize};

use crate::{
    classifier::{ClassifierOptions, Palette},
    errors::RegionsError,
    labeling::{label_regions, ColorizeOptions, LabelOptions, Segmentation},
};

/// Settings of every stage from intensity image to annotations.
///
/// Every field has a default, so a JSON file only needs the fields it changes:
///
/// ```json
/// { "morphology": ["open"], "labeling": { "half_frame": 2 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Centroid movement under which k-means stops.
    pub kmeans_tolerance: u8,
    /// Iteration cap of k-means.
    pub kmeans_max_iter: usize,
    /// Seed of the k-means initialization, random when unset.
    pub seed: Option<u64>,
    /// Treat dark pixels as foreground.
    pub invert: bool,
    /// Morphological operations applied after thresholding, by name.
    pub morphology: Vec<String>,
    /// Region labeler options.
    pub labeling: LabelOptions,
    /// Label image rendering options.
    pub colorize: ColorizeOptions,
    /// Classifier options.
    pub classifier: ClassifierOptions,
    /// Class colors.
    pub palette: Palette,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let kmeans = KMeansOptions::default();
        Self {
            kmeans_tolerance: kmeans.tolerance,
            kmeans_max_iter: kmeans.max_iter,
            seed: kmeans.seed,
            invert: false,
            morphology: vec![MorphOp::Close.to_string(), MorphOp::Open.to_string()],
            labeling: LabelOptions::default(),
            colorize: ColorizeOptions::default(),
            classifier: ClassifierOptions::default(),
            palette: Palette::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RegionsError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// The k-means options of the thresholding stage.
    pub fn kmeans_options(&self) -> KMeansOptions {
        KMeansOptions {
            tolerance: self.kmeans_tolerance,
            max_iter: self.kmeans_max_iter,
            seed: self.seed,
            ..Default::default()
        }
    }

    /// Parse the morphology sequence.
    pub fn morph_ops(&self) -> Result<Vec<MorphOp>, MorphologyError> {
        self.morphology.iter().map(|name| name.parse()).collect()
    }
}

/// Smooth an intensity image with a mask kernel.
pub fn smooth(src: &Image<u8, 1>, mask: &Kernel) -> Result<Image<u8, 1>, RegionsError> {
    let mut dst = Image::from_size_val(src.size(), 0)?;
    filter2d(src, &mut dst, mask)?;
    Ok(dst)
}

/// Threshold an intensity image into a binary image with the k-means cutoff.
///
/// Returns the binary image and the threshold that produced it.
pub fn binarize(
    src: &Image<u8, 1>,
    config: &PipelineConfig,
) -> Result<(Image<u8, 1>, u8), RegionsError> {
    let threshold = threshold_kmeans(src, &config.kmeans_options())?;
    log::info!("k-means threshold: {threshold}");

    let mut binary = Image::from_size_val(src.size(), 0)?;
    if config.invert {
        threshold_binary_inverse(src, &mut binary, threshold, FOREGROUND)?;
    } else {
        threshold_binary(src, &mut binary, threshold, FOREGROUND)?;
    }

    Ok((binary, threshold))
}

/// Segment an intensity image into labeled regions.
///
/// Runs the optional mask smoothing, the k-means threshold, the morphology sequence and the
/// region labeler.
pub fn segment(
    src: &Image<u8, 1>,
    config: &PipelineConfig,
    mask: Option<&Kernel>,
) -> Result<Segmentation, RegionsError> {
    let smoothed;
    let src = match mask {
        Some(mask) => {
            smoothed = smooth(src, mask)?;
            &smoothed
        }
        None => src,
    };

    let (binary, _) = binarize(src, config)?;
    let cleaned = apply_morphology(&binary, &config.morph_ops()?)?;

    label_regions(&cleaned, &config.labeling)
}
