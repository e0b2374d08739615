use std::collections::HashMap;
use std::ops::Range;

use ocula_image::{Image, ImageError};
use ocula_imgproc::{filter::interior_pixels, morphology::BACKGROUND as BINARY_BACKGROUND};
use serde::{Deserialize, Serialize};

use crate::errors::RegionsError;

/// Value of background pixels in a label image.
pub const BACKGROUND_LABEL: u32 = u32::MAX;

// sentinels of the working buffer, raw labels start right after them
const UNLABELED: u32 = 0;
const BACKGROUND: u32 = 1;
const FIRST_LABEL: u32 = 2;

/// Options for the region labeler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOptions {
    /// Half size of the square neighborhood; two foreground pixels are connected when they are at
    /// most `half_frame` pixels apart along both axes.
    pub half_frame: usize,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self { half_frame: 1 }
    }
}

/// An axis aligned box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Top row.
    pub row: usize,
    /// Left column.
    pub col: usize,
    /// Number of columns covered.
    pub width: usize,
    /// Number of rows covered.
    pub height: usize,
}

impl BoundingBox {
    /// The rows covered by the box.
    pub fn rows(&self) -> Range<usize> {
        self.row..self.row + self.height
    }

    /// The columns covered by the box.
    pub fn cols(&self) -> Range<usize> {
        self.col..self.col + self.width
    }

    /// Whether the pixel at `(row, col)` lies inside the box.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows().contains(&row) && self.cols().contains(&col)
    }
}

/// Running min/max extents of a set of pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxAccumulator {
    min_row: usize,
    max_row: usize,
    min_col: usize,
    max_col: usize,
}

impl BoxAccumulator {
    /// Start from a single pixel.
    pub fn new(row: usize, col: usize) -> Self {
        Self {
            min_row: row,
            max_row: row,
            min_col: col,
            max_col: col,
        }
    }

    /// Grow the extents so they contain the pixel at `(row, col)`.
    pub fn expand_to_contain(&mut self, row: usize, col: usize) {
        self.min_row = self.min_row.min(row);
        self.max_row = self.max_row.max(row);
        self.min_col = self.min_col.min(col);
        self.max_col = self.max_col.max(col);
    }

    /// Convert the extents to a box.
    pub fn finish(self) -> BoundingBox {
        BoundingBox {
            row: self.min_row,
            col: self.min_col,
            width: self.max_col - self.min_col + 1,
            height: self.max_row - self.min_row + 1,
        }
    }
}

/// A connected set of foreground pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Dense index of the region, also its value in the label image.
    pub index: usize,
    /// Label the region carried before compaction.
    pub raw_label: u32,
    /// Extent of the region.
    pub bbox: BoundingBox,
}

/// The result of labeling a binary image.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    /// Per pixel region index, [`BACKGROUND_LABEL`] for background.
    pub labels: Image<u32, 1>,
    /// Regions ordered by their first pixel in raster order.
    pub regions: Vec<Region>,
}

impl Segmentation {
    /// Number of regions found.
    pub fn num_regions(&self) -> usize {
        self.regions.len()
    }

    /// Number of pixels carrying the label of `region`.
    pub fn area(&self, region: &Region) -> usize {
        let width = self.labels.width();
        let data = self.labels.as_slice();
        region
            .bbox
            .rows()
            .flat_map(|row| region.bbox.cols().map(move |col| row * width + col))
            .filter(|&i| data[i] == region.index as u32)
            .count()
    }
}

/// Iterate the labels of the `(2h+1)²` neighborhood of `(row, col)` in raster order.
fn neighborhood(
    labels: &[u32],
    width: usize,
    row: usize,
    col: usize,
    half_frame: usize,
) -> impl Iterator<Item = u32> + '_ {
    (row - half_frame..=row + half_frame).flat_map(move |r| {
        labels[r * width + col - half_frame..=r * width + col + half_frame]
            .iter()
            .copied()
    })
}

/// Label the connected foreground regions of a binary image.
///
/// Any pixel different from the binary background value is foreground. Pixels within
/// `half_frame` of the image border are never labeled and come out as background.
///
/// The labeler runs in three passes:
///
/// 1. every foreground pixel adopts the first label found in its neighborhood in raster order,
///    or opens a new label;
/// 2. labels meeting in a neighborhood are merged, the larger into the smaller;
/// 3. the surviving labels are compacted to `0..n` in order of appearance while the bounding
///    boxes are accumulated.
///
/// # Arguments
///
/// * `src` - The binary image.
/// * `options` - The labeling options.
///
/// # Errors
///
/// * [`RegionsError::InvalidParameter`] if `half_frame` is zero.
/// * [`RegionsError::NoRegions`] if no pixel gets labeled.
/// * [`RegionsError::LabelCountMismatch`] if the merge bookkeeping disagrees with the labels
///   left in the image.
///
/// # Example
///
/// ```
/// use ocula_image::{Image, ImageSize};
/// use ocula_regions::labeling::{label_regions, LabelOptions};
///
/// let mut data = vec![0u8; 36];
/// for i in [7, 8, 13, 14] {
///     data[i] = 255;
/// }
/// let src = Image::<u8, 1>::new(ImageSize { width: 6, height: 6 }, data).unwrap();
///
/// let segmentation = label_regions(&src, &LabelOptions::default()).unwrap();
/// assert_eq!(segmentation.num_regions(), 1);
/// assert_eq!(segmentation.regions[0].bbox.width, 2);
/// ```
pub fn label_regions(
    src: &Image<u8, 1>,
    options: &LabelOptions,
) -> Result<Segmentation, RegionsError> {
    let half_frame = options.half_frame;
    if half_frame == 0 {
        return Err(RegionsError::InvalidParameter(
            "half_frame must be at least 1".to_string(),
        ));
    }

    let size = src.size();
    let width = size.width;
    let src_data = src.as_slice();

    let mut work = Vec::new();
    work.try_reserve_exact(src_data.len())
        .map_err(ImageError::from)?;
    work.resize(src_data.len(), UNLABELED);

    // pass 1: provisional labels
    let mut next_label = FIRST_LABEL;
    let mut label_count = 0usize;

    for (row, col) in interior_pixels(size, (half_frame, half_frame)) {
        let i = row * width + col;
        if src_data[i] == BINARY_BACKGROUND {
            work[i] = BACKGROUND;
            continue;
        }

        let adopted =
            neighborhood(&work, width, row, col, half_frame).find(|&l| l >= FIRST_LABEL);
        work[i] = match adopted {
            Some(label) => label,
            None => {
                let label = next_label;
                next_label += 1;
                label_count += 1;
                label
            }
        };
    }

    log::debug!("assigned {label_count} provisional labels");

    // pass 2: merge labels sharing a neighborhood
    for (row, col) in interior_pixels(size, (half_frame, half_frame)) {
        if work[row * width + col] < FIRST_LABEL {
            continue;
        }

        loop {
            let (min, max) = neighborhood(&work, width, row, col, half_frame)
                .filter(|&l| l >= FIRST_LABEL)
                .fold((u32::MAX, FIRST_LABEL), |(lo, hi), l| (lo.min(l), hi.max(l)));

            if min == max {
                break;
            }

            log::debug!("merging label {max} into {min}");
            work.iter_mut().filter(|l| **l == max).for_each(|l| *l = min);
            label_count -= 1;
        }
    }

    // pass 3: compaction and bounding boxes
    let mut compact = HashMap::<u32, usize>::new();
    let mut boxes = Vec::<(u32, BoxAccumulator)>::new();
    let mut labels = Vec::new();
    labels
        .try_reserve_exact(work.len())
        .map_err(ImageError::from)?;

    for (i, &raw) in work.iter().enumerate() {
        if raw < FIRST_LABEL {
            labels.push(BACKGROUND_LABEL);
            continue;
        }

        let (row, col) = (i / width, i % width);
        let index = *compact.entry(raw).or_insert_with(|| {
            boxes.push((raw, BoxAccumulator::new(row, col)));
            boxes.len() - 1
        });
        boxes[index].1.expand_to_contain(row, col);
        labels.push(index as u32);
    }

    if boxes.is_empty() {
        return Err(RegionsError::NoRegions);
    }

    if boxes.len() != label_count {
        return Err(RegionsError::LabelCountMismatch {
            found: boxes.len(),
            expected: label_count,
        });
    }

    let regions = boxes
        .into_iter()
        .enumerate()
        .map(|(index, (raw_label, acc))| Region {
            index,
            raw_label,
            bbox: acc.finish(),
        })
        .collect::<Vec<_>>();

    log::info!("labeled {} regions", regions.len());

    Ok(Segmentation {
        labels: Image::new(size, labels)?,
        regions,
    })
}

/// Options to render a label image for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorizeOptions {
    /// Region indices are spread over `0..display_range`.
    pub display_range: u8,
    /// Intensity of background pixels.
    pub background: u8,
}

impl Default for ColorizeOptions {
    fn default() -> Self {
        Self {
            display_range: 240,
            background: 255,
        }
    }
}

/// Render a segmentation as an intensity image.
///
/// Region `i` of `n` gets intensity `i * display_range / n`.
pub fn colorize_regions(
    segmentation: &Segmentation,
    options: &ColorizeOptions,
) -> Result<Image<u8, 1>, ImageError> {
    let n = segmentation.num_regions().max(1);
    let range = options.display_range as usize;

    let data = segmentation
        .labels
        .as_slice()
        .iter()
        .map(|&label| match label {
            BACKGROUND_LABEL => options.background,
            index => (index as usize * range / n) as u8,
        })
        .collect();

    Image::new(segmentation.labels.size(), data)
}
