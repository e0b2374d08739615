use serde::{Deserialize, Serialize};

use crate::{
    errors::RegionsError,
    features::{FeatureVector, FEATURE_COUNT},
    labeling::{BoundingBox, Region},
    registry::ClassRegistry,
};

/// Options for the nearest-value classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierOptions {
    /// A feature slot votes only if the closest prototype value is nearer than this.
    pub epsilon: f64,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self { epsilon: 0.01 }
    }
}

/// Colors assigned to classes, cycled by class index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette(pub Vec<[u8; 3]>);

impl Default for Palette {
    fn default() -> Self {
        Self(vec![
            [255, 0, 0],
            [0, 255, 0],
            [0, 0, 255],
            [255, 255, 0],
            [255, 0, 255],
            [0, 255, 255],
            [255, 128, 0],
            [128, 0, 255],
            [128, 255, 0],
            [255, 0, 128],
        ])
    }
}

impl Palette {
    /// The color of the class at `class_index`, `None` for an empty palette.
    pub fn color(&self, class_index: usize) -> Option<[u8; 3]> {
        if self.0.is_empty() {
            return None;
        }
        Some(self.0[class_index % self.0.len()])
    }
}

/// Classification result of one region, ready to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Index of the region.
    pub region: usize,
    /// Extent of the region.
    pub bbox: BoundingBox,
    /// The winning class, `None` when no feature matched.
    pub class_index: Option<usize>,
    /// Color of the winning class.
    pub color: Option<[u8; 3]>,
}

/// Count the feature slots voting for each class.
///
/// For every slot the class with the closest prototype value gets the vote, lowest index first
/// on ties, provided the distance is below `epsilon`. Classes whose prototype averages no sample
/// take no part. Votes are indexed by registry position.
pub fn vote(
    features: &FeatureVector,
    registry: &ClassRegistry,
    options: &ClassifierOptions,
) -> Vec<usize> {
    let mut votes = vec![0usize; registry.len()];

    for slot in 0..FEATURE_COUNT {
        let value = features.values[slot];
        let mut best: Option<(usize, f64)> = None;

        for (index, class) in registry.iter().enumerate() {
            if class.prototype.count == 0 {
                continue;
            }
            let distance = (class.prototype.values[slot] - value).abs();
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }

        if let Some((index, distance)) = best {
            if distance < options.epsilon {
                votes[index] += 1;
            }
        }
    }

    votes
}

/// Pick the class of a region from its feature vector.
///
/// Returns `None` if no feature slot matched any class.
///
/// # Example
///
/// ```
/// use ocula_regions::classifier::{classify_region, ClassifierOptions};
/// use ocula_regions::features::FeatureVector;
/// use ocula_regions::registry::ClassRegistry;
///
/// let mut registry = ClassRegistry::new();
/// registry.insert_with_prototype("small", FeatureVector::new([0.1; 7], 1)).unwrap();
/// registry.insert_with_prototype("large", FeatureVector::new([0.5; 7], 1)).unwrap();
///
/// let region = FeatureVector::new([0.49; 7], 1);
/// let class = classify_region(&region, &registry, &ClassifierOptions { epsilon: 0.05 });
/// assert_eq!(class, Some(1));
/// ```
pub fn classify_region(
    features: &FeatureVector,
    registry: &ClassRegistry,
    options: &ClassifierOptions,
) -> Option<usize> {
    let votes = vote(features, registry, options);

    let mut winner: Option<(usize, usize)> = None;
    for (index, &count) in votes.iter().enumerate() {
        if count > 0 && winner.map_or(true, |(_, best)| count > best) {
            winner = Some((index, count));
        }
    }

    winner.map(|(index, _)| index)
}

/// Classify every region and build its annotation.
///
/// # Arguments
///
/// * `regions` - The regions to classify.
/// * `features` - The feature vector of each region, in the same order.
/// * `registry` - The learned classes.
/// * `options` - The classifier options.
/// * `palette` - The class colors.
///
/// # Errors
///
/// Returns [`RegionsError::FeatureCountMismatch`] if `features` and `regions` differ in length.
pub fn classify(
    regions: &[Region],
    features: &[FeatureVector],
    registry: &ClassRegistry,
    options: &ClassifierOptions,
    palette: &Palette,
) -> Result<Vec<Annotation>, RegionsError> {
    if regions.len() != features.len() {
        return Err(RegionsError::FeatureCountMismatch {
            regions: regions.len(),
            features: features.len(),
        });
    }

    let annotations = regions
        .iter()
        .zip(features)
        .map(|(region, features)| {
            let class_index = classify_region(features, registry, options);
            match class_index.and_then(|i| registry.get(i)) {
                Some(class) => log::info!("region {} is {}", region.index, class.name),
                None => log::info!("region {} is unclassified", region.index),
            }
            Annotation {
                region: region.index,
                bbox: region.bbox,
                class_index,
                color: class_index.and_then(|i| palette.color(i)),
            }
        })
        .collect();

    Ok(annotations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Result<ClassRegistry, RegionsError> {
        let mut registry = ClassRegistry::new();
        registry.insert_with_prototype(
            "round",
            FeatureVector::new([0.16, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 4),
        )?;
        registry.insert_with_prototype(
            "long",
            FeatureVector::new([0.8, 0.5, 0.3, 0.3, 0.2, 0.2, 0.1], 4),
        )?;
        Ok(registry)
    }

    #[test]
    fn test_exact_prototype_gets_every_vote() -> Result<(), RegionsError> {
        let registry = registry()?;
        let options = ClassifierOptions { epsilon: 0.05 };

        for class in &registry {
            let votes = vote(&class.prototype, &registry, &options);
            assert_eq!(votes[class.index], FEATURE_COUNT);
            assert_eq!(votes.iter().sum::<usize>(), FEATURE_COUNT);
            assert_eq!(
                classify_region(&class.prototype, &registry, &options),
                Some(class.index)
            );
        }
        Ok(())
    }

    #[test]
    fn test_no_vote_is_unclassified() -> Result<(), RegionsError> {
        let registry = registry()?;
        let far = FeatureVector::new([5.0; FEATURE_COUNT], 1);
        assert_eq!(
            classify_region(&far, &registry, &ClassifierOptions::default()),
            None
        );
        assert_eq!(
            classify_region(&far, &ClassRegistry::new(), &ClassifierOptions::default()),
            None
        );
        Ok(())
    }

    #[test]
    fn test_ties_go_to_lowest_index() -> Result<(), RegionsError> {
        let mut registry = ClassRegistry::new();
        registry.insert_with_prototype("a", FeatureVector::new([1.0; FEATURE_COUNT], 1))?;
        registry.insert_with_prototype("b", FeatureVector::new([1.0; FEATURE_COUNT], 1))?;

        let votes = vote(
            &FeatureVector::new([1.0; FEATURE_COUNT], 1),
            &registry,
            &ClassifierOptions::default(),
        );
        assert_eq!(votes, vec![FEATURE_COUNT, 0]);

        // three slots each, one slot votes for nobody
        let mut registry = ClassRegistry::new();
        registry.insert_with_prototype(
            "a",
            FeatureVector::new([0.0, 0.0, 0.0, 9.0, 9.0, 9.0, 5.0], 1),
        )?;
        registry.insert_with_prototype(
            "b",
            FeatureVector::new([9.0, 9.0, 9.0, 0.0, 0.0, 0.0, 5.0], 1),
        )?;
        let region = FeatureVector::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 1);
        let options = ClassifierOptions { epsilon: 0.5 };
        assert_eq!(vote(&region, &registry, &options), vec![3, 3]);
        assert_eq!(classify_region(&region, &registry, &options), Some(0));
        Ok(())
    }

    #[test]
    fn test_untrained_class_gets_no_vote() -> Result<(), RegionsError> {
        let mut registry = ClassRegistry::new();
        registry.insert("empty")?;
        registry.insert_with_prototype(
            "square",
            FeatureVector::new([0.17, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 3),
        )?;

        let region = FeatureVector::new([0.1667, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 1);
        let options = ClassifierOptions::default();
        assert_eq!(vote(&region, &registry, &options), vec![0, FEATURE_COUNT]);
        assert_eq!(classify_region(&region, &registry, &options), Some(1));
        Ok(())
    }

    #[test]
    fn test_votes_follow_registry_position() -> Result<(), Box<dyn std::error::Error>> {
        // a stored index that disagrees with the position of the class
        let registry: ClassRegistry = serde_json::from_str(
            r#"{ "classes": [
                { "name": "a", "index": 7, "files": [],
                  "prototype": { "values": [0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5], "count": 2 } }
            ] }"#,
        )?;

        let region = FeatureVector::new([0.5; FEATURE_COUNT], 1);
        let options = ClassifierOptions::default();
        assert_eq!(vote(&region, &registry, &options), vec![FEATURE_COUNT]);
        assert_eq!(classify_region(&region, &registry, &options), Some(0));
        Ok(())
    }

    #[test]
    fn test_classify_annotations() -> Result<(), RegionsError> {
        let registry = registry()?;
        let regions = [
            Region {
                index: 0,
                raw_label: 2,
                bbox: BoundingBox {
                    row: 1,
                    col: 1,
                    width: 3,
                    height: 3,
                },
            },
            Region {
                index: 1,
                raw_label: 5,
                bbox: BoundingBox {
                    row: 8,
                    col: 2,
                    width: 4,
                    height: 1,
                },
            },
        ];
        let features = [
            FeatureVector::new([0.8, 0.5, 0.3, 0.3, 0.2, 0.2, 0.1], 1),
            FeatureVector::new([7.0; FEATURE_COUNT], 1),
        ];

        let annotations = classify(
            &regions,
            &features,
            &registry,
            &ClassifierOptions::default(),
            &Palette::default(),
        )?;
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].class_index, Some(1));
        assert_eq!(annotations[0].color, Some([0, 255, 0]));
        assert_eq!(annotations[0].bbox, regions[0].bbox);
        assert_eq!(annotations[1].class_index, None);
        assert_eq!(annotations[1].color, None);

        assert!(matches!(
            classify(
                &regions,
                &features[..1],
                &registry,
                &ClassifierOptions::default(),
                &Palette::default()
            ),
            Err(RegionsError::FeatureCountMismatch {
                regions: 2,
                features: 1
            })
        ));
        Ok(())
    }

    #[test]
    fn test_palette_cycles() {
        let palette = Palette::default();
        assert_eq!(palette.0.len(), 10);
        assert_eq!(palette.color(12), palette.color(2));
        assert_eq!(Palette(Vec::new()).color(0), None);
    }
}
