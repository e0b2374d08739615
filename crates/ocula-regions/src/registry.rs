use std::path::PathBuf;

use ocula_image::Image;
use serde::{Deserialize, Serialize};

use crate::{
    errors::RegionsError,
    features::{extract_features, FeatureVector},
    labeling::Region,
};

/// A learned object class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    /// Unique class name.
    pub name: String,
    /// Position of the class in its registry.
    pub index: usize,
    /// Running average of the features of every training region.
    pub prototype: FeatureVector,
    /// Training images the class was learned from.
    pub files: Vec<PathBuf>,
}

/// An ordered set of classes, indexed by insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassRegistry {
    classes: Vec<Class>,
}

impl ClassRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the registry holds no class.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Iterate the classes in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Class> {
        self.classes.iter()
    }

    /// The class at `index`.
    pub fn get(&self, index: usize) -> Option<&Class> {
        self.classes.get(index)
    }

    /// The index of the class called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.classes.iter().position(|class| class.name == name)
    }

    /// The class called `name`.
    pub fn get_by_name(&self, name: &str) -> Option<&Class> {
        self.index_of(name).and_then(|index| self.get(index))
    }

    /// Register a class with an empty prototype and return its index.
    pub fn insert(&mut self, name: impl Into<String>) -> Result<usize, RegionsError> {
        self.insert_with_prototype(name, FeatureVector::default())
    }

    /// Register a class with a known prototype and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`RegionsError::DuplicateClass`] if the name is taken.
    pub fn insert_with_prototype(
        &mut self,
        name: impl Into<String>,
        prototype: FeatureVector,
    ) -> Result<usize, RegionsError> {
        let name = name.into();
        if self.index_of(&name).is_some() {
            return Err(RegionsError::DuplicateClass(name));
        }

        let index = self.classes.len();
        self.classes.push(Class {
            name,
            index,
            prototype,
            files: Vec::new(),
        });
        Ok(index)
    }

    /// Record a training image of the class at `index`.
    pub fn add_file(&mut self, index: usize, path: impl Into<PathBuf>) -> Result<(), RegionsError> {
        self.class_mut(index)?.files.push(path.into());
        Ok(())
    }

    /// Fold the regions of one training image into the prototype of the class at `index`.
    ///
    /// Each region counts as one sample of the running average.
    ///
    /// # Errors
    ///
    /// * [`RegionsError::ClassIndexOutOfBounds`] if there is no class at `index`.
    /// * [`RegionsError::NoRegions`] if `regions` is empty.
    pub fn update_class(
        &mut self,
        index: usize,
        labels: &Image<u32, 1>,
        regions: &[Region],
    ) -> Result<&Class, RegionsError> {
        let incoming = extract_features(labels, regions)?;
        self.update_class_features(index, &incoming)
    }

    /// Fold an already averaged feature vector into the prototype of the class at `index`.
    pub fn update_class_features(
        &mut self,
        index: usize,
        incoming: &FeatureVector,
    ) -> Result<&Class, RegionsError> {
        let class = self.class_mut(index)?;
        class.prototype.accumulate(incoming);
        log::debug!(
            "class {} now averages {} regions",
            class.name,
            class.prototype.count
        );
        Ok(&*class)
    }

    fn class_mut(&mut self, index: usize) -> Result<&mut Class, RegionsError> {
        self.classes
            .get_mut(index)
            .ok_or(RegionsError::ClassIndexOutOfBounds(index))
    }
}

impl<'a> IntoIterator for &'a ClassRegistry {
    type Item = &'a Class;
    type IntoIter = std::slice::Iter<'a, Class>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;
    use crate::labeling::{label_regions, LabelOptions};
    use approx::assert_relative_eq;
    use ocula_image::ImageSize;

    #[test]
    fn test_insert_and_lookup() -> Result<(), RegionsError> {
        let mut registry = ClassRegistry::new();
        assert!(registry.is_empty());

        assert_eq!(registry.insert("bolt")?, 0);
        assert_eq!(registry.insert("nut")?, 1);
        assert!(matches!(
            registry.insert("nut"),
            Err(RegionsError::DuplicateClass(name)) if name == "nut"
        ));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.index_of("nut"), Some(1));
        assert_eq!(registry.get_by_name("bolt").map(|c| c.index), Some(0));
        assert!(registry.get_by_name("washer").is_none());

        registry.add_file(1, "nut-01.png")?;
        assert_eq!(registry.get(1).map(|c| c.files.len()), Some(1));
        assert!(matches!(
            registry.add_file(5, "x.png"),
            Err(RegionsError::ClassIndexOutOfBounds(5))
        ));
        Ok(())
    }

    #[test]
    fn test_update_class_running_average() -> Result<(), RegionsError> {
        let mut registry = ClassRegistry::new();
        let index = registry.insert("square")?;

        let size = ImageSize {
            width: 20,
            height: 10,
        };
        let mut img = Image::from_size_val(size, 0u8)?;
        for row in 2..6 {
            for col in (2..6).chain(10..14) {
                img.set_pixel(col, row, 0, 255)?;
            }
        }
        let seg = label_regions(&img, &LabelOptions::default())?;

        let class = registry.update_class(index, &seg.labels, &seg.regions)?;
        assert_eq!(class.prototype.count, 2);
        let first = class.prototype.values;

        registry.update_class_features(index, &FeatureVector::new([0.0; FEATURE_COUNT], 2))?;
        let class = registry.get(index).ok_or(RegionsError::ClassIndexOutOfBounds(index))?;
        assert_eq!(class.prototype.count, 4);
        assert_relative_eq!(class.prototype.values[0], first[0] / 2.0);
        Ok(())
    }
}
