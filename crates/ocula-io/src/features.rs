use std::path::Path;

use ocula_regions::{
    features::{FeatureVector, FEATURE_COUNT},
    registry::ClassRegistry,
};

use crate::{error::IoError, text::LineReader};

const CLASS_KEYWORD: &str = "CLASS";
const EOF_KEYWORD: &str = "EOF";

/// Parse a learned class file into a registry.
///
/// The file holds one block per class, `CLASS <name> <count> <featureCount>` followed by
/// `featureCount` values one per line, and ends with an `EOF` line. Classes get their index in
/// file order.
pub fn parse_class_features(path: &Path, text: &str) -> Result<ClassRegistry, IoError> {
    let mut reader = LineReader::new(path, text);
    let mut registry = ClassRegistry::new();

    loop {
        let (line, header) = reader.expect_line()?;
        if header == EOF_KEYWORD {
            break;
        }

        let mut fields = header.split_whitespace();
        if fields.next() != Some(CLASS_KEYWORD) {
            return Err(reader.error(
                line,
                format!("expected '{CLASS_KEYWORD}' or '{EOF_KEYWORD}'"),
            ));
        }
        let name: String = reader.parse(line, fields.next(), "class name")?;
        let count: u64 = reader.parse(line, fields.next(), "region count")?;
        let feature_count: usize = reader.parse(line, fields.next(), "feature count")?;
        if feature_count != FEATURE_COUNT {
            return Err(reader.error(
                line,
                format!("expected {FEATURE_COUNT} features, found {feature_count}"),
            ));
        }

        let mut values = [0.0; FEATURE_COUNT];
        for value in values.iter_mut() {
            let (line, field) = reader.expect_line()?;
            *value = reader.parse(line, Some(field), "feature value")?;
        }

        if registry.index_of(&name).is_some() {
            return Err(reader.error(line, format!("class {name} is defined twice")));
        }
        registry.insert_with_prototype(name, FeatureVector::new(values, count))?;
    }

    Ok(registry)
}

/// Read a learned class file.
pub fn read_class_features(file_path: impl AsRef<Path>) -> Result<ClassRegistry, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }
    let text = std::fs::read_to_string(file_path)?;
    let registry = parse_class_features(file_path, &text)?;
    log::debug!(
        "read {} classes from {}",
        registry.len(),
        file_path.display()
    );
    Ok(registry)
}

fn push_block(text: &mut String, name: &str, features: &FeatureVector) {
    text.push_str(&format!(
        "{CLASS_KEYWORD} {name} {} {FEATURE_COUNT}\n",
        features.count
    ));
    for value in features.values {
        text.push_str(&format!("{value}\n"));
    }
}

/// Format a registry as a learned class file.
///
/// Values are written with round-trip precision.
pub fn format_class_features(registry: &ClassRegistry) -> String {
    let mut text = String::new();
    for class in registry {
        push_block(&mut text, &class.name, &class.prototype);
    }
    text.push_str(EOF_KEYWORD);
    text.push('\n');
    text
}

/// Write a learned class file.
pub fn write_class_features(
    file_path: impl AsRef<Path>,
    registry: &ClassRegistry,
) -> Result<(), IoError> {
    std::fs::write(file_path, format_class_features(registry))?;
    Ok(())
}

/// Write the features of a single image as a one block class file.
pub fn write_image_features(
    file_path: impl AsRef<Path>,
    name: &str,
    features: &FeatureVector,
) -> Result<(), IoError> {
    let mut text = String::new();
    push_block(&mut text, name, features);
    text.push_str(EOF_KEYWORD);
    text.push('\n');
    std::fs::write(file_path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "CLASS bolt 12 7
0.25
0.01
0
0
0
0
0
CLASS nut 3 7
0.5
0.125
1e-3
0
0
0
-0.0001
EOF
";

    #[test]
    fn parse_sample() -> Result<(), IoError> {
        let registry = parse_class_features(Path::new("classes.txt"), SAMPLE)?;
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.index_of("bolt"), Some(0));

        let nut = registry.get_by_name("nut").cloned().unwrap_or_else(|| panic!("nut missing"));
        assert_eq!(nut.index, 1);
        assert_eq!(nut.prototype.count, 3);
        assert_eq!(nut.prototype.values[2], 0.001);
        assert_eq!(nut.prototype.values[6], -0.0001);
        Ok(())
    }

    #[test]
    fn format_round_trips_values() -> Result<(), IoError> {
        let mut registry = ClassRegistry::new();
        registry.insert_with_prototype(
            "thin",
            FeatureVector::new(
                [1.0 / 3.0, 2.0e-9, 0.1, 0.0, -5.5e-15, 7.0, 1.0 / 7.0],
                9,
            ),
        )?;
        let text = format_class_features(&registry);
        assert!(text.ends_with("EOF\n"));

        let parsed = parse_class_features(Path::new("classes.txt"), &text)?;
        assert_eq!(parsed, registry);
        Ok(())
    }

    #[test]
    fn parse_errors() {
        let path = Path::new("classes.txt");
        assert!(matches!(
            parse_class_features(path, "CLASS a 1 7\n0.1\n0.2\n"),
            Err(IoError::UnexpectedEof(_))
        ));
        assert!(matches!(
            parse_class_features(path, "CLASS a 1 3\n0.1\n0.2\n0.3\nEOF\n"),
            Err(IoError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_class_features(path, "KLASS a 1 7\n"),
            Err(IoError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_class_features(path, "CLASS a 1 7\n0.1\n0.2\nabc\n"),
            Err(IoError::Parse { line: 4, .. })
        ));
        assert!(matches!(
            parse_class_features(path, ""),
            Err(IoError::UnexpectedEof(_))
        ));
        assert!(matches!(
            parse_class_features(path, "EOF\n").map(|r| r.len()),
            Ok(0)
        ));
    }

    #[test]
    fn write_image_block() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("image.features");
        let features = FeatureVector::new([0.5; FEATURE_COUNT], 4);
        write_image_features(&path, "image", &features)?;

        let registry = read_class_features(&path)?;
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get_by_name("image").map(|c| c.prototype),
            Some(features)
        );
        Ok(())
    }
}
