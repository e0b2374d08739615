use std::path::{Path, PathBuf};

use crate::{error::IoError, text::LineReader};

/// The training images of one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingClass {
    /// Class name.
    pub name: String,
    /// Training image paths, in file order.
    pub files: Vec<PathBuf>,
}

/// Parse a training list.
///
/// Each class starts with a `CLASS <name>` line followed by one or more image paths, one per
/// line. The list ends with an `EOF` line.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use ocula_io::training::parse_training_list;
///
/// let text = "CLASS bolt\nbolt-1.png\nbolt-2.png\nCLASS nut\nnut-1.png\nEOF\n";
/// let classes = parse_training_list(Path::new("train.txt"), text).unwrap();
/// assert_eq!(classes.len(), 2);
/// assert_eq!(classes[0].files.len(), 2);
/// ```
pub fn parse_training_list(path: &Path, text: &str) -> Result<Vec<TrainingClass>, IoError> {
    let mut reader = LineReader::new(path, text);
    let mut classes: Vec<TrainingClass> = Vec::new();
    // header line of the last class, to report classes left without images
    let mut header_line = 0;

    loop {
        let (line, content) = reader.expect_line()?;
        let is_header = matches!(
            content.strip_prefix("CLASS"),
            Some(rest) if rest.starts_with(char::is_whitespace) || rest.is_empty()
        );

        if content == "EOF" || is_header {
            if let Some(class) = classes.last().filter(|c| c.files.is_empty()) {
                return Err(reader.error(
                    header_line,
                    format!("class {} lists no training image", class.name),
                ));
            }
        }
        if content == "EOF" {
            break;
        }

        match content.strip_prefix("CLASS") {
            Some(rest) if is_header => {
                header_line = line;
                let mut fields = rest.split_whitespace();
                let name: String = reader.parse(line, fields.next(), "class name")?;
                if fields.next().is_some() {
                    return Err(reader.error(line, "class names cannot contain spaces"));
                }
                if classes.iter().any(|c| c.name == name) {
                    return Err(reader.error(line, format!("class {name} is listed twice")));
                }
                classes.push(TrainingClass {
                    name,
                    files: Vec::new(),
                });
            }
            _ => match classes.last_mut() {
                Some(class) => class.files.push(PathBuf::from(content)),
                None => return Err(reader.error(line, "image path before the first CLASS line")),
            },
        }
    }

    Ok(classes)
}

/// Read a training list file.
pub fn read_training_list(file_path: impl AsRef<Path>) -> Result<Vec<TrainingClass>, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }
    let text = std::fs::read_to_string(file_path)?;
    parse_training_list(file_path, &text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list() -> Result<(), IoError> {
        let text = "CLASS square\n\nimages/sq 1.bmp\nimages/sq2.bmp\nCLASS ring\nring.bmp\nEOF\n";
        let classes = parse_training_list(Path::new("train.txt"), text)?;
        assert_eq!(
            classes,
            vec![
                TrainingClass {
                    name: "square".to_string(),
                    files: vec![
                        PathBuf::from("images/sq 1.bmp"),
                        PathBuf::from("images/sq2.bmp")
                    ],
                },
                TrainingClass {
                    name: "ring".to_string(),
                    files: vec![PathBuf::from("ring.bmp")],
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn parse_errors() {
        let path = Path::new("train.txt");
        assert!(matches!(
            parse_training_list(path, "a.png\nEOF\n"),
            Err(IoError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_training_list(path, "CLASS\nEOF\n"),
            Err(IoError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_training_list(path, "CLASS a\nx.png\nCLASS a\nEOF\n"),
            Err(IoError::Parse { line: 3, .. })
        ));
        assert!(matches!(
            parse_training_list(path, "CLASS a\nx.png\n"),
            Err(IoError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn class_without_images_is_rejected() {
        let path = Path::new("train.txt");
        assert!(matches!(
            parse_training_list(path, "CLASS a\nx.png\nCLASS b\nEOF\n"),
            Err(IoError::Parse { line: 3, .. })
        ));
        assert!(matches!(
            parse_training_list(path, "CLASS a\n\nCLASS b\ny.png\nEOF\n"),
            Err(IoError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_training_list(path, "EOF\n").map(|c| c.len()),
            Ok(0)
        ));
    }
}
