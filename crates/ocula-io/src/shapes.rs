use std::path::Path;

use ocula_imgproc::draw::Shape;

use crate::{error::IoError, text::LineReader};

/// Parse a shape script.
///
/// One shape per line, terminated by an `EOF` line:
///
/// * `plus x y len`
/// * `rectangle x y width height`
/// * `circle x y radius`
/// * `ellipse x y a b`
///
/// `x` is the row and `y` the column of the shape center.
pub fn parse_shapes(path: &Path, text: &str) -> Result<Vec<Shape>, IoError> {
    let mut reader = LineReader::new(path, text);
    let mut shapes = Vec::new();

    loop {
        let (line, content) = reader.expect_line()?;
        if content == "EOF" {
            break;
        }

        let mut fields = content.split_whitespace();
        let name = fields.next().unwrap_or_default();
        let mut next =
            |what: &str| -> Result<i64, IoError> { reader.parse(line, fields.next(), what) };

        let shape = match name {
            "plus" => Shape::Plus {
                row: next("x")?,
                col: next("y")?,
                len: next("len")?,
            },
            "rectangle" => Shape::Rectangle {
                row: next("x")?,
                col: next("y")?,
                width: next("width")?,
                height: next("height")?,
            },
            "circle" => Shape::Circle {
                row: next("x")?,
                col: next("y")?,
                radius: next("radius")?,
            },
            "ellipse" => Shape::Ellipse {
                row: next("x")?,
                col: next("y")?,
                a: next("a")?,
                b: next("b")?,
            },
            other => {
                return Err(IoError::UnsupportedShape {
                    path: path.to_path_buf(),
                    line,
                    name: other.to_string(),
                })
            }
        };

        if fields.next().is_some() {
            return Err(reader.error(line, format!("too many fields for {}", shape.name())));
        }
        shape.validate()?;
        shapes.push(shape);
    }

    Ok(shapes)
}

/// Read a shape script file.
pub fn read_shapes(file_path: impl AsRef<Path>) -> Result<Vec<Shape>, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }
    let text = std::fs::read_to_string(file_path)?;
    parse_shapes(file_path, &text)
}
