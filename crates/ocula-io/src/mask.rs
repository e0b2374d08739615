use std::path::Path;

use ocula_imgproc::filter::Kernel;

use crate::{error::IoError, text::LineReader};

/// Largest accepted mask width and height.
///
/// Keeps the weight sum of any `i16` mask inside `i32`.
pub const MAX_MASK_SIDE: usize = 255;

/// Parse a mask from its text form.
///
/// The first line holds `<width> <height>`, followed by `width * height` whitespace separated
/// signed weights in row-major order. Neither side may exceed [`MAX_MASK_SIDE`].
pub fn parse_mask(path: &Path, text: &str) -> Result<Kernel, IoError> {
    let mut reader = LineReader::new(path, text);

    let (line, header) = reader.expect_line()?;
    let mut fields = header.split_whitespace();
    let width: usize = reader.parse(line, fields.next(), "mask width")?;
    let height: usize = reader.parse(line, fields.next(), "mask height")?;
    if width == 0 || height == 0 {
        return Err(reader.error(line, "mask width and height must be positive"));
    }
    if width > MAX_MASK_SIDE || height > MAX_MASK_SIDE {
        return Err(reader.error(
            line,
            format!("mask {width}x{height} exceeds {MAX_MASK_SIDE}x{MAX_MASK_SIDE}"),
        ));
    }
    let len = width * height;

    let path = reader.path().to_path_buf();
    let mut data = Vec::with_capacity(len);
    let mut tokens = reader.tokens();
    while data.len() < len {
        let (line, token) = tokens
            .next()
            .ok_or_else(|| IoError::UnexpectedEof(path.clone()))?;
        let weight = token.parse::<i16>().map_err(|_| IoError::Parse {
            path: path.clone(),
            line,
            reason: format!("invalid mask weight '{token}'"),
        })?;
        data.push(weight);
    }

    log::debug!("read {width}x{height} mask from {}", path.display());

    Ok(Kernel::new(width, height, data)?)
}

/// Read a mask file.
///
/// # Example
///
/// ```no_run
/// use ocula_io::mask::read_mask;
///
/// let kernel = read_mask("masks/box3.txt").unwrap();
/// assert_eq!(kernel.width(), 3);
/// ```
pub fn read_mask(file_path: impl AsRef<Path>) -> Result<Kernel, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }
    let text = std::fs::read_to_string(file_path)?;
    parse_mask(file_path, &text)
}

/// Write a mask file.
pub fn write_mask(file_path: impl AsRef<Path>, kernel: &Kernel) -> Result<(), IoError> {
    let mut text = format!("{} {}\n", kernel.width(), kernel.height());
    for row in kernel.data().chunks(kernel.width()) {
        let row = row.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        text.push_str(&row.join(" "));
        text.push('\n');
    }
    std::fs::write(file_path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocula_imgproc::filter::KernelError;

    #[test]
    fn parse_box_mask() -> Result<(), IoError> {
        let kernel = parse_mask(Path::new("box.txt"), "3 3\n1 1 1\n1 1 1\n1 1 1\n")?;
        assert_eq!(kernel, Kernel::box_kernel(3)?);

        // weights may be laid out freely
        let kernel = parse_mask(Path::new("row.txt"), "3 1\n-1\n2 -1")?;
        assert_eq!(kernel.data(), &[-1, 2, -1]);
        Ok(())
    }

    #[test]
    fn parse_errors() {
        let path = Path::new("bad.txt");
        assert!(matches!(
            parse_mask(path, "3 3\n1 1 1\n1 1"),
            Err(IoError::UnexpectedEof(_))
        ));
        assert!(matches!(
            parse_mask(path, "3 3\n1 1 1\n1 x 1\n1 1 1"),
            Err(IoError::Parse { line: 3, .. })
        ));
        assert!(matches!(
            parse_mask(path, "0 3\n"),
            Err(IoError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_mask(path, "2 2\n1 1 1 1"),
            Err(IoError::KernelError(KernelError::EvenSizedKernel(2, 2)))
        ));
        assert!(matches!(parse_mask(path, ""), Err(IoError::UnexpectedEof(_))));
    }

    #[test]
    fn oversized_header_is_rejected() {
        let path = Path::new("huge.txt");
        assert!(matches!(
            parse_mask(path, "4000000001 4000000001\n1\n"),
            Err(IoError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_mask(path, "257 1\n1\n"),
            Err(IoError::Parse { line: 1, .. })
        ));
        // a side at the limit is still read, and fails only on the missing weights
        assert!(matches!(
            parse_mask(path, "255 1\n1\n"),
            Err(IoError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn write_then_read() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("mask.txt");
        let kernel = Kernel::new(3, 3, vec![1, 2, 1, 2, 4, 2, 1, 2, 1])?;
        write_mask(&path, &kernel)?;
        assert_eq!(read_mask(&path)?, kernel);

        assert!(matches!(
            read_mask(dir.path().join("missing.txt")),
            Err(IoError::FileDoesNotExist(_))
        ));
        Ok(())
    }
}
