use std::path::Path;

use crate::error::IoError;

/// Format an intensity histogram as text, one `<intensity> <count>` line per bin.
pub fn format_histogram(hist: &[usize]) -> String {
    hist.iter()
        .enumerate()
        .map(|(value, count)| format!("{value} {count}\n"))
        .collect()
}

/// Write an intensity histogram for plotting.
///
/// # Example
///
/// ```no_run
/// use ocula_io::histogram::write_histogram;
///
/// let mut hist = vec![0usize; 256];
/// hist[128] = 4;
/// write_histogram("histogram.txt", &hist).unwrap();
/// ```
pub fn write_histogram(file_path: impl AsRef<Path>, hist: &[usize]) -> Result<(), IoError> {
    let file_path = file_path.as_ref();
    std::fs::write(file_path, format_histogram(hist))?;
    log::debug!("wrote {} bins to {}", hist.len(), file_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_bins() -> Result<(), Box<dyn std::error::Error>> {
        let mut hist = vec![0usize; 256];
        hist[0] = 3;
        hist[255] = 12;

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("histogram.txt");
        write_histogram(&path, &hist)?;

        let text = std::fs::read_to_string(&path)?;
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 256);
        assert_eq!(lines[0], "0 3");
        assert_eq!(lines[17], "17 0");
        assert_eq!(lines[255], "255 12");
        Ok(())
    }
}
