use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::IoError;

/// Line reader over a text file that tracks line numbers for error reporting.
pub(crate) struct LineReader<'a> {
    path: PathBuf,
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> LineReader<'a> {
    pub fn new(path: &Path, text: &'a str) -> Self {
        Self {
            path: path.to_path_buf(),
            lines: text.lines().enumerate(),
        }
    }

    /// The next non blank line, trimmed, with its one based number.
    pub fn next_line(&mut self) -> Option<(usize, &'a str)> {
        self.lines
            .by_ref()
            .map(|(i, line)| (i + 1, line.trim()))
            .find(|(_, line)| !line.is_empty())
    }

    /// Like [`LineReader::next_line`] but a missing line is an error.
    pub fn expect_line(&mut self) -> Result<(usize, &'a str), IoError> {
        self.next_line()
            .ok_or_else(|| IoError::UnexpectedEof(self.path.clone()))
    }

    /// Every remaining whitespace separated token with its line number.
    pub fn tokens(self) -> impl Iterator<Item = (usize, &'a str)> {
        self.lines
            .flat_map(|(i, line)| line.split_whitespace().map(move |token| (i + 1, token)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn error(&self, line: usize, reason: impl Into<String>) -> IoError {
        IoError::Parse {
            path: self.path.clone(),
            line,
            reason: reason.into(),
        }
    }

    /// Parse a token, reporting `what` was expected when it is missing or malformed.
    pub fn parse<T: FromStr>(
        &self,
        line: usize,
        token: Option<&str>,
        what: &str,
    ) -> Result<T, IoError> {
        let token = token.ok_or_else(|| self.error(line, format!("missing {what}")))?;
        token
            .parse()
            .map_err(|_| self.error(line, format!("invalid {what} '{token}'")))
    }
}
