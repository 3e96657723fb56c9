use crate::config::CsvConfiguration;
use crate::error::{CsvError, CsvResult};
use crate::parser::CsvParser;
use crate::source::{FileLineSource, LineSource, StreamLineSource};
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

/// Builds a [`CsvParser`]. Each setter validates immediately, so a bad
/// delimiter fails here rather than when the file is read.
///
/// ```no_run
/// # fn main() -> csv_query::CsvResult<()> {
/// let mut parser = csv_query::CsvParserBuilder::new()
///     .delimiter(';')?
///     .ignore_white_spaces(true)
///     .from_path("access_log.csv")?;
/// let errors = parser.where_greater_than("status", 399)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CsvParserBuilder {
    config: CsvConfiguration,
    path: Option<PathBuf>,
}

impl CsvParserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn configuration(mut self, config: CsvConfiguration) -> Self {
        self.config = config;
        self
    }

    pub fn delimiter(mut self, delimiter: char) -> CsvResult<Self> {
        self.config.set_delimiter(delimiter)?;
        Ok(self)
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> CsvResult<Self> {
        self.config.set_buffer_size(capacity)?;
        Ok(self)
    }

    pub fn encoding(mut self, encoding: &'static encoding_rs::Encoding) -> Self {
        self.config.set_encoding(encoding);
        self
    }

    pub fn encoding_label(mut self, label: &str) -> CsvResult<Self> {
        self.config.set_encoding_label(label)?;
        Ok(self)
    }

    pub fn ignore_white_spaces(mut self, yes: bool) -> Self {
        self.config.set_ignore_white_spaces(yes);
        self
    }

    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Open the file given to [`path`](Self::path). Fails with
    /// `NullArgument` if no path was ever supplied.
    pub fn open(self) -> CsvResult<CsvParser<FileLineSource>> {
        let path = self.path.ok_or(CsvError::NullArgument("path"))?;
        CsvParser::open_with(path, self.config)
    }

    pub fn from_path<P: AsRef<Path>>(self, path: P) -> CsvResult<CsvParser<FileLineSource>> {
        CsvParser::open_with(path, self.config)
    }

    pub fn from_reader<R: Read + Seek>(
        self,
        reader: R,
    ) -> CsvResult<CsvParser<StreamLineSource<R>>> {
        CsvParser::from_reader(reader, self.config)
    }

    pub fn from_source<S: LineSource>(self, source: S) -> CsvResult<CsvParser<S>> {
        CsvParser::from_source(source, self.config)
    }
}
