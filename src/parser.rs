use crate::builder::CsvParserBuilder;
use crate::config::CsvConfiguration;
use crate::error::{CsvError, CsvParseError, CsvResult, KeyNotFound};
use crate::header::Header;
use crate::query::{Comparison, FieldPredicate};
use crate::row::{decode_row, Decoded, Row};
use crate::source::{FileLineSource, LineSource, StreamLineSource};
use std::error::Error as StdError;
use std::io::{self, Read, Seek};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, trace};

/// Where the next read will land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Header consumed, next read yields data row 0.
    AtHeaderBoundary,
    /// Next read yields the data row at `next_index`.
    MidStream { next_index: usize },
    /// The last read hit end of stream.
    Exhausted,
}

/// Reads a delimited text file line by line and answers count, indexed
/// and predicate queries by re-reading it from a single forward stream.
///
/// Not safe for concurrent use: every query moves the shared cursor. Use
/// one parser per reader, or guard the parser with a lock.
pub struct CsvParser<S = FileLineSource> {
    source: S,
    config: CsvConfiguration,
    header: Header,
    cursor: Cursor,
    lines_read: u64,
    count: Option<usize>,
}

impl CsvParser<FileLineSource> {
    pub fn builder() -> CsvParserBuilder {
        CsvParserBuilder::new()
    }

    pub fn open<P: AsRef<Path>>(path: P) -> CsvResult<Self> {
        Self::open_with(path, CsvConfiguration::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, config: CsvConfiguration) -> CsvResult<Self> {
        let path = path.as_ref();
        let source = FileLineSource::open(path, &config)?;
        debug!(path = %path.display(), delimiter = %config.delimiter(), "opened csv file");
        Self::from_source(source, config)
    }
}

impl<R: Read + Seek> CsvParser<StreamLineSource<R>> {
    /// Parse an already-open reader. It is rewound to offset zero first.
    pub fn from_reader(reader: R, config: CsvConfiguration) -> CsvResult<Self> {
        let source = StreamLineSource::new(reader, &config);
        Self::from_source(source, config)
    }
}

impl<S: LineSource> CsvParser<S> {
    /// Resolve the header from the first line and park the cursor on the
    /// first data row.
    pub fn from_source(mut source: S, config: CsvConfiguration) -> CsvResult<Self> {
        source.reset_to_start()?;
        let first = source.next_line()?;
        let header = Header::resolve(first.as_deref(), config.delimiter());
        let (cursor, lines_read) = match first {
            Some(_) => (Cursor::AtHeaderBoundary, 1),
            None => (Cursor::Exhausted, 0),
        };

        Ok(Self {
            source,
            config,
            header,
            cursor,
            lines_read,
            count: None,
        })
    }

    pub fn configuration(&self) -> &CsvConfiguration {
        &self.config
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Physical lines consumed since the last rewind, header included.
    pub fn current_line(&self) -> u64 {
        self.lines_read
    }

    /// Number of data lines, header excluded. Blank lines are counted.
    ///
    /// The first call scans the whole input and rewinds; the result is
    /// kept for the life of the parser.
    pub fn count(&mut self) -> CsvResult<usize> {
        if let Some(count) = self.count {
            return Ok(count);
        }

        let counted = self.count_lines();
        let rewound = self.rewind();
        let count = counted?;
        rewound?;

        debug!(rows = count, "row count computed");
        self.count = Some(count);
        Ok(count)
    }

    pub fn is_empty(&mut self) -> CsvResult<bool> {
        Ok(self.count()? == 0)
    }

    /// Zero-based access to a data row.
    ///
    /// Reading forward from the cursor is cheap; asking for a row behind it
    /// rewinds and replays from the top. A blank line comes back as
    /// [`Row::blank`].
    pub fn get(&mut self, index: usize) -> CsvResult<Row> {
        let count = self.count()?;
        if index >= count {
            return Err(CsvError::IndexOutOfRange { index, count });
        }

        match self.cursor {
            Cursor::AtHeaderBoundary => {}
            Cursor::MidStream { next_index } if next_index <= index => {}
            Cursor::MidStream { .. } | Cursor::Exhausted => self.rewind()?,
        }

        loop {
            let next_index = match self.cursor {
                Cursor::AtHeaderBoundary => 0,
                Cursor::MidStream { next_index } => next_index,
                Cursor::Exhausted => break,
            };
            let Some(line) = self.read_line()? else {
                break;
            };
            if next_index == index {
                return match self.decode(&line)? {
                    Decoded::Row(row) => Ok(row),
                    Decoded::Blank => Ok(Row::blank(&self.header)),
                };
            }
        }

        // The input shrank underneath us.
        Err(CsvError::IndexOutOfRange { index, count })
    }

    /// Rows from the cursor onwards, skipping blank lines. Starts over from
    /// the first data row when the previous pass ran to the end.
    pub fn rows(&mut self) -> Rows<'_, S> {
        Rows {
            parser: self,
            started: false,
            done: false,
        }
    }

    pub fn where_equals<T>(&mut self, field_name: &str, value: T) -> CsvResult<Vec<Row>>
    where
        T: FromStr + PartialOrd,
        T::Err: StdError + Send + Sync + 'static,
    {
        self.where_by(field_name, Comparison::Equal, value)
    }

    pub fn where_greater_than<T>(&mut self, field_name: &str, value: T) -> CsvResult<Vec<Row>>
    where
        T: FromStr + PartialOrd,
        T::Err: StdError + Send + Sync + 'static,
    {
        self.where_by(field_name, Comparison::GreaterThan, value)
    }

    pub fn where_less_than<T>(&mut self, field_name: &str, value: T) -> CsvResult<Vec<Row>>
    where
        T: FromStr + PartialOrd,
        T::Err: StdError + Send + Sync + 'static,
    {
        self.where_by(field_name, Comparison::LessThan, value)
    }

    /// Scan every row from the top and keep those whose `field_name`,
    /// converted to `T`, satisfies `comparison` against `value`.
    ///
    /// Returns either every match in file order or an error, never a
    /// partial set. The cursor is back on the first data row afterwards
    /// either way.
    pub fn where_by<T>(
        &mut self,
        field_name: &str,
        comparison: Comparison,
        value: T,
    ) -> CsvResult<Vec<Row>>
    where
        T: FromStr + PartialOrd,
        T::Err: StdError + Send + Sync + 'static,
    {
        let scanned = FieldPredicate::new(field_name, comparison, value).and_then(|predicate| {
            self.require_field(field_name)?;
            self.rewind()?;
            self.collect_matches(&predicate)
        });
        let rewound = self.rewind();
        let matches = scanned?;
        rewound?;

        debug!(
            field = field_name,
            comparison = %comparison,
            matches = matches.len(),
            "query finished"
        );
        Ok(matches)
    }

    /// Release the underlying source.
    pub fn close(self) {
        drop(self);
    }

    pub fn into_source(self) -> S {
        self.source
    }

    fn require_field(&self, field_name: &str) -> CsvResult<()> {
        if self.header.contains(field_name) {
            return Ok(());
        }
        Err(CsvParseError::UnknownField {
            name: field_name.to_string(),
            source: KeyNotFound::new(field_name),
        }
        .into())
    }

    fn collect_matches<T>(&mut self, predicate: &FieldPredicate<T>) -> CsvResult<Vec<Row>>
    where
        T: FromStr + PartialOrd,
        T::Err: StdError + Send + Sync + 'static,
    {
        let mut matches = Vec::new();
        while let Some(line) = self.read_line()? {
            let Decoded::Row(row) = self.decode(&line)? else {
                continue;
            };
            if predicate.evaluate(&row)? {
                matches.push(row);
            }
        }
        Ok(matches)
    }

    fn count_lines(&mut self) -> CsvResult<usize> {
        if let Some(lines) = self.source.line_count_hint()? {
            trace!(lines, "line count from source");
            return Ok(lines.saturating_sub(1));
        }

        self.rewind()?;
        let mut count = 0usize;
        while self.read_line()?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    fn decode(&self, line: &str) -> Result<Decoded, CsvParseError> {
        decode_row(line, self.lines_read, &self.header, &self.config)
    }

    fn read_line(&mut self) -> CsvResult<Option<String>> {
        let line = self.source.next_line()?;
        match line {
            Some(_) => {
                self.lines_read += 1;
                let next_index = usize::try_from(self.lines_read - 1).map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("line {} is beyond the addressable row range", self.lines_read),
                    )
                })?;
                self.cursor = Cursor::MidStream { next_index };
            }
            None => self.cursor = Cursor::Exhausted,
        }
        Ok(line)
    }

    /// Nothing left to read, even if no read has reported it yet.
    fn at_end(&mut self) -> CsvResult<bool> {
        match self.cursor {
            Cursor::Exhausted => Ok(true),
            Cursor::AtHeaderBoundary | Cursor::MidStream { .. } => self.source.at_end(),
        }
    }

    /// Back to offset zero with the header line consumed.
    fn rewind(&mut self) -> CsvResult<()> {
        trace!(from_line = self.lines_read, "rewinding to first data row");
        self.source.reset_to_start()?;
        self.lines_read = 0;
        self.cursor = Cursor::Exhausted;
        if self.source.next_line()?.is_some() {
            self.lines_read = 1;
            self.cursor = Cursor::AtHeaderBoundary;
        }
        Ok(())
    }
}

impl<S> std::fmt::Debug for CsvParser<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvParser")
            .field("config", &self.config)
            .field("header", &self.header)
            .field("cursor", &self.cursor)
            .field("lines_read", &self.lines_read)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

/// Lazy iterator over the rows of a [`CsvParser`].
///
/// A malformed row is yielded as an error and ends the iteration.
pub struct Rows<'a, S: LineSource> {
    parser: &'a mut CsvParser<S>,
    started: bool,
    done: bool,
}

impl<S: LineSource> Iterator for Rows<'_, S> {
    type Item = CsvResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            let restarted = match self.parser.at_end() {
                Ok(true) => self.parser.rewind(),
                Ok(false) => Ok(()),
                Err(e) => Err(e),
            };
            if let Err(e) = restarted {
                self.done = true;
                return Some(Err(e));
            }
        }

        loop {
            let line = match self.parser.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            match self.parser.decode(&line) {
                Ok(Decoded::Row(row)) => return Some(Ok(row)),
                Ok(Decoded::Blank) => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

impl<S: LineSource> std::iter::FusedIterator for Rows<'_, S> {}

impl<'a, S: LineSource> IntoIterator for &'a mut CsvParser<S> {
    type Item = CsvResult<Row>;
    type IntoIter = Rows<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows()
    }
}
