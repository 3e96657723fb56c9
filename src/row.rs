use crate::config::CsvConfiguration;
use crate::error::{CsvParseError, CsvResult, KeyNotFound};
use crate::header::{position_of, Header};
use std::any::type_name;
use std::error::Error as StdError;
use std::fmt;
use std::ops::Index;
use std::str::FromStr;
use std::sync::Arc;

/// One decoded data line: field names from the header paired with raw values.
///
/// Rows own their values and share only the immutable name list, so they
/// stay valid after the parser moves on or is closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    names: Arc<[String]>,
    values: Vec<String>,
}

impl Row {
    /// A row with every field empty, standing in for a blank line.
    pub fn blank(header: &Header) -> Self {
        Self {
            names: header.shared_names(),
            values: vec![String::new(); header.len()],
        }
    }

    /// Raw value of `name`, looked up case-insensitively.
    pub fn get(&self, name: &str) -> CsvResult<&str> {
        Ok(self.lookup(name)?)
    }

    /// Value of `name` parsed as `T`. Surrounding whitespace is ignored.
    pub fn get_as<T>(&self, name: &str) -> CsvResult<T>
    where
        T: FromStr,
        T::Err: StdError + Send + Sync + 'static,
    {
        let raw = self.lookup(name).map_err(|source| CsvParseError::UnknownField {
            name: name.to_string(),
            source,
        })?;
        Ok(parse_field(raw)?)
    }

    pub fn get_index(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when every field is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.trim().is_empty())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }

    /// `(name, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.names
            .iter()
            .zip(self.values.iter())
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub(crate) fn lookup(&self, name: &str) -> Result<&str, KeyNotFound> {
        position_of(&self.names, name)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
            .ok_or_else(|| KeyNotFound::new(name))
    }
}

impl Index<&str> for Row {
    type Output = str;

    /// Panics when `name` is not a header field; use [`Row::get`] to handle that case.
    fn index(&self, name: &str) -> &str {
        match self.lookup(name) {
            Ok(value) => value,
            Err(e) => panic!("{e}"),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// Result of decoding one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Row(Row),
    /// Every field was empty or whitespace; callers skip these.
    Blank,
}

/// Split `line` into fields and pair them with the header.
///
/// `line_number` is the 1-based physical line, used in error messages.
pub fn decode_row(
    line: &str,
    line_number: u64,
    header: &Header,
    config: &CsvConfiguration,
) -> Result<Decoded, CsvParseError> {
    let fields: Vec<&str> = line.split(config.delimiter()).collect();

    if fields.iter().all(|f| f.trim().is_empty()) {
        return Ok(Decoded::Blank);
    }

    if fields.len() != header.len() {
        return Err(CsvParseError::FieldCountMismatch {
            line: line_number,
            expected: header.len(),
            found: fields.len(),
        });
    }

    let values = fields
        .into_iter()
        .map(|f| {
            if config.ignore_white_spaces() {
                f.trim().to_string()
            } else {
                f.to_string()
            }
        })
        .collect();

    Ok(Decoded::Row(Row {
        names: header.shared_names(),
        values,
    }))
}

/// Convert a raw field to `T` through its textual representation.
pub(crate) fn parse_field<T>(raw: &str) -> Result<T, CsvParseError>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| CsvParseError::Conversion {
            value: raw.to_string(),
            type_name: type_name::<T>(),
            source: Box::new(e),
        })
}
