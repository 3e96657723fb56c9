use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

/// A field name that is not part of the header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("key `{key}` is not a field in the header")]
pub struct KeyNotFound {
    pub key: String,
}

impl KeyNotFound {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Errors raised while decoding rows or converting field values.
#[derive(Debug, Error)]
pub enum CsvParseError {
    #[error(
        "line {line}: header has {expected} fields but row has {found}; make sure the CSV is valid"
    )]
    FieldCountMismatch {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("the given key `{name}` is not a field header in the CSV file")]
    UnknownField {
        name: String,
        #[source]
        source: KeyNotFound,
    },
    #[error("could not convert CSV field \"{value}\" to type {type_name}")]
    Conversion {
        value: String,
        type_name: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Error type returned by this crate.
#[derive(Debug, Error)]
pub enum CsvError {
    /// The input path does not reference an existing file.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A required argument was never supplied. Signals a caller bug rather
    /// than a bad value.
    #[error("required argument `{0}` was not supplied")]
    NullArgument(&'static str),
    #[error("row index {index} is out of range (row count is {count})")]
    IndexOutOfRange { index: usize, count: usize },
    #[error(transparent)]
    KeyNotFound(#[from] KeyNotFound),
    #[error(transparent)]
    Parse(#[from] CsvParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CsvResult<T> = std::result::Result<T, CsvError>;

impl CsvError {
    /// True for every flavour of parse failure.
    pub fn is_parse(&self) -> bool {
        matches!(self, CsvError::Parse(_))
    }
}
