//! Typed comparison predicates over a single field.

use crate::error::{CsvError, CsvParseError, CsvResult};
use crate::row::{parse_field, Row};
use std::cmp::Ordering;
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

/// How a field value must relate to the probe value to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Equal,
    GreaterThan,
    LessThan,
}

impl Comparison {
    /// Whether `field.cmp(value) == ordering` satisfies this comparison.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Equal => ordering == Ordering::Equal,
            Comparison::GreaterThan => ordering == Ordering::Greater,
            Comparison::LessThan => ordering == Ordering::Less,
        }
    }

    /// Unordered pairs (e.g. NaN) never match.
    pub fn matches<T: PartialOrd>(self, field: &T, value: &T) -> bool {
        field
            .partial_cmp(value)
            .is_some_and(|ordering| self.accepts(ordering))
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparison::Equal => "=",
            Comparison::GreaterThan => ">",
            Comparison::LessThan => "<",
        })
    }
}

/// `field <comparison> value`, with the field converted to `T` per row.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate<T> {
    field: String,
    comparison: Comparison,
    value: T,
}

impl<T> FieldPredicate<T>
where
    T: FromStr + PartialOrd,
    T::Err: StdError + Send + Sync + 'static,
{
    pub fn new(field: &str, comparison: Comparison, value: T) -> CsvResult<Self> {
        if field.trim().is_empty() {
            return Err(CsvError::InvalidArgument(
                "field cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            field: field.to_string(),
            comparison,
            value,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Convert the row's field and compare it against the probe value.
    pub fn evaluate(&self, row: &Row) -> Result<bool, CsvParseError> {
        let raw = row
            .lookup(&self.field)
            .map_err(|source| CsvParseError::UnknownField {
                name: self.field.clone(),
                source,
            })?;
        let converted: T = parse_field(raw)?;
        Ok(self.comparison.matches(&converted, &self.value))
    }
}
