use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordered, normalized field names taken from the first line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Arc<[String]>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            names: Arc::from(Vec::new()),
        }
    }
}

impl Header {
    /// Build the header from the first line of the input. `None` means the
    /// input was empty, which yields an empty header rather than an error.
    ///
    /// Names are always lower-cased and trimmed, independent of
    /// `ignore_white_spaces`.
    pub fn resolve(first_line: Option<&str>, delimiter: char) -> Self {
        let Some(line) = first_line else {
            debug!("empty input, header has no fields");
            return Self::default();
        };

        let names: Vec<String> = line
            .split(delimiter)
            .map(|name| name.trim().to_lowercase())
            .collect();

        {
            let mut seen = HashSet::with_capacity(names.len());
            for (column, name) in names.iter().enumerate() {
                if name.is_empty() {
                    warn!(column, "header has an empty field name");
                } else if !seen.insert(name.as_str()) {
                    warn!(column, name = %name, "duplicate header name; lookups resolve to the first column");
                }
            }
        }
        debug!(fields = names.len(), "header resolved");

        Self {
            names: names.into(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column index of `name`, compared case-insensitively. The first
    /// column wins when a name repeats.
    pub fn position(&self, name: &str) -> Option<usize> {
        position_of(&self.names, name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub(crate) fn shared_names(&self) -> Arc<[String]> {
        Arc::clone(&self.names)
    }
}

pub(crate) fn position_of(names: &[String], name: &str) -> Option<usize> {
    if let Some(found) = names.iter().position(|n| n == name) {
        return Some(found);
    }
    let lowered = name.to_lowercase();
    names.iter().position(|n| *n == lowered)
}
