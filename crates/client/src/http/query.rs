//! Query-string construction.

use salesdesk_core::filters::QueryPair;

/// Ordered query parameters.
///
/// Blank values are dropped on insertion, and a set with no parameters
/// renders as a bare path with no `?`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<QueryPair>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter unless its value is blank.
    pub fn push(&mut self, key: &'static str, value: impl Into<String>) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.pairs.push((key, value));
        }
    }

    /// Builder form of [`QueryParams::push`] over many pairs.
    #[must_use]
    pub fn with(mut self, pairs: impl IntoIterator<Item = QueryPair>) -> Self {
        for (key, value) in pairs {
            self.push(key, value);
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `key=value&...` with every component percent-encoded.
    #[must_use]
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `path` with the query string appended, or `path` alone when empty.
    #[must_use]
    pub fn apply(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_owned()
        } else {
            format!("{path}?{}", self.encode())
        }
    }
}
