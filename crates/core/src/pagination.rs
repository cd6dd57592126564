//! Paginated list results.
//!
//! The server owns page accounting. [`Metadata`] relays its object verbatim
//! and offers typed reads of the well-known keys; nothing here recomputes a
//! page count.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::wire::coerce_i64;

/// Server-supplied pagination metadata, kept as an opaque map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    /// Wrap a metadata value. Anything other than an object becomes empty.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        Self(value.and_then(Value::as_object).cloned().unwrap_or_default())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw access to any metadata key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn number(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(coerce_i64)
    }

    #[must_use]
    pub fn current_page(&self) -> Option<i64> {
        self.number("current_page")
    }

    #[must_use]
    pub fn total_pages(&self) -> Option<i64> {
        self.number("total_pages").or_else(|| self.number("last_page"))
    }

    #[must_use]
    pub fn page_size(&self) -> Option<i64> {
        self.number("page_size")
    }

    #[must_use]
    pub fn total_records(&self) -> Option<i64> {
        self.number("total_records")
    }

    /// Whether a "previous" control should be enabled.
    ///
    /// False on page 1 and when the server reported no current page.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.current_page().is_some_and(|page| page > 1)
    }

    /// Whether a "next" control should be enabled.
    ///
    /// False on the last page and when either number is missing.
    #[must_use]
    pub fn has_next(&self) -> bool {
        match (self.current_page(), self.total_pages()) {
            (Some(page), Some(total)) => page < total,
            _ => false,
        }
    }
}

/// One page of items plus the server's metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub metadata: Metadata,
}

impl<T> Page<T> {
    /// A page with no items and empty metadata.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            metadata: Metadata::default(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Page selection and ordering for list calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Server sort key, e.g. `name` or `-price`.
    pub sort: Option<String>,
}

impl PageRequest {
    #[must_use]
    pub const fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
            sort: None,
        }
    }

    #[must_use]
    pub fn sorted_by(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }
}
