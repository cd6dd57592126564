//! List filters for each resource.
//!
//! `pairs()` yields only active filters: `None` and blank strings are
//! skipped, so an all-default filter produces no query parameters at all.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::pagination::PageRequest;
use crate::types::{ProductId, Role, UserId};

/// A query parameter name and its unencoded value.
pub type QueryPair = (&'static str, String);

fn push_text(pairs: &mut Vec<QueryPair>, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        pairs.push((key, value.to_owned()));
    }
}

fn push<T: ToString>(pairs: &mut Vec<QueryPair>, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        pairs.push((key, value.to_string()));
    }
}

/// Filters for `GET /v1/products`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl ProductFilter {
    #[must_use]
    pub fn pairs(&self) -> Vec<QueryPair> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "name", self.name.as_deref());
        push(&mut pairs, "min_price", self.min_price);
        push(&mut pairs, "max_price", self.max_price);
        pairs
    }
}

/// Filters for `GET /v1/sales`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleFilter {
    pub user_id: Option<UserId>,
    pub product_id: Option<ProductId>,
    pub min_qty: Option<i64>,
    pub max_qty: Option<i64>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl SaleFilter {
    #[must_use]
    pub fn pairs(&self) -> Vec<QueryPair> {
        let mut pairs = Vec::new();
        push(&mut pairs, "user_id", self.user_id);
        push(&mut pairs, "product_id", self.product_id);
        push(&mut pairs, "min_qty", self.min_qty);
        push(&mut pairs, "max_qty", self.max_qty);
        push(&mut pairs, "min_date", self.min_date.map(|d| d.format("%Y-%m-%d")));
        push(&mut pairs, "max_date", self.max_date.map(|d| d.format("%Y-%m-%d")));
        pairs
    }

    /// Restrict to sales on a single calendar day (UTC).
    #[must_use]
    pub fn on_day(at: DateTime<Utc>) -> Self {
        let day = at.date_naive();
        Self {
            min_date: Some(day),
            max_date: Some(day),
            ..Self::default()
        }
    }
}

/// Filters for `GET /v1/user`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UserFilter {
    #[must_use]
    pub fn pairs(&self) -> Vec<QueryPair> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "name", self.name.as_deref());
        push_text(&mut pairs, "email", self.email.as_deref());
        push_text(&mut pairs, "role", self.role.as_ref().map(Role::as_str));
        push(&mut pairs, "is_active", self.is_active);
        pairs
    }
}

impl PageRequest {
    #[must_use]
    pub fn pairs(&self) -> Vec<QueryPair> {
        let mut pairs = Vec::new();
        push(&mut pairs, "page", self.page);
        push(&mut pairs, "page_size", self.page_size);
        push_text(&mut pairs, "sort", self.sort.as_deref());
        pairs
    }
}
