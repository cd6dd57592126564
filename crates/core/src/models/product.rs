//! Product catalog records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use super::{changed, changed_opt};
use crate::types::ProductId;
use crate::wire::{
    WireError, WireNaming, WireReader, WireRecord, WireWriter, decimal_value, timestamp_value,
};

/// Wire field table for products.
pub mod fields {
    use crate::wire::Field;

    pub const ID: Field = Field::new("id", "ID");
    pub const NAME: Field = Field::new("name", "Name");
    pub const DESCRIPTION: Field = Field::new("description", "Description");
    pub const PRICE: Field = Field::new("price", "Price");
    pub const STOCK: Field = Field::new("stock", "Stock");
    pub const CREATED_AT: Field = Field::new("created_at", "CreatedAt");
    pub const UPDATED_AT: Field = Field::new("updated_at", "UpdatedAt");
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Keep only the fields of `update` that differ from this product.
    #[must_use]
    pub fn diff(&self, update: &ProductUpdate) -> ProductUpdate {
        ProductUpdate {
            name: changed(&self.name, update.name.as_ref()),
            description: changed_opt(self.description.as_ref(), update.description.as_ref()),
            price: changed(&self.price, update.price.as_ref()),
            stock: changed(&self.stock, update.stock.as_ref()),
        }
    }
}

impl WireRecord for Product {
    fn from_wire(value: &Value) -> Result<Self, WireError> {
        let r = WireReader::new("product", value)?;
        Ok(Self {
            id: r.required_id(fields::ID)?,
            name: r.required_string(fields::NAME)?,
            description: r.optional_string(fields::DESCRIPTION)?,
            price: r.required_decimal(fields::PRICE)?,
            stock: r.required_i64(fields::STOCK)?,
            created_at: r.required_timestamp(fields::CREATED_AT)?,
            updated_at: r.optional_timestamp(fields::UPDATED_AT)?,
        })
    }

    fn to_wire(&self, naming: WireNaming) -> Value {
        WireWriter::new(naming)
            .put(fields::ID, self.id.as_i64())
            .put(fields::NAME, self.name.clone())
            .put_opt(fields::DESCRIPTION, self.description.clone())
            .put(fields::PRICE, decimal_value(self.price))
            .put(fields::STOCK, self.stock)
            .put(fields::CREATED_AT, timestamp_value(self.created_at))
            .put_opt(fields::UPDATED_AT, self.updated_at.map(timestamp_value))
            .finish()
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i64,
}

impl NewProduct {
    #[must_use]
    pub fn to_wire(&self) -> Value {
        WireWriter::new(WireNaming::SnakeCase)
            .put(fields::NAME, self.name.clone())
            .put_opt(fields::DESCRIPTION, self.description.clone())
            .put(fields::PRICE, decimal_value(self.price))
            .put(fields::STOCK, self.stock)
            .finish()
    }
}

/// Partial product update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    /// Replacement text. An update can change a description but never
    /// remove it; the server keeps the stored text when the key is absent.
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
}

impl ProductUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
    }

    #[must_use]
    pub fn to_wire(&self) -> Value {
        WireWriter::new(WireNaming::SnakeCase)
            .put_opt(fields::NAME, self.name.clone())
            .put_opt(fields::DESCRIPTION, self.description.clone())
            .put_opt(fields::PRICE, self.price.map(decimal_value))
            .put_opt(fields::STOCK, self.stock)
            .finish()
    }
}
