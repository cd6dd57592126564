//! Recorded sales.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use super::changed;
use crate::types::{ProductId, SaleId, UserId};
use crate::wire::{
    WireError, WireNaming, WireReader, WireRecord, WireWriter, decimal_value, timestamp_value,
};

/// Wire field table for sales.
pub mod fields {
    use crate::wire::Field;

    pub const ID: Field = Field::new("id", "ID");
    pub const USER_ID: Field = Field::new("user_id", "UserID");
    pub const PRODUCT_ID: Field = Field::new("product_id", "ProductID");
    pub const QUANTITY: Field = Field::new("quantity", "Quantity");
    pub const TOTAL_PRICE: Field = Field::new("total_price", "TotalPrice");
    pub const SALE_DATE: Field = Field::new("sale_date", "SaleDate");
    pub const CREATED_AT: Field = Field::new("created_at", "CreatedAt");
    pub const UPDATED_AT: Field = Field::new("updated_at", "UpdatedAt");
}

/// A sale as recorded by the server. The total is computed server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    pub id: SaleId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub total_price: Decimal,
    pub sale_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Sale {
    /// Keep only the fields of `update` that differ from this sale.
    #[must_use]
    pub fn diff(&self, update: &SaleUpdate) -> SaleUpdate {
        SaleUpdate {
            user_id: changed(&self.user_id, update.user_id.as_ref()),
            product_id: changed(&self.product_id, update.product_id.as_ref()),
            quantity: changed(&self.quantity, update.quantity.as_ref()),
            sale_date: changed(&self.sale_date, update.sale_date.as_ref()),
        }
    }
}

impl WireRecord for Sale {
    fn from_wire(value: &Value) -> Result<Self, WireError> {
        let r = WireReader::new("sale", value)?;
        Ok(Self {
            id: r.required_id(fields::ID)?,
            user_id: r.required_id(fields::USER_ID)?,
            product_id: r.required_id(fields::PRODUCT_ID)?,
            quantity: r.required_i64(fields::QUANTITY)?,
            total_price: r.required_decimal(fields::TOTAL_PRICE)?,
            sale_date: r.required_timestamp(fields::SALE_DATE)?,
            created_at: r.required_timestamp(fields::CREATED_AT)?,
            updated_at: r.optional_timestamp(fields::UPDATED_AT)?,
        })
    }

    fn to_wire(&self, naming: WireNaming) -> Value {
        WireWriter::new(naming)
            .put(fields::ID, self.id.as_i64())
            .put(fields::USER_ID, self.user_id.as_i64())
            .put(fields::PRODUCT_ID, self.product_id.as_i64())
            .put(fields::QUANTITY, self.quantity)
            .put(fields::TOTAL_PRICE, decimal_value(self.total_price))
            .put(fields::SALE_DATE, timestamp_value(self.sale_date))
            .put(fields::CREATED_AT, timestamp_value(self.created_at))
            .put_opt(fields::UPDATED_AT, self.updated_at.map(timestamp_value))
            .finish()
    }
}

/// Payload for recording a sale.
///
/// `user_id` and `sale_date` default server-side to the caller and now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    pub product_id: ProductId,
    pub quantity: i64,
    pub user_id: Option<UserId>,
    pub sale_date: Option<DateTime<Utc>>,
}

impl NewSale {
    #[must_use]
    pub fn to_wire(&self) -> Value {
        WireWriter::new(WireNaming::SnakeCase)
            .put(fields::PRODUCT_ID, self.product_id.as_i64())
            .put(fields::QUANTITY, self.quantity)
            .put_opt(fields::USER_ID, self.user_id.map(|id| id.as_i64()))
            .put_opt(fields::SALE_DATE, self.sale_date.map(timestamp_value))
            .finish()
    }
}

/// Partial sale update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleUpdate {
    pub user_id: Option<UserId>,
    pub product_id: Option<ProductId>,
    pub quantity: Option<i64>,
    pub sale_date: Option<DateTime<Utc>>,
}

impl SaleUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.product_id.is_none()
            && self.quantity.is_none()
            && self.sale_date.is_none()
    }

    #[must_use]
    pub fn to_wire(&self) -> Value {
        WireWriter::new(WireNaming::SnakeCase)
            .put_opt(fields::USER_ID, self.user_id.map(|id| id.as_i64()))
            .put_opt(fields::PRODUCT_ID, self.product_id.map(|id| id.as_i64()))
            .put_opt(fields::QUANTITY, self.quantity)
            .put_opt(fields::SALE_DATE, self.sale_date.map(timestamp_value))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    fn sample() -> Sale {
        Sale {
            id: SaleId::new(11),
            user_id: UserId::new(7),
            product_id: ProductId::new(3),
            quantity: 2,
            total_price: Decimal::from_str("49.80").unwrap(),
            sale_date: "2024-05-03T14:00:00Z".parse().unwrap(),
            created_at: "2024-05-03T14:00:01Z".parse().unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_round_trip_both_namings() {
        let sale = sample();
        for naming in [WireNaming::SnakeCase, WireNaming::Capitalized] {
            let wire = sale.to_wire(naming);
            assert_eq!(Sale::from_wire(&wire).unwrap(), sale, "{naming:?}");
        }
    }

    #[test]
    fn test_round_trip_keeps_high_precision_total() {
        let sale = Sale {
            total_price: Decimal::from_str("98765432109.87654321").unwrap(),
            ..sample()
        };
        for naming in [WireNaming::SnakeCase, WireNaming::Capitalized] {
            let text = serde_json::to_string(&sale.to_wire(naming)).unwrap();
            let back = Sale::from_wire(&serde_json::from_str(&text).unwrap()).unwrap();
            assert_eq!(back.total_price, sale.total_price, "{naming:?}");
            assert_eq!(back, sale);
        }
    }

    #[test]
    fn test_capitalized_names_use_go_initialisms() {
        let wire = sample().to_wire(WireNaming::Capitalized);
        assert_eq!(wire["UserID"], json!(7));
        assert_eq!(wire["ProductID"], json!(3));
        assert!(wire.get("UpdatedAt").is_none());
    }

    #[test]
    fn test_new_sale_omits_server_defaults() {
        let new_sale = NewSale {
            product_id: ProductId::new(3),
            quantity: 2,
            user_id: None,
            sale_date: None,
        };
        assert_eq!(new_sale.to_wire(), json!({"product_id": 3, "quantity": 2}));
    }

    #[test]
    fn test_diff_keeps_only_changes() {
        let sale = sample();
        let update = SaleUpdate {
            quantity: Some(5),
            product_id: Some(sale.product_id),
            ..SaleUpdate::default()
        };
        let diff = sale.diff(&update);
        assert_eq!(diff.to_wire(), json!({"quantity": 5}));
        assert!(sale.diff(&SaleUpdate::default()).is_empty());
    }
}
