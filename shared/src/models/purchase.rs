//! Raw-material purchase models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calc::line_total;

/// A raw-material purchase from a supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub material: String,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    /// price_per_unit × quantity
    pub total_price: Decimal,
    pub logistics_price_per_unit: Option<Decimal>,
    /// logistics_price_per_unit × quantity
    pub logistics_total_price: Option<Decimal>,
    pub purchase_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Purchase {
    /// Recompute both derived totals from price and quantity
    pub fn recompute_totals(&mut self) {
        self.total_price = line_total(self.price_per_unit, Some(self.quantity));
        self.logistics_total_price = self
            .logistics_price_per_unit
            .map(|price| line_total(price, Some(self.quantity)));
    }
}
