//! Shipment and shipment report models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Goods packed or loaded against a production order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    pub production_order_id: Uuid,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    /// price_per_unit × quantity; recomputed on every change
    pub total_price: Decimal,
    pub vehicle_number: Option<String>,
    pub trailer_number: Option<String>,
    pub driver_name: Option<String>,
    pub status: ShipmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sub-status of a shipment before it leaves the site
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Packed,
    Loaded,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Packed => "packed",
            ShipmentStatus::Loaded => "loaded",
        }
    }
}

impl std::str::FromStr for ShipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "packed" => Ok(ShipmentStatus::Packed),
            "loaded" => Ok(ShipmentStatus::Loaded),
            other => Err(format!("unknown shipment status: {}", other)),
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filed once a loaded vehicle is on the way; feeds the shipment report
/// screen and drives the order into `shipping`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentReport {
    pub id: Uuid,
    pub shipment_id: Uuid,
    pub invoice_number: String,
    pub shipment_date: NaiveDate,
    pub current_location: Option<String>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub actual_delivery_date: Option<NaiveDate>,
    pub number_of_days: Option<i32>,
    pub delivery_expense: Option<Decimal>,
    pub currency_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
