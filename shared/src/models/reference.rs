//! Reference data: marks, units, bag types, currencies, geography

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product grade/type classification referenced by orders and recipes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mark {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// Measurement unit for order quantities (e.g. "mt", "kg")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitType {
    pub id: Uuid,
    pub name: String,
}

/// Packaging type for produced goods
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BagType {
    pub id: Uuid,
    pub name: String,
    pub capacity_kg: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    pub id: Uuid,
    /// ISO 4217 code (e.g. "USD")
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub id: Uuid,
    pub country_id: Uuid,
    pub name: String,
}
