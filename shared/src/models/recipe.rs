//! Recipe (bill-of-materials) models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of main raw-material lines per recipe
pub const MAX_RAW_MATERIAL_LINES: usize = 4;

/// The bill-of-materials record attached to a production order's
/// manufacturing phase. One recipe per order; editable until production
/// starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub production_order_id: Uuid,
    /// Up to [`MAX_RAW_MATERIAL_LINES`] main raw-material lines
    pub raw_materials: Vec<RecipeLine>,
    pub by_product: Option<RecipeLine>,
    pub chemicals: Option<String>,
    pub additive: Option<String>,
    pub device: Option<String>,
    pub lot_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single material line in a recipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeLine {
    pub material: String,
    pub volume: Decimal,
}
