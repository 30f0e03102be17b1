//! Production journal models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calc::production_diff;

/// Actual-vs-planned output record for an order in production
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionJournalEntry {
    pub id: Uuid,
    pub production_order_id: Uuid,
    pub recipe_id: Uuid,
    pub planned: Decimal,
    pub produced: Decimal,
    /// Quantity packed and ready for loading
    pub ready: Decimal,
    pub actual_production_date: NaiveDate,
    /// planned − produced; recomputed whenever either side changes
    pub diff: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductionJournalEntry {
    pub fn recompute_diff(&mut self) {
        self.diff = production_diff(self.planned, self.produced);
    }
}
