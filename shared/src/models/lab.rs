//! Lab QA models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calc::sample_mean;

/// Independent quality-control measurements for a production order.
///
/// Each measurement is a repeated sample array; the averages are simple
/// arithmetic means over whatever samples are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabReport {
    pub id: Uuid,
    pub production_order_id: Uuid,
    pub recipe_id: Uuid,
    pub viscosity: Vec<Decimal>,
    pub softening_temperature: Vec<Decimal>,
    pub dropping_point: Vec<Decimal>,
    pub melting_point: Vec<Decimal>,
    pub viscosity_avg: Decimal,
    pub softening_temperature_avg: Decimal,
    pub dropping_point_avg: Decimal,
    pub melting_point_avg: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LabReport {
    /// Recompute all derived averages from the sample arrays
    pub fn recompute_averages(&mut self) {
        self.viscosity_avg = sample_mean(&self.viscosity);
        self.softening_temperature_avg = sample_mean(&self.softening_temperature);
        self.dropping_point_avg = sample_mean(&self.dropping_point);
        self.melting_point_avg = sample_mean(&self.melting_point);
    }
}
