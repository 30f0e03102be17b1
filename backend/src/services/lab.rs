//! Lab QA service
//!
//! Lab reports carry repeated measurement arrays; the per-measurement
//! averages are derived server-side and never taken from the client.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::calc::sample_mean;
use shared::models::{LabReport, ProductionOrderStatus};
use shared::validation::validate_measurement;

/// Lab QA service
#[derive(Clone)]
pub struct LabService {
    db: PgPool,
}

/// Database row for a lab report
#[derive(Debug, sqlx::FromRow)]
struct LabRow {
    id: Uuid,
    production_order_id: Uuid,
    recipe_id: Uuid,
    viscosity: serde_json::Value,
    softening_temperature: serde_json::Value,
    dropping_point: serde_json::Value,
    melting_point: serde_json::Value,
    viscosity_avg: Decimal,
    softening_temperature_avg: Decimal,
    dropping_point_avg: Decimal,
    melting_point_avg: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LabRow {
    fn into_report(self) -> AppResult<LabReport> {
        Ok(LabReport {
            id: self.id,
            production_order_id: self.production_order_id,
            recipe_id: self.recipe_id,
            viscosity: decode_samples(self.viscosity)?,
            softening_temperature: decode_samples(self.softening_temperature)?,
            dropping_point: decode_samples(self.dropping_point)?,
            melting_point: decode_samples(self.melting_point)?,
            viscosity_avg: self.viscosity_avg,
            softening_temperature_avg: self.softening_temperature_avg,
            dropping_point_avg: self.dropping_point_avg,
            melting_point_avg: self.melting_point_avg,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn decode_samples(value: serde_json::Value) -> AppResult<Vec<Decimal>> {
    serde_json::from_value(value).map_err(|e| AppError::Internal(e.to_string()))
}

fn encode_samples(samples: &[Decimal]) -> AppResult<serde_json::Value> {
    serde_json::to_value(samples).map_err(|e| AppError::Internal(e.to_string()))
}

/// Input for recording a lab report
#[derive(Debug, Deserialize)]
pub struct CreateLabInput {
    pub production_order_id: Uuid,
    pub recipe_id: Uuid,
    #[serde(default)]
    pub viscosity: Vec<Decimal>,
    #[serde(default)]
    pub softening_temperature: Vec<Decimal>,
    #[serde(default)]
    pub dropping_point: Vec<Decimal>,
    #[serde(default)]
    pub melting_point: Vec<Decimal>,
}

/// Input for updating a lab report's measurement arrays
#[derive(Debug, Default, Deserialize)]
pub struct UpdateLabInput {
    pub viscosity: Option<Vec<Decimal>>,
    pub softening_temperature: Option<Vec<Decimal>>,
    pub dropping_point: Option<Vec<Decimal>>,
    pub melting_point: Option<Vec<Decimal>>,
}

impl LabService {
    /// Create a new LabService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a lab report for an order in (or past) production
    pub async fn create_report(&self, input: CreateLabInput) -> AppResult<LabReport> {
        let status = self.order_status(input.production_order_id).await?;
        if !status.production_started() {
            return Err(AppError::Conflict(format!(
                "Lab reports require a started production, current status: {}",
                status
            )));
        }

        for samples in [
            &input.viscosity,
            &input.softening_temperature,
            &input.dropping_point,
            &input.melting_point,
        ] {
            for value in samples {
                validate_measurement(*value)
                    .map_err(|msg| AppError::ValidationError(msg.to_string()))?;
            }
        }

        let row = sqlx::query_as::<_, LabRow>(
            r#"
            INSERT INTO lab_reports
                (production_order_id, recipe_id, viscosity, softening_temperature,
                 dropping_point, melting_point, viscosity_avg,
                 softening_temperature_avg, dropping_point_avg, melting_point_avg)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, production_order_id, recipe_id, viscosity,
                      softening_temperature, dropping_point, melting_point,
                      viscosity_avg, softening_temperature_avg,
                      dropping_point_avg, melting_point_avg, created_at, updated_at
            "#,
        )
        .bind(input.production_order_id)
        .bind(input.recipe_id)
        .bind(encode_samples(&input.viscosity)?)
        .bind(encode_samples(&input.softening_temperature)?)
        .bind(encode_samples(&input.dropping_point)?)
        .bind(encode_samples(&input.melting_point)?)
        .bind(sample_mean(&input.viscosity))
        .bind(sample_mean(&input.softening_temperature))
        .bind(sample_mean(&input.dropping_point))
        .bind(sample_mean(&input.melting_point))
        .fetch_one(&self.db)
        .await?;

        row.into_report()
    }

    /// Update a report's measurement arrays, recomputing the averages
    pub async fn update_report(
        &self,
        report_id: Uuid,
        input: UpdateLabInput,
    ) -> AppResult<LabReport> {
        let current = self.get_report(report_id).await?;

        let viscosity = input.viscosity.unwrap_or(current.viscosity);
        let softening = input
            .softening_temperature
            .unwrap_or(current.softening_temperature);
        let dropping = input.dropping_point.unwrap_or(current.dropping_point);
        let melting = input.melting_point.unwrap_or(current.melting_point);

        for samples in [&viscosity, &softening, &dropping, &melting] {
            for value in samples.iter() {
                validate_measurement(*value)
                    .map_err(|msg| AppError::ValidationError(msg.to_string()))?;
            }
        }

        let row = sqlx::query_as::<_, LabRow>(
            r#"
            UPDATE lab_reports
            SET viscosity = $1, softening_temperature = $2, dropping_point = $3,
                melting_point = $4, viscosity_avg = $5,
                softening_temperature_avg = $6, dropping_point_avg = $7,
                melting_point_avg = $8, updated_at = NOW()
            WHERE id = $9
            RETURNING id, production_order_id, recipe_id, viscosity,
                      softening_temperature, dropping_point, melting_point,
                      viscosity_avg, softening_temperature_avg,
                      dropping_point_avg, melting_point_avg, created_at, updated_at
            "#,
        )
        .bind(encode_samples(&viscosity)?)
        .bind(encode_samples(&softening)?)
        .bind(encode_samples(&dropping)?)
        .bind(encode_samples(&melting)?)
        .bind(sample_mean(&viscosity))
        .bind(sample_mean(&softening))
        .bind(sample_mean(&dropping))
        .bind(sample_mean(&melting))
        .bind(report_id)
        .fetch_one(&self.db)
        .await?;

        row.into_report()
    }

    /// Get a lab report by ID
    pub async fn get_report(&self, report_id: Uuid) -> AppResult<LabReport> {
        let row = sqlx::query_as::<_, LabRow>(
            r#"
            SELECT id, production_order_id, recipe_id, viscosity,
                   softening_temperature, dropping_point, melting_point,
                   viscosity_avg, softening_temperature_avg,
                   dropping_point_avg, melting_point_avg, created_at, updated_at
            FROM lab_reports
            WHERE id = $1
            "#,
        )
        .bind(report_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Lab report".to_string()))?;

        row.into_report()
    }

    /// List lab reports for an order
    pub async fn list_by_order(&self, order_id: Uuid) -> AppResult<Vec<LabReport>> {
        let rows = sqlx::query_as::<_, LabRow>(
            r#"
            SELECT id, production_order_id, recipe_id, viscosity,
                   softening_temperature, dropping_point, melting_point,
                   viscosity_avg, softening_temperature_avg,
                   dropping_point_avg, melting_point_avg, created_at, updated_at
            FROM lab_reports
            WHERE production_order_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(LabRow::into_report).collect()
    }

    async fn order_status(&self, order_id: Uuid) -> AppResult<ProductionOrderStatus> {
        let status =
            sqlx::query_scalar::<_, String>("SELECT status FROM production_orders WHERE id = $1")
                .bind(order_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Production order".to_string()))?;

        ProductionOrderStatus::from_str(&status).map_err(AppError::Internal)
    }
}
