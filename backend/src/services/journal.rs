//! Production journal service
//!
//! Journal entries record actual vs. planned output and only exist while
//! the parent order is producing.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::calc::production_diff;
use shared::models::{ProductionJournalEntry, ProductionOrderStatus};

/// Production journal service
#[derive(Clone)]
pub struct JournalService {
    db: PgPool,
}

/// Database row for a journal entry
#[derive(Debug, sqlx::FromRow)]
struct JournalRow {
    id: Uuid,
    production_order_id: Uuid,
    recipe_id: Uuid,
    planned: Decimal,
    produced: Decimal,
    ready: Decimal,
    actual_production_date: NaiveDate,
    diff: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<JournalRow> for ProductionJournalEntry {
    fn from(row: JournalRow) -> Self {
        ProductionJournalEntry {
            id: row.id,
            production_order_id: row.production_order_id,
            recipe_id: row.recipe_id,
            planned: row.planned,
            produced: row.produced,
            ready: row.ready,
            actual_production_date: row.actual_production_date,
            diff: row.diff,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for recording a journal entry
#[derive(Debug, Deserialize)]
pub struct CreateJournalInput {
    pub production_order_id: Uuid,
    pub recipe_id: Uuid,
    pub planned: Decimal,
    pub produced: Decimal,
    pub ready: Decimal,
    pub actual_production_date: NaiveDate,
}

/// Input for updating a journal entry while production is running
#[derive(Debug, Default, Deserialize)]
pub struct UpdateJournalInput {
    pub planned: Option<Decimal>,
    pub produced: Option<Decimal>,
    pub ready: Option<Decimal>,
    pub actual_production_date: Option<NaiveDate>,
}

impl JournalService {
    /// Create a new JournalService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a journal entry for an order in production
    pub async fn create_entry(
        &self,
        input: CreateJournalInput,
    ) -> AppResult<ProductionJournalEntry> {
        let status = self.order_status(input.production_order_id).await?;
        if status != ProductionOrderStatus::Producing {
            return Err(AppError::Conflict(format!(
                "Journal entries can only be recorded while producing, current status: {}",
                status
            )));
        }

        if input.produced < Decimal::ZERO || input.ready < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "Produced and ready quantities cannot be negative".to_string(),
            ));
        }

        // diff is derived, never taken from the client
        let diff = production_diff(input.planned, input.produced);

        let row = sqlx::query_as::<_, JournalRow>(
            r#"
            INSERT INTO production_journal
                (production_order_id, recipe_id, planned, produced, ready,
                 actual_production_date, diff)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, production_order_id, recipe_id, planned, produced,
                      ready, actual_production_date, diff, created_at, updated_at
            "#,
        )
        .bind(input.production_order_id)
        .bind(input.recipe_id)
        .bind(input.planned)
        .bind(input.produced)
        .bind(input.ready)
        .bind(input.actual_production_date)
        .bind(diff)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Update a journal entry, recomputing the derived diff
    pub async fn update_entry(
        &self,
        entry_id: Uuid,
        input: UpdateJournalInput,
    ) -> AppResult<ProductionJournalEntry> {
        let current = self.get_entry(entry_id).await?;

        let status = self.order_status(current.production_order_id).await?;
        if status != ProductionOrderStatus::Producing {
            return Err(AppError::Conflict(format!(
                "Journal entries are frozen outside production, current status: {}",
                status
            )));
        }

        let planned = input.planned.unwrap_or(current.planned);
        let produced = input.produced.unwrap_or(current.produced);
        let ready = input.ready.unwrap_or(current.ready);
        let date = input
            .actual_production_date
            .unwrap_or(current.actual_production_date);
        let diff = production_diff(planned, produced);

        let row = sqlx::query_as::<_, JournalRow>(
            r#"
            UPDATE production_journal
            SET planned = $1, produced = $2, ready = $3,
                actual_production_date = $4, diff = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING id, production_order_id, recipe_id, planned, produced,
                      ready, actual_production_date, diff, created_at, updated_at
            "#,
        )
        .bind(planned)
        .bind(produced)
        .bind(ready)
        .bind(date)
        .bind(diff)
        .bind(entry_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get a journal entry by ID
    pub async fn get_entry(&self, entry_id: Uuid) -> AppResult<ProductionJournalEntry> {
        let row = sqlx::query_as::<_, JournalRow>(
            r#"
            SELECT id, production_order_id, recipe_id, planned, produced,
                   ready, actual_production_date, diff, created_at, updated_at
            FROM production_journal
            WHERE id = $1
            "#,
        )
        .bind(entry_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Journal entry".to_string()))?;

        Ok(row.into())
    }

    /// List journal entries for an order
    pub async fn list_by_order(&self, order_id: Uuid) -> AppResult<Vec<ProductionJournalEntry>> {
        let rows = sqlx::query_as::<_, JournalRow>(
            r#"
            SELECT id, production_order_id, recipe_id, planned, produced,
                   ready, actual_production_date, diff, created_at, updated_at
            FROM production_journal
            WHERE production_order_id = $1
            ORDER BY actual_production_date DESC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
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
