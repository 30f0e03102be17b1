//! Raw-material purchase service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::calc::line_total;
use shared::models::Purchase;
use shared::validation::{validate_price, validate_quantity};

/// Raw-material purchase service
#[derive(Clone)]
pub struct PurchaseService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: Uuid,
    supplier_id: Uuid,
    material: String,
    quantity: Decimal,
    price_per_unit: Decimal,
    total_price: Decimal,
    logistics_price_per_unit: Option<Decimal>,
    logistics_total_price: Option<Decimal>,
    purchase_date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PurchaseRow> for Purchase {
    fn from(row: PurchaseRow) -> Self {
        Purchase {
            id: row.id,
            supplier_id: row.supplier_id,
            material: row.material,
            quantity: row.quantity,
            price_per_unit: row.price_per_unit,
            total_price: row.total_price,
            logistics_price_per_unit: row.logistics_price_per_unit,
            logistics_total_price: row.logistics_total_price,
            purchase_date: row.purchase_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating or updating a purchase.
///
/// Totals are never accepted from the caller, they are derived
/// from price and quantity on every write.
#[derive(Debug, Deserialize)]
pub struct PurchaseInput {
    pub supplier_id: Uuid,
    pub material: String,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub logistics_price_per_unit: Option<Decimal>,
    pub purchase_date: NaiveDate,
}

const PURCHASE_COLUMNS: &str = "id, supplier_id, material, quantity, price_per_unit, \
     total_price, logistics_price_per_unit, logistics_total_price, purchase_date, \
     created_at, updated_at";

impl PurchaseService {
    /// Create a new PurchaseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn check_input(input: &PurchaseInput) -> AppResult<()> {
        if input.material.trim().is_empty() {
            return Err(AppError::Validation {
                field: "material".to_string(),
                message: "Material is required".to_string(),
            });
        }
        validate_quantity(input.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;
        validate_price(input.price_per_unit).map_err(|msg| AppError::Validation {
            field: "price_per_unit".to_string(),
            message: msg.to_string(),
        })?;
        if let Some(price) = input.logistics_price_per_unit {
            validate_price(price).map_err(|msg| AppError::Validation {
                field: "logistics_price_per_unit".to_string(),
                message: msg.to_string(),
            })?;
        }
        Ok(())
    }

    async fn supplier_exists(&self, supplier_id: Uuid) -> AppResult<()> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM suppliers WHERE id = $1")
            .bind(supplier_id)
            .fetch_one(&self.db)
            .await?;
        if count == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }
        Ok(())
    }

    pub async fn create_purchase(&self, input: PurchaseInput) -> AppResult<Purchase> {
        Self::check_input(&input)?;
        self.supplier_exists(input.supplier_id).await?;

        let total = line_total(input.price_per_unit, Some(input.quantity));
        let logistics_total = input
            .logistics_price_per_unit
            .map(|price| line_total(price, Some(input.quantity)));

        let row = sqlx::query_as::<_, PurchaseRow>(&format!(
            r#"
            INSERT INTO purchases (supplier_id, material, quantity, price_per_unit,
                                   total_price, logistics_price_per_unit,
                                   logistics_total_price, purchase_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PURCHASE_COLUMNS}
            "#
        ))
        .bind(input.supplier_id)
        .bind(input.material.trim())
        .bind(input.quantity)
        .bind(input.price_per_unit)
        .bind(total)
        .bind(input.logistics_price_per_unit)
        .bind(logistics_total)
        .bind(input.purchase_date)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    pub async fn get_purchase(&self, purchase_id: Uuid) -> AppResult<Purchase> {
        let row = sqlx::query_as::<_, PurchaseRow>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = $1"
        ))
        .bind(purchase_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        Ok(row.into())
    }

    pub async fn list_purchases(&self, supplier_id: Option<Uuid>) -> AppResult<Vec<Purchase>> {
        let rows = match supplier_id {
            Some(supplier_id) => {
                sqlx::query_as::<_, PurchaseRow>(&format!(
                    "SELECT {PURCHASE_COLUMNS} FROM purchases \
                     WHERE supplier_id = $1 ORDER BY purchase_date DESC"
                ))
                .bind(supplier_id)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, PurchaseRow>(&format!(
                    "SELECT {PURCHASE_COLUMNS} FROM purchases ORDER BY purchase_date DESC"
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update_purchase(
        &self,
        purchase_id: Uuid,
        input: PurchaseInput,
    ) -> AppResult<Purchase> {
        Self::check_input(&input)?;
        self.supplier_exists(input.supplier_id).await?;

        let total = line_total(input.price_per_unit, Some(input.quantity));
        let logistics_total = input
            .logistics_price_per_unit
            .map(|price| line_total(price, Some(input.quantity)));

        let row = sqlx::query_as::<_, PurchaseRow>(&format!(
            r#"
            UPDATE purchases
            SET supplier_id = $1, material = $2, quantity = $3, price_per_unit = $4,
                total_price = $5, logistics_price_per_unit = $6,
                logistics_total_price = $7, purchase_date = $8, updated_at = NOW()
            WHERE id = $9
            RETURNING {PURCHASE_COLUMNS}
            "#
        ))
        .bind(input.supplier_id)
        .bind(input.material.trim())
        .bind(input.quantity)
        .bind(input.price_per_unit)
        .bind(total)
        .bind(input.logistics_price_per_unit)
        .bind(logistics_total)
        .bind(input.purchase_date)
        .bind(purchase_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        Ok(row.into())
    }

    pub async fn delete_purchase(&self, purchase_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM purchases WHERE id = $1")
            .bind(purchase_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Purchase".to_string()));
        }
        Ok(())
    }
}
