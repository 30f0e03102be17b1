//! Shipment service
//!
//! Shipments are packed against an order in production, loaded onto a
//! vehicle, and reported once on the way; filing the report is what moves
//! the order itself into `shipping`, through the transition gate.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::calc::line_total;
use shared::models::{
    OrderAction, ProductionOrderStatus, Shipment, ShipmentReport, ShipmentStatus, UserRole,
};
use shared::workflow;

const SHIPMENT_COLUMNS: &str = "id, production_order_id, quantity, price_per_unit, total_price, \
     vehicle_number, trailer_number, driver_name, status, created_at, updated_at";

const REPORT_COLUMNS: &str = "id, shipment_id, invoice_number, shipment_date, current_location, \
     expected_delivery_date, actual_delivery_date, number_of_days, \
     delivery_expense, currency_id, created_at";

/// Shipment service
#[derive(Clone)]
pub struct ShipmentService {
    db: PgPool,
}

/// Database row for a shipment
#[derive(Debug, sqlx::FromRow)]
struct ShipmentRow {
    id: Uuid,
    production_order_id: Uuid,
    quantity: Decimal,
    price_per_unit: Decimal,
    total_price: Decimal,
    vehicle_number: Option<String>,
    trailer_number: Option<String>,
    driver_name: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ShipmentRow {
    fn into_shipment(self) -> AppResult<Shipment> {
        Ok(Shipment {
            id: self.id,
            production_order_id: self.production_order_id,
            quantity: self.quantity,
            price_per_unit: self.price_per_unit,
            total_price: self.total_price,
            vehicle_number: self.vehicle_number,
            trailer_number: self.trailer_number,
            driver_name: self.driver_name,
            status: ShipmentStatus::from_str(&self.status).map_err(AppError::Internal)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database row for a shipment report
#[derive(Debug, sqlx::FromRow)]
struct ReportRow {
    id: Uuid,
    shipment_id: Uuid,
    invoice_number: String,
    shipment_date: NaiveDate,
    current_location: Option<String>,
    expected_delivery_date: Option<NaiveDate>,
    actual_delivery_date: Option<NaiveDate>,
    number_of_days: Option<i32>,
    delivery_expense: Option<Decimal>,
    currency_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<ReportRow> for ShipmentReport {
    fn from(row: ReportRow) -> Self {
        ShipmentReport {
            id: row.id,
            shipment_id: row.shipment_id,
            invoice_number: row.invoice_number,
            shipment_date: row.shipment_date,
            current_location: row.current_location,
            expected_delivery_date: row.expected_delivery_date,
            actual_delivery_date: row.actual_delivery_date,
            number_of_days: row.number_of_days,
            delivery_expense: row.delivery_expense,
            currency_id: row.currency_id,
            created_at: row.created_at,
        }
    }
}

/// Input for packing a shipment against an order
#[derive(Debug, Deserialize)]
pub struct CreateShipmentInput {
    pub production_order_id: Uuid,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub vehicle_number: Option<String>,
    pub trailer_number: Option<String>,
    pub driver_name: Option<String>,
}

/// Input for filing a shipment report (vehicle on the way)
#[derive(Debug, Deserialize)]
pub struct CreateReportInput {
    pub shipment_id: Uuid,
    pub invoice_number: String,
    pub shipment_date: NaiveDate,
    pub current_location: Option<String>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub delivery_expense: Option<Decimal>,
    pub currency_id: Option<Uuid>,
}

/// Input for updating a report as the vehicle travels
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReportInput {
    pub current_location: Option<String>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub actual_delivery_date: Option<NaiveDate>,
    pub delivery_expense: Option<Decimal>,
    pub currency_id: Option<Uuid>,
}

impl ShipmentService {
    /// Create a new ShipmentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Pack a shipment against an order in (or just out of) production
    pub async fn create_shipment(&self, input: CreateShipmentInput) -> AppResult<Shipment> {
        let status = self.order_status(input.production_order_id).await?;
        if !matches!(
            status,
            ProductionOrderStatus::Producing | ProductionOrderStatus::Produced
        ) {
            return Err(AppError::Conflict(format!(
                "Shipments require an order in producing or produced, current status: {}",
                status
            )));
        }

        if input.quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Shipment quantity must be positive".to_string(),
            });
        }

        let journal_entries = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM production_journal WHERE production_order_id = $1",
        )
        .bind(input.production_order_id)
        .fetch_one(&self.db)
        .await?;
        if journal_entries == 0 {
            return Err(AppError::Conflict(
                "At least one journal entry is required before packing a shipment".to_string(),
            ));
        }

        let qa_reports = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM lab_reports WHERE production_order_id = $1",
        )
        .bind(input.production_order_id)
        .fetch_one(&self.db)
        .await?;
        if qa_reports == 0 {
            tracing::warn!(
                order_id = %input.production_order_id,
                "packing a shipment without any lab QA report"
            );
        }

        let total_price = line_total(input.price_per_unit, Some(input.quantity));

        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            r#"
            INSERT INTO shipments
                (production_order_id, quantity, price_per_unit, total_price,
                 vehicle_number, trailer_number, driver_name, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'packed')
            RETURNING {}
            "#,
            SHIPMENT_COLUMNS
        ))
        .bind(input.production_order_id)
        .bind(input.quantity)
        .bind(input.price_per_unit)
        .bind(total_price)
        .bind(&input.vehicle_number)
        .bind(&input.trailer_number)
        .bind(&input.driver_name)
        .fetch_one(&self.db)
        .await?;

        row.into_shipment()
    }

    /// Get a shipment by ID
    pub async fn get_shipment(&self, shipment_id: Uuid) -> AppResult<Shipment> {
        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            "SELECT {} FROM shipments WHERE id = $1",
            SHIPMENT_COLUMNS
        ))
        .bind(shipment_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Shipment".to_string()))?;

        row.into_shipment()
    }

    /// List shipments for an order
    pub async fn list_by_order(&self, order_id: Uuid) -> AppResult<Vec<Shipment>> {
        let rows = sqlx::query_as::<_, ShipmentRow>(&format!(
            "SELECT {} FROM shipments WHERE production_order_id = $1 ORDER BY created_at DESC",
            SHIPMENT_COLUMNS
        ))
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ShipmentRow::into_shipment).collect()
    }

    /// List all shipments
    pub async fn list_shipments(&self) -> AppResult<Vec<Shipment>> {
        let rows = sqlx::query_as::<_, ShipmentRow>(&format!(
            "SELECT {} FROM shipments ORDER BY created_at DESC",
            SHIPMENT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ShipmentRow::into_shipment).collect()
    }

    /// Move a packed shipment to loaded
    pub async fn mark_loaded(&self, shipment_id: Uuid) -> AppResult<Shipment> {
        let shipment = self.get_shipment(shipment_id).await?;
        if shipment.status != ShipmentStatus::Packed {
            return Err(AppError::Conflict(format!(
                "Only packed shipments can be loaded, current status: {}",
                shipment.status
            )));
        }

        let row = sqlx::query_as::<_, ShipmentRow>(&format!(
            r#"
            UPDATE shipments SET status = 'loaded', updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SHIPMENT_COLUMNS
        ))
        .bind(shipment_id)
        .fetch_one(&self.db)
        .await?;

        row.into_shipment()
    }

    /// File the shipment report and move the order into `shipping`.
    ///
    /// Both writes happen in one transaction; the order transition still
    /// goes through the gate, so a report cannot be filed before the order
    /// has finished producing, and only by a role allowed to ship.
    pub async fn create_report(
        &self,
        input: CreateReportInput,
        role: UserRole,
    ) -> AppResult<ShipmentReport> {
        if !workflow::role_allows(role, OrderAction::BeginShipping) {
            return Err(AppError::InsufficientPermissions(format!(
                "Role {} may not request {}",
                role,
                OrderAction::BeginShipping
            )));
        }

        if input.invoice_number.trim().is_empty() {
            return Err(AppError::Validation {
                field: "invoice_number".to_string(),
                message: "Invoice number is required".to_string(),
            });
        }

        let shipment = self.get_shipment(input.shipment_id).await?;
        if shipment.status != ShipmentStatus::Loaded {
            return Err(AppError::Conflict(format!(
                "Shipment must be loaded before it can be reported, current status: {}",
                shipment.status
            )));
        }

        let order_status = self.order_status(shipment.production_order_id).await?;
        let outcome = workflow::apply(order_status, OrderAction::BeginShipping, None)?;

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, ReportRow>(&format!(
            r#"
            INSERT INTO shipment_reports
                (shipment_id, invoice_number, shipment_date, current_location,
                 expected_delivery_date, delivery_expense, currency_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(input.shipment_id)
        .bind(&input.invoice_number)
        .bind(input.shipment_date)
        .bind(&input.current_location)
        .bind(input.expected_delivery_date)
        .bind(input.delivery_expense)
        .bind(input.currency_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE production_orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(outcome.next.as_str())
            .bind(shipment.production_order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Update a report; setting the actual delivery date derives the
    /// number-of-days field
    pub async fn update_report(
        &self,
        report_id: Uuid,
        input: UpdateReportInput,
    ) -> AppResult<ShipmentReport> {
        let current = self.get_report(report_id).await?;

        let actual_delivery = input
            .actual_delivery_date
            .or(current.actual_delivery_date);
        let number_of_days = actual_delivery
            .map(|date| (date - current.shipment_date).num_days() as i32);

        let row = sqlx::query_as::<_, ReportRow>(&format!(
            r#"
            UPDATE shipment_reports
            SET current_location = COALESCE($1, current_location),
                expected_delivery_date = COALESCE($2, expected_delivery_date),
                actual_delivery_date = COALESCE($3, actual_delivery_date),
                number_of_days = COALESCE($4, number_of_days),
                delivery_expense = COALESCE($5, delivery_expense),
                currency_id = COALESCE($6, currency_id)
            WHERE id = $7
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(&input.current_location)
        .bind(input.expected_delivery_date)
        .bind(input.actual_delivery_date)
        .bind(number_of_days)
        .bind(input.delivery_expense)
        .bind(input.currency_id)
        .bind(report_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get a shipment report by ID
    pub async fn get_report(&self, report_id: Uuid) -> AppResult<ShipmentReport> {
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {} FROM shipment_reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(report_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Shipment report".to_string()))?;

        Ok(row.into())
    }

    /// List all shipment reports
    pub async fn list_reports(&self) -> AppResult<Vec<ShipmentReport>> {
        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {} FROM shipment_reports ORDER BY shipment_date DESC",
            REPORT_COLUMNS
        ))
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
