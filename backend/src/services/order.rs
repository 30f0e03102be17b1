//! Production order service
//!
//! Owns the canonical order records. Every status change goes through
//! [`shared::workflow`]; there is no other mutation path, so the UI can
//! never produce a status the transition table does not allow.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{
    OrderAction, ProductionOrder, ProductionOrderExpanded, ProductionOrderStatus, UserRole,
};
use shared::types::DocumentReference;
use shared::validation::validate_order_for_approval;
use shared::workflow::{self, Requirement};

const ORDER_COLUMNS: &str = "id, number, buyer_id, consignee_id, country_id, city_id, mark_id, \
     unit_type_id, bag_type_id, quantity, status, documents, \
     commercial_rejection_reason, production_rejection_reason, created_at, updated_at";

// Read shape with referenced display names resolved in one query
const ORDER_EXPANDED_COLUMNS: &str = "o.id, o.number, o.buyer_id, o.consignee_id, o.country_id, \
     o.city_id, o.mark_id, o.unit_type_id, o.bag_type_id, o.quantity, o.status, o.documents, \
     o.commercial_rejection_reason, o.production_rejection_reason, o.created_at, o.updated_at, \
     buyer.name AS buyer_name, consignee.name AS consignee_name, \
     country.name AS country_name, city.name AS city_name, mark.name AS mark_name, \
     unit_type.name AS unit_type_name, bag_type.name AS bag_type_name";

const ORDER_EXPANDED_FROM: &str = "production_orders o \
     JOIN clients buyer ON buyer.id = o.buyer_id \
     LEFT JOIN clients consignee ON consignee.id = o.consignee_id \
     LEFT JOIN countries country ON country.id = o.country_id \
     LEFT JOIN cities city ON city.id = o.city_id \
     JOIN marks mark ON mark.id = o.mark_id \
     JOIN unit_types unit_type ON unit_type.id = o.unit_type_id \
     LEFT JOIN bag_types bag_type ON bag_type.id = o.bag_type_id";

/// Production order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Database row for a production order
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    number: i64,
    buyer_id: Uuid,
    consignee_id: Option<Uuid>,
    country_id: Option<Uuid>,
    city_id: Option<Uuid>,
    mark_id: Uuid,
    unit_type_id: Uuid,
    bag_type_id: Option<Uuid>,
    quantity: Decimal,
    status: String,
    documents: serde_json::Value,
    commercial_rejection_reason: Option<String>,
    production_rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> AppResult<ProductionOrder> {
        let status = ProductionOrderStatus::from_str(&self.status).map_err(AppError::Internal)?;
        let documents: Vec<DocumentReference> = serde_json::from_value(self.documents)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(ProductionOrder {
            id: self.id,
            number: self.number,
            buyer_id: self.buyer_id,
            consignee_id: self.consignee_id,
            country_id: self.country_id,
            city_id: self.city_id,
            mark_id: self.mark_id,
            unit_type_id: self.unit_type_id,
            bag_type_id: self.bag_type_id,
            quantity: self.quantity,
            status,
            documents,
            commercial_rejection_reason: self.commercial_rejection_reason,
            production_rejection_reason: self.production_rejection_reason,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ExpandedRow {
    #[sqlx(flatten)]
    order: OrderRow,
    buyer_name: String,
    consignee_name: Option<String>,
    country_name: Option<String>,
    city_name: Option<String>,
    mark_name: String,
    unit_type_name: String,
    bag_type_name: Option<String>,
}

impl ExpandedRow {
    fn into_expanded(self) -> AppResult<ProductionOrderExpanded> {
        Ok(ProductionOrderExpanded {
            order: self.order.into_order()?,
            buyer_name: self.buyer_name,
            consignee_name: self.consignee_name,
            country_name: self.country_name,
            city_name: self.city_name,
            mark_name: self.mark_name,
            unit_type_name: self.unit_type_name,
            bag_type_name: self.bag_type_name,
        })
    }
}

/// Input for creating an order (always starts in `draft`)
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub buyer_id: Uuid,
    pub consignee_id: Option<Uuid>,
    pub country_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub mark_id: Uuid,
    pub unit_type_id: Uuid,
    pub bag_type_id: Option<Uuid>,
    pub quantity: Decimal,
    #[serde(default)]
    pub documents: Vec<DocumentReference>,
}

/// Input for updating a draft order; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderInput {
    pub buyer_id: Option<Uuid>,
    pub consignee_id: Option<Uuid>,
    pub country_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub mark_id: Option<Uuid>,
    pub unit_type_id: Option<Uuid>,
    pub bag_type_id: Option<Uuid>,
    pub quantity: Option<Decimal>,
    pub documents: Option<Vec<DocumentReference>>,
}

/// Body of `POST /production-orders/:id/actions`
#[derive(Debug, Deserialize)]
pub struct OrderActionInput {
    pub action: OrderAction,
    pub reason: Option<String>,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an order in `draft`
    pub async fn create_order(&self, input: CreateOrderInput) -> AppResult<ProductionOrder> {
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
            });
        }

        let documents = serde_json::to_value(&input.documents)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO production_orders
                (buyer_id, consignee_id, country_id, city_id, mark_id,
                 unit_type_id, bag_type_id, quantity, status, documents)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'draft', $9)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(input.buyer_id)
        .bind(input.consignee_id)
        .bind(input.country_id)
        .bind(input.city_id)
        .bind(input.mark_id)
        .bind(input.unit_type_id)
        .bind(input.bag_type_id)
        .bind(input.quantity)
        .bind(&documents)
        .fetch_one(&self.db)
        .await?;

        row.into_order()
    }

    /// Get an order by ID
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<ProductionOrder> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM production_orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Production order".to_string()))?;

        row.into_order()
    }

    /// Get an order with its referenced display names resolved
    pub async fn get_order_expanded(&self, order_id: Uuid) -> AppResult<ProductionOrderExpanded> {
        let row = sqlx::query_as::<_, ExpandedRow>(&format!(
            "SELECT {} FROM {} WHERE o.id = $1",
            ORDER_EXPANDED_COLUMNS, ORDER_EXPANDED_FROM
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Production order".to_string()))?;

        row.into_expanded()
    }

    /// List orders with display names, optionally filtered by status
    pub async fn list_orders(
        &self,
        status: Option<ProductionOrderStatus>,
    ) -> AppResult<Vec<ProductionOrderExpanded>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, ExpandedRow>(&format!(
                    "SELECT {} FROM {} WHERE o.status = $1 ORDER BY o.number DESC",
                    ORDER_EXPANDED_COLUMNS, ORDER_EXPANDED_FROM
                ))
                .bind(status.as_str())
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, ExpandedRow>(&format!(
                    "SELECT {} FROM {} ORDER BY o.number DESC",
                    ORDER_EXPANDED_COLUMNS, ORDER_EXPANDED_FROM
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        rows.into_iter().map(ExpandedRow::into_expanded).collect()
    }

    /// Update a draft order's fields
    pub async fn update_order(
        &self,
        order_id: Uuid,
        input: UpdateOrderInput,
    ) -> AppResult<ProductionOrder> {
        let order = self.get_order(order_id).await?;
        if order.status != ProductionOrderStatus::Draft {
            return Err(AppError::Conflict(format!(
                "Only draft orders can be edited, current status: {}",
                order.status
            )));
        }

        if let Some(quantity) = input.quantity {
            if quantity <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Quantity must be positive".to_string(),
                });
            }
        }

        let documents = match &input.documents {
            Some(documents) => Some(
                serde_json::to_value(documents).map_err(|e| AppError::Internal(e.to_string()))?,
            ),
            None => None,
        };

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE production_orders
            SET buyer_id = COALESCE($1, buyer_id),
                consignee_id = COALESCE($2, consignee_id),
                country_id = COALESCE($3, country_id),
                city_id = COALESCE($4, city_id),
                mark_id = COALESCE($5, mark_id),
                unit_type_id = COALESCE($6, unit_type_id),
                bag_type_id = COALESCE($7, bag_type_id),
                quantity = COALESCE($8, quantity),
                documents = COALESCE($9, documents),
                updated_at = NOW()
            WHERE id = $10
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(input.buyer_id)
        .bind(input.consignee_id)
        .bind(input.country_id)
        .bind(input.city_id)
        .bind(input.mark_id)
        .bind(input.unit_type_id)
        .bind(input.bag_type_id)
        .bind(input.quantity)
        .bind(documents)
        .bind(order_id)
        .fetch_one(&self.db)
        .await?;

        row.into_order()
    }

    /// Delete an order that never entered the pipeline
    pub async fn delete_order(&self, order_id: Uuid) -> AppResult<()> {
        let order = self.get_order(order_id).await?;
        let deletable = matches!(
            order.status,
            ProductionOrderStatus::Draft
                | ProductionOrderStatus::Rejected
                | ProductionOrderStatus::RejectedByProduction
        );
        if !deletable {
            return Err(AppError::Conflict(format!(
                "Orders in status {} cannot be deleted",
                order.status
            )));
        }

        sqlx::query("DELETE FROM production_orders WHERE id = $1")
            .bind(order_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Request a status transition. The gate decides legality; this method
    /// verifies the gate's precondition against the database and persists
    /// the outcome.
    pub async fn apply_action(
        &self,
        order_id: Uuid,
        action: OrderAction,
        reason: Option<&str>,
        role: UserRole,
    ) -> AppResult<ProductionOrder> {
        if !workflow::role_allows(role, action) {
            return Err(AppError::InsufficientPermissions(format!(
                "Role {} may not request {}",
                role, action
            )));
        }

        let order = self.get_order(order_id).await?;
        let outcome = workflow::apply(order.status, action, reason)?;

        if let Some(requirement) = outcome.requirement {
            self.check_requirement(&order, requirement).await?;
        }

        let (commercial_reason, production_reason) = match action {
            OrderAction::Reject => (reason.map(str::to_string), None),
            OrderAction::RejectByProduction => (None, reason.map(str::to_string)),
            _ => (None, None),
        };

        tracing::info!(
            order = %order.number,
            from = %order.status,
            to = %outcome.next,
            %action,
            "production order transition"
        );

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE production_orders
            SET status = $1,
                commercial_rejection_reason = COALESCE($2, commercial_rejection_reason),
                production_rejection_reason = COALESCE($3, production_rejection_reason),
                updated_at = NOW()
            WHERE id = $4
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(outcome.next.as_str())
        .bind(commercial_reason)
        .bind(production_reason)
        .bind(order_id)
        .fetch_one(&self.db)
        .await?;

        row.into_order()
    }

    /// Actions currently legal for an order, for conditional UI rendering
    pub async fn permitted_actions(&self, order_id: Uuid) -> AppResult<Vec<OrderAction>> {
        let order = self.get_order(order_id).await?;
        Ok(workflow::permitted_actions(order.status))
    }

    /// Verify the gate's precondition against stored records
    async fn check_requirement(
        &self,
        order: &ProductionOrder,
        requirement: Requirement,
    ) -> AppResult<()> {
        match requirement {
            Requirement::OrderFieldsComplete => validate_order_for_approval(order)
                .map_err(|msg| AppError::ValidationError(msg.to_string())),
            Requirement::RecipeAttached => {
                let count = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM recipes WHERE production_order_id = $1",
                )
                .bind(order.id)
                .fetch_one(&self.db)
                .await?;
                if count == 0 {
                    return Err(AppError::Conflict(
                        "A recipe must be attached before production can be planned".to_string(),
                    ));
                }
                Ok(())
            }
            Requirement::ShipmentExists => {
                let count = sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM shipments WHERE production_order_id = $1",
                )
                .bind(order.id)
                .fetch_one(&self.db)
                .await?;
                if count == 0 {
                    return Err(AppError::Conflict(
                        "A shipment must exist before the order can start shipping".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}
