//! Production order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::DocumentReference;

/// The central manufacturing work item, tracked from commercial approval
/// through shipment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub id: Uuid,
    /// Human-readable sequence number (e.g. 2024-0041)
    pub number: i64,
    pub buyer_id: Uuid,
    pub consignee_id: Option<Uuid>,
    pub country_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub mark_id: Uuid,
    pub unit_type_id: Uuid,
    pub bag_type_id: Option<Uuid>,
    pub quantity: Decimal,
    pub status: ProductionOrderStatus,
    /// Approving document attachments
    pub documents: Vec<DocumentReference>,
    /// Set only when the commercial director rejects the order
    pub commercial_rejection_reason: Option<String>,
    /// Set only when production rejects the order
    pub production_rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read shape for order detail and listing pages: the plain
/// [`ProductionOrder`] carries foreign keys, this variant additionally
/// resolves the referenced display names so the UI needs no extra lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionOrderExpanded {
    #[serde(flatten)]
    pub order: ProductionOrder,
    pub buyer_name: String,
    pub consignee_name: Option<String>,
    pub country_name: Option<String>,
    pub city_name: Option<String>,
    pub mark_name: String,
    pub unit_type_name: String,
    pub bag_type_name: Option<String>,
}

/// Status of a production order in the approval/production/shipping pipeline
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProductionOrderStatus {
    Draft,
    OnApproval,
    /// Legacy status; no actions lead out of it
    Approved,
    Rejected,
    UnderReviewByProduction,
    AcceptedByProduction,
    RejectedByProduction,
    Planned,
    Producing,
    Produced,
    Shipping,
    Delivered,
}

impl ProductionOrderStatus {
    /// All statuses, in pipeline order
    pub const ALL: [ProductionOrderStatus; 12] = [
        ProductionOrderStatus::Draft,
        ProductionOrderStatus::OnApproval,
        ProductionOrderStatus::Approved,
        ProductionOrderStatus::Rejected,
        ProductionOrderStatus::UnderReviewByProduction,
        ProductionOrderStatus::AcceptedByProduction,
        ProductionOrderStatus::RejectedByProduction,
        ProductionOrderStatus::Planned,
        ProductionOrderStatus::Producing,
        ProductionOrderStatus::Produced,
        ProductionOrderStatus::Shipping,
        ProductionOrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionOrderStatus::Draft => "draft",
            ProductionOrderStatus::OnApproval => "on_approval",
            ProductionOrderStatus::Approved => "approved",
            ProductionOrderStatus::Rejected => "rejected",
            ProductionOrderStatus::UnderReviewByProduction => "under_review_by_production",
            ProductionOrderStatus::AcceptedByProduction => "accepted_by_production",
            ProductionOrderStatus::RejectedByProduction => "rejected_by_production",
            ProductionOrderStatus::Planned => "planned",
            ProductionOrderStatus::Producing => "producing",
            ProductionOrderStatus::Produced => "produced",
            ProductionOrderStatus::Shipping => "shipping",
            ProductionOrderStatus::Delivered => "delivered",
        }
    }

    /// True once the order has entered (or passed) production
    pub fn production_started(&self) -> bool {
        matches!(
            self,
            ProductionOrderStatus::Producing
                | ProductionOrderStatus::Produced
                | ProductionOrderStatus::Shipping
                | ProductionOrderStatus::Delivered
        )
    }
}

impl std::str::FromStr for ProductionOrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductionOrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown production order status: {}", s))
    }
}

impl std::fmt::Display for ProductionOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operator actions exposed on a production order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    SendToCommercialDirector,
    Approve,
    Reject,
    AcceptByProduction,
    RejectByProduction,
    PlanProduction,
    StartProduction,
    CompleteProduction,
    BeginShipping,
    ConfirmDelivery,
}

impl OrderAction {
    pub const ALL: [OrderAction; 10] = [
        OrderAction::SendToCommercialDirector,
        OrderAction::Approve,
        OrderAction::Reject,
        OrderAction::AcceptByProduction,
        OrderAction::RejectByProduction,
        OrderAction::PlanProduction,
        OrderAction::StartProduction,
        OrderAction::CompleteProduction,
        OrderAction::BeginShipping,
        OrderAction::ConfirmDelivery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::SendToCommercialDirector => "send_to_commercial_director",
            OrderAction::Approve => "approve",
            OrderAction::Reject => "reject",
            OrderAction::AcceptByProduction => "accept_by_production",
            OrderAction::RejectByProduction => "reject_by_production",
            OrderAction::PlanProduction => "plan_production",
            OrderAction::StartProduction => "start_production",
            OrderAction::CompleteProduction => "complete_production",
            OrderAction::BeginShipping => "begin_shipping",
            OrderAction::ConfirmDelivery => "confirm_delivery",
        }
    }

    /// Actions that carry a mandatory free-text reason
    pub fn requires_reason(&self) -> bool {
        matches!(self, OrderAction::Reject | OrderAction::RejectByProduction)
    }
}

impl std::fmt::Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
