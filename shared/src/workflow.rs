//! Production order status workflow
//!
//! The transition gate is the single authority on which actions are legal
//! for an order in a given status. It is a pure decision: persisting the
//! new status and cascading to dependent records is the caller's job.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{OrderAction, ProductionOrderStatus, UserRole};

/// A precondition the caller must verify before committing a transition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// All mandatory order fields filled in
    OrderFieldsComplete,
    /// A recipe is attached to the order
    RecipeAttached,
    /// At least one journal entry exists and a shipment has been created
    ShipmentExists,
}

/// Outcome of a legal transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: ProductionOrderStatus,
    pub requirement: Option<Requirement>,
}

/// Why a requested transition was refused
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {action} an order in status {from}")]
    Invalid {
        from: ProductionOrderStatus,
        action: OrderAction,
    },
    #[error("a rejection reason is required for {action}")]
    MissingReason { action: OrderAction },
}

/// Look up the transition table for `(from, action)`.
///
/// Every pair not listed here is illegal; there is no way to skip states
/// through this surface.
pub fn transition(
    from: ProductionOrderStatus,
    action: OrderAction,
) -> Result<Transition, TransitionError> {
    use OrderAction as A;
    use ProductionOrderStatus as S;

    let (next, requirement) = match (from, action) {
        (S::Draft, A::SendToCommercialDirector) => {
            (S::OnApproval, Some(Requirement::OrderFieldsComplete))
        }
        (S::OnApproval, A::Approve) => (S::UnderReviewByProduction, None),
        (S::OnApproval, A::Reject) => (S::Rejected, None),
        (S::UnderReviewByProduction, A::AcceptByProduction) => (S::AcceptedByProduction, None),
        (S::UnderReviewByProduction, A::RejectByProduction) => (S::RejectedByProduction, None),
        (S::AcceptedByProduction, A::PlanProduction) => {
            (S::Planned, Some(Requirement::RecipeAttached))
        }
        (S::Planned, A::StartProduction) => (S::Producing, None),
        (S::Producing, A::CompleteProduction) => (S::Produced, None),
        (S::Produced, A::BeginShipping) => (S::Shipping, Some(Requirement::ShipmentExists)),
        (S::Shipping, A::ConfirmDelivery) => (S::Delivered, None),
        _ => return Err(TransitionError::Invalid { from, action }),
    };

    Ok(Transition { next, requirement })
}

/// Like [`transition`], but also validates the rejection reason for the
/// actions that carry one.
pub fn apply(
    from: ProductionOrderStatus,
    action: OrderAction,
    reason: Option<&str>,
) -> Result<Transition, TransitionError> {
    let outcome = transition(from, action)?;
    if action.requires_reason() {
        match reason {
            Some(text) if !text.trim().is_empty() => {}
            _ => return Err(TransitionError::MissingReason { action }),
        }
    }
    Ok(outcome)
}

/// Actions legal for an order in `from`, in table order
pub fn permitted_actions(from: ProductionOrderStatus) -> Vec<OrderAction> {
    OrderAction::ALL
        .into_iter()
        .filter(|action| transition(from, *action).is_ok())
        .collect()
}

/// Whether `role` may request `action`. Admins may request anything.
pub fn role_allows(role: UserRole, action: OrderAction) -> bool {
    use OrderAction as A;

    let required = match action {
        A::SendToCommercialDirector | A::Approve | A::Reject => UserRole::Commercial,
        A::AcceptByProduction
        | A::RejectByProduction
        | A::PlanProduction
        | A::StartProduction
        | A::CompleteProduction => UserRole::Production,
        A::BeginShipping | A::ConfirmDelivery => UserRole::Logistics,
    };

    role == UserRole::Admin || role == required
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderAction as A;
    use ProductionOrderStatus as S;

    #[test]
    fn gate_covers_the_full_pipeline() {
        let path = [
            (S::Draft, A::SendToCommercialDirector, S::OnApproval),
            (S::OnApproval, A::Approve, S::UnderReviewByProduction),
            (
                S::UnderReviewByProduction,
                A::AcceptByProduction,
                S::AcceptedByProduction,
            ),
            (S::AcceptedByProduction, A::PlanProduction, S::Planned),
            (S::Planned, A::StartProduction, S::Producing),
            (S::Producing, A::CompleteProduction, S::Produced),
            (S::Produced, A::BeginShipping, S::Shipping),
            (S::Shipping, A::ConfirmDelivery, S::Delivered),
        ];
        for (from, action, expected) in path {
            let outcome = transition(from, action).unwrap();
            assert_eq!(outcome.next, expected, "{} --{}-->", from, action);
        }
    }

    #[test]
    fn rejection_without_reason_is_refused() {
        let err = apply(S::OnApproval, A::Reject, None).unwrap_err();
        assert_eq!(err, TransitionError::MissingReason { action: A::Reject });

        let err = apply(S::OnApproval, A::Reject, Some("   ")).unwrap_err();
        assert_eq!(err, TransitionError::MissingReason { action: A::Reject });

        let outcome = apply(S::OnApproval, A::Reject, Some("insufficient margin")).unwrap();
        assert_eq!(outcome.next, S::Rejected);
    }

    #[test]
    fn approval_needs_no_reason() {
        let outcome = apply(S::OnApproval, A::Approve, None).unwrap();
        assert_eq!(outcome.next, S::UnderReviewByProduction);
    }

    #[test]
    fn terminal_and_legacy_statuses_have_no_actions() {
        for status in [S::Approved, S::Rejected, S::RejectedByProduction, S::Delivered] {
            assert!(permitted_actions(status).is_empty(), "{}", status);
        }
    }

    #[test]
    fn role_gating_matches_action_stage() {
        assert!(role_allows(UserRole::Commercial, A::Approve));
        assert!(!role_allows(UserRole::Commercial, A::StartProduction));
        assert!(role_allows(UserRole::Production, A::AcceptByProduction));
        assert!(!role_allows(UserRole::Production, A::BeginShipping));
        assert!(role_allows(UserRole::Logistics, A::ConfirmDelivery));
        assert!(!role_allows(UserRole::Lab, A::Approve));
        for action in A::ALL {
            assert!(role_allows(UserRole::Admin, action));
        }
    }
}
