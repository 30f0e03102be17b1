//! Tests for the production order status gate
//!
//! The gate is the single authority on which actions move an order
//! between statuses; these tests pin down the full table.

use shared::models::{OrderAction, ProductionOrderStatus, UserRole};
use shared::workflow::{self, TransitionError};

use OrderAction as A;
use ProductionOrderStatus as S;

/// The complete legal transition table: (from, action, to)
const TABLE: &[(S, A, S)] = &[
    (S::Draft, A::SendToCommercialDirector, S::OnApproval),
    (S::OnApproval, A::Approve, S::UnderReviewByProduction),
    (S::OnApproval, A::Reject, S::Rejected),
    (S::UnderReviewByProduction, A::AcceptByProduction, S::AcceptedByProduction),
    (S::UnderReviewByProduction, A::RejectByProduction, S::RejectedByProduction),
    (S::AcceptedByProduction, A::PlanProduction, S::Planned),
    (S::Planned, A::StartProduction, S::Producing),
    (S::Producing, A::CompleteProduction, S::Produced),
    (S::Produced, A::BeginShipping, S::Shipping),
    (S::Shipping, A::ConfirmDelivery, S::Delivered),
];

fn table_lookup(from: S, action: A) -> Option<S> {
    TABLE
        .iter()
        .find(|(f, a, _)| *f == from && *a == action)
        .map(|(_, _, to)| *to)
}

/// Every (status, action) pair either matches the table or is rejected.
/// The grid is exhaustive, so no transition can sneak in unlisted.
#[test]
fn full_grid_matches_table() {
    for from in S::ALL {
        for action in A::ALL {
            let result = workflow::transition(from, action);
            match table_lookup(from, action) {
                Some(expected) => {
                    let outcome = result.unwrap_or_else(|e| {
                        panic!("{from} + {action} should be legal, got {e}")
                    });
                    assert_eq!(outcome.next, expected, "{from} + {action}");
                }
                None => {
                    assert!(
                        matches!(result, Err(TransitionError::Invalid { .. })),
                        "{from} + {action} should be illegal"
                    );
                }
            }
        }
    }
}

/// An order walks the full happy path from draft to delivered.
#[test]
fn happy_path_reaches_delivered() {
    let path = [
        A::SendToCommercialDirector,
        A::Approve,
        A::AcceptByProduction,
        A::PlanProduction,
        A::StartProduction,
        A::CompleteProduction,
        A::BeginShipping,
        A::ConfirmDelivery,
    ];

    let mut status = S::Draft;
    for action in path {
        let outcome = workflow::apply(status, action, None)
            .unwrap_or_else(|e| panic!("{status} + {action}: {e}"));
        status = outcome.next;
    }
    assert_eq!(status, S::Delivered);
}

/// Sending an order that is already on approval fails; the action is
/// not idempotent and the second submission must be surfaced.
#[test]
fn double_submission_is_rejected() {
    let first = workflow::apply(S::Draft, A::SendToCommercialDirector, None).unwrap();
    assert_eq!(first.next, S::OnApproval);

    let second = workflow::apply(first.next, A::SendToCommercialDirector, None);
    assert!(matches!(
        second,
        Err(TransitionError::Invalid {
            from: S::OnApproval,
            action: A::SendToCommercialDirector
        })
    ));
}

/// A director turning down an order must say why.
#[test]
fn rejection_requires_a_reason() {
    for reason in [None, Some(""), Some("   ")] {
        let result = workflow::apply(S::OnApproval, A::Reject, reason);
        assert!(
            matches!(result, Err(TransitionError::MissingReason { action: A::Reject })),
            "reason {reason:?} should be refused"
        );
    }

    let ok = workflow::apply(S::OnApproval, A::Reject, Some("insufficient margin")).unwrap();
    assert_eq!(ok.next, S::Rejected);
}

#[test]
fn production_rejection_requires_a_reason() {
    let missing = workflow::apply(S::UnderReviewByProduction, A::RejectByProduction, None);
    assert!(matches!(
        missing,
        Err(TransitionError::MissingReason { action: A::RejectByProduction })
    ));

    let ok = workflow::apply(
        S::UnderReviewByProduction,
        A::RejectByProduction,
        Some("no capacity this quarter"),
    )
    .unwrap();
    assert_eq!(ok.next, S::RejectedByProduction);
}

/// Approval carries no reason and must not demand one.
#[test]
fn approve_takes_no_reason() {
    let outcome = workflow::apply(S::OnApproval, A::Approve, None).unwrap();
    assert_eq!(outcome.next, S::UnderReviewByProduction);
}

/// Terminal and parked statuses offer nothing to do.
#[test]
fn terminal_statuses_offer_no_actions() {
    for status in [S::Rejected, S::RejectedByProduction, S::Approved, S::Delivered] {
        assert!(
            workflow::permitted_actions(status).is_empty(),
            "{status} should have no permitted actions"
        );
    }
}

/// permitted_actions agrees with the table for every status.
#[test]
fn permitted_actions_match_table() {
    for from in S::ALL {
        let expected: Vec<A> = A::ALL
            .into_iter()
            .filter(|a| table_lookup(from, *a).is_some())
            .collect();
        assert_eq!(workflow::permitted_actions(from), expected, "{from}");
    }
}

/// Gated preconditions surface on the transitions that carry them.
#[test]
fn gated_transitions_carry_requirements() {
    use shared::workflow::Requirement;

    let send = workflow::transition(S::Draft, A::SendToCommercialDirector).unwrap();
    assert_eq!(send.requirement, Some(Requirement::OrderFieldsComplete));

    let plan = workflow::transition(S::AcceptedByProduction, A::PlanProduction).unwrap();
    assert_eq!(plan.requirement, Some(Requirement::RecipeAttached));

    let ship = workflow::transition(S::Produced, A::BeginShipping).unwrap();
    assert_eq!(ship.requirement, Some(Requirement::ShipmentExists));

    let start = workflow::transition(S::Planned, A::StartProduction).unwrap();
    assert_eq!(start.requirement, None);
}

/// Each department may only request its own leg of the pipeline;
/// admins may request anything.
#[test]
fn roles_gate_their_own_actions() {
    assert!(workflow::role_allows(UserRole::Commercial, A::Approve));
    assert!(workflow::role_allows(UserRole::Commercial, A::SendToCommercialDirector));
    assert!(!workflow::role_allows(UserRole::Commercial, A::StartProduction));

    assert!(workflow::role_allows(UserRole::Production, A::AcceptByProduction));
    assert!(workflow::role_allows(UserRole::Production, A::CompleteProduction));
    assert!(!workflow::role_allows(UserRole::Production, A::Reject));
    assert!(!workflow::role_allows(UserRole::Production, A::ConfirmDelivery));

    assert!(workflow::role_allows(UserRole::Logistics, A::BeginShipping));
    assert!(workflow::role_allows(UserRole::Logistics, A::ConfirmDelivery));
    assert!(!workflow::role_allows(UserRole::Logistics, A::PlanProduction));

    assert!(!workflow::role_allows(UserRole::Lab, A::Approve));
    assert!(!workflow::role_allows(UserRole::Lab, A::BeginShipping));

    for action in A::ALL {
        assert!(workflow::role_allows(UserRole::Admin, action), "{action}");
    }
}

/// Filing a shipment report moves the order `produced -> shipping`, and the
/// role gate is consulted before the transition: every role that is not
/// logistics (or admin) must be refused at the gate, so no other entry
/// point can drive the order into shipping.
#[test]
fn shipping_via_report_requires_a_logistics_role() {
    for role in [
        UserRole::Admin,
        UserRole::Commercial,
        UserRole::Production,
        UserRole::Lab,
        UserRole::Logistics,
    ] {
        let allowed = workflow::role_allows(role, A::BeginShipping);
        assert_eq!(
            allowed,
            matches!(role, UserRole::Logistics | UserRole::Admin),
            "{role}"
        );
        if allowed {
            let outcome = workflow::apply(S::Produced, A::BeginShipping, None).unwrap();
            assert_eq!(outcome.next, S::Shipping);
        }
    }
}

/// Status round-trips through its wire string.
#[test]
fn status_strings_round_trip() {
    for status in S::ALL {
        let parsed: S = status.as_str().parse().unwrap();
        assert_eq!(parsed, status);
    }
    assert!("not-a-status".parse::<S>().is_err());
}
