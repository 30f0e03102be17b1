//! Validation utilities for the ProdFlow platform

use rust_decimal::Decimal;

use crate::models::{ProductionOrder, Recipe, MAX_RAW_MATERIAL_LINES};

// ============================================================================
// Order Validations
// ============================================================================

/// Validate that an order is complete enough to send for approval
pub fn validate_order_for_approval(order: &ProductionOrder) -> Result<(), &'static str> {
    if order.quantity <= Decimal::ZERO {
        return Err("Order quantity must be positive");
    }
    if order.consignee_id.is_none() {
        return Err("Consignee is required before approval");
    }
    Ok(())
}

/// Validate a mandatory free-text rejection reason
pub fn validate_rejection_reason(reason: &str) -> Result<(), &'static str> {
    if reason.trim().is_empty() {
        return Err("Rejection reason must not be empty");
    }
    Ok(())
}

/// Validate quantity entered on orders, shipments, and purchases
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a unit price
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Recipe Validations
// ============================================================================

/// Validate a recipe's material lines and lot number
pub fn validate_recipe(recipe: &Recipe) -> Result<(), &'static str> {
    if recipe.raw_materials.is_empty() {
        return Err("Recipe needs at least one raw material line");
    }
    if recipe.raw_materials.len() > MAX_RAW_MATERIAL_LINES {
        return Err("Recipe cannot have more than 4 raw material lines");
    }
    for line in &recipe.raw_materials {
        if line.material.trim().is_empty() {
            return Err("Raw material name must not be empty");
        }
        if line.volume <= Decimal::ZERO {
            return Err("Raw material volume must be positive");
        }
    }
    if recipe.lot_number.trim().is_empty() {
        return Err("Lot number is required");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate a lab measurement value is in a physically plausible range
pub fn validate_measurement(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO {
        return Err("Measurement cannot be negative");
    }
    if value > Decimal::from(10_000) {
        return Err("Measurement out of range");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductionOrderStatus, RecipeLine};
    use chrono::Utc;
    use uuid::Uuid;

    fn order() -> ProductionOrder {
        ProductionOrder {
            id: Uuid::new_v4(),
            number: 1,
            buyer_id: Uuid::new_v4(),
            consignee_id: Some(Uuid::new_v4()),
            country_id: None,
            city_id: None,
            mark_id: Uuid::new_v4(),
            unit_type_id: Uuid::new_v4(),
            bag_type_id: None,
            quantity: Decimal::from(20),
            status: ProductionOrderStatus::Draft,
            documents: vec![],
            commercial_rejection_reason: None,
            production_rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn recipe() -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            production_order_id: Uuid::new_v4(),
            raw_materials: vec![RecipeLine {
                material: "slack wax".to_string(),
                volume: Decimal::from(18),
            }],
            by_product: None,
            chemicals: None,
            additive: None,
            device: None,
            lot_number: "L-2024-017".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_for_approval_valid() {
        assert!(validate_order_for_approval(&order()).is_ok());
    }

    #[test]
    fn test_order_for_approval_zero_quantity() {
        let mut order = order();
        order.quantity = Decimal::ZERO;
        assert!(validate_order_for_approval(&order).is_err());
    }

    #[test]
    fn test_order_for_approval_missing_consignee() {
        let mut order = order();
        order.consignee_id = None;
        assert!(validate_order_for_approval(&order).is_err());
    }

    #[test]
    fn test_rejection_reason() {
        assert!(validate_rejection_reason("insufficient margin").is_ok());
        assert!(validate_rejection_reason("").is_err());
        assert!(validate_rejection_reason("   ").is_err());
    }

    #[test]
    fn test_recipe_valid() {
        assert!(validate_recipe(&recipe()).is_ok());
    }

    #[test]
    fn test_recipe_too_many_lines() {
        let mut recipe = recipe();
        recipe.raw_materials = (0..5)
            .map(|i| RecipeLine {
                material: format!("raw {}", i),
                volume: Decimal::ONE,
            })
            .collect();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_recipe_empty_lot_number() {
        let mut recipe = recipe();
        recipe.lot_number = " ".to_string();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_recipe_nonpositive_volume() {
        let mut recipe = recipe();
        recipe.raw_materials[0].volume = Decimal::ZERO;
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_measurement() {
        assert!(validate_measurement(Decimal::from(64)).is_ok());
        assert!(validate_measurement(Decimal::from(-1)).is_err());
        assert!(validate_measurement(Decimal::from(20_000)).is_err());
    }
}
