//! Derived-field calculators
//!
//! Pure recomputation helpers for the dependent numeric fields on forms:
//! line totals, lab measurement averages, and planned-vs-actual deltas.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency and lab-measurement fields are declared with 2-decimal precision
pub const FIELD_PRECISION: u32 = 2;

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(FIELD_PRECISION, RoundingStrategy::MidpointAwayFromZero)
}

/// `total = price × quantity`, rounded to the field precision.
///
/// An absent or zero quantity yields 0, never an error.
pub fn line_total(price: Decimal, quantity: Option<Decimal>) -> Decimal {
    match quantity {
        Some(qty) if !qty.is_zero() => round(price * qty),
        _ => Decimal::ZERO,
    }
}

/// Arithmetic mean of a measurement sample array, rounded to the field
/// precision. A partial array falls back to the mean over the samples
/// present; an empty array yields 0.
pub fn sample_mean(samples: &[Decimal]) -> Decimal {
    if samples.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = samples.iter().sum();
    round(sum / Decimal::from(samples.len() as u64))
}

/// Planned-vs-actual output delta for a journal entry
pub fn production_diff(planned: Decimal, produced: Decimal) -> Decimal {
    planned - produced
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn line_total_is_the_exact_product() {
        assert_eq!(line_total(dec("12.50"), Some(dec("4"))), dec("50.00"));
        assert_eq!(line_total(dec("3"), Some(dec("7"))), dec("21"));
    }

    #[test]
    fn line_total_zero_or_absent_quantity_yields_zero() {
        assert_eq!(line_total(dec("99.99"), None), Decimal::ZERO);
        assert_eq!(line_total(dec("99.99"), Some(Decimal::ZERO)), Decimal::ZERO);
    }

    #[test]
    fn sample_mean_three_samples() {
        let samples = [dec("64.1"), dec("64.4"), dec("64.9")];
        // (64.1 + 64.4 + 64.9) / 3 = 64.466... -> 64.47
        assert_eq!(sample_mean(&samples), dec("64.47"));
    }

    #[test]
    fn sample_mean_falls_back_to_two_samples() {
        let samples = [dec("52.0"), dec("53.0")];
        assert_eq!(sample_mean(&samples), dec("52.50"));
    }

    #[test]
    fn sample_mean_empty_is_zero() {
        assert_eq!(sample_mean(&[]), Decimal::ZERO);
    }

    #[test]
    fn production_diff_sign() {
        assert_eq!(production_diff(dec("100"), dec("92.5")), dec("7.5"));
        assert_eq!(production_diff(dec("100"), dec("104")), dec("-4"));
    }
}
