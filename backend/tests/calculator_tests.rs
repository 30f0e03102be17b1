//! Tests for the derived-field calculators
//!
//! Totals, sample averages, and production differences are derived on
//! the server; these tests pin down the rounding and the degenerate
//! inputs.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::calc::{line_total, production_diff, sample_mean};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn line_total_rounds_half_away_from_zero() {
    // 3 × 1.675 = 5.025, rounds up to 5.03 rather than banker's 5.02
    assert_eq!(line_total(dec("1.675"), Some(dec("3"))), dec("5.03"));
    assert_eq!(line_total(dec("12.50"), Some(dec("4"))), dec("50.00"));
}

#[test]
fn line_total_without_quantity_is_zero() {
    assert_eq!(line_total(dec("99.99"), None), Decimal::ZERO);
    assert_eq!(line_total(dec("99.99"), Some(Decimal::ZERO)), Decimal::ZERO);
}

#[test]
fn sample_mean_of_lab_measurements() {
    // The classic three-sample case: mean of 64.1, 64.4, 64.9 is 64.466...
    let samples = [dec("64.1"), dec("64.4"), dec("64.9")];
    assert_eq!(sample_mean(&samples), dec("64.47"));
}

#[test]
fn sample_mean_of_nothing_is_zero() {
    assert_eq!(sample_mean(&[]), Decimal::ZERO);
}

#[test]
fn sample_mean_of_one_is_itself() {
    assert_eq!(sample_mean(&[dec("97.25")]), dec("97.25"));
}

#[test]
fn production_diff_is_signed() {
    assert_eq!(production_diff(dec("100"), dec("92.5")), dec("7.5"));
    assert_eq!(production_diff(dec("100"), dec("104")), dec("-4"));
    assert_eq!(production_diff(dec("80"), dec("80")), Decimal::ZERO);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A line total never has more than two decimal places.
    #[test]
    fn line_total_precision_bounded(
        price_cents in 1u64..10_000_000,
        quantity_milli in 1u64..1_000_000,
    ) {
        let price = Decimal::new(price_cents as i64, 2);
        let quantity = Decimal::new(quantity_milli as i64, 3);

        let total = line_total(price, Some(quantity));
        prop_assert!(total.scale() <= 2, "total {total} has scale {}", total.scale());
        prop_assert!(total >= Decimal::ZERO);
    }

    /// The rounded total stays within half a cent of the exact product.
    #[test]
    fn line_total_close_to_exact_product(
        price_cents in 1u64..10_000_000,
        quantity_milli in 1u64..1_000_000,
    ) {
        let price = Decimal::new(price_cents as i64, 2);
        let quantity = Decimal::new(quantity_milli as i64, 3);

        let exact = price * quantity;
        let total = line_total(price, Some(quantity));
        let diff = (total - exact).abs();
        prop_assert!(diff <= dec("0.005"), "total {total} vs exact {exact}");
    }

    /// The mean of equal samples is that sample.
    #[test]
    fn mean_of_constant_samples(
        value_cents in 0u64..1_000_000,
        count in 1usize..20,
    ) {
        let value = Decimal::new(value_cents as i64, 2);
        let samples = vec![value; count];
        prop_assert_eq!(sample_mean(&samples), value);
    }

    /// The mean lies between the smallest and largest sample, give or
    /// take the final rounding step.
    #[test]
    fn mean_within_sample_range(
        raw in proptest::collection::vec(0u64..1_000_000, 1..20),
    ) {
        let samples: Vec<Decimal> =
            raw.iter().map(|v| Decimal::new(*v as i64, 2)).collect();
        let mean = sample_mean(&samples);

        let min = samples.iter().min().copied().unwrap();
        let max = samples.iter().max().copied().unwrap();
        let slack = dec("0.005");
        prop_assert!(mean >= min - slack, "mean {mean} below min {min}");
        prop_assert!(mean <= max + slack, "mean {mean} above max {max}");
    }

    /// planned = produced + diff always holds.
    #[test]
    fn diff_reconstructs_planned(
        planned_cents in 0i64..100_000_000,
        produced_cents in 0i64..100_000_000,
    ) {
        let planned = Decimal::new(planned_cents, 2);
        let produced = Decimal::new(produced_cents, 2);
        prop_assert_eq!(produced + production_diff(planned, produced), planned);
    }
}
