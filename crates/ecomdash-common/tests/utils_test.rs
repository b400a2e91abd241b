//! Tests for ecomdash-common formatting utilities.

use ecomdash_common::utils::*;
use proptest::prelude::*;

#[test]
fn test_currency_rounds_to_cents() {
    assert_eq!(format_currency_brl(0.004), "R$ 0,00");
    assert_eq!(format_currency_brl(0.006), "R$ 0,01");
    assert_eq!(format_currency_brl(999.999), "R$ 1.000,00");
}

#[test]
fn test_negative_zero_has_no_sign() {
    assert_eq!(format_currency_brl(-0.001), "R$ 0,00");
}

#[test]
fn test_month_abbreviations_cover_the_year() {
    let names: Vec<_> = (1..=12).filter_map(month_abbr).collect();
    assert_eq!(names, MONTH_ABBREVIATIONS.to_vec());
}

proptest! {
    #[test]
    fn prop_currency_keeps_two_decimals(amount in 0.0f64..1e9) {
        let formatted = format_currency_brl(amount);
        prop_assert!(formatted.starts_with("R$ "));
        let (_, cents) = formatted.rsplit_once(',').unwrap();
        prop_assert_eq!(cents.len(), 2);
    }

    #[test]
    fn prop_truncate_never_exceeds_limit(input in ".{0,64}", max in 3usize..40) {
        prop_assert!(truncate_string(&input, max).chars().count() <= max);
    }
}
