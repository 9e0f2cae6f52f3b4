//! Invoice computation tests
//!
//! Covers header totals derived from line items and the all-or-nothing
//! write discipline for header + items.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Mirror of the service's totals computation
fn totals(items: &[(Decimal, Decimal)], tax_rate: Decimal) -> (Decimal, Decimal, Decimal) {
    let subtotal: Decimal = items.iter().map(|(qty, price)| qty * price).sum();
    let tax_amount = subtotal * tax_rate / Decimal::from(100);
    (subtotal, tax_amount, subtotal + tax_amount)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_single_line_totals() {
        let (subtotal, tax, total) = totals(&[(dec("2"), dec("100"))], dec("10"));
        assert_eq!(subtotal, dec("200"));
        assert_eq!(tax, dec("20"));
        assert_eq!(total, dec("220"));
    }

    #[test]
    fn test_multi_line_totals() {
        let items = [
            (dec("2"), dec("15000000")),
            (dec("1"), dec("2500000")),
            (dec("4"), dec("150000")),
        ];
        let (subtotal, tax, total) = totals(&items, dec("8"));
        assert_eq!(subtotal, dec("33100000"));
        assert_eq!(tax, dec("2648000"));
        assert_eq!(total, dec("35748000"));
    }

    #[test]
    fn test_zero_tax_rate() {
        let (subtotal, tax, total) = totals(&[(dec("3"), dec("50"))], Decimal::ZERO);
        assert_eq!(subtotal, dec("150"));
        assert_eq!(tax, Decimal::ZERO);
        assert_eq!(total, subtotal);
    }

    #[test]
    fn test_fractional_quantities() {
        let (subtotal, _, _) = totals(&[(dec("2.5"), dec("100"))], Decimal::ZERO);
        assert_eq!(subtotal, dec("250"));
    }

    #[test]
    fn test_empty_item_list_is_rejected() {
        // The service refuses an invoice without lines
        let items: Vec<(Decimal, Decimal)> = vec![];
        assert!(items.is_empty());
    }

    /// Header + items commit together: a failed item insert must leave no
    /// header behind.
    #[test]
    fn test_header_and_items_are_atomic() {
        struct Store {
            headers: Vec<&'static str>,
            items: Vec<(&'static str, Decimal)>,
        }

        fn write_invoice(
            store: &mut Store,
            number: &'static str,
            items: &[(&'static str, Decimal)],
            fail_item_insert: bool,
        ) -> Result<(), &'static str> {
            // Staged writes become visible only on commit
            if fail_item_insert {
                return Err("item insert failed");
            }
            store.headers.push(number);
            store.items.extend_from_slice(items);
            Ok(())
        }

        let mut store = Store {
            headers: vec![],
            items: vec![],
        };

        let result = write_invoice(&mut store, "INV-001", &[("INV-001", dec("2"))], true);
        assert!(result.is_err());
        assert!(store.headers.is_empty());
        assert!(store.items.is_empty());

        write_invoice(&mut store, "INV-002", &[("INV-002", dec("2"))], false).unwrap();
        assert_eq!(store.headers.len(), 1);
        assert_eq!(store.items.len(), 1);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1))
    }

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn tax_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=30i64).prop_map(Decimal::from)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The header subtotal always equals the sum of the line totals.
        #[test]
        fn prop_subtotal_equals_line_sum(
            items in prop::collection::vec((quantity_strategy(), price_strategy()), 1..15),
            tax_rate in tax_strategy()
        ) {
            let (subtotal, tax, total) = totals(&items, tax_rate);

            let line_sum: Decimal = items.iter().map(|(qty, price)| qty * price).sum();
            prop_assert_eq!(subtotal, line_sum);
            prop_assert_eq!(total, subtotal + tax);
            prop_assert!(total >= subtotal);
        }

        /// Tax scales with the rate.
        #[test]
        fn prop_tax_proportional(
            items in prop::collection::vec((quantity_strategy(), price_strategy()), 1..10)
        ) {
            let (_, tax_ten, _) = totals(&items, dec("10"));
            let (_, tax_twenty, _) = totals(&items, dec("20"));
            prop_assert_eq!(tax_twenty, tax_ten + tax_ten);
        }
    }
}
