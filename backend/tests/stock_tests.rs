//! Stock query engine tests
//!
//! Covers stock status classification (including the low/high tie-break),
//! low-stock alert levels, and valuation at the current unit price.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{alert_level, stock_status, AlertLevel, StockStatus};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_status_low_at_min_stock() {
        assert_eq!(stock_status(dec("10"), dec("10"), dec("100")), StockStatus::Low);
        assert_eq!(stock_status(dec("9"), dec("10"), dec("100")), StockStatus::Low);
    }

    #[test]
    fn test_status_high_at_max_stock() {
        assert_eq!(
            stock_status(dec("100"), dec("10"), dec("100")),
            StockStatus::High
        );
        assert_eq!(
            stock_status(dec("150"), dec("10"), dec("100")),
            StockStatus::High
        );
    }

    #[test]
    fn test_status_normal_between_thresholds() {
        assert_eq!(
            stock_status(dec("50"), dec("10"), dec("100")),
            StockStatus::Normal
        );
    }

    #[test]
    fn test_status_tie_break_resolves_low() {
        // min == max == on-hand: the low test runs first
        assert_eq!(stock_status(dec("20"), dec("20"), dec("20")), StockStatus::Low);
    }

    #[test]
    fn test_alert_critical_at_or_below_min() {
        assert_eq!(alert_level(dec("10"), dec("10")), Some(AlertLevel::Critical));
        assert_eq!(alert_level(dec("0"), dec("10")), Some(AlertLevel::Critical));
    }

    #[test]
    fn test_alert_warning_up_to_threshold() {
        assert_eq!(alert_level(dec("11"), dec("10")), Some(AlertLevel::Warning));
        assert_eq!(alert_level(dec("15"), dec("10")), Some(AlertLevel::Warning));
    }

    #[test]
    fn test_no_alert_above_threshold() {
        assert_eq!(alert_level(dec("15.1"), dec("10")), None);
        assert_eq!(alert_level(dec("100"), dec("10")), None);
    }

    #[test]
    fn test_valuation_uses_current_price() {
        // Valuation is on-hand times the product's current unit price, not a
        // cost-basis average over historical movement prices.
        let on_hand = dec("20");
        let current_price = dec("150000");
        assert_eq!(on_hand * current_price, dec("3000000"));
    }

    #[test]
    fn test_valuation_of_empty_stock_is_zero() {
        assert_eq!(Decimal::ZERO * dec("150000"), Decimal::ZERO);
    }

    #[test]
    fn test_shortage_calculation() {
        let min_stock = dec("10");
        let on_hand = dec("4");
        let unit_price = dec("250");
        let shortage = min_stock - on_hand;
        assert_eq!(shortage, dec("6"));
        assert_eq!(shortage * unit_price, dec("1500"));
    }

    #[test]
    fn test_alert_ordering_most_depleted_first() {
        let mut alerts = vec![dec("8"), dec("2"), dec("5")];
        alerts.sort();
        assert_eq!(alerts, vec![dec("2"), dec("5"), dec("8")]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=100000i64).prop_map(|n| Decimal::new(n, 1))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Exactly one status holds, and the tie-break always prefers low.
        #[test]
        fn prop_status_is_total_and_low_wins(
            on_hand in quantity_strategy(),
            min_stock in quantity_strategy(),
            spread in quantity_strategy()
        ) {
            let max_stock = min_stock + spread;
            let status = stock_status(on_hand, min_stock, max_stock);

            if on_hand <= min_stock {
                prop_assert_eq!(status, StockStatus::Low);
            } else if on_hand >= max_stock {
                prop_assert_eq!(status, StockStatus::High);
            } else {
                prop_assert_eq!(status, StockStatus::Normal);
            }
        }

        /// Critical implies warning range; no alert above 1.5x min stock.
        #[test]
        fn prop_alert_levels_partition(
            on_hand in quantity_strategy(),
            min_stock in quantity_strategy()
        ) {
            let warning_ceiling = min_stock * Decimal::new(15, 1);
            match alert_level(on_hand, min_stock) {
                Some(AlertLevel::Critical) => prop_assert!(on_hand <= min_stock),
                Some(AlertLevel::Warning) => {
                    prop_assert!(on_hand > min_stock && on_hand <= warning_ceiling)
                }
                None => prop_assert!(on_hand > warning_ceiling),
            }
        }

        /// Valuation scales linearly with on-hand quantity.
        #[test]
        fn prop_valuation_linear(
            on_hand in quantity_strategy(),
            unit_price in quantity_strategy()
        ) {
            let value = on_hand * unit_price;
            let doubled = (on_hand + on_hand) * unit_price;
            prop_assert_eq!(doubled, value + value);
        }
    }
}
