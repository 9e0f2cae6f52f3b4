//! Inventory ledger tests
//!
//! Covers the core ledger invariants:
//! - on-hand is the signed sum of inbound minus outbound rows
//! - the sufficiency gate rejects outbound/transfer requests beyond on-hand
//! - transfers commit both legs or neither
//! - serialized check-then-act admits exactly one of two competing outbounds

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{signed_quantity, MovementType};

/// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// One recorded row: (type, product, warehouse, quantity, reference)
type Row = (MovementType, u32, u32, Decimal, Option<String>);

/// Outcome of a rejected gated request
#[derive(Debug, PartialEq)]
struct Insufficient {
    available: Decimal,
    requested: Decimal,
}

/// In-memory model of the ledger with the same gating rules as the service:
/// gated writes recompute on-hand and append atomically.
#[derive(Default)]
struct MemoryLedger {
    rows: Vec<Row>,
}

impl MemoryLedger {
    fn on_hand(&self, product: u32, warehouse: u32) -> Decimal {
        self.rows
            .iter()
            .filter(|(_, p, w, _, _)| *p == product && *w == warehouse)
            .fold(Decimal::ZERO, |acc, (ty, _, _, qty, _)| {
                acc + signed_quantity(*ty, *qty)
            })
    }

    fn record_inbound(&mut self, product: u32, warehouse: u32, quantity: Decimal) {
        self.rows
            .push((MovementType::Inbound, product, warehouse, quantity, None));
    }

    fn record_outbound(
        &mut self,
        product: u32,
        warehouse: u32,
        quantity: Decimal,
    ) -> Result<(), Insufficient> {
        let available = self.on_hand(product, warehouse);
        if available < quantity {
            return Err(Insufficient {
                available,
                requested: quantity,
            });
        }
        self.rows
            .push((MovementType::Outbound, product, warehouse, quantity, None));
        Ok(())
    }

    /// Both legs appended together, or neither. `fail_second_leg` simulates
    /// a destination-leg insert failure.
    fn record_transfer(
        &mut self,
        product: u32,
        from: u32,
        to: u32,
        quantity: Decimal,
        reference: &str,
        fail_second_leg: bool,
    ) -> Result<(), Insufficient> {
        let available = self.on_hand(product, from);
        if available < quantity {
            return Err(Insufficient {
                available,
                requested: quantity,
            });
        }
        let mut staged = vec![
            (
                MovementType::Outbound,
                product,
                from,
                quantity,
                Some(reference.to_string()),
            ),
            (
                MovementType::Inbound,
                product,
                to,
                quantity,
                Some(reference.to_string()),
            ),
        ];
        if fail_second_leg {
            // Nothing from the staged writes becomes visible
            staged.clear();
        }
        self.rows.extend(staged);
        Ok(())
    }

    /// Signed adjustment: positive becomes an inbound row, negative an
    /// outbound row gated like any other outbound.
    fn record_adjustment(
        &mut self,
        product: u32,
        warehouse: u32,
        signed: Decimal,
    ) -> Result<MovementType, Insufficient> {
        if signed > Decimal::ZERO {
            self.record_inbound(product, warehouse, signed);
            Ok(MovementType::Inbound)
        } else {
            self.record_outbound(product, warehouse, signed.abs())?;
            Ok(MovementType::Outbound)
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_inbound_fifty_yields_fifty() {
        let mut ledger = MemoryLedger::default();
        ledger.record_inbound(1, 1, dec("50"));
        assert_eq!(ledger.on_hand(1, 1), dec("50"));
    }

    #[test]
    fn test_inbound_then_outbound() {
        let mut ledger = MemoryLedger::default();
        ledger.record_inbound(1, 1, dec("50"));
        ledger.record_outbound(1, 1, dec("30")).unwrap();
        assert_eq!(ledger.on_hand(1, 1), dec("20"));
    }

    #[test]
    fn test_outbound_beyond_on_hand_is_rejected_with_amounts() {
        let mut ledger = MemoryLedger::default();
        ledger.record_inbound(1, 1, dec("50"));
        ledger.record_outbound(1, 1, dec("30")).unwrap();

        let err = ledger.record_outbound(1, 1, dec("30")).unwrap_err();
        assert_eq!(
            err,
            Insufficient {
                available: dec("20"),
                requested: dec("30"),
            }
        );
        // The rejected request appended nothing
        assert_eq!(ledger.on_hand(1, 1), dec("20"));
    }

    #[test]
    fn test_on_hand_is_scoped_per_warehouse() {
        let mut ledger = MemoryLedger::default();
        ledger.record_inbound(1, 1, dec("50"));
        ledger.record_inbound(1, 2, dec("10"));
        assert_eq!(ledger.on_hand(1, 1), dec("50"));
        assert_eq!(ledger.on_hand(1, 2), dec("10"));
        assert_eq!(ledger.on_hand(2, 1), Decimal::ZERO);
    }

    #[test]
    fn test_transfer_moves_stock_and_shares_reference() {
        let mut ledger = MemoryLedger::default();
        ledger.record_inbound(1, 1, dec("50"));
        ledger
            .record_transfer(1, 1, 2, dec("15"), "TR-001", false)
            .unwrap();

        assert_eq!(ledger.on_hand(1, 1), dec("35"));
        assert_eq!(ledger.on_hand(1, 2), dec("15"));

        let legs: Vec<_> = ledger
            .rows
            .iter()
            .filter(|(_, _, _, _, r)| r.as_deref() == Some("TR-001"))
            .collect();
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].0, MovementType::Outbound);
        assert_eq!(legs[1].0, MovementType::Inbound);
    }

    #[test]
    fn test_transfer_rollback_leaves_source_untouched() {
        let mut ledger = MemoryLedger::default();
        ledger.record_inbound(1, 1, dec("50"));
        ledger
            .record_transfer(1, 1, 2, dec("15"), "TR-002", true)
            .unwrap();

        // Failed destination leg: neither leg is visible
        assert_eq!(ledger.on_hand(1, 1), dec("50"));
        assert_eq!(ledger.on_hand(1, 2), Decimal::ZERO);
    }

    #[test]
    fn test_transfer_rejected_when_source_short() {
        let mut ledger = MemoryLedger::default();
        ledger.record_inbound(1, 1, dec("10"));
        let err = ledger
            .record_transfer(1, 1, 2, dec("15"), "TR-003", false)
            .unwrap_err();
        assert_eq!(err.available, dec("10"));
        assert_eq!(err.requested, dec("15"));
    }

    #[test]
    fn test_positive_adjustment_maps_to_inbound() {
        let mut ledger = MemoryLedger::default();
        let ty = ledger.record_adjustment(1, 1, dec("5")).unwrap();
        assert_eq!(ty, MovementType::Inbound);
        assert_eq!(ledger.on_hand(1, 1), dec("5"));
    }

    #[test]
    fn test_negative_adjustment_maps_to_outbound_magnitude() {
        let mut ledger = MemoryLedger::default();
        ledger.record_inbound(1, 1, dec("10"));
        let ty = ledger.record_adjustment(1, 1, dec("-4")).unwrap();
        assert_eq!(ty, MovementType::Outbound);
        assert_eq!(ledger.on_hand(1, 1), dec("6"));
    }

    #[test]
    fn test_negative_adjustment_is_gated() {
        let mut ledger = MemoryLedger::default();
        ledger.record_inbound(1, 1, dec("3"));
        let err = ledger.record_adjustment(1, 1, dec("-4")).unwrap_err();
        assert_eq!(err.available, dec("3"));
        assert_eq!(err.requested, dec("4"));
        assert_eq!(ledger.on_hand(1, 1), dec("3"));
    }

    #[test]
    fn test_adjustment_reference_format() {
        let reference = format!("ADJUSTMENT: {}", "damaged in storage");
        assert_eq!(reference, "ADJUSTMENT: damaged in storage");
    }

    #[test]
    fn test_audit_rows_carry_no_stock_effect() {
        // Directly recorded transfer/adjustment/stocktake rows do not enter
        // the on-hand fold; only their direction rows do.
        assert_eq!(
            signed_quantity(MovementType::Transfer, dec("7")),
            Decimal::ZERO
        );
        assert_eq!(
            signed_quantity(MovementType::Adjustment, dec("7")),
            Decimal::ZERO
        );
        assert_eq!(
            signed_quantity(MovementType::Stocktake, dec("7")),
            Decimal::ZERO
        );
    }
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[cfg(test)]
mod concurrency_tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Two concurrent outbounds of 30 against on-hand 40: the product row
    /// lock serializes the check-then-act pairs, so exactly one succeeds.
    #[test]
    fn test_competing_outbounds_admit_exactly_one() {
        let ledger = Arc::new(Mutex::new(MemoryLedger::default()));
        ledger.lock().unwrap().record_inbound(1, 1, dec("40"));

        let mut handles = Vec::new();
        for _ in 0..2 {
            let ledger = Arc::clone(&ledger);
            handles.push(std::thread::spawn(move || {
                // The lock models the serialized unit of work: the on-hand
                // read and the insert happen without interleaving.
                let mut guard = ledger.lock().unwrap();
                guard.record_outbound(1, 1, dec("30")).is_ok()
            }));
        }

        let outcomes: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = outcomes.iter().filter(|ok| **ok).count();

        assert_eq!(successes, 1);
        assert_eq!(ledger.lock().unwrap().on_hand(1, 1), dec("10"));
    }

    /// Many competing withdrawals never drive on-hand negative.
    #[test]
    fn test_many_competing_withdrawals_never_go_negative() {
        let ledger = Arc::new(Mutex::new(MemoryLedger::default()));
        ledger.lock().unwrap().record_inbound(1, 1, dec("100"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    let mut guard = ledger.lock().unwrap();
                    let _ = guard.record_outbound(1, 1, dec("30"));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let on_hand = ledger.lock().unwrap().on_hand(1, 1);
        assert!(on_hand >= Decimal::ZERO);
        // 3 withdrawals of 30 fit into 100, the rest must have been rejected
        assert_eq!(on_hand, dec("10"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1)) // 0.1 to 1000.0
    }

    fn signed_strategy() -> impl Strategy<Value = Decimal> {
        (-5000i64..=5000i64)
            .prop_filter("non-zero", |n| *n != 0)
            .prop_map(|n| Decimal::new(n, 1))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// On-hand equals the signed sum of the recorded rows and is never
        /// negative after any sequence of gated operations.
        #[test]
        fn prop_on_hand_matches_signed_sum(
            operations in prop::collection::vec((any::<bool>(), quantity_strategy()), 1..40)
        ) {
            let mut ledger = MemoryLedger::default();

            for (is_inbound, quantity) in &operations {
                if *is_inbound {
                    ledger.record_inbound(1, 1, *quantity);
                } else {
                    // Rejection is fine; success must keep the sum consistent
                    let _ = ledger.record_outbound(1, 1, *quantity);
                }
            }

            let expected: Decimal = ledger
                .rows
                .iter()
                .map(|(ty, _, _, qty, _)| signed_quantity(*ty, *qty))
                .sum();

            prop_assert_eq!(ledger.on_hand(1, 1), expected);
            prop_assert!(ledger.on_hand(1, 1) >= Decimal::ZERO);
        }

        /// A committed transfer conserves total stock across warehouses.
        #[test]
        fn prop_transfer_conserves_total_stock(
            initial in quantity_strategy(),
            transfer in quantity_strategy()
        ) {
            let mut ledger = MemoryLedger::default();
            ledger.record_inbound(1, 1, initial);
            let before = ledger.on_hand(1, 1) + ledger.on_hand(1, 2);

            let _ = ledger.record_transfer(1, 1, 2, transfer, "TR-P", false);

            let after = ledger.on_hand(1, 1) + ledger.on_hand(1, 2);
            prop_assert_eq!(before, after);
            prop_assert!(ledger.on_hand(1, 1) >= Decimal::ZERO);
            prop_assert!(ledger.on_hand(1, 2) >= Decimal::ZERO);
        }

        /// Adjustments fold into the same signed sum as plain movements.
        #[test]
        fn prop_adjustments_fold_into_sum(
            seed in quantity_strategy(),
            adjustments in prop::collection::vec(signed_strategy(), 1..20)
        ) {
            let mut ledger = MemoryLedger::default();
            ledger.record_inbound(1, 1, seed);

            let mut expected = seed;
            for signed in &adjustments {
                if ledger.record_adjustment(1, 1, *signed).is_ok() {
                    expected += *signed;
                }
            }

            prop_assert_eq!(ledger.on_hand(1, 1), expected);
            prop_assert!(ledger.on_hand(1, 1) >= Decimal::ZERO);
        }

        /// The gate rejects exactly the requests exceeding on-hand, and a
        /// rejection reports the pre-request on-hand value.
        #[test]
        fn prop_gate_reports_available_and_requested(
            available in quantity_strategy(),
            requested in quantity_strategy()
        ) {
            let mut ledger = MemoryLedger::default();
            ledger.record_inbound(1, 1, available);

            match ledger.record_outbound(1, 1, requested) {
                Ok(()) => {
                    prop_assert!(requested <= available);
                    prop_assert_eq!(ledger.on_hand(1, 1), available - requested);
                }
                Err(err) => {
                    prop_assert!(requested > available);
                    prop_assert_eq!(err.available, available);
                    prop_assert_eq!(err.requested, requested);
                }
            }
        }
    }
}

// ============================================================================
// Integration Test Helpers (for use with actual database)
// ============================================================================

#[cfg(test)]
mod integration_helpers {
    use super::*;

    /// Simulate one gated step against a known balance
    pub fn simulate_gated_outbound(
        current_balance: Decimal,
        quantity: Decimal,
    ) -> Result<Decimal, &'static str> {
        if quantity <= Decimal::ZERO {
            return Err("Quantity must be positive");
        }
        if current_balance < quantity {
            return Err("Insufficient stock");
        }
        Ok(current_balance - quantity)
    }

    #[test]
    fn test_simulate_gated_outbound() {
        assert_eq!(
            simulate_gated_outbound(dec("100"), dec("30")).unwrap(),
            dec("70")
        );
        assert!(simulate_gated_outbound(dec("20"), dec("30")).is_err());
        assert!(simulate_gated_outbound(dec("100"), dec("-1")).is_err());
    }
}
