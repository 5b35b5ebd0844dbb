//! Stock counter application tests
//!
//! Tests for the persistence-side counter rules including:
//! - Property 4: Counters never go negative
//! - Property 5: Moves conserve total quantity
//! - Property 6: Failed applications leave counters untouched

use proptest::prelude::*;
use shared::{AdjustmentError, AdjustmentType, StockCounters};

fn counters(on_hand: i64) -> StockCounters {
    StockCounters {
        on_hand,
        ..Default::default()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Additions raise on_hand and report the new level
    #[test]
    fn test_add_increments_on_hand() {
        let mut c = counters(100);
        let applied = c.apply(AdjustmentType::Add, 25).unwrap();
        assert_eq!(c.on_hand, 125);
        assert_eq!(applied.quantity_change, 25);
        assert_eq!(applied.new_on_hand, 125);
    }

    /// Removals lower on_hand and report a negative change
    #[test]
    fn test_remove_decrements_on_hand() {
        let mut c = counters(100);
        let applied = c.apply(AdjustmentType::Remove, 30).unwrap();
        assert_eq!(c.on_hand, 70);
        assert_eq!(applied.quantity_change, -30);
    }

    /// Removing more than on hand is rejected, not clamped
    #[test]
    fn test_remove_insufficient_stock() {
        let mut c = counters(10);
        let err = c.apply(AdjustmentType::Remove, 25).unwrap_err();
        assert!(matches!(
            err,
            AdjustmentError::InsufficientStock {
                requested: 25,
                available: 10,
                ..
            }
        ));
        assert_eq!(c.on_hand, 10);
    }

    /// Zero and negative quantities are validation errors
    #[test]
    fn test_non_positive_quantity_rejected() {
        let mut c = counters(100);
        assert_eq!(
            c.apply(AdjustmentType::Add, 0),
            Err(AdjustmentError::NonPositiveQuantity)
        );
        assert_eq!(
            c.apply(AdjustmentType::Remove, -5),
            Err(AdjustmentError::NonPositiveQuantity)
        );
    }

    /// Reservations are limited by unreserved on-hand stock
    #[test]
    fn test_reserve_limited_by_available() {
        let mut c = StockCounters {
            on_hand: 100,
            reserved: 90,
            ..Default::default()
        };
        assert!(c.apply(AdjustmentType::Reserve, 11).is_err());
        assert!(c.apply(AdjustmentType::Reserve, 10).is_ok());
        assert_eq!(c.reserved, 100);
        assert_eq!(c.available_to_promise(), 0);
    }

    /// Releasing a reservation cannot exceed the reserved quantity
    #[test]
    fn test_release_reservation_limited() {
        let mut c = StockCounters {
            on_hand: 100,
            reserved: 5,
            ..Default::default()
        };
        assert!(c.apply(AdjustmentType::ReleaseReservation, 6).is_err());
        assert!(c.apply(AdjustmentType::ReleaseReservation, 5).is_ok());
        assert_eq!(c.reserved, 0);
    }

    /// Marking non-saleable moves quantity off on_hand
    #[test]
    fn test_mark_non_saleable_moves_quantity() {
        let mut c = counters(40);
        c.apply(AdjustmentType::MarkNonSaleable, 15).unwrap();
        assert_eq!(c.on_hand, 25);
        assert_eq!(c.non_saleable, 15);
    }

    /// Hold and release-hold round trip restores the counters
    #[test]
    fn test_hold_release_round_trip() {
        let original = StockCounters {
            on_hand: 80,
            on_hold: 5,
            ..Default::default()
        };
        let mut c = original;
        c.apply(AdjustmentType::Hold, 30).unwrap();
        assert_eq!(c.on_hand, 50);
        assert_eq!(c.on_hold, 35);
        c.apply(AdjustmentType::ReleaseHold, 30).unwrap();
        assert_eq!(c, original);
    }

    /// Transfers and counts are audit-only
    #[test]
    fn test_transfer_and_count_move_nothing() {
        let original = counters(40);
        let mut c = original;
        let applied = c.apply(AdjustmentType::Transfer, 10).unwrap();
        assert_eq!(c, original);
        assert_eq!(applied.quantity_change, 10);

        let applied = c.apply(AdjustmentType::Count, 40).unwrap();
        assert_eq!(c, original);
        assert_eq!(applied.quantity_change, 40);
    }

    /// Available to promise is on_hand minus reserved, floored at zero
    #[test]
    fn test_available_to_promise() {
        let c = StockCounters {
            on_hand: 100,
            reserved: 30,
            ..Default::default()
        };
        assert_eq!(c.available_to_promise(), 70);

        let oversold = StockCounters {
            on_hand: 10,
            reserved: 25,
            ..Default::default()
        };
        assert_eq!(oversold.available_to_promise(), 0);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// No successful application drives any counter negative
    #[test]
    fn prop_counters_stay_non_negative(
        on_hand in 0i64..10_000,
        reserved in 0i64..10_000,
        on_hold in 0i64..10_000,
        quantity in 1i64..10_000,
        type_idx in 0usize..9,
    ) {
        let reserved = reserved.min(on_hand);
        let mut c = StockCounters {
            on_hand,
            reserved,
            on_hold,
            ..Default::default()
        };
        let t = AdjustmentType::ALL[type_idx];
        if c.apply(t, quantity).is_ok() {
            prop_assert!(c.on_hand >= 0);
            prop_assert!(c.reserved >= 0);
            prop_assert!(c.non_saleable >= 0);
            prop_assert!(c.on_hold >= 0);
        }
    }

    /// Hold and non-saleable moves conserve on_hand + moved counter
    #[test]
    fn prop_moves_conserve_total(
        on_hand in 0i64..10_000,
        on_hold in 0i64..10_000,
        non_saleable in 0i64..10_000,
        quantity in 1i64..10_000,
    ) {
        let mut c = StockCounters {
            on_hand,
            on_hold,
            non_saleable,
            ..Default::default()
        };
        let hold_total = c.on_hand + c.on_hold;
        if c.apply(AdjustmentType::Hold, quantity).is_ok() {
            prop_assert_eq!(c.on_hand + c.on_hold, hold_total);
        }

        let ns_total = c.on_hand + c.non_saleable;
        if c.apply(AdjustmentType::MarkNonSaleable, quantity).is_ok() {
            prop_assert_eq!(c.on_hand + c.non_saleable, ns_total);
        }
    }

    /// A failed application leaves every counter untouched
    #[test]
    fn prop_failure_leaves_counters_unchanged(
        on_hand in 0i64..100,
        reserved in 0i64..100,
        on_hold in 0i64..100,
        quantity in 1i64..10_000,
        type_idx in 0usize..9,
    ) {
        let original = StockCounters {
            on_hand,
            reserved: reserved.min(on_hand),
            on_hold,
            ..Default::default()
        };
        let mut c = original;
        let t = AdjustmentType::ALL[type_idx];
        if c.apply(t, quantity).is_err() {
            prop_assert_eq!(c, original);
        }
    }

    /// quantity_change matches the display projection's signed delta
    #[test]
    fn prop_applied_change_matches_projection(
        on_hand in 0i64..10_000,
        quantity in 1i64..10_000,
        type_idx in 0usize..9,
    ) {
        let mut c = StockCounters {
            on_hand,
            ..Default::default()
        };
        let t = AdjustmentType::ALL[type_idx];
        if let Ok(applied) = c.apply(t, quantity) {
            let projected = shared::compute_adjustment(on_hand, t, quantity);
            prop_assert_eq!(applied.quantity_change, projected.signed_delta);
        }
    }
}
