//! Stock adjustment calculator tests
//!
//! Tests for the adjustment projection including:
//! - Property 1: Remove is the only decrementing type
//! - Property 2: New level equals current plus signed delta
//! - Property 3: No clamping at zero

use proptest::prelude::*;
use shared::{compute_adjustment, AdjustmentType};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Adding 25 to 100 on hand projects 125
    #[test]
    fn test_add_projects_positive_delta() {
        let outcome = compute_adjustment(100, AdjustmentType::Add, 25);
        assert_eq!(outcome.signed_delta, 25);
        assert_eq!(outcome.new_level, 125);
    }

    /// Removing 30 from 100 on hand projects 70
    #[test]
    fn test_remove_projects_negative_delta() {
        let outcome = compute_adjustment(100, AdjustmentType::Remove, 30);
        assert_eq!(outcome.signed_delta, -30);
        assert_eq!(outcome.new_level, 70);
    }

    /// A transfer of 10 against 50 on hand projects +10
    #[test]
    fn test_transfer_projects_positive_delta() {
        let outcome = compute_adjustment(50, AdjustmentType::Transfer, 10);
        assert_eq!(outcome.signed_delta, 10);
        assert_eq!(outcome.new_level, 60);
    }

    /// Removing more than on hand goes negative rather than clamping
    #[test]
    fn test_remove_does_not_clamp_at_zero() {
        let outcome = compute_adjustment(10, AdjustmentType::Remove, 25);
        assert_eq!(outcome.signed_delta, -25);
        assert_eq!(outcome.new_level, -15);
    }

    /// Every non-remove type projects the entered quantity unchanged
    #[test]
    fn test_all_non_remove_types_increment() {
        for t in AdjustmentType::ALL {
            if t == AdjustmentType::Remove {
                continue;
            }
            let outcome = compute_adjustment(0, t, 7);
            assert_eq!(outcome.signed_delta, 7, "type {}", t);
            assert_eq!(outcome.new_level, 7, "type {}", t);
        }
    }

    /// Type codes are stable snake_case strings
    #[test]
    fn test_adjustment_type_codes() {
        assert_eq!(AdjustmentType::Add.as_str(), "add");
        assert_eq!(AdjustmentType::Remove.as_str(), "remove");
        assert_eq!(
            AdjustmentType::ReleaseReservation.as_str(),
            "release_reservation"
        );
        assert_eq!(AdjustmentType::MarkNonSaleable.as_str(), "mark_non_saleable");

        for t in AdjustmentType::ALL {
            assert!(t
                .as_str()
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }

    /// Codes parse back to the same type; unknown codes are rejected
    #[test]
    fn test_adjustment_type_parsing() {
        for t in AdjustmentType::ALL {
            let parsed: AdjustmentType = t.as_str().parse().unwrap();
            assert_eq!(parsed, t);
        }
        assert!("restock".parse::<AdjustmentType>().is_err());
        assert!("ADD".parse::<AdjustmentType>().is_err());
    }

    /// Display names exist for the pick list
    #[test]
    fn test_display_names_nonempty() {
        for t in AdjustmentType::ALL {
            assert!(!t.display_name().is_empty());
        }
    }

    /// serde uses the same snake_case codes as as_str
    #[test]
    fn test_serde_codes_match_as_str() {
        for t in AdjustmentType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            let back: AdjustmentType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, t);
        }
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// new_level always equals current plus the signed delta
    #[test]
    fn prop_new_level_is_current_plus_delta(
        current in -1_000_000i64..1_000_000,
        quantity in 0i64..1_000_000,
        type_idx in 0usize..9,
    ) {
        let t = AdjustmentType::ALL[type_idx];
        let outcome = compute_adjustment(current, t, quantity);
        prop_assert_eq!(outcome.new_level, current + outcome.signed_delta);
    }

    /// The delta magnitude is always the entered quantity
    #[test]
    fn prop_delta_magnitude_is_entered_quantity(
        current in -1_000_000i64..1_000_000,
        quantity in 0i64..1_000_000,
        type_idx in 0usize..9,
    ) {
        let t = AdjustmentType::ALL[type_idx];
        let outcome = compute_adjustment(current, t, quantity);
        prop_assert_eq!(outcome.signed_delta.abs(), quantity);
    }

    /// Only removals produce a negative delta
    #[test]
    fn prop_only_remove_decrements(
        current in -1_000_000i64..1_000_000,
        quantity in 1i64..1_000_000,
        type_idx in 0usize..9,
    ) {
        let t = AdjustmentType::ALL[type_idx];
        let outcome = compute_adjustment(current, t, quantity);
        if t == AdjustmentType::Remove {
            prop_assert!(outcome.signed_delta < 0);
        } else {
            prop_assert!(outcome.signed_delta > 0);
        }
    }

    /// An add followed by an equal remove restores the starting level
    #[test]
    fn prop_add_remove_round_trip(
        current in -1_000_000i64..1_000_000,
        quantity in 0i64..1_000_000,
    ) {
        let added = compute_adjustment(current, AdjustmentType::Add, quantity);
        let removed = compute_adjustment(added.new_level, AdjustmentType::Remove, quantity);
        prop_assert_eq!(removed.new_level, current);
    }
}
