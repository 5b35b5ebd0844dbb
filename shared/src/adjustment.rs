//! Stock-adjustment arithmetic and counter application rules
//!
//! Two layers live here. `compute_adjustment` is the display-side projection:
//! given the current on-hand quantity and an entered quantity it derives the
//! signed delta and the resulting level, with no clamping and no validation.
//! `StockCounters::apply` is the persistence-side rule set: it moves quantity
//! between the named counters, refusing any movement that would drive a
//! counter negative.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Classification of why a stock quantity changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    Add,
    Remove,
    Transfer,
    Count,
    Reserve,
    ReleaseReservation,
    MarkNonSaleable,
    Hold,
    ReleaseHold,
}

impl AdjustmentType {
    /// All adjustment types, in presentation order
    pub const ALL: [AdjustmentType; 9] = [
        AdjustmentType::Add,
        AdjustmentType::Remove,
        AdjustmentType::Transfer,
        AdjustmentType::Count,
        AdjustmentType::Reserve,
        AdjustmentType::ReleaseReservation,
        AdjustmentType::MarkNonSaleable,
        AdjustmentType::Hold,
        AdjustmentType::ReleaseHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::Add => "add",
            AdjustmentType::Remove => "remove",
            AdjustmentType::Transfer => "transfer",
            AdjustmentType::Count => "count",
            AdjustmentType::Reserve => "reserve",
            AdjustmentType::ReleaseReservation => "release_reservation",
            AdjustmentType::MarkNonSaleable => "mark_non_saleable",
            AdjustmentType::Hold => "hold",
            AdjustmentType::ReleaseHold => "release_hold",
        }
    }

    /// Human-readable name for pick lists
    pub fn display_name(&self) -> &'static str {
        match self {
            AdjustmentType::Add => "Addition",
            AdjustmentType::Remove => "Removal",
            AdjustmentType::Transfer => "Transfer",
            AdjustmentType::Count => "Cycle Count",
            AdjustmentType::Reserve => "Reservation",
            AdjustmentType::ReleaseReservation => "Release Reservation",
            AdjustmentType::MarkNonSaleable => "Mark Non-Saleable",
            AdjustmentType::Hold => "Place on Hold",
            AdjustmentType::ReleaseHold => "Release from Hold",
        }
    }
}

impl fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustmentType {
    type Err = UnknownAdjustmentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdjustmentType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownAdjustmentType(s.to_string()))
    }
}

/// Error for unrecognized adjustment type codes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown adjustment type: {0}")]
pub struct UnknownAdjustmentType(pub String);

/// Result of projecting an adjustment against an on-hand quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentOutcome {
    pub signed_delta: i64,
    pub new_level: i64,
}

/// Project the stock level that would result from an adjustment.
///
/// `remove` is the only type that decrements; every other type projects a
/// positive delta. The result is not clamped: a removal larger than the
/// current level projects a negative `new_level`.
pub fn compute_adjustment(
    current_on_hand: i64,
    adjustment_type: AdjustmentType,
    entered_quantity: i64,
) -> AdjustmentOutcome {
    let signed_delta = match adjustment_type {
        AdjustmentType::Remove => -entered_quantity,
        _ => entered_quantity,
    };
    AdjustmentOutcome {
        signed_delta,
        new_level: current_on_hand + signed_delta,
    }
}

/// Errors raised when an adjustment cannot be applied to the counters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdjustmentError {
    #[error("Quantity must be positive")]
    NonPositiveQuantity,

    #[error("Insufficient {counter}: requested {requested}, available {available}")]
    InsufficientStock {
        counter: &'static str,
        requested: i64,
        available: i64,
    },
}

/// Named stock counters for a product at a location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCounters {
    pub on_hand: i64,
    pub reserved: i64,
    pub non_saleable: i64,
    pub on_order: i64,
    pub in_transit: i64,
    pub returned: i64,
    pub on_hold: i64,
    pub backorder: i64,
}

/// Record of a successfully applied adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedAdjustment {
    /// Signed delta for the audit trail (negative only for removals)
    pub quantity_change: i64,
    /// On-hand quantity after the adjustment
    pub new_on_hand: i64,
}

impl StockCounters {
    /// Quantity that can still be promised to new orders
    pub fn available_to_promise(&self) -> i64 {
        (self.on_hand - self.reserved).max(0)
    }

    /// Apply an adjustment, moving quantity between counters.
    ///
    /// Movements that would drive a counter negative are rejected instead of
    /// clamped. `transfer` and `count` are recorded to the audit trail but
    /// move no counter.
    pub fn apply(
        &mut self,
        adjustment_type: AdjustmentType,
        quantity: i64,
    ) -> Result<AppliedAdjustment, AdjustmentError> {
        if quantity <= 0 {
            return Err(AdjustmentError::NonPositiveQuantity);
        }

        match adjustment_type {
            AdjustmentType::Add => {
                self.on_hand += quantity;
            }
            AdjustmentType::Remove => {
                Self::require(quantity, self.on_hand, "on-hand stock")?;
                self.on_hand -= quantity;
            }
            AdjustmentType::Reserve => {
                Self::require(quantity, self.on_hand - self.reserved, "available stock")?;
                self.reserved += quantity;
            }
            AdjustmentType::ReleaseReservation => {
                Self::require(quantity, self.reserved, "reserved quantity")?;
                self.reserved -= quantity;
            }
            AdjustmentType::MarkNonSaleable => {
                Self::require(quantity, self.on_hand, "on-hand stock")?;
                self.on_hand -= quantity;
                self.non_saleable += quantity;
            }
            AdjustmentType::Hold => {
                Self::require(quantity, self.on_hand, "on-hand stock")?;
                self.on_hand -= quantity;
                self.on_hold += quantity;
            }
            AdjustmentType::ReleaseHold => {
                Self::require(quantity, self.on_hold, "held quantity")?;
                self.on_hold -= quantity;
                self.on_hand += quantity;
            }
            // Recorded for the audit trail only; no counter movement.
            AdjustmentType::Transfer | AdjustmentType::Count => {}
        }

        let quantity_change = match adjustment_type {
            AdjustmentType::Remove => -quantity,
            _ => quantity,
        };

        Ok(AppliedAdjustment {
            quantity_change,
            new_on_hand: self.on_hand,
        })
    }

    fn require(
        requested: i64,
        available: i64,
        counter: &'static str,
    ) -> Result<(), AdjustmentError> {
        if requested > available {
            Err(AdjustmentError::InsufficientStock {
                counter,
                requested,
                available,
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_add() {
        let outcome = compute_adjustment(100, AdjustmentType::Add, 25);
        assert_eq!(outcome.signed_delta, 25);
        assert_eq!(outcome.new_level, 125);
    }

    #[test]
    fn compute_remove() {
        let outcome = compute_adjustment(100, AdjustmentType::Remove, 30);
        assert_eq!(outcome.signed_delta, -30);
        assert_eq!(outcome.new_level, 70);
    }

    #[test]
    fn compute_transfer_projects_positive_delta() {
        let outcome = compute_adjustment(50, AdjustmentType::Transfer, 10);
        assert_eq!(outcome.signed_delta, 10);
        assert_eq!(outcome.new_level, 60);
    }

    #[test]
    fn compute_remove_does_not_clamp() {
        let outcome = compute_adjustment(10, AdjustmentType::Remove, 25);
        assert_eq!(outcome.new_level, -15);
    }

    #[test]
    fn apply_add_increments_on_hand() {
        let mut counters = StockCounters {
            on_hand: 100,
            ..Default::default()
        };
        let applied = counters.apply(AdjustmentType::Add, 25).unwrap();
        assert_eq!(applied.quantity_change, 25);
        assert_eq!(applied.new_on_hand, 125);
        assert_eq!(counters.on_hand, 125);
    }

    #[test]
    fn apply_remove_requires_sufficient_stock() {
        let mut counters = StockCounters {
            on_hand: 10,
            ..Default::default()
        };
        let err = counters.apply(AdjustmentType::Remove, 25).unwrap_err();
        assert!(matches!(err, AdjustmentError::InsufficientStock { .. }));
        assert_eq!(counters.on_hand, 10);
    }

    #[test]
    fn apply_rejects_zero_quantity() {
        let mut counters = StockCounters::default();
        assert_eq!(
            counters.apply(AdjustmentType::Add, 0),
            Err(AdjustmentError::NonPositiveQuantity)
        );
    }

    #[test]
    fn apply_reserve_respects_available() {
        let mut counters = StockCounters {
            on_hand: 100,
            reserved: 90,
            ..Default::default()
        };
        assert!(counters.apply(AdjustmentType::Reserve, 20).is_err());
        assert!(counters.apply(AdjustmentType::Reserve, 10).is_ok());
        assert_eq!(counters.reserved, 100);
    }

    #[test]
    fn hold_release_round_trip_restores_counters() {
        let original = StockCounters {
            on_hand: 80,
            on_hold: 5,
            ..Default::default()
        };
        let mut counters = original;
        counters.apply(AdjustmentType::Hold, 30).unwrap();
        assert_eq!(counters.on_hand, 50);
        assert_eq!(counters.on_hold, 35);
        counters.apply(AdjustmentType::ReleaseHold, 30).unwrap();
        assert_eq!(counters, original);
    }

    #[test]
    fn mark_non_saleable_moves_quantity() {
        let mut counters = StockCounters {
            on_hand: 40,
            ..Default::default()
        };
        let applied = counters.apply(AdjustmentType::MarkNonSaleable, 15).unwrap();
        assert_eq!(counters.on_hand, 25);
        assert_eq!(counters.non_saleable, 15);
        assert_eq!(applied.new_on_hand, 25);
    }

    #[test]
    fn count_moves_no_counter() {
        let mut counters = StockCounters {
            on_hand: 40,
            ..Default::default()
        };
        let applied = counters.apply(AdjustmentType::Count, 40).unwrap();
        assert_eq!(counters.on_hand, 40);
        assert_eq!(applied.quantity_change, 40);
    }

    #[test]
    fn available_to_promise_never_negative() {
        let counters = StockCounters {
            on_hand: 10,
            reserved: 25,
            ..Default::default()
        };
        assert_eq!(counters.available_to_promise(), 0);
    }

    #[test]
    fn adjustment_type_round_trips_through_str() {
        for t in AdjustmentType::ALL {
            assert_eq!(t.as_str().parse::<AdjustmentType>().unwrap(), t);
        }
        assert!("recount".parse::<AdjustmentType>().is_err());
    }
}
