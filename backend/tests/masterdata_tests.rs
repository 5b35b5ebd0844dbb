//! Master-data validation and shared type tests
//!
//! Tests for the request-boundary validators, pagination rules, and the
//! id-or-object relation type.

use proptest::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::types::{PageParams, Related, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use shared::validation::{
    validate_code, validate_country_code, validate_lot_dates, validate_name,
    validate_rate_percent, validate_tracking_flags,
};
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::models::{AttributeDataType, LocationType, LotStatus};

    /// Names are non-blank and capped at 255 characters
    #[test]
    fn test_name_validation() {
        assert!(validate_name("Electronics").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("  \t ").is_err());
        assert!(validate_name(&"n".repeat(255)).is_ok());
        assert!(validate_name(&"n".repeat(256)).is_err());
    }

    /// Codes are short, alphanumeric, no whitespace
    #[test]
    fn test_code_validation() {
        assert!(validate_code("SKU-100").is_ok());
        assert!(validate_code("WH_EAST_1").is_ok());
        assert!(validate_code("").is_err());
        assert!(validate_code("two words").is_err());
        assert!(validate_code("naïve").is_err());
    }

    /// Country codes are ISO alpha-2 uppercase
    #[test]
    fn test_country_code_validation() {
        assert!(validate_country_code("US").is_ok());
        assert!(validate_country_code("us").is_err());
        assert!(validate_country_code("USA").is_err());
    }

    /// Tax rates live in [0, 100]
    #[test]
    fn test_rate_percent_validation() {
        assert!(validate_rate_percent(dec("0")).is_ok());
        assert!(validate_rate_percent(dec("19.5")).is_ok());
        assert!(validate_rate_percent(dec("100")).is_ok());
        assert!(validate_rate_percent(dec("100.01")).is_err());
        assert!(validate_rate_percent(dec("-0.01")).is_err());
    }

    /// Serial and lot tracking are mutually exclusive
    #[test]
    fn test_tracking_flags() {
        assert!(validate_tracking_flags(false, false).is_ok());
        assert!(validate_tracking_flags(true, false).is_ok());
        assert!(validate_tracking_flags(false, true).is_ok());
        assert!(validate_tracking_flags(true, true).is_err());
    }

    /// Expiry must fall strictly after manufacturing
    #[test]
    fn test_lot_date_ordering() {
        let jan = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let jun = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert!(validate_lot_dates(Some(jan), Some(jun)).is_ok());
        assert!(validate_lot_dates(Some(jun), Some(jan)).is_err());
        assert!(validate_lot_dates(Some(jan), Some(jan)).is_err());
        assert!(validate_lot_dates(None, None).is_ok());
    }

    /// Defaults: page 1, 25 per page
    #[test]
    fn test_pagination_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(params.limit(), 25);
        assert_eq!(params.offset(), 0);
    }

    /// Requested page sizes are capped at 100
    #[test]
    fn test_pagination_cap() {
        let params = PageParams::new(Some(2), Some(1000));
        assert_eq!(params.page_size(), MAX_PAGE_SIZE);
        assert_eq!(params.offset(), 100);
    }

    /// Only select attributes carry an option list
    #[test]
    fn test_attribute_data_types() {
        assert!(AttributeDataType::Select.supports_options());
        for dt in [
            AttributeDataType::Text,
            AttributeDataType::Number,
            AttributeDataType::Boolean,
            AttributeDataType::Date,
        ] {
            assert!(!dt.supports_options());
        }
    }

    /// Enum codes round trip through their string form
    #[test]
    fn test_enum_string_round_trips() {
        for lt in [
            LocationType::Warehouse,
            LocationType::Store,
            LocationType::FulfillmentCenter,
        ] {
            assert_eq!(lt.as_str().parse::<LocationType>().unwrap(), lt);
        }
        for ls in [
            LotStatus::Available,
            LotStatus::Reserved,
            LotStatus::Expired,
            LotStatus::Quarantine,
            LotStatus::Damaged,
        ] {
            assert_eq!(ls.as_str().parse::<LotStatus>().unwrap(), ls);
        }
    }
}

// ============================================================================
// Related<T> serde behavior
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RateStub {
    id: Uuid,
    name: String,
}

/// A bare UUID deserializes to the Id variant
#[test]
fn test_related_accepts_bare_id() {
    let id = Uuid::new_v4();
    let related: Related<RateStub> = serde_json::from_value(serde_json::json!(id)).unwrap();
    assert_eq!(related, Related::Id(id));
    assert_eq!(related.id_with(|r| r.id), id);
}

/// A full object deserializes to the Resolved variant
#[test]
fn test_related_accepts_object() {
    let id = Uuid::new_v4();
    let related: Related<RateStub> = serde_json::from_value(serde_json::json!({
        "id": id,
        "name": "VAT 19%",
    }))
    .unwrap();
    assert_eq!(related.as_resolved().map(|r| r.name.as_str()), Some("VAT 19%"));
}

/// Resolved values serialize as objects, ids as strings
#[test]
fn test_related_serialization_shape() {
    let id = Uuid::new_v4();
    let resolved = Related::Resolved(RateStub {
        id,
        name: "GST".to_string(),
    });
    let json = serde_json::to_value(&resolved).unwrap();
    assert!(json.is_object());

    let bare: Related<RateStub> = Related::Id(id);
    let json = serde_json::to_value(&bare).unwrap();
    assert!(json.is_string());
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Offsets never go negative and always align to page boundaries
    #[test]
    fn prop_pagination_offsets(page in 0u32..10_000, page_size in 0u32..10_000) {
        let params = PageParams::new(Some(page), Some(page_size));
        prop_assert!(params.page() >= 1);
        prop_assert!(params.page_size() >= 1);
        prop_assert!(params.page_size() <= MAX_PAGE_SIZE);
        prop_assert!(params.offset() >= 0);
        prop_assert_eq!(
            params.offset() % params.limit(),
            0
        );
    }

    /// Valid codes always pass; appending a space always fails
    #[test]
    fn prop_code_whitespace_rejected(code in "[A-Za-z0-9_-]{1,49}") {
        prop_assert!(validate_code(&code).is_ok());
        let code_with_space = format!("{} ", code);
        prop_assert!(validate_code(&code_with_space).is_err());
    }
}
