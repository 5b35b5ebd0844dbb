//! Validation helpers for master-data and inventory input
//!
//! These run at the request boundary, before anything is written.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Validate a display name: non-blank, at most 255 characters
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name must not be blank");
    }
    if name.chars().count() > 255 {
        return Err("Name must be at most 255 characters");
    }
    Ok(())
}

/// Validate a short code: non-blank, at most 50 characters,
/// alphanumeric plus `-` and `_`, no whitespace
pub fn validate_code(code: &str) -> Result<(), &'static str> {
    if code.is_empty() {
        return Err("Code must not be blank");
    }
    if code.len() > 50 {
        return Err("Code must be at most 50 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("Code must be alphanumeric (dashes and underscores allowed)");
    }
    Ok(())
}

/// Validate an ISO-3166 alpha-2 country code
pub fn validate_country_code(code: &str) -> Result<(), &'static str> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err("Country code must be two uppercase letters");
    }
    Ok(())
}

/// Validate a tax rate percentage (0 to 100 inclusive)
pub fn validate_rate_percent(rate: Decimal) -> Result<(), &'static str> {
    if rate < Decimal::ZERO || rate > Decimal::from(100) {
        return Err("Rate must be between 0 and 100 percent");
    }
    Ok(())
}

/// Validate an adjustment or lot quantity: strictly positive
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// A product is tracked by serial number or by lot, never both
pub fn validate_tracking_flags(is_serialized: bool, is_lotted: bool) -> Result<(), &'static str> {
    if is_serialized && is_lotted {
        return Err("A product cannot be both serialized and lotted");
    }
    Ok(())
}

/// Expiry must fall strictly after manufacturing when both are given
pub fn validate_lot_dates(
    manufacturing_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
) -> Result<(), &'static str> {
    if let (Some(made), Some(expires)) = (manufacturing_date, expiry_date) {
        if expires <= made {
            return Err("Expiry date must be after manufacturing date");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rejects_blank_and_overlong() {
        assert!(validate_name("Beverages").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(256)).is_err());
        assert!(validate_name(&"x".repeat(255)).is_ok());
    }

    #[test]
    fn code_format() {
        assert!(validate_code("EA").is_ok());
        assert!(validate_code("TAX_EU-STD").is_ok());
        assert!(validate_code("").is_err());
        assert!(validate_code("has space").is_err());
        assert!(validate_code(&"A".repeat(51)).is_err());
    }

    #[test]
    fn country_code_format() {
        assert!(validate_country_code("DE").is_ok());
        assert!(validate_country_code("de").is_err());
        assert!(validate_country_code("DEU").is_err());
        assert!(validate_country_code("D").is_err());
    }

    #[test]
    fn rate_percent_bounds() {
        assert!(validate_rate_percent(Decimal::ZERO).is_ok());
        assert!(validate_rate_percent(Decimal::from(100)).is_ok());
        assert!(validate_rate_percent(Decimal::from(101)).is_err());
        assert!(validate_rate_percent(Decimal::from(-1)).is_err());
    }

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
    }

    #[test]
    fn tracking_flags_exclusive() {
        assert!(validate_tracking_flags(true, false).is_ok());
        assert!(validate_tracking_flags(false, true).is_ok());
        assert!(validate_tracking_flags(false, false).is_ok());
        assert!(validate_tracking_flags(true, true).is_err());
    }

    #[test]
    fn lot_dates_ordering() {
        let made = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let expires = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        assert!(validate_lot_dates(Some(made), Some(expires)).is_ok());
        assert!(validate_lot_dates(Some(expires), Some(made)).is_err());
        assert!(validate_lot_dates(Some(made), Some(made)).is_err());
        assert!(validate_lot_dates(None, Some(expires)).is_ok());
        assert!(validate_lot_dates(Some(made), None).is_ok());
    }
}
