//! Inventory domain enums

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of fulfillment location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Warehouse,
    Store,
    FulfillmentCenter,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Warehouse => "warehouse",
            LocationType::Store => "store",
            LocationType::FulfillmentCenter => "fulfillment_center",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warehouse" => Ok(LocationType::Warehouse),
            "store" => Ok(LocationType::Store),
            "fulfillment_center" => Ok(LocationType::FulfillmentCenter),
            other => Err(format!("unknown location type: {}", other)),
        }
    }
}

/// Status of a tracked lot/batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    Available,
    Reserved,
    Expired,
    Quarantine,
    Damaged,
}

impl LotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LotStatus::Available => "available",
            LotStatus::Reserved => "reserved",
            LotStatus::Expired => "expired",
            LotStatus::Quarantine => "quarantine",
            LotStatus::Damaged => "damaged",
        }
    }
}

impl fmt::Display for LotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(LotStatus::Available),
            "reserved" => Ok(LotStatus::Reserved),
            "expired" => Ok(LotStatus::Expired),
            "quarantine" => Ok(LotStatus::Quarantine),
            "damaged" => Ok(LotStatus::Damaged),
            other => Err(format!("unknown lot status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_type_round_trips() {
        for s in ["warehouse", "store", "fulfillment_center"] {
            assert_eq!(s.parse::<LocationType>().unwrap().as_str(), s);
        }
    }

    #[test]
    fn lot_status_round_trips() {
        for s in ["available", "reserved", "expired", "quarantine", "damaged"] {
            assert_eq!(s.parse::<LotStatus>().unwrap().as_str(), s);
        }
    }
}
