//! Attribute domain enums

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Value type an attribute stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeDataType {
    Text,
    Number,
    Boolean,
    Date,
    Select,
}

impl AttributeDataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeDataType::Text => "text",
            AttributeDataType::Number => "number",
            AttributeDataType::Boolean => "boolean",
            AttributeDataType::Date => "date",
            AttributeDataType::Select => "select",
        }
    }

    /// Only select attributes carry a list of options
    pub fn supports_options(&self) -> bool {
        matches!(self, AttributeDataType::Select)
    }
}

impl fmt::Display for AttributeDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeDataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(AttributeDataType::Text),
            "number" => Ok(AttributeDataType::Number),
            "boolean" => Ok(AttributeDataType::Boolean),
            "date" => Ok(AttributeDataType::Date),
            "select" => Ok(AttributeDataType::Select),
            other => Err(format!("unknown attribute data type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_select_supports_options() {
        assert!(AttributeDataType::Select.supports_options());
        assert!(!AttributeDataType::Text.supports_options());
        assert!(!AttributeDataType::Number.supports_options());
    }

    #[test]
    fn data_type_round_trips() {
        for s in ["text", "number", "boolean", "date", "select"] {
            assert_eq!(s.parse::<AttributeDataType>().unwrap().as_str(), s);
        }
        assert!("json".parse::<AttributeDataType>().is_err());
    }
}
