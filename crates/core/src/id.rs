//! Strongly-typed identifiers used across the order flow.
//!
//! The remote application addresses everything by text, so most identifiers
//! are trimmed, non-empty strings. The order number the application assigns on
//! commit is numeric.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Purchase requisition number the order is created from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequisitionNumber(String);

/// Line number within a purchase requisition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequisitionLine(String);

/// Material code (business key of an order line).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MaterialCode(String);

/// Canonical supplier account code in the remote application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SupplierCode(String);

macro_rules! impl_text_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create an identifier from text; surrounding whitespace is dropped.
            pub fn new(value: impl AsRef<str>) -> Result<Self, DomainError> {
                let trimmed = value.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: empty", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_text_newtype!(RequisitionNumber, "RequisitionNumber");
impl_text_newtype!(RequisitionLine, "RequisitionLine");
impl_text_newtype!(MaterialCode, "MaterialCode");
impl_text_newtype!(SupplierCode, "SupplierCode");

/// Purchase order number assigned by the remote application on commit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(u64);

impl OrderNumber {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for OrderNumber {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for OrderNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u64>()
            .map_err(|e| DomainError::invalid_id(format!("OrderNumber: {}", e)))?;
        Ok(Self(value))
    }
}
