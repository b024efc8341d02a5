//! Strongly-typed identifiers used across the ledger.
//!
//! All identifiers come from the external data source and are opaque text; the
//! newtypes only keep them from being mixed up with each other.

use core::cmp::Ordering;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a single movement record, unique within its source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(String);

/// Identifier of an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockId(String);

/// Code of a stock location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationCode(String);

macro_rules! impl_text_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
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

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: empty", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

impl_text_newtype!(MoveId, "MoveId");
impl_text_newtype!(StockId, "StockId");
impl_text_newtype!(LocationCode, "LocationCode");

impl StockId {
    /// Stock id assigned to records that carry none.
    pub fn unknown() -> Self {
        Self(String::new())
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_empty()
    }
}

impl LocationCode {
    /// Sentinel for records posted without a location.
    pub fn unknown() -> Self {
        Self(String::new())
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_empty()
    }
}

impl MoveId {
    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

/// Numeric ids compare as numbers (`9 < 10`), everything else as text.
/// Numeric ids order before non-numeric ones.
impl Ord for MoveId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for MoveId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn numeric_move_ids_order_numerically() {
        assert!(MoveId::from("9") < MoveId::from("10"));
        assert!(MoveId::from("100") > MoveId::from("20"));
    }

    #[test]
    fn numeric_ids_sort_before_text_ids() {
        let mut ids = vec![MoveId::from("b"), MoveId::from("12"), MoveId::from("a"), MoveId::from("3")];
        ids.sort();
        let as_text: Vec<_> = ids.iter().map(MoveId::as_str).collect();
        assert_eq!(as_text, vec!["3", "12", "a", "b"]);
    }

    #[test]
    fn leading_zeros_still_give_a_total_order() {
        let a = MoveId::from("007");
        let b = MoveId::from("7");
        assert_ne!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    #[test]
    fn blank_ids_are_rejected_by_from_str() {
        assert!("  ".parse::<StockId>().is_err());
        assert_eq!(" WH1 ".parse::<LocationCode>().unwrap(), LocationCode::from("WH1"));
    }

    proptest! {
        #[test]
        fn move_id_ordering_is_antisymmetric(a in "[0-9a-z]{1,4}", b in "[0-9a-z]{1,4}") {
            let (a, b) = (MoveId::new(a), MoveId::new(b));
            prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
            prop_assert_eq!(a.cmp(&b) == Ordering::Equal, a == b);
        }
    }
}
