use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockledger_core::{LocationCode, MoveId, Quantity, StockId};

/// Canonical transaction category of a movement.
///
/// Assigned once during normalization; nothing downstream re-derives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Receipt,
    Issue,
    Transfer,
    Adjustment,
    Other,
}

impl TransactionType {
    /// Map a numeric source transaction code.
    pub fn from_code(code: i64) -> Self {
        match code {
            25 => TransactionType::Receipt,
            13 => TransactionType::Issue,
            16 => TransactionType::Transfer,
            17 => TransactionType::Adjustment,
            _ => TransactionType::Other,
        }
    }

    /// Map a textual type name. Exact (case-insensitive) match only.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "receipt" => TransactionType::Receipt,
            "issue" => TransactionType::Issue,
            "transfer" => TransactionType::Transfer,
            "adjustment" => TransactionType::Adjustment,
            _ => TransactionType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Receipt => "receipt",
            TransactionType::Issue => "issue",
            TransactionType::Transfer => "transfer",
            TransactionType::Adjustment => "adjustment",
            TransactionType::Other => "other",
        }
    }
}

/// Display text a source record carried in-line, used only when the lookup
/// tables have no matching row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineText {
    pub item_description: Option<String>,
    pub units: Option<String>,
    pub location_name: Option<String>,
}

/// One atomic, signed, dated inventory quantity change.
///
/// Immutable once normalized. `quantity_signed` encodes direction by sign; a
/// zero quantity is kept in history but is inert in every sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEvent {
    pub id: MoveId,
    pub stock_id: StockId,
    /// The leg's own location (never a from/to pair).
    pub location_code: LocationCode,
    pub quantity_signed: Quantity,
    pub transaction_type: TransactionType,
    pub reference: String,
    /// Day granularity; time of day is dropped during normalization.
    pub transaction_date: NaiveDate,
    pub detail: Option<String>,
    /// Display only, never used in balance arithmetic.
    pub unit_cost: Option<Quantity>,
    #[serde(default)]
    pub inline: InlineText,
}

impl MoveEvent {
    pub fn new(
        id: impl Into<MoveId>,
        stock_id: impl Into<StockId>,
        location_code: impl Into<LocationCode>,
        quantity_signed: Quantity,
        transaction_type: TransactionType,
        transaction_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            stock_id: stock_id.into(),
            location_code: location_code.into(),
            quantity_signed,
            transaction_type,
            reference: String::new(),
            transaction_date,
            detail: None,
            unit_cost: None,
            inline: InlineText::default(),
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_unit_cost(mut self, unit_cost: Quantity) -> Self {
        self.unit_cost = Some(unit_cost);
        self
    }

    pub fn with_inline(mut self, inline: InlineText) -> Self {
        self.inline = inline;
        self
    }

    /// Chronological key: date first, id as the deterministic tie-break.
    pub fn chrono_key(&self) -> (NaiveDate, &MoveId) {
        (self.transaction_date, &self.id)
    }

    /// Degenerate (zero) quantity: present in history, excluded from aggregates.
    pub fn is_inert(&self) -> bool {
        self.quantity_signed.is_zero()
    }

    pub fn is_increase(&self) -> bool {
        self.quantity_signed.is_sign_positive() && !self.is_inert()
    }

    pub fn is_decrease(&self) -> bool {
        self.quantity_signed.is_sign_negative() && !self.is_inert()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn numeric_codes_map_to_canonical_types() {
        assert_eq!(TransactionType::from_code(25), TransactionType::Receipt);
        assert_eq!(TransactionType::from_code(13), TransactionType::Issue);
        assert_eq!(TransactionType::from_code(16), TransactionType::Transfer);
        assert_eq!(TransactionType::from_code(17), TransactionType::Adjustment);
        assert_eq!(TransactionType::from_code(26), TransactionType::Other);
    }

    #[test]
    fn names_match_exactly_not_by_substring() {
        assert_eq!(TransactionType::from_name(" Transfer "), TransactionType::Transfer);
        assert_eq!(TransactionType::from_name("ADJUSTMENT"), TransactionType::Adjustment);
        assert_eq!(TransactionType::from_name("stock transfer out"), TransactionType::Other);
    }

    #[test]
    fn direction_follows_sign_and_zero_is_inert() {
        let up = MoveEvent::new("1", "X", "WH1", Decimal::from(5), TransactionType::Receipt, day(1));
        let down = MoveEvent::new("2", "X", "WH1", Decimal::from(-5), TransactionType::Issue, day(1));
        let zero = MoveEvent::new("3", "X", "WH1", Decimal::ZERO, TransactionType::Other, day(1));

        assert!(up.is_increase() && !up.is_decrease());
        assert!(down.is_decrease() && !down.is_increase());
        assert!(zero.is_inert() && !zero.is_increase() && !zero.is_decrease());
    }

    #[test]
    fn chrono_key_orders_by_date_then_id() {
        let a = MoveEvent::new("10", "X", "WH1", Decimal::ONE, TransactionType::Receipt, day(2));
        let b = MoveEvent::new("9", "X", "WH1", Decimal::ONE, TransactionType::Receipt, day(2));
        let c = MoveEvent::new("1", "X", "WH1", Decimal::ONE, TransactionType::Receipt, day(3));
        assert!(b.chrono_key() < a.chrono_key());
        assert!(a.chrono_key() < c.chrono_key());
    }
}
