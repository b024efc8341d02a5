//! Raw record normalization.
//!
//! Source records arrive with varying key names and value shapes. Every field is
//! resolved through one alias table, in priority order, and every miss falls back
//! to a documented default so that `normalize` is total.

use core::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockledger_core::{LocationCode, MoveId, Quantity, StockId};

use crate::event::{InlineText, MoveEvent, TransactionType};

/// A movement record exactly as the source delivered it.
///
/// Any JSON value is accepted; non-objects simply resolve every field to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMoveRecord(pub JsonValue);

impl From<JsonValue> for RawMoveRecord {
    fn from(value: JsonValue) -> Self {
        Self(value)
    }
}

/// Canonical fields a raw record is resolved into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    StockId,
    LocationCode,
    Quantity,
    TransactionType,
    Reference,
    TransactionDate,
    Detail,
    UnitCost,
    ItemDescription,
    Units,
    LocationName,
}

impl Field {
    /// Accepted source keys, highest priority first.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Id => &["trans_id", "id", "move_id", "trans_no"],
            Field::StockId => &["stock_id", "stockId", "item_code", "stock_code"],
            Field::LocationCode => &["loc_code", "location_code", "locationCode", "location"],
            Field::Quantity => &["qty", "quantity", "quantitySigned"],
            Field::TransactionType => &["type", "trans_type", "transactionType"],
            Field::Reference => &["reference", "ref", "trans_ref"],
            Field::TransactionDate => &["tran_date", "trans_date", "transactionDate", "date"],
            Field::Detail => &["memo_", "memo", "detail", "narrative"],
            Field::UnitCost => &["standard_cost", "unit_cost", "unitCost", "price"],
            Field::ItemDescription => &["description", "item_description"],
            Field::Units => &["units", "unit", "uom"],
            Field::LocationName => &["location_name", "locationName"],
        }
    }

    pub fn name(self) -> &'static str {
        self.aliases()[0]
    }
}

impl RawMoveRecord {
    /// First present, non-null, non-blank value among the field's aliases.
    pub fn resolve(&self, field: Field) -> Option<&JsonValue> {
        first_present(&self.0, field.aliases())
    }

    fn text(&self, field: Field) -> Option<String> {
        self.resolve(field).and_then(scalar_text)
    }

    fn decimal(&self, field: Field) -> Option<Decimal> {
        match self.resolve(field)? {
            JsonValue::Number(n) => parse_decimal(&n.to_string()),
            JsonValue::String(s) => parse_decimal(s.trim()),
            _ => None,
        }
    }

    fn date(&self, field: Field) -> Option<NaiveDate> {
        match self.resolve(field)? {
            JsonValue::String(s) => parse_day(s.trim()),
            _ => None,
        }
    }

    fn transaction_type(&self) -> Option<TransactionType> {
        match self.resolve(Field::TransactionType)? {
            JsonValue::Number(n) => n.as_i64().map(TransactionType::from_code),
            JsonValue::String(s) => {
                let s = s.trim();
                Some(match s.parse::<i64>() {
                    Ok(code) => TransactionType::from_code(code),
                    Err(_) => TransactionType::from_name(s),
                })
            }
            _ => None,
        }
    }
}

/// First present, non-null, non-blank value under any of `keys`, in order.
pub(crate) fn first_present<'v>(value: &'v JsonValue, keys: &[&str]) -> Option<&'v JsonValue> {
    keys.iter().find_map(|key| match value.get(*key) {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    })
}

/// Strings, numbers and booleans as trimmed text; containers have none.
pub(crate) fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Parse a calendar day, discarding any time-of-day component.
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
}

/// Date assigned to records without a usable date (sorts first).
pub fn epoch_origin() -> NaiveDate {
    DateTime::<Utc>::UNIX_EPOCH.date_naive()
}

/// Normalization result plus the fields that fell back to their default.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub event: MoveEvent,
    pub defaulted: Vec<Field>,
}

/// Normalize one raw record, reporting which required fields were defaulted.
///
/// Optional fields (detail, unit cost, in-line text) are never reported.
pub fn normalize_detailed(raw: &RawMoveRecord) -> Normalized {
    let mut defaulted = Vec::new();
    let mut required = |field: Field, present: bool| {
        if !present {
            defaulted.push(field);
        }
    };

    let id = raw.text(Field::Id);
    required(Field::Id, id.is_some());

    let stock_id = raw.text(Field::StockId);
    required(Field::StockId, stock_id.is_some());

    let location_code = raw.text(Field::LocationCode);
    required(Field::LocationCode, location_code.is_some());

    let quantity = raw.decimal(Field::Quantity);
    required(Field::Quantity, quantity.is_some());

    let transaction_type = raw.transaction_type();
    required(Field::TransactionType, transaction_type.is_some());

    let reference = raw.text(Field::Reference);
    required(Field::Reference, reference.is_some());

    let date = raw.date(Field::TransactionDate);
    required(Field::TransactionDate, date.is_some());

    let event = MoveEvent {
        id: id.map(MoveId::new).unwrap_or_else(|| MoveId::new("")),
        stock_id: stock_id.map(StockId::new).unwrap_or_else(StockId::unknown),
        location_code: location_code
            .map(LocationCode::new)
            .unwrap_or_else(LocationCode::unknown),
        quantity_signed: quantity.unwrap_or(Quantity::ZERO).normalize(),
        transaction_type: transaction_type.unwrap_or(TransactionType::Other),
        reference: reference.unwrap_or_default(),
        transaction_date: date.unwrap_or_else(epoch_origin),
        detail: raw.text(Field::Detail),
        unit_cost: raw.decimal(Field::UnitCost),
        inline: InlineText {
            item_description: raw.text(Field::ItemDescription),
            units: raw.text(Field::Units),
            location_name: raw.text(Field::LocationName),
        },
    };

    Normalized { event, defaulted }
}

/// Normalize one raw record. Total: missing fields resolve to defaults.
pub fn normalize(raw: &RawMoveRecord) -> MoveEvent {
    let Normalized { event, defaulted } = normalize_detailed(raw);
    if !defaulted.is_empty() {
        let fields: Vec<&str> = defaulted.iter().map(|f| f.name()).collect();
        tracing::debug!(move_id = %event.id, ?fields, "malformed move record; defaults applied");
    }
    event
}

/// Normalize a whole source batch.
///
/// Records without an id get the positional id `#<index>` so the replay
/// tie-break stays deterministic.
pub fn normalize_all<'a>(records: impl IntoIterator<Item = &'a RawMoveRecord>) -> Vec<MoveEvent> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let mut event = normalize(raw);
            if event.id.as_str().is_empty() {
                event.id = MoveId::new(format!("#{index}"));
            }
            event
        })
        .collect()
}
