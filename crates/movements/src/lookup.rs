//! Master-data lookup tables used to enrich display values.
//!
//! Lookups never alter quantities. Every resolution follows the same order:
//! lookup table, then text the move carried in-line, then a placeholder.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockledger_core::{LocationCode, StockId};

use crate::event::MoveEvent;
use crate::normalize::{first_present, scalar_text};

/// A stock location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub code: LocationCode,
    pub name: String,
}

/// An inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub stock_id: StockId,
    pub description: String,
    /// Unit id the item is measured in.
    pub units_ref: Option<String>,
}

/// A unit of measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    pub id: String,
    pub description: String,
}

/// A lookup-table row decoded from loosely shaped source JSON.
///
/// Keys are resolved through alias lists like move records are; codes and ids
/// may arrive as strings or numbers. A row without its key is unusable.
pub trait LookupRow: Sized {
    const TABLE: &'static str;

    fn from_row(row: &JsonValue) -> Option<Self>;
}

fn text_of(row: &JsonValue, keys: &[&str]) -> Option<String> {
    first_present(row, keys).and_then(scalar_text)
}

impl LookupRow for Location {
    const TABLE: &'static str = "locations";

    fn from_row(row: &JsonValue) -> Option<Self> {
        Some(Self {
            code: LocationCode::new(text_of(row, &["loc_code", "location_code", "locationCode", "code"])?),
            name: text_of(row, &["location_name", "locationName", "name"]).unwrap_or_default(),
        })
    }
}

impl LookupRow for Item {
    const TABLE: &'static str = "items";

    fn from_row(row: &JsonValue) -> Option<Self> {
        Some(Self {
            stock_id: StockId::new(text_of(row, &["stock_id", "stockId", "item_code", "stock_code"])?),
            description: text_of(row, &["description", "item_description", "name"]).unwrap_or_default(),
            units_ref: text_of(row, &["units", "units_ref", "unit", "uom"]),
        })
    }
}

impl LookupRow for Unit {
    const TABLE: &'static str = "units";

    fn from_row(row: &JsonValue) -> Option<Self> {
        Some(Self {
            id: text_of(row, &["id", "abbr", "unit_id", "code"])?,
            description: text_of(row, &["description", "name"]).unwrap_or_default(),
        })
    }
}

/// Decode every usable row; unusable rows are logged and skipped.
pub fn decode_rows<T: LookupRow>(rows: &[JsonValue]) -> Vec<T> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let decoded = T::from_row(row);
            if decoded.is_none() {
                tracing::warn!(table = T::TABLE, index, "skipping lookup row without a key");
            }
            decoded
        })
        .collect()
}

/// Display text used when nothing else resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholders {
    pub location: String,
    pub item: String,
    pub unit: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            location: "Unknown location".to_string(),
            item: "Unknown item".to_string(),
            unit: "Unknown unit".to_string(),
        }
    }
}

/// A location code together with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub code: LocationCode,
    pub name: String,
}

/// Indexed lookup tables.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    locations: HashMap<LocationCode, Location>,
    items: HashMap<StockId, Item>,
    units: HashMap<String, Unit>,
    placeholders: Placeholders,
}

impl Lookups {
    pub fn new(
        locations: impl IntoIterator<Item = Location>,
        items: impl IntoIterator<Item = Item>,
        units: impl IntoIterator<Item = Unit>,
    ) -> Self {
        Self {
            locations: locations.into_iter().map(|l| (l.code.clone(), l)).collect(),
            items: items.into_iter().map(|i| (i.stock_id.clone(), i)).collect(),
            units: units.into_iter().map(|u| (u.id.clone(), u)).collect(),
            placeholders: Placeholders::default(),
        }
    }

    pub fn with_placeholders(mut self, placeholders: Placeholders) -> Self {
        self.placeholders = placeholders;
        self
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    pub fn location(&self, code: &LocationCode) -> Option<&Location> {
        self.locations.get(code)
    }

    pub fn item(&self, stock_id: &StockId) -> Option<&Item> {
        self.items.get(stock_id)
    }

    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Resolve the location a move was posted against.
    pub fn resolve_location(&self, event: &MoveEvent) -> ResolvedLocation {
        let code = &event.location_code;
        let name = self
            .location(code)
            .map(|l| l.name.clone())
            .filter(|n| !n.trim().is_empty())
            .or_else(|| event.inline.location_name.clone())
            .unwrap_or_else(|| {
                tracing::debug!(location = %code, "location lookup miss");
                self.placeholders.location.clone()
            });

        ResolvedLocation {
            code: code.clone(),
            name,
        }
    }

    /// Item description for `stock_id`, falling back to in-line text on any of `legs`.
    pub fn resolve_description<'a>(
        &self,
        stock_id: &StockId,
        legs: impl IntoIterator<Item = &'a MoveEvent>,
    ) -> String {
        self.item(stock_id)
            .map(|i| i.description.clone())
            .filter(|d| !d.trim().is_empty())
            .or_else(|| {
                legs.into_iter()
                    .find_map(|e| e.inline.item_description.clone())
            })
            .unwrap_or_else(|| {
                tracing::debug!(stock_id = %stock_id, "item lookup miss");
                self.placeholders.item.clone()
            })
    }

    /// Units for `stock_id`: item's unit row, else its raw unit id, else in-line text.
    pub fn resolve_units<'a>(
        &self,
        stock_id: &StockId,
        legs: impl IntoIterator<Item = &'a MoveEvent>,
    ) -> String {
        let from_item = self.item(stock_id).and_then(|i| i.units_ref.as_deref()).map(|id| {
            self.unit(id)
                .map(|u| u.description.clone())
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| id.to_string())
        });

        from_item
            .or_else(|| legs.into_iter().find_map(|e| e.inline.units.clone()))
            .unwrap_or_else(|| {
                tracing::debug!(stock_id = %stock_id, "unit lookup miss");
                self.placeholders.unit.clone()
            })
    }
}
