//! Adjustment records.
//!
//! Adjustments are not paired: each adjustment-typed event is already a
//! complete logical record and maps to one [`AdjustmentRecord`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockledger_core::{MoveId, Quantity, StockId};
use stockledger_movements::{Lookups, MoveEvent, ResolvedLocation, TransactionType};

use crate::replay::SortOrder;

/// Which adjustments to return.
///
/// Precedence: `reference` (equality or prefix match), then `stock_id`, then all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentSelector {
    pub reference: Option<String>,
    pub stock_id: Option<StockId>,
}

impl AdjustmentSelector {
    pub fn by_reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            stock_id: None,
        }
    }

    pub fn by_stock(stock_id: impl Into<StockId>) -> Self {
        Self {
            reference: None,
            stock_id: Some(stock_id.into()),
        }
    }

    fn admits(&self, event: &MoveEvent) -> bool {
        if event.transaction_type != TransactionType::Adjustment {
            return false;
        }
        match (self.reference.as_deref(), &self.stock_id) {
            (Some(reference), _) => event.reference.starts_with(reference),
            (None, Some(stock_id)) => &event.stock_id == stock_id,
            (None, None) => true,
        }
    }
}

/// One adjustment line with its display values resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    pub id: MoveId,
    pub reference: String,
    pub location: ResolvedLocation,
    pub date: NaiveDate,
    pub stock_id: StockId,
    pub description: String,
    /// Signed: an adjustment may reduce stock.
    pub quantity: Quantity,
    pub units: String,
    pub unit_cost: Option<Quantity>,
}

pub fn resolve_adjustments(
    events: &[MoveEvent],
    selector: &AdjustmentSelector,
    lookups: &Lookups,
    order: SortOrder,
) -> Vec<AdjustmentRecord> {
    let mut matched: Vec<&MoveEvent> = events.iter().filter(|e| selector.admits(e)).collect();
    matched.sort_by(|a, b| a.chrono_key().cmp(&b.chrono_key()));

    let records = matched
        .into_iter()
        .map(|e| AdjustmentRecord {
            id: e.id.clone(),
            reference: e.reference.clone(),
            location: lookups.resolve_location(e),
            date: e.transaction_date,
            stock_id: e.stock_id.clone(),
            description: lookups.resolve_description(&e.stock_id, [e]),
            quantity: e.quantity_signed,
            units: lookups.resolve_units(&e.stock_id, [e]),
            unit_cost: e.unit_cost,
        })
        .collect();

    order.apply(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn adj(id: &str, stock: &str, reference: &str, d: u32, qty: i64) -> MoveEvent {
        MoveEvent::new(id, stock, "WH1", Decimal::from(qty), TransactionType::Adjustment, day(d))
            .with_reference(reference)
    }

    fn refs(records: &[AdjustmentRecord]) -> Vec<&str> {
        records.iter().map(|r| r.reference.as_str()).collect()
    }

    fn sample() -> Vec<MoveEvent> {
        vec![
            adj("3", "X", "ADJ-51", 9, -2),
            adj("1", "X", "ADJ-5", 3, 4),
            adj("2", "Y", "ADJ-6", 4, 1),
            MoveEvent::new("4", "X", "WH1", Decimal::ONE, TransactionType::Receipt, day(1))
                .with_reference("ADJ-5"),
        ]
    }

    #[test]
    fn reference_matches_equal_or_prefix_adjustments_only() {
        let out = resolve_adjustments(
            &sample(),
            &AdjustmentSelector::by_reference("ADJ-5"),
            &Lookups::default(),
            SortOrder::Ascending,
        );
        assert_eq!(refs(&out), vec!["ADJ-5", "ADJ-51"]);
        assert_eq!(out[1].quantity, Decimal::from(-2));
    }

    #[test]
    fn reversal_is_applied_on_request() {
        let out = resolve_adjustments(
            &sample(),
            &AdjustmentSelector::by_reference("ADJ-5"),
            &Lookups::default(),
            SortOrder::MostRecentFirst,
        );
        assert_eq!(refs(&out), vec!["ADJ-51", "ADJ-5"]);
    }

    #[test]
    fn reference_takes_precedence_over_stock() {
        let selector = AdjustmentSelector {
            reference: Some("ADJ-6".to_string()),
            stock_id: Some("X".into()),
        };
        let out = resolve_adjustments(&sample(), &selector, &Lookups::default(), SortOrder::Ascending);
        assert_eq!(refs(&out), vec!["ADJ-6"]);
    }

    #[test]
    fn stock_selector_and_no_selector() {
        let by_stock = resolve_adjustments(
            &sample(),
            &AdjustmentSelector::by_stock("X"),
            &Lookups::default(),
            SortOrder::Ascending,
        );
        assert_eq!(by_stock.len(), 2);

        let all = resolve_adjustments(
            &sample(),
            &AdjustmentSelector::default(),
            &Lookups::default(),
            SortOrder::Ascending,
        );
        assert_eq!(refs(&all), vec!["ADJ-5", "ADJ-6", "ADJ-51"]);
    }

    #[test]
    fn display_values_use_placeholders_on_miss() {
        let out = resolve_adjustments(
            &sample(),
            &AdjustmentSelector::by_stock("Y"),
            &Lookups::default(),
            SortOrder::Ascending,
        );
        assert_eq!(out[0].location.name, "Unknown location");
        assert_eq!(out[0].description, "Unknown item");
    }
}
