//! Reconstruction of logical transfers from their two legs.
//!
//! A location-to-location transfer is recorded as a negative leg at the source
//! and a positive leg at the destination, sharing one reference. Malformed groups
//! (a missing leg, extra legs, unequal magnitudes) are reported as recorded and
//! flagged, never reconciled.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockledger_core::{Quantity, StockId};
use stockledger_movements::{Lookups, MoveEvent, ResolvedLocation, TransactionType};

/// One logical transfer of one stock item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub reference: String,
    pub stock_id: StockId,
    pub from_location: ResolvedLocation,
    pub to_location: ResolvedLocation,
    /// Always positive: the positive leg's magnitude, else the negative leg's.
    pub quantity: Quantity,
    pub date: NaiveDate,
    pub description: String,
    pub units: String,
    /// `false` when the legs are not exactly one negative and one positive of
    /// equal magnitude; `quantity` is then the as-recorded value.
    pub legs_balanced: bool,
}

/// Transfers recorded under `reference`, one record per stock item.
pub fn resolve_transfers(events: &[MoveEvent], reference: &str, lookups: &Lookups) -> Vec<TransferRecord> {
    let legs = events.iter().filter(|e| e.reference == reference);
    pair_groups(transfer_legs_by_group(legs), lookups)
}

/// Every transfer in `events`, ordered by date then reference.
pub fn resolve_all_transfers(events: &[MoveEvent], lookups: &Lookups) -> Vec<TransferRecord> {
    let mut records = pair_groups(transfer_legs_by_group(events.iter()), lookups);
    // Stable: same-day records of one reference stay in stock id order.
    records.sort_by(|a, b| (a.date, &a.reference).cmp(&(b.date, &b.reference)));
    records
}

type LegGroups<'a> = BTreeMap<(&'a str, &'a StockId), Vec<&'a MoveEvent>>;

/// Transfer-typed events grouped by `(reference, stock_id)` in a single pass.
fn transfer_legs_by_group<'a>(events: impl Iterator<Item = &'a MoveEvent>) -> LegGroups<'a> {
    let mut groups = LegGroups::new();
    for event in events.filter(|e| e.transaction_type == TransactionType::Transfer) {
        groups
            .entry((event.reference.as_str(), &event.stock_id))
            .or_default()
            .push(event);
    }
    groups
}

fn pair_groups(groups: LegGroups<'_>, lookups: &Lookups) -> Vec<TransferRecord> {
    groups
        .into_iter()
        .filter_map(|((reference, stock_id), mut legs)| {
            legs.sort_by(|a, b| a.chrono_key().cmp(&b.chrono_key()));
            pair_legs(reference, stock_id, &legs, lookups)
        })
        .collect()
}

fn pair_legs(
    reference: &str,
    stock_id: &StockId,
    legs: &[&MoveEvent],
    lookups: &Lookups,
) -> Option<TransferRecord> {
    let first = *legs.first()?;
    let negative = legs.iter().copied().find(|e| e.is_decrease());
    let positive = legs.iter().copied().find(|e| e.is_increase());

    let from = negative.unwrap_or(first);
    let to = positive.unwrap_or(first);

    let quantity = positive
        .or(negative)
        .map(|e| e.quantity_signed.abs())
        .unwrap_or(Quantity::ZERO);

    let legs_balanced = legs.len() == 2
        && matches!((negative, positive), (Some(n), Some(p)) if n.quantity_signed.abs() == p.quantity_signed.abs());

    if !legs_balanced {
        tracing::warn!(
            reference,
            stock_id = %stock_id,
            legs = legs.len(),
            has_negative = negative.is_some(),
            has_positive = positive.is_some(),
            "transfer legs do not balance; reporting as-recorded quantity"
        );
    }

    Some(TransferRecord {
        reference: reference.to_string(),
        stock_id: stock_id.clone(),
        from_location: lookups.resolve_location(from),
        to_location: lookups.resolve_location(to),
        quantity,
        date: negative.or(positive).unwrap_or(first).transaction_date,
        description: lookups.resolve_description(stock_id, legs.iter().copied()),
        units: lookups.resolve_units(stock_id, legs.iter().copied()),
        legs_balanced,
    })
}
