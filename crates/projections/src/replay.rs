//! Chronological replay with running quantity-on-hand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stockledger_core::{Quantity, StockId};
use stockledger_movements::MoveEvent;

/// Output ordering of derived rows.
///
/// Balances are always computed in ascending order; `MostRecentFirst` only
/// reverses the finished sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    MostRecentFirst,
}

impl SortOrder {
    /// Apply this ordering to rows already sorted ascending.
    pub fn apply<T>(self, mut rows: Vec<T>) -> Vec<T> {
        if self == SortOrder::MostRecentFirst {
            rows.reverse();
        }
        rows
    }
}

/// One replayed event with the quantity on hand after it.
///
/// `running_balance` is only meaningful within the sequence it was computed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub event: MoveEvent,
    pub running_balance: Quantity,
}

/// Partition `events` by `group_key`, sort each partition by `(date, id)` and
/// compute the cumulative balance.
///
/// Source order is never trusted as chronological. Partitions are returned in
/// key order.
pub fn replay<'a, K, F>(
    events: impl IntoIterator<Item = &'a MoveEvent>,
    group_key: F,
    order: SortOrder,
) -> BTreeMap<K, Vec<LedgerRow>>
where
    K: Ord,
    F: Fn(&MoveEvent) -> K,
{
    let mut groups: BTreeMap<K, Vec<&MoveEvent>> = BTreeMap::new();
    for event in events {
        groups.entry(group_key(event)).or_default().push(event);
    }

    groups
        .into_iter()
        .map(|(key, mut partition)| {
            partition.sort_by(|a, b| a.chrono_key().cmp(&b.chrono_key()));
            (key, order.apply(cumulative(partition)))
        })
        .collect()
}

/// [`replay`] partitioned per stock item, so balances never mix between items.
pub fn replay_by_stock<'a>(
    events: impl IntoIterator<Item = &'a MoveEvent>,
    order: SortOrder,
) -> BTreeMap<StockId, Vec<LedgerRow>> {
    replay(events, |e| e.stock_id.clone(), order)
}

/// `total + delta`, clamped to the representable range instead of panicking.
pub(crate) fn add_clamped(total: Quantity, delta: Quantity) -> Quantity {
    total.checked_add(delta).unwrap_or_else(|| {
        tracing::warn!(%total, %delta, "quantity sum out of range; clamping");
        if delta.is_sign_negative() { Quantity::MIN } else { Quantity::MAX }
    })
}

fn cumulative(sorted: Vec<&MoveEvent>) -> Vec<LedgerRow> {
    let mut balance = Quantity::ZERO;
    sorted
        .into_iter()
        .map(|event| {
            balance = add_clamped(balance, event.quantity_signed);
            LedgerRow {
                event: event.clone(),
                running_balance: balance,
            }
        })
        .collect()
}
