//! Quantity-on-hand aggregates around a date boundary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockledger_core::{LocationCode, Quantity};
use stockledger_movements::MoveEvent;

use crate::replay::add_clamped;

/// A day-granularity cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "date", rename_all = "snake_case")]
pub enum Cutoff {
    /// `date < cutoff` (exclusive).
    Before(NaiveDate),
    /// `date <= cutoff` (inclusive).
    Through(NaiveDate),
}

impl Cutoff {
    pub fn new(date: NaiveDate, inclusive: bool) -> Self {
        if inclusive {
            Cutoff::Through(date)
        } else {
            Cutoff::Before(date)
        }
    }

    pub fn admits(&self, date: NaiveDate) -> bool {
        match *self {
            Cutoff::Before(cutoff) => date < cutoff,
            Cutoff::Through(cutoff) => date <= cutoff,
        }
    }
}

/// Signed quantity sum of the events the cutoff admits.
///
/// The location filter, when present, is applied first (exact code equality).
/// Zero-quantity events are skipped.
pub fn boundary_sum<'a>(
    events: impl IntoIterator<Item = &'a MoveEvent>,
    cutoff: Cutoff,
    location: Option<&LocationCode>,
) -> Quantity {
    events
        .into_iter()
        .filter(|e| location.is_none_or(|loc| &e.location_code == loc))
        .filter(|e| !e.is_inert())
        .filter(|e| cutoff.admits(e.transaction_date))
        .fold(Quantity::ZERO, |total, e| add_clamped(total, e.quantity_signed))
}

/// Quantity on hand before the start and through the end of a date range.
///
/// Each side is only computed when its bound is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryTotals {
    pub before: Option<Quantity>,
    pub through: Option<Quantity>,
}

pub fn boundary_totals(
    events: &[MoveEvent],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    location: Option<&LocationCode>,
) -> BoundaryTotals {
    BoundaryTotals {
        before: from.map(|d| boundary_sum(events, Cutoff::Before(d), location)),
        through: to.map(|d| boundary_sum(events, Cutoff::Through(d), location)),
    }
}
