//! Item movement history: the pipeline behind the history query.
//!
//! Order of operations:
//! 1. category selection
//! 2. stock item and location filters
//! 3. boundary aggregates (independent of the display gate)
//! 4. replay per stock item over the whole filtered set
//! 5. date-range filter on the replayed rows, so balances include prior history
//! 6. display gate, ordering, pagination

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stockledger_core::{LocationCode, Quantity, StockId};
use stockledger_movements::MoveEvent;

use crate::boundary::{BoundaryTotals, Cutoff, boundary_sum, boundary_totals};
use crate::filter::{Category, DateRange, DisplayGate, PageRequest, location_matches, paginate};
use crate::replay::{LedgerRow, SortOrder, replay_by_stock};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub stock_id: Option<StockId>,
    pub location: Option<LocationCode>,
    pub range: DateRange,
    pub category: Category,
    pub order: SortOrder,
    pub page: PageRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub rows: Vec<LedgerRow>,
    /// Quantity on hand strictly before `range.from`, when set.
    ///
    /// Summed over every item in scope: with no `stock_id` filter this mixes
    /// items and is not any single item's quantity on hand. See `qoh_by_item`.
    pub qoh_before: Option<Quantity>,
    /// Quantity on hand through `range.to` inclusive, when set. Same scope as
    /// `qoh_before`.
    pub qoh_after: Option<Quantity>,
    /// The same aggregates per stock item in scope (empty when no bound is set).
    pub qoh_by_item: BTreeMap<StockId, BoundaryTotals>,
    /// Rows across all pages (zero unless the gate shows rows).
    pub total_count: usize,
    pub page: u32,
    pub has_more: bool,
    pub gate: DisplayGate,
}

pub fn history(events: &[MoveEvent], query: &HistoryQuery) -> HistoryPage {
    let scoped: Vec<MoveEvent> = events
        .iter()
        .filter(|e| query.category.admits(e))
        .filter(|e| query.stock_id.as_ref().is_none_or(|s| &e.stock_id == s))
        .filter(|e| location_matches(e, query.location.as_ref()))
        .cloned()
        .collect();

    let totals = boundary_totals(&scoped, query.range.from, query.range.to, None);
    let qoh_by_item = per_item_totals(&scoped, query.range);
    let gate = query.range.gate();

    let rows = if gate.shows_rows() {
        let mut rows: Vec<LedgerRow> = replay_by_stock(&scoped, SortOrder::Ascending)
            .into_values()
            .flatten()
            .filter(|row| query.range.contains(row.event.transaction_date))
            .collect();
        // Stable merge across items; each item's rows are already ascending.
        rows.sort_by(|a, b| a.event.chrono_key().cmp(&b.event.chrono_key()));
        query.order.apply(rows)
    } else {
        Vec::new()
    };

    let page = paginate(rows, query.page);

    HistoryPage {
        rows: page.items,
        qoh_before: totals.before,
        qoh_after: totals.through,
        qoh_by_item,
        total_count: page.total,
        page: page.page,
        has_more: page.has_more,
        gate,
    }
}

fn per_item_totals(scoped: &[MoveEvent], range: DateRange) -> BTreeMap<StockId, BoundaryTotals> {
    if range.gate() == DisplayGate::NoBoundsSelected {
        return BTreeMap::new();
    }

    let mut by_item: BTreeMap<&StockId, Vec<&MoveEvent>> = BTreeMap::new();
    for event in scoped {
        by_item.entry(&event.stock_id).or_default().push(event);
    }

    by_item
        .into_iter()
        .map(|(stock_id, events)| {
            let totals = BoundaryTotals {
                before: range.from.map(|d| boundary_sum(events.iter().copied(), Cutoff::Before(d), None)),
                through: range.to.map(|d| boundary_sum(events.iter().copied(), Cutoff::Through(d), None)),
            };
            (stock_id.clone(), totals)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PageSize;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use stockledger_movements::TransactionType;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn mv(id: &str, stock: &str, loc: &str, date: NaiveDate, qty: i64, ty: TransactionType) -> MoveEvent {
        MoveEvent::new(id, stock, loc, Decimal::from(qty), ty, date)
    }

    fn item_x() -> Vec<MoveEvent> {
        vec![
            mv("3", "X", "WH1", day(1, 10), 15, TransactionType::Receipt),
            mv("1", "X", "WH1", day(1, 1), 100, TransactionType::Receipt),
            mv("2", "X", "WH1", day(1, 5), -30, TransactionType::Issue),
        ]
    }

    fn query(from: Option<NaiveDate>, to: Option<NaiveDate>) -> HistoryQuery {
        HistoryQuery {
            stock_id: Some("X".into()),
            range: DateRange::new(from, to),
            page: PageRequest::all(),
            ..HistoryQuery::default()
        }
    }

    fn balances(page: &HistoryPage) -> Vec<Decimal> {
        page.rows.iter().map(|r| r.running_balance).collect()
    }

    #[test]
    fn full_range_returns_replayed_rows_and_aggregates() {
        let page = history(&item_x(), &query(Some(day(1, 1)), Some(day(1, 10))));
        assert_eq!(page.gate, DisplayGate::FullHistory);
        assert_eq!(balances(&page), vec![Decimal::from(100), Decimal::from(70), Decimal::from(85)]);
        assert_eq!(page.qoh_before, Some(Decimal::ZERO));
        assert_eq!(page.qoh_after, Some(Decimal::from(85)));
        assert_eq!(page.total_count, 3);
    }

    #[test]
    fn balances_carry_history_from_before_the_range() {
        let page = history(&item_x(), &query(Some(day(1, 5)), Some(day(1, 10))));
        assert_eq!(page.qoh_before, Some(Decimal::from(100)));
        assert_eq!(balances(&page), vec![Decimal::from(70), Decimal::from(85)]);
    }

    #[test]
    fn single_bound_shows_aggregate_but_no_rows() {
        let only_from = history(&item_x(), &query(Some(day(1, 5)), None));
        assert_eq!(only_from.gate, DisplayGate::AggregatesOnly);
        assert!(only_from.rows.is_empty());
        assert_eq!(only_from.total_count, 0);
        assert_eq!(only_from.qoh_before, Some(Decimal::from(100)));
        assert_eq!(only_from.qoh_after, None);

        let only_to = history(&item_x(), &query(None, Some(day(1, 10))));
        assert!(only_to.rows.is_empty());
        assert_eq!(only_to.qoh_after, Some(Decimal::from(85)));
    }

    #[test]
    fn no_bounds_shows_nothing() {
        let page = history(&item_x(), &query(None, None));
        assert_eq!(page.gate, DisplayGate::NoBoundsSelected);
        assert!(page.rows.is_empty());
        assert_eq!(page.qoh_before, None);
        assert_eq!(page.qoh_after, None);
    }

    #[test]
    fn inverted_range_yields_no_rows() {
        let page = history(&item_x(), &query(Some(day(1, 10)), Some(day(1, 1))));
        assert!(page.rows.is_empty());
        assert_eq!(page.total_count, 0);
    }

    #[test]
    fn most_recent_first_keeps_balances() {
        let mut q = query(Some(day(1, 1)), Some(day(1, 31)));
        q.order = SortOrder::MostRecentFirst;
        let page = history(&item_x(), &q);
        assert_eq!(balances(&page), vec![Decimal::from(85), Decimal::from(70), Decimal::from(100)]);
    }

    #[test]
    fn location_filter_scopes_rows_and_aggregates() {
        let mut events = item_x();
        events.push(mv("4", "X", "WH2", day(1, 2), 500, TransactionType::Receipt));

        let mut q = query(Some(day(1, 1)), Some(day(1, 31)));
        q.location = Some("WH1".into());
        let page = history(&events, &q);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.qoh_after, Some(Decimal::from(85)));

        q.location = None;
        let page = history(&events, &q);
        assert_eq!(page.total_count, 4);
        assert_eq!(page.qoh_after, Some(Decimal::from(585)));
    }

    #[test]
    fn multi_item_history_keeps_per_item_balances() {
        let mut events = item_x();
        events.push(mv("4", "Y", "WH1", day(1, 2), 7, TransactionType::Receipt));

        let mut q = query(Some(day(1, 1)), Some(day(1, 31)));
        q.stock_id = None;
        let page = history(&events, &q);
        let seq: Vec<_> = page
            .rows
            .iter()
            .map(|r| (r.event.stock_id.as_str(), r.running_balance))
            .collect();
        assert_eq!(
            seq,
            vec![
                ("X", Decimal::from(100)),
                ("Y", Decimal::from(7)),
                ("X", Decimal::from(70)),
                ("X", Decimal::from(85)),
            ]
        );
    }

    #[test]
    fn unfiltered_aggregates_are_also_reported_per_item() {
        let mut events = item_x();
        events.push(mv("4", "Y", "WH1", day(1, 2), 7, TransactionType::Receipt));

        let mut q = query(Some(day(1, 5)), Some(day(1, 31)));
        q.stock_id = None;
        let page = history(&events, &q);

        assert_eq!(page.qoh_before, Some(Decimal::from(107)));
        assert_eq!(page.qoh_after, Some(Decimal::from(92)));
        assert_eq!(
            page.qoh_by_item[&StockId::from("X")],
            BoundaryTotals { before: Some(Decimal::from(100)), through: Some(Decimal::from(85)) }
        );
        assert_eq!(
            page.qoh_by_item[&StockId::from("Y")],
            BoundaryTotals { before: Some(Decimal::from(7)), through: Some(Decimal::from(7)) }
        );

        let none = history(&events, &query(None, None));
        assert!(none.qoh_by_item.is_empty());
    }

    #[test]
    fn pages_slice_the_ordered_rows() {
        let mut q = query(Some(day(1, 1)), Some(day(1, 31)));
        q.page = PageRequest::new(2, PageSize::Limited(2));
        let page = history(&item_x(), &q);
        assert_eq!(balances(&page), vec![Decimal::from(85)]);
        assert_eq!(page.total_count, 3);
        assert!(!page.has_more);
    }

    #[test]
    fn empty_source_degrades_to_empty_results() {
        let page = history(&[], &query(Some(day(1, 1)), Some(day(1, 31))));
        assert!(page.rows.is_empty());
        assert_eq!(page.qoh_before, Some(Decimal::ZERO));
        assert_eq!(page.qoh_after, Some(Decimal::ZERO));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: the last visible running balance equals the aggregate
        /// through the range end, for a single item.
        #[test]
        fn last_row_agrees_with_qoh_after(
            specs in prop::collection::vec((1u32..28, -100i64..100), 1..30),
            from in 1u32..14,
            to in 14u32..28,
        ) {
            let events: Vec<MoveEvent> = specs
                .into_iter()
                .enumerate()
                .map(|(i, (d, q))| mv(&i.to_string(), "X", "WH1", day(6, d), q, TransactionType::Other))
                .collect();
            let page = history(&events, &query(Some(day(6, from)), Some(day(6, to))));

            if let Some(last) = page.rows.last() {
                prop_assert_eq!(Some(last.running_balance), page.qoh_after);
                prop_assert_eq!(
                    boundary_sum(&events, Cutoff::Through(last.event.transaction_date), None),
                    last.running_balance
                );
            }
        }
    }
}
