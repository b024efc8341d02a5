//! Ledger derivations over normalized movement events.
//!
//! Every function here is pure: it reads a slice of [`MoveEvent`]s (plus lookup
//! tables where display values are needed) and returns freshly derived rows.
//! Nothing is cached; callers recompute on every query.
//!
//! [`MoveEvent`]: stockledger_movements::MoveEvent

pub mod adjustments;
pub mod boundary;
pub mod filter;
pub mod history;
pub mod replay;
pub mod transfers;

pub use adjustments::{AdjustmentRecord, AdjustmentSelector, resolve_adjustments};
pub use boundary::{BoundaryTotals, Cutoff, boundary_sum, boundary_totals};
pub use filter::{Category, DateRange, DisplayGate, Page, PageRequest, PageSize, paginate};
pub use history::{HistoryPage, HistoryQuery, history};
pub use replay::{LedgerRow, SortOrder, replay, replay_by_stock};
pub use transfers::{TransferRecord, resolve_all_transfers, resolve_transfers};
