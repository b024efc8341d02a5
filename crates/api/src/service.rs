//! Query facade over the movement ledger.
//!
//! Every call loads a fresh snapshot from the source and derives its answer;
//! nothing is cached between calls.

use std::sync::Arc;

use serde::Serialize;

use stockledger_projections::{
    AdjustmentRecord, AdjustmentSelector, HistoryPage, HistoryQuery, PageRequest, PageSize, SortOrder,
    TransferRecord, history, resolve_adjustments, resolve_all_transfers, resolve_transfers,
};

use crate::config::LedgerSettings;
use crate::source::{MoveSource, MovementSnapshot, SourcePart, load_snapshot};

/// A derived result plus whether the source was only partially available.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Served<T> {
    pub data: T,
    pub source_degraded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<SourcePart>,
}

impl<T> Served<T> {
    fn from_snapshot(snapshot: &MovementSnapshot, data: T) -> Self {
        Self {
            data,
            source_degraded: snapshot.is_degraded(),
            missing: snapshot.missing.clone(),
        }
    }
}

pub struct InventoryLedgerService {
    source: Arc<dyn MoveSource>,
    settings: LedgerSettings,
}

impl InventoryLedgerService {
    pub fn new(source: Arc<dyn MoveSource>, settings: LedgerSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Page request from optional caller values, applying configured default and cap.
    pub fn page_request(&self, page: Option<u32>, page_size: Option<u32>) -> PageRequest {
        let size = page_size
            .map(PageSize::from_raw)
            .unwrap_or(self.settings.default_page_size)
            .capped(self.settings.max_page_size);
        PageRequest::new(page.unwrap_or(1), size)
    }

    async fn snapshot(&self) -> MovementSnapshot {
        load_snapshot(&*self.source, self.settings.placeholders.clone()).await
    }

    /// Ledger rows with running balances plus boundary aggregates.
    pub async fn get_history(&self, mut query: HistoryQuery) -> Served<HistoryPage> {
        query.page.size = query.page.size.capped(self.settings.max_page_size);
        let snapshot = self.snapshot().await;
        let page = history(&snapshot.events, &query);

        tracing::debug!(
            stock_id = ?query.stock_id,
            gate = ?page.gate,
            rows = page.rows.len(),
            total = page.total_count,
            "history served"
        );
        Served::from_snapshot(&snapshot, page)
    }

    pub async fn get_transfer_detail(&self, reference: &str) -> Served<Vec<TransferRecord>> {
        let snapshot = self.snapshot().await;
        let transfers = resolve_transfers(&snapshot.events, reference, &snapshot.lookups);
        Served::from_snapshot(&snapshot, transfers)
    }

    pub async fn list_transfers(&self) -> Served<Vec<TransferRecord>> {
        let snapshot = self.snapshot().await;
        let transfers = resolve_all_transfers(&snapshot.events, &snapshot.lookups);
        Served::from_snapshot(&snapshot, transfers)
    }

    pub async fn get_adjustment_detail(
        &self,
        selector: &AdjustmentSelector,
        order: SortOrder,
    ) -> Served<Vec<AdjustmentRecord>> {
        let snapshot = self.snapshot().await;
        let adjustments = resolve_adjustments(&snapshot.events, selector, &snapshot.lookups, order);
        Served::from_snapshot(&snapshot, adjustments)
    }
}
