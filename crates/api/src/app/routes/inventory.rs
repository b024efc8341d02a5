use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockledger_projections::HistoryQuery;

use crate::app::{dto, errors};
use crate::service::InventoryLedgerService;

pub fn router() -> Router {
    Router::new()
        .route("/history", get(get_history))
        .route("/transfers", get(get_transfers))
        .route("/adjustments", get(get_adjustments))
}

/// GET /inventory/history?stock_id=X&location=WH1&from=2024-01-01&to=2024-01-31
///
/// Rows are only returned when both `from` and `to` are set; with one bound
/// only the matching aggregate is filled in.
///
/// Query parameters:
/// - `category`: all (default), transfers, adjustments, receipt, issue, other
/// - `order`: asc (default) or desc
/// - `page`, `page_size`: 1-based paging (`page_size=0` returns every row)
pub async fn get_history(
    Extension(service): Extension<Arc<InventoryLedgerService>>,
    Query(params): Query<dto::HistoryParams>,
) -> axum::response::Response {
    let filter = match params.filter() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let query = HistoryQuery {
        stock_id: filter.stock_id,
        location: filter.location,
        range: filter.range,
        category: filter.category,
        order: filter.order,
        page: service.page_request(filter.page, filter.page_size),
    };

    Json(service.get_history(query).await).into_response()
}

/// GET /inventory/transfers?reference=TR-1
///
/// Without a reference, every transfer in the source is listed.
pub async fn get_transfers(
    Extension(service): Extension<Arc<InventoryLedgerService>>,
    Query(params): Query<dto::TransferParams>,
) -> axum::response::Response {
    let reference = params
        .reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());

    let served = match reference {
        Some(reference) => service.get_transfer_detail(reference).await,
        None => service.list_transfers().await,
    };
    Json(served).into_response()
}

/// GET /inventory/adjustments?reference=ADJ&stock_id=X&order=desc
///
/// `reference` matches by prefix and wins over `stock_id`.
pub async fn get_adjustments(
    Extension(service): Extension<Arc<InventoryLedgerService>>,
    Query(params): Query<dto::AdjustmentParams>,
) -> axum::response::Response {
    let order = match params.order() {
        Ok(o) => o,
        Err(e) => return errors::domain_error_to_response(e),
    };

    Json(service.get_adjustment_detail(&params.selector(), order).await).into_response()
}
