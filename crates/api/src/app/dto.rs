use chrono::NaiveDate;
use serde::Deserialize;

use stockledger_core::{DomainError, DomainResult, LocationCode, StockId};
use stockledger_movements::normalize::parse_day;
use stockledger_projections::{AdjustmentSelector, Category, DateRange, SortOrder};

// -------------------------
// Query parameters
// -------------------------

/// Blank values are treated as absent throughout.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub stock_id: Option<String>,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransferParams {
    pub reference: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdjustmentParams {
    pub reference: Option<String>,
    pub stock_id: Option<String>,
    pub order: Option<String>,
}

/// Parsed history parameters. Paging is left raw; the service applies its own limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFilter {
    pub stock_id: Option<StockId>,
    pub location: Option<LocationCode>,
    pub range: DateRange,
    pub category: Category,
    pub order: SortOrder,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl HistoryParams {
    pub fn filter(&self) -> DomainResult<HistoryFilter> {
        let category = match present(&self.category) {
            Some(raw) => raw.parse()?,
            None => Category::All,
        };
        Ok(HistoryFilter {
            stock_id: present(&self.stock_id).map(StockId::new),
            location: present(&self.location).map(LocationCode::new),
            range: DateRange::new(parse_date("from", &self.from)?, parse_date("to", &self.to)?),
            category,
            order: parse_order(&self.order)?,
            page: parse_count("page", &self.page)?,
            page_size: parse_count("page_size", &self.page_size)?,
        })
    }
}

impl AdjustmentParams {
    pub fn selector(&self) -> AdjustmentSelector {
        match (present(&self.reference), present(&self.stock_id)) {
            (Some(reference), _) => AdjustmentSelector::by_reference(reference),
            (None, Some(stock)) => AdjustmentSelector::by_stock(stock),
            (None, None) => AdjustmentSelector::default(),
        }
    }

    pub fn order(&self) -> DomainResult<SortOrder> {
        parse_order(&self.order)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(name: &str, value: &Option<String>) -> DomainResult<Option<NaiveDate>> {
    match present(value) {
        None => Ok(None),
        Some(raw) => parse_day(raw)
            .map(Some)
            .ok_or_else(|| DomainError::validation(format!("{name} is not a date: {raw}"))),
    }
}

fn parse_count(name: &str, value: &Option<String>) -> DomainResult<Option<u32>> {
    match present(value) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            DomainError::validation(format!("{name} must be a non-negative integer: {raw}"))
        }),
    }
}

fn parse_order(value: &Option<String>) -> DomainResult<SortOrder> {
    match present(value).map(str::to_ascii_lowercase).as_deref() {
        None | Some("asc") | Some("ascending") => Ok(SortOrder::Ascending),
        Some("desc") | Some("most_recent_first") => Ok(SortOrder::MostRecentFirst),
        Some(other) => Err(DomainError::validation(format!(
            "order must be one of: asc, desc (got {other})"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockledger_movements::TransactionType;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn blank_parameters_are_absent() {
        let params = HistoryParams {
            stock_id: some("  "),
            from: some(""),
            ..HistoryParams::default()
        };
        let filter = params.filter().unwrap();
        assert_eq!(filter.stock_id, None);
        assert_eq!(filter.range, DateRange::default());
        assert_eq!(filter.order, SortOrder::Ascending);
    }

    #[test]
    fn history_parameters_are_parsed() {
        let params = HistoryParams {
            stock_id: some("X"),
            location: some("WH1"),
            from: some("2024-01-01"),
            to: some("2024-01-31 00:00:00"),
            category: some("receipt"),
            order: some("DESC"),
            ..HistoryParams::default()
        };
        let filter = params.filter().unwrap();
        assert_eq!(filter.stock_id, Some(StockId::from("X")));
        assert_eq!(filter.location, Some(LocationCode::from("WH1")));
        assert_eq!(filter.range.to, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(filter.category, Category::Type(TransactionType::Receipt));
        assert_eq!(filter.order, SortOrder::MostRecentFirst);
        assert_eq!((filter.page, filter.page_size), (None, None));

        let paged = HistoryParams { page: some("3"), page_size: some(" 25 "), ..HistoryParams::default() };
        let filter = paged.filter().unwrap();
        assert_eq!((filter.page, filter.page_size), (Some(3), Some(25)));
    }

    #[test]
    fn malformed_values_are_validation_errors() {
        let bad_date = HistoryParams { from: some("yesterday"), ..HistoryParams::default() };
        assert!(matches!(bad_date.filter(), Err(DomainError::Validation(_))));

        let bad_size = HistoryParams { page_size: some("lots"), ..HistoryParams::default() };
        assert!(matches!(bad_size.filter(), Err(DomainError::Validation(_))));

        let negative_page = HistoryParams { page: some("-1"), ..HistoryParams::default() };
        assert!(matches!(negative_page.filter(), Err(DomainError::Validation(_))));

        let bad_order = AdjustmentParams { order: some("sideways"), ..AdjustmentParams::default() };
        assert!(bad_order.order().is_err());
    }

    #[test]
    fn reference_takes_precedence_over_stock() {
        let params = AdjustmentParams {
            reference: some("ADJ"),
            stock_id: some("X"),
            order: None,
        };
        assert_eq!(params.selector(), AdjustmentSelector::by_reference("ADJ"));
    }
}
