//! Selection, date-range gating and pagination of derived rows.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, LocationCode};
use stockledger_movements::{MoveEvent, TransactionType};

/// Which kind of movement a view is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Generic history: every movement.
    #[default]
    All,
    Transfers,
    Adjustments,
    Type(TransactionType),
}

impl Category {
    pub fn admits(&self, event: &MoveEvent) -> bool {
        match self {
            Category::All => true,
            Category::Transfers => event.transaction_type == TransactionType::Transfer,
            Category::Adjustments => event.transaction_type == TransactionType::Adjustment,
            Category::Type(t) => event.transaction_type == *t,
        }
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Category::All),
            "transfer" | "transfers" => Ok(Category::Transfers),
            "adjustment" | "adjustments" => Ok(Category::Adjustments),
            "receipt" | "receipts" => Ok(Category::Type(TransactionType::Receipt)),
            "issue" | "issues" => Ok(Category::Type(TransactionType::Issue)),
            "other" => Ok(Category::Type(TransactionType::Other)),
            other => Err(DomainError::validation(format!("unknown category: {other}"))),
        }
    }
}

/// Exact location equality; `None` admits every location.
pub fn location_matches(event: &MoveEvent, location: Option<&LocationCode>) -> bool {
    location.is_none_or(|loc| &event.location_code == loc)
}

/// What a history view may show, derived purely from which bounds are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayGate {
    NoBoundsSelected,
    AggregatesOnly,
    FullHistory,
}

impl DisplayGate {
    pub fn shows_rows(self) -> bool {
        self == DisplayGate::FullHistory
    }
}

/// Inclusive, day-granularity date range with optional bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// `from <= date <= to`; an unset bound is open.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| from <= date) && self.to.is_none_or(|to| date <= to)
    }

    pub fn gate(&self) -> DisplayGate {
        match (self.from, self.to) {
            (Some(_), Some(_)) => DisplayGate::FullHistory,
            (None, None) => DisplayGate::NoBoundsSelected,
            _ => DisplayGate::AggregatesOnly,
        }
    }
}

/// Rows per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    Limited(u32),
    Unlimited,
}

impl PageSize {
    /// `0` signals "no limit".
    pub fn from_raw(size: u32) -> Self {
        if size == 0 { PageSize::Unlimited } else { PageSize::Limited(size) }
    }

    /// Cap a limited size at `max`; unlimited stays unlimited.
    pub fn capped(self, max: u32) -> Self {
        match self {
            PageSize::Limited(n) => PageSize::Limited(n.min(max.max(1))),
            PageSize::Unlimited => PageSize::Unlimited,
        }
    }
}

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: PageSize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: PageSize::Limited(50),
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: PageSize) -> Self {
        Self {
            page: page.max(1),
            size,
        }
    }

    pub fn all() -> Self {
        Self::new(1, PageSize::Unlimited)
    }
}

/// One page of an ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Rows across all pages.
    pub total: usize,
    pub page: u32,
    pub has_more: bool,
}

/// Slice an already filtered and ordered sequence.
pub fn paginate<T>(rows: Vec<T>, request: PageRequest) -> Page<T> {
    let total = rows.len();
    let page = request.page.max(1);

    let (items, has_more) = match request.size {
        PageSize::Unlimited => (rows, false),
        PageSize::Limited(size) => {
            let size = size.max(1) as usize;
            let offset = (page as usize - 1).saturating_mul(size);
            let items: Vec<T> = rows.into_iter().skip(offset).take(size).collect();
            (items, offset.saturating_add(size) < total)
        }
    };

    Page {
        items,
        total,
        page,
        has_more,
    }
}
