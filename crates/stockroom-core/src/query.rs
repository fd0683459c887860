//! # Query/Filter Engine
//!
//! Pure read-side projections over a Catalog or Ledger snapshot.
//!
//! ## Projections
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Catalog view                                                           │
//! │    items ──► category (exact | All) ──► search (name or id) ──► sort    │
//! │                                                         none/asc/desc   │
//! │                                                                         │
//! │  Ledger view                                                            │
//! │    transactions ──► type (exact | All) ──► date range ──► date desc     │
//! │                                                                         │
//! │  Dashboard                                                              │
//! │    InventorySummary, low_stock_items, recent_issues                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is deterministic: equal inputs give equal output
//! order. All sorts are stable.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::types::{Category, Item, Transaction, TransactionType};
use crate::validation::ValidationResult;
use crate::DEFAULT_RECENT_ISSUES;

// =============================================================================
// Catalog View
// =============================================================================

/// Name ordering for the catalog view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Keep store order.
    #[default]
    Unsorted,
    NameAsc,
    NameDesc,
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(SortOrder::Unsorted),
            "name-asc" | "asc" => Ok(SortOrder::NameAsc),
            "name-desc" | "desc" => Ok(SortOrder::NameDesc),
            _ => Err(ValidationError::not_allowed(
                "sort",
                ["none", "name-asc", "name-desc"],
            )),
        }
    }
}

/// Catalog filter. `None` fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub category: Option<Category>,
    pub search_text: Option<String>,
}

impl CatalogFilter {
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(category) = self.category {
            if item.category != category {
                return false;
            }
        }

        match self.search_text.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                item.name.to_lowercase().contains(&needle) || item.id.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

/// Compares names the way a person reading a list expects.
///
/// Letters compare case-insensitively first; on a tie, lowercase sorts
/// before uppercase (`"oil" < "Oil"`).
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);

    folded_a.cmp(folded_b).then_with(|| {
        a.chars()
            .map(char::is_uppercase)
            .cmp(b.chars().map(char::is_uppercase))
    })
}

/// Filters and orders catalog items.
///
/// ## Example
/// ```rust
/// use stockroom_core::query::{filter_items, CatalogFilter, SortOrder};
/// use stockroom_core::types::Category;
///
/// let filter = CatalogFilter {
///     category: Some(Category::Pantry),
///     search_text: Some("oil".into()),
/// };
/// let visible = filter_items(&[], &filter, SortOrder::NameAsc);
/// assert!(visible.is_empty());
/// ```
pub fn filter_items<'a>(
    items: &'a [Item],
    filter: &CatalogFilter,
    sort: SortOrder,
) -> Vec<&'a Item> {
    let mut visible: Vec<&Item> = items.iter().filter(|i| filter.matches(i)).collect();

    match sort {
        SortOrder::Unsorted => {}
        SortOrder::NameAsc => visible.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortOrder::NameDesc => visible.sort_by(|a, b| compare_names(&b.name, &a.name)),
    }

    visible
}

// =============================================================================
// Ledger View
// =============================================================================

/// Ledger filter. Dates are calendar days in UTC; both bounds inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerFilter {
    pub kind: Option<TransactionType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| Utc.from_utc_datetime(&midnight))
}

impl LedgerFilter {
    /// `date >= start 00:00` and `date < (end + 1 day) 00:00`.
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(kind) = self.kind {
            if tx.kind != kind {
                return false;
            }
        }

        if let Some(start) = self.start_date.and_then(start_of_day) {
            if tx.date < start {
                return false;
            }
        }

        // An end date with no following day leaves the upper side open.
        if let Some(end) = self
            .end_date
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .and_then(start_of_day)
        {
            if tx.date >= end {
                return false;
            }
        }

        true
    }
}

/// Human-readable filter label for report headers.
impl fmt::Display for LedgerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "{}", kind)?,
            None => write!(f, "All")?,
        }
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => write!(f, " | {} to {}", start, end),
            (Some(start), None) => write!(f, " | from {}", start),
            (None, Some(end)) => write!(f, " | until {}", end),
            (None, None) => Ok(()),
        }
    }
}

/// Filters transactions and orders them newest first.
///
/// Entries with equal dates keep their input order.
pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    filter: &LedgerFilter,
) -> Vec<&'a Transaction> {
    let mut visible: Vec<&Transaction> =
        transactions.iter().filter(|tx| filter.matches(tx)).collect();
    visible.sort_by(|a, b| b.date.cmp(&a.date));
    visible
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(field: &str, input: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        }
    })
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline counts for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total_items: usize,
    pub low_stock_count: usize,
    /// One entry per category, in `Category::ALL` order.
    pub per_category: Vec<(Category, usize)>,
}

impl InventorySummary {
    pub fn from_items(items: &[Item]) -> Self {
        InventorySummary {
            total_items: items.len(),
            low_stock_count: items.iter().filter(|i| i.is_low_stock()).count(),
            per_category: Category::ALL
                .into_iter()
                .map(|c| (c, items.iter().filter(|i| i.category == c).count()))
                .collect(),
        }
    }
}

/// Items at or below their min level, in catalog order.
pub fn low_stock_items(items: &[Item]) -> Vec<&Item> {
    items.iter().filter(|i| i.is_low_stock()).collect()
}

/// The latest `limit` Issue entries, newest first.
///
/// `None` uses the dashboard default of five.
pub fn recent_issues(transactions: &[Transaction], limit: Option<usize>) -> Vec<&Transaction> {
    let filter = LedgerFilter {
        kind: Some(TransactionType::Issue),
        ..LedgerFilter::default()
    };
    let mut issues = filter_transactions(transactions, &filter);
    issues.truncate(limit.unwrap_or(DEFAULT_RECENT_ISSUES));
    issues
}

// =============================================================================
// Unit Tests
// =============================================================================
