//! Receipt persistence and spending analytics.

pub mod analytics;
mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use analytics::{
    CategorySpending, CategorySpendingItem, CategorySummary, DashboardSummary, ItemSpend,
    MerchantFrequency, MerchantSummary, MerchantVisits, SpendingTrends, TrendPeriod, TrendPoint,
};
pub use memory::InMemoryReceiptRepository;

use crate::error::RepositoryError;
use crate::models::receipt::{Receipt, ReceiptItem};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;

/// Inclusive date window. Either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether a receipt date falls inside the window. Undated receipts only
    /// match an unbounded window.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// Receipt listing query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive substring of the merchant name.
    pub merchant: Option<String>,
    /// 1-based page number. 0 means the first page.
    pub page: usize,
    /// Page size. 0 means the default; values above the maximum are clamped.
    pub limit: usize,
}

impl ReceiptFilter {
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    pub fn limit(&self) -> usize {
        page_limit(self.limit)
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    pub fn matches(&self, receipt: &Receipt) -> bool {
        let merchant_ok = match self.merchant.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => receipt
                .merchant
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        };
        merchant_ok && self.range().contains(receipt.date)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_items: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub limit: usize,
}

/// 0 means the default; anything above the maximum is capped.
fn page_limit(limit: usize) -> usize {
    match limit {
        0 => DEFAULT_PAGE_LIMIT,
        n => n.min(MAX_PAGE_LIMIT),
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Cut one page out of an already ordered result set.
    ///
    /// Page numbers start at 1; `page` and `limit` are normalized the same
    /// way as in [`ReceiptFilter`].
    pub fn slice(all: Vec<T>, page: usize, limit: usize) -> Self {
        let page = page.max(1);
        let limit = page_limit(limit);
        let total_items = all.len();
        let total_pages = total_items.div_ceil(limit);
        let data = all
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Self {
            data,
            pagination: Pagination {
                total_items,
                total_pages,
                current_page: page,
                limit,
            },
        }
    }
}

/// Receipt storage.
///
/// Analytics have default implementations computed over [`ReceiptRepository::all`];
/// a database-backed store would push them down into queries.
#[async_trait]
pub trait ReceiptRepository: Send + Sync {
    /// Store a new receipt and return it with ids assigned.
    async fn create(&self, receipt: Receipt) -> Result<Receipt>;

    async fn get(&self, id: &str) -> Result<Receipt>;

    /// Replace an existing receipt.
    async fn update(&self, receipt: Receipt) -> Result<Receipt>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Filtered listing, newest receipt date first.
    async fn list(&self, filter: &ReceiptFilter) -> Result<Page<Receipt>>;

    async fn items(&self, id: &str) -> Result<Vec<ReceiptItem>>;

    /// Every stored receipt, in no particular order.
    async fn all(&self) -> Result<Vec<Receipt>>;

    async fn dashboard_summary(&self, range: &DateRange) -> Result<DashboardSummary> {
        Ok(analytics::dashboard_summary(&self.all().await?, range))
    }

    async fn spending_trends(
        &self,
        period: TrendPeriod,
        range: &DateRange,
    ) -> Result<SpendingTrends> {
        Ok(analytics::spending_trends(&self.all().await?, period, range))
    }

    async fn spending_by_category(&self, range: &DateRange) -> Result<CategorySpending> {
        Ok(analytics::spending_by_category(&self.all().await?, range))
    }

    async fn merchant_frequency(
        &self,
        range: &DateRange,
        limit: usize,
    ) -> Result<MerchantFrequency> {
        Ok(analytics::merchant_frequency(&self.all().await?, range, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new(Some(ymd(2024, 1, 1)), Some(ymd(2024, 1, 31)));
        assert!(range.contains(Some(ymd(2024, 1, 1))));
        assert!(range.contains(Some(ymd(2024, 1, 31))));
        assert!(!range.contains(Some(ymd(2024, 2, 1))));
        assert!(!range.contains(None));
        assert!(DateRange::default().contains(None));
    }

    #[test]
    fn test_filter_limits() {
        let filter = ReceiptFilter::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.limit(), 10);

        let filter = ReceiptFilter {
            page: 3,
            limit: 500,
            ..ReceiptFilter::default()
        };
        assert_eq!(filter.page(), 3);
        assert_eq!(filter.limit(), 100);
    }

    #[test]
    fn test_page_slice() {
        let page = Page::slice((1..=25).collect::<Vec<_>>(), 3, 10);
        assert_eq!(page.data, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.pagination.total_pages, 3);

        let empty = Page::slice((1..=5).collect::<Vec<_>>(), 4, 10);
        assert!(empty.data.is_empty());
        assert_eq!(empty.pagination.total_items, 5);
    }

    #[test]
    fn test_page_slice_normalizes_arguments() {
        let first = Page::slice((1..=25).collect::<Vec<_>>(), 0, 0);
        assert_eq!(first.data, (1..=10).collect::<Vec<_>>());
        assert_eq!(first.pagination.current_page, 1);
        assert_eq!(first.pagination.limit, 10);
        assert_eq!(first.pagination.total_pages, 3);

        let capped = Page::slice((1..=250).collect::<Vec<_>>(), 1, 1000);
        assert_eq!(capped.data.len(), 100);
        assert_eq!(capped.pagination.total_pages, 3);
    }
}
