//! Spending analytics over a set of receipts.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DateRange;
use crate::error::RepositoryError;
use crate::models::invoice::Category;
use crate::models::receipt::Receipt;

const TOP_N: usize = 5;
pub const DEFAULT_MERCHANT_LIMIT: usize = 10;
pub const MAX_MERCHANT_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spend: Decimal,
    pub receipt_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_spend: Decimal,
    pub top_categories: Vec<CategorySummary>,
    pub top_merchants: Vec<MerchantSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantSummary {
    pub merchant: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
}

/// Bucket size for spending trends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl TrendPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendPeriod::Daily => "daily",
            TrendPeriod::Weekly => "weekly",
            TrendPeriod::Monthly => "monthly",
            TrendPeriod::Yearly => "yearly",
        }
    }

    /// Bucket label for a date. Weeks are ISO weeks.
    pub fn label(&self, date: chrono::NaiveDate) -> String {
        let fmt = match self {
            TrendPeriod::Daily => "%Y-%m-%d",
            TrendPeriod::Weekly => "%G-%V",
            TrendPeriod::Monthly => "%Y-%m",
            TrendPeriod::Yearly => "%Y",
        };
        date.format(fmt).to_string()
    }
}

impl FromStr for TrendPeriod {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(TrendPeriod::Daily),
            "weekly" => Ok(TrendPeriod::Weekly),
            "monthly" => Ok(TrendPeriod::Monthly),
            "yearly" => Ok(TrendPeriod::Yearly),
            other => Err(RepositoryError::InvalidQuery(format!(
                "unknown trend period {:?}, expected daily, weekly, monthly or yearly",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingTrends {
    pub period: TrendPeriod,
    pub data: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub categories: Vec<CategorySpendingItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpendingItem {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
    /// Top items in this category by spend.
    pub items: Vec<ItemSpend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSpend {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spent: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantFrequency {
    pub total_visits: usize,
    pub merchants: Vec<MerchantVisits>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantVisits {
    pub name: String,
    pub visits: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_spent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
}

fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part.checked_div(whole)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|p| p.round_dp(2))
            .unwrap_or(Decimal::ZERO)
    }
}

/// Accumulate without panicking on stored amounts near the `Decimal` bounds.
fn add_to(total: &mut Decimal, amount: Decimal) {
    *total = total.saturating_add(amount);
}

fn in_range<'a>(receipts: &'a [Receipt], range: &'a DateRange) -> impl Iterator<Item = &'a Receipt> {
    receipts.iter().filter(move |r| range.contains(r.date))
}

fn category_name(category: &str) -> String {
    if category.trim().is_empty() {
        Category::Other.as_str().to_string()
    } else {
        category.to_string()
    }
}

/// Sort `(name, amount)` pairs by amount descending, then name.
fn ranked(totals: HashMap<String, Decimal>) -> Vec<(String, Decimal)> {
    let mut ranked: Vec<_> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Totals, averages and the top categories and merchants.
pub fn dashboard_summary(receipts: &[Receipt], range: &DateRange) -> DashboardSummary {
    let mut total_spend = Decimal::ZERO;
    let mut receipt_count = 0;
    let mut by_category: HashMap<String, Decimal> = HashMap::new();
    let mut by_merchant: HashMap<String, Decimal> = HashMap::new();

    for receipt in in_range(receipts, range) {
        total_spend = total_spend.saturating_add(receipt.total);
        receipt_count += 1;
        add_to(by_merchant.entry(receipt.merchant.clone()).or_default(), receipt.total);

        for item in &receipt.items {
            add_to(by_category.entry(category_name(&item.category)).or_default(), item.amount());
        }
    }

    let average_spend = if receipt_count > 0 {
        (total_spend / Decimal::from(receipt_count)).round_dp(2)
    } else {
        Decimal::ZERO
    };

    DashboardSummary {
        total_spend,
        receipt_count,
        average_spend,
        top_categories: ranked(by_category)
            .into_iter()
            .take(TOP_N)
            .map(|(category, amount)| CategorySummary {
                category,
                amount,
                percentage: percentage(amount, total_spend),
            })
            .collect(),
        top_merchants: ranked(by_merchant)
            .into_iter()
            .take(TOP_N)
            .map(|(merchant, amount)| MerchantSummary {
                merchant,
                amount,
                percentage: percentage(amount, total_spend),
            })
            .collect(),
    }
}

/// Spend per period bucket, oldest first. Undated receipts are skipped.
pub fn spending_trends(receipts: &[Receipt], period: TrendPeriod, range: &DateRange) -> SpendingTrends {
    let mut buckets: HashMap<String, Decimal> = HashMap::new();

    for receipt in in_range(receipts, range) {
        if let Some(date) = receipt.date {
            add_to(buckets.entry(period.label(date)).or_default(), receipt.total);
        }
    }

    let mut data: Vec<_> = buckets
        .into_iter()
        .map(|(date, amount)| TrendPoint { date, amount })
        .collect();
    data.sort_by(|a, b| a.date.cmp(&b.date));

    SpendingTrends { period, data }
}

/// Spend per item category with the top items in each.
pub fn spending_by_category(receipts: &[Receipt], range: &DateRange) -> CategorySpending {
    let mut total = Decimal::ZERO;
    let mut by_category: HashMap<String, Decimal> = HashMap::new();
    let mut by_item: HashMap<String, HashMap<String, (Decimal, usize)>> = HashMap::new();

    for receipt in in_range(receipts, range) {
        total = total.saturating_add(receipt.total);

        for item in &receipt.items {
            let category = category_name(&item.category);
            let amount = item.amount();
            add_to(by_category.entry(category.clone()).or_default(), amount);

            let entry = by_item
                .entry(category)
                .or_default()
                .entry(item.name.clone())
                .or_default();
            add_to(&mut entry.0, amount);
            entry.1 += 1;
        }
    }

    let categories = ranked(by_category)
        .into_iter()
        .map(|(name, amount)| {
            let mut items: Vec<_> = by_item
                .remove(&name)
                .unwrap_or_default()
                .into_iter()
                .map(|(name, (total_spent, count))| ItemSpend {
                    name,
                    total_spent,
                    count,
                })
                .collect();
            items.sort_by(|a, b| {
                b.total_spent
                    .cmp(&a.total_spent)
                    .then_with(|| a.name.cmp(&b.name))
            });
            items.truncate(TOP_N);

            CategorySpendingItem {
                percentage: percentage(amount, total),
                name,
                amount,
                items,
            }
        })
        .collect();

    CategorySpending { total, categories }
}

/// Most visited merchants. `limit` 0 means the default; it is capped at 50.
pub fn merchant_frequency(receipts: &[Receipt], range: &DateRange, limit: usize) -> MerchantFrequency {
    let limit = match limit {
        0 => DEFAULT_MERCHANT_LIMIT,
        n => n.min(MAX_MERCHANT_LIMIT),
    };

    let mut total_visits = 0;
    let mut by_merchant: HashMap<String, (usize, Decimal)> = HashMap::new();

    for receipt in in_range(receipts, range) {
        total_visits += 1;
        let entry = by_merchant.entry(receipt.merchant.clone()).or_default();
        entry.0 += 1;
        add_to(&mut entry.1, receipt.total);
    }

    let mut merchants: Vec<_> = by_merchant
        .into_iter()
        .map(|(name, (visits, total_spent))| MerchantVisits {
            name,
            visits,
            total_spent,
            average_spent: (total_spent / Decimal::from(visits)).round_dp(2),
            percentage: percentage(Decimal::from(visits), Decimal::from(total_visits)),
        })
        .collect();
    merchants.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.name.cmp(&b.name)));
    merchants.truncate(limit);

    MerchantFrequency {
        total_visits,
        merchants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receipt::ReceiptItem;
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn item(name: &str, qty: u32, price: i64, category: &str) -> ReceiptItem {
        ReceiptItem {
            id: String::new(),
            name: name.to_string(),
            quantity: qty,
            price: Decimal::from(price),
            currency: String::new(),
            category: category.to_string(),
        }
    }

    fn receipt(merchant: &str, date: Option<NaiveDate>, total: i64, items: Vec<ReceiptItem>) -> Receipt {
        let now = Utc::now();
        Receipt {
            id: String::new(),
            user_id: "u1".to_string(),
            merchant: merchant.to_string(),
            date,
            total: Decimal::from(total),
            tax: Decimal::ZERO,
            subtotal: Decimal::from(total),
            items,
            image_url: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn fixture() -> Vec<Receipt> {
        vec![
            receipt("Grab", ymd(2024, 1, 2), 20, vec![item("Ride", 2, 10, "Transport")]),
            receipt("Grab", ymd(2024, 1, 9), 30, vec![item("Ride", 1, 30, "Transport")]),
            receipt(
                "Warung Sari",
                ymd(2024, 2, 14),
                50,
                vec![item("Nasi goreng", 2, 15, "Food"), item("Es teh", 4, 5, "")],
            ),
            receipt("Hotel Nusa", None, 100, vec![item("Room", 1, 100, "Accommodation")]),
        ]
    }

    #[test]
    fn test_dashboard_summary() {
        let summary = dashboard_summary(&fixture(), &DateRange::default());

        assert_eq!(summary.total_spend, Decimal::from(200));
        assert_eq!(summary.receipt_count, 4);
        assert_eq!(summary.average_spend, Decimal::from(50));
        assert_eq!(summary.top_categories[0].category, "Accommodation");
        assert_eq!(summary.top_categories[0].percentage, Decimal::from(50));
        assert_eq!(summary.top_merchants[0].merchant, "Hotel Nusa");
        assert_eq!(summary.top_merchants[1].merchant, "Grab");
        assert_eq!(summary.top_merchants[1].amount, Decimal::from(50));
    }

    #[test]
    fn test_dashboard_range_excludes_undated() {
        let range = DateRange::new(ymd(2024, 1, 1), ymd(2024, 1, 31));
        let summary = dashboard_summary(&fixture(), &range);

        assert_eq!(summary.receipt_count, 2);
        assert_eq!(summary.total_spend, Decimal::from(50));
        assert_eq!(summary.top_merchants.len(), 1);
    }

    #[test]
    fn test_spending_trends() {
        let receipts = fixture();

        let monthly = spending_trends(&receipts, TrendPeriod::Monthly, &DateRange::default());
        assert_eq!(
            monthly.data,
            vec![
                TrendPoint { date: "2024-01".to_string(), amount: Decimal::from(50) },
                TrendPoint { date: "2024-02".to_string(), amount: Decimal::from(50) },
            ]
        );

        let weekly = spending_trends(&receipts, TrendPeriod::Weekly, &DateRange::default());
        let labels: Vec<_> = weekly.data.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(labels, vec!["2024-01", "2024-02", "2024-07"]);

        let yearly = spending_trends(&receipts, TrendPeriod::Yearly, &DateRange::default());
        assert_eq!(yearly.data.len(), 1);
        assert_eq!(yearly.data[0].amount, Decimal::from(100));
    }

    #[test]
    fn test_trend_period_parse() {
        assert_eq!("Weekly".parse::<TrendPeriod>().unwrap(), TrendPeriod::Weekly);
        assert!(matches!(
            "hourly".parse::<TrendPeriod>(),
            Err(RepositoryError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_spending_by_category() {
        let spending = spending_by_category(&fixture(), &DateRange::default());

        assert_eq!(spending.total, Decimal::from(200));
        let names: Vec<_> = spending.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Accommodation", "Transport", "Food", "Other"]);

        let transport = &spending.categories[1];
        assert_eq!(transport.amount, Decimal::from(50));
        assert_eq!(transport.percentage, Decimal::from(25));
        assert_eq!(
            transport.items,
            vec![ItemSpend { name: "Ride".to_string(), total_spent: Decimal::from(50), count: 2 }]
        );
    }

    #[test]
    fn test_merchant_frequency() {
        let frequency = merchant_frequency(&fixture(), &DateRange::default(), 0);

        assert_eq!(frequency.total_visits, 4);
        assert_eq!(frequency.merchants[0].name, "Grab");
        assert_eq!(frequency.merchants[0].visits, 2);
        assert_eq!(frequency.merchants[0].average_spent, Decimal::from(25));
        assert_eq!(frequency.merchants[0].percentage, Decimal::from(50));
        assert_eq!(frequency.merchants[1].name, "Hotel Nusa");

        let limited = merchant_frequency(&fixture(), &DateRange::default(), 1);
        assert_eq!(limited.merchants.len(), 1);
    }

    #[test]
    fn test_near_max_totals_saturate() {
        let huge = |merchant: &str| Receipt {
            total: Decimal::MAX,
            items: vec![ReceiptItem {
                price: Decimal::MAX,
                ..item("Gold bar", 2, 0, "Luxury")
            }],
            ..receipt(merchant, ymd(2024, 3, 1), 0, Vec::new())
        };
        let receipts = vec![huge("Vault"), huge("Vault"), huge("Bank")];
        let range = DateRange::default();

        let summary = dashboard_summary(&receipts, &range);
        assert_eq!(summary.total_spend, Decimal::MAX);
        assert_eq!(summary.receipt_count, 3);
        assert_eq!(summary.top_categories[0].amount, Decimal::MAX);
        assert_eq!(summary.top_merchants[0].amount, Decimal::MAX);

        let trends = spending_trends(&receipts, TrendPeriod::Monthly, &range);
        assert_eq!(trends.data.len(), 1);
        assert_eq!(trends.data[0].amount, Decimal::MAX);

        let by_category = spending_by_category(&receipts, &range);
        assert_eq!(by_category.total, Decimal::MAX);
        assert_eq!(by_category.categories[0].items[0].total_spent, Decimal::MAX);
        assert_eq!(by_category.categories[0].items[0].count, 3);

        let frequency = merchant_frequency(&receipts, &range, 0);
        assert_eq!(frequency.merchants[0].name, "Vault");
        assert_eq!(frequency.merchants[0].total_spent, Decimal::MAX);
    }
}
