use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Page, ReceiptFilter, ReceiptRepository, Result};
use crate::error::RepositoryError;
use crate::models::receipt::{Receipt, ReceiptItem};

/// Process-local receipt store.
#[derive(Debug, Default)]
pub struct InMemoryReceiptRepository {
    receipts: RwLock<HashMap<String, Receipt>>,
}

impl InMemoryReceiptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.receipts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.receipts.read().await.is_empty()
    }
}

fn assign_item_ids(items: &mut [ReceiptItem]) {
    for item in items.iter_mut().filter(|i| i.id.is_empty()) {
        item.id = Uuid::new_v4().to_string();
    }
}

#[async_trait]
impl ReceiptRepository for InMemoryReceiptRepository {
    async fn create(&self, mut receipt: Receipt) -> Result<Receipt> {
        receipt.id = Uuid::new_v4().to_string();
        assign_item_ids(&mut receipt.items);

        self.receipts
            .write()
            .await
            .insert(receipt.id.clone(), receipt.clone());
        Ok(receipt)
    }

    async fn get(&self, id: &str) -> Result<Receipt> {
        self.receipts
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn update(&self, mut receipt: Receipt) -> Result<Receipt> {
        let mut receipts = self.receipts.write().await;
        let existing = receipts
            .get_mut(&receipt.id)
            .ok_or_else(|| RepositoryError::NotFound(receipt.id.clone()))?;

        receipt.created_at = existing.created_at;
        assign_item_ids(&mut receipt.items);
        *existing = receipt.clone();
        Ok(receipt)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.receipts
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn list(&self, filter: &ReceiptFilter) -> Result<Page<Receipt>> {
        let mut matching: Vec<Receipt> = self
            .receipts
            .read()
            .await
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        // Newest first; undated receipts sort last.
        matching.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Ok(Page::slice(matching, filter.page(), filter.limit()))
    }

    async fn items(&self, id: &str) -> Result<Vec<ReceiptItem>> {
        Ok(self.get(id).await?.items)
    }

    async fn all(&self) -> Result<Vec<Receipt>> {
        Ok(self.receipts.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{DateRange, TrendPeriod};
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn receipt(merchant: &str, date: Option<NaiveDate>, total: i64) -> Receipt {
        let now = Utc::now();
        Receipt {
            id: String::new(),
            user_id: "u1".to_string(),
            merchant: merchant.to_string(),
            date,
            total: Decimal::from(total),
            tax: Decimal::ZERO,
            subtotal: Decimal::ZERO,
            items: vec![ReceiptItem {
                id: String::new(),
                name: "Coffee".to_string(),
                quantity: 1,
                price: Decimal::from(total),
                currency: String::new(),
                category: "Food".to_string(),
            }],
            image_url: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_crud() {
        let repo = InMemoryReceiptRepository::new();

        let created = repo.create(receipt("Starbucks", None, 5)).await.unwrap();
        assert!(!created.id.is_empty());
        assert!(!created.items[0].id.is_empty());
        assert_eq!(repo.get(&created.id).await.unwrap(), created);

        let mut changed = created.clone();
        changed.merchant = "Starbucks Reserve".to_string();
        let updated = repo.update(changed).await.unwrap();
        assert_eq!(updated.merchant, "Starbucks Reserve");
        assert_eq!(updated.created_at, created.created_at);

        assert_eq!(repo.items(&created.id).await.unwrap().len(), 1);

        repo.delete(&created.id).await.unwrap();
        assert!(repo.is_empty().await);
        assert!(matches!(
            repo.get(&created.id).await,
            Err(RepositoryError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete(&created.id).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing() {
        let repo = InMemoryReceiptRepository::new();
        let mut ghost = receipt("Ghost", None, 1);
        ghost.id = "missing".to_string();

        assert!(matches!(
            repo.update(ghost).await,
            Err(RepositoryError::NotFound(id)) if id == "missing"
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let repo = InMemoryReceiptRepository::new();
        for (merchant, day) in [("Kopi Kenangan", 3), ("KOPI Janji Jiwa", 10), ("Indomaret", 5)] {
            repo.create(receipt(merchant, NaiveDate::from_ymd_opt(2024, 4, day), 10))
                .await
                .unwrap();
        }
        repo.create(receipt("Kopi Tuku", None, 10)).await.unwrap();

        let page = repo
            .list(&ReceiptFilter {
                merchant: Some("kopi".to_string()),
                ..ReceiptFilter::default()
            })
            .await
            .unwrap();
        let merchants: Vec<_> = page.data.iter().map(|r| r.merchant.as_str()).collect();
        assert_eq!(merchants, vec!["KOPI Janji Jiwa", "Kopi Kenangan", "Kopi Tuku"]);
        assert_eq!(page.pagination.total_items, 3);

        let page = repo
            .list(&ReceiptFilter {
                start_date: NaiveDate::from_ymd_opt(2024, 4, 4),
                limit: 1,
                page: 2,
                ..ReceiptFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(page.pagination.total_items, 2);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.data[0].merchant, "Indomaret");
    }

    #[tokio::test]
    async fn test_default_analytics() {
        let repo = InMemoryReceiptRepository::new();
        repo.create(receipt("A", NaiveDate::from_ymd_opt(2024, 4, 1), 10))
            .await
            .unwrap();
        repo.create(receipt("B", NaiveDate::from_ymd_opt(2024, 5, 1), 30))
            .await
            .unwrap();

        let range = DateRange::default();
        let summary = repo.dashboard_summary(&range).await.unwrap();
        assert_eq!(summary.total_spend, Decimal::from(40));

        let trends = repo.spending_trends(TrendPeriod::Monthly, &range).await.unwrap();
        assert_eq!(trends.data.len(), 2);

        let frequency = repo.merchant_frequency(&range, 10).await.unwrap();
        assert_eq!(frequency.total_visits, 2);

        let categories = repo.spending_by_category(&range).await.unwrap();
        assert_eq!(categories.categories[0].name, "Food");
    }
}
