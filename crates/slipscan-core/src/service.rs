//! Receipt scanning service.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use slipscan_vision::{ImageStore, MlxModel, OpenRouterModel, SupabaseStore, VisionModel, object_name};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::Result;
use crate::extraction::{CompletionParser, ExtractionResult, InvoiceParser};
use crate::models::config::{ModelProvider, ScanConfig};
use crate::models::invoice::Invoice;
use crate::models::receipt::{Receipt, ReceiptItem};
use crate::pool::WorkerPool;
use crate::repository::{
    CategorySpending, DashboardSummary, DateRange, MerchantFrequency, Page, ReceiptFilter,
    ReceiptRepository, SpendingTrends, TrendPeriod,
};

/// Scans receipt images and manages the stored receipts.
///
/// Every scan holds a worker slot for its upload, model call and parse, so
/// at most `pool.capacity()` of them talk to the collaborators at once.
pub struct ReceiptScanner {
    store: Arc<dyn ImageStore>,
    model: Arc<dyn VisionModel>,
    repository: Arc<dyn ReceiptRepository>,
    parser: Arc<dyn InvoiceParser>,
    pool: WorkerPool,
}

impl ReceiptScanner {
    pub fn new(
        store: Arc<dyn ImageStore>,
        model: Arc<dyn VisionModel>,
        repository: Arc<dyn ReceiptRepository>,
        pool: WorkerPool,
    ) -> Self {
        Self {
            store,
            model,
            repository,
            parser: Arc::new(CompletionParser::new()),
            pool,
        }
    }

    /// Build a scanner with the HTTP collaborators named in `config`.
    pub fn from_config(config: &ScanConfig, repository: Arc<dyn ReceiptRepository>) -> Result<Self> {
        let store = Arc::new(SupabaseStore::new(config.storage.clone())?);

        let model: Arc<dyn VisionModel> = match config.model.provider {
            ModelProvider::OpenRouter => {
                Arc::new(OpenRouterModel::new(config.model.open_router.clone())?)
            }
            ModelProvider::Mlx => Arc::new(MlxModel::new(config.model.mlx.clone())?),
        };

        info!(
            "Scanner using {} with {} workers",
            model.name(),
            config.pool.max_workers
        );

        Ok(Self::new(
            store,
            model,
            repository,
            WorkerPool::new(config.pool.max_workers),
        ))
    }

    /// Replace the completion parser.
    pub fn with_parser(mut self, parser: Arc<dyn InvoiceParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Upload, call the model and parse, all inside one worker slot.
    /// Returns the extraction and the public image URL.
    async fn run_scan(
        &self,
        image: &[u8],
        cancel: &CancellationToken,
    ) -> Result<(ExtractionResult, String)> {
        let mut slot = self.pool.admit(cancel).await?;
        slot.start();

        let (filename, content_type) = object_name(image);
        let image_url = self.store.upload(image, &filename, content_type).await?;
        debug!("Uploaded {} bytes to {}", image.len(), image_url);

        let completion = self.model.complete(&image_url).await?;
        debug!("{} returned {} chars", self.model.name(), completion.len());

        let result = self.parser.parse(&completion)?;
        drop(slot);

        Ok((result, image_url))
    }

    /// Extract an invoice, keeping stage and warnings.
    pub async fn extract(&self, image: &[u8], cancel: &CancellationToken) -> Result<ExtractionResult> {
        self.run_scan(image, cancel).await.map(|(result, _)| result)
    }

    /// Extract an invoice from an image.
    pub async fn extract_invoice(&self, image: &[u8], cancel: &CancellationToken) -> Result<Invoice> {
        self.extract(image, cancel).await.map(|result| result.invoice)
    }

    /// Extract an invoice, convert it to a receipt and store it.
    pub async fn scan_receipt(
        &self,
        image: &[u8],
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Receipt> {
        let (result, image_url) = self.run_scan(image, cancel).await?;

        let mut receipt = Receipt::from_invoice(&result.invoice, user_id);
        receipt.image_url = image_url;

        let stored = self.repository.create(receipt).await?;
        info!(
            "Stored receipt {} from {} ({} items, total {})",
            stored.id,
            stored.merchant,
            stored.items.len(),
            stored.total
        );
        Ok(stored)
    }

    /// Extract every image concurrently through the shared pool.
    ///
    /// Results are in input order.
    pub async fn scan_batch(
        &self,
        images: &[Vec<u8>],
        cancel: &CancellationToken,
    ) -> Vec<Result<Invoice>> {
        join_all(images.iter().map(|image| self.extract_invoice(image, cancel))).await
    }

    pub async fn create_receipt(&self, mut receipt: Receipt) -> Result<Receipt> {
        let now = Utc::now();
        receipt.created_at = now;
        receipt.updated_at = now;
        Ok(self.repository.create(receipt).await?)
    }

    pub async fn get_receipt(&self, id: &str) -> Result<Receipt> {
        Ok(self.repository.get(id).await?)
    }

    pub async fn update_receipt(&self, mut receipt: Receipt) -> Result<Receipt> {
        receipt.updated_at = Utc::now();
        Ok(self.repository.update(receipt).await?)
    }

    pub async fn delete_receipt(&self, id: &str) -> Result<()> {
        Ok(self.repository.delete(id).await?)
    }

    pub async fn list_receipts(&self, filter: &ReceiptFilter) -> Result<Page<Receipt>> {
        Ok(self.repository.list(filter).await?)
    }

    pub async fn receipt_items(&self, id: &str) -> Result<Vec<ReceiptItem>> {
        Ok(self.repository.items(id).await?)
    }

    pub async fn dashboard_summary(&self, range: &DateRange) -> Result<DashboardSummary> {
        Ok(self.repository.dashboard_summary(range).await?)
    }

    /// `period` is one of `daily`, `weekly`, `monthly`, `yearly`.
    pub async fn spending_trends(&self, period: &str, range: &DateRange) -> Result<SpendingTrends> {
        let period: TrendPeriod = period.parse()?;
        Ok(self.repository.spending_trends(period, range).await?)
    }

    pub async fn spending_by_category(&self, range: &DateRange) -> Result<CategorySpending> {
        Ok(self.repository.spending_by_category(range).await?)
    }

    pub async fn merchant_frequency(
        &self,
        range: &DateRange,
        limit: usize,
    ) -> Result<MerchantFrequency> {
        Ok(self.repository.merchant_frequency(range, limit).await?)
    }
}

impl std::fmt::Debug for ReceiptScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptScanner")
            .field("model", &self.model.name())
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}
