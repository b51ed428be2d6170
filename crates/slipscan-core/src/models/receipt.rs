//! Receipt model, the stored and caller-facing form of a scan.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::invoice::Invoice;

/// A scanned or manually entered receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Storage id. Empty until the receipt is persisted.
    #[serde(default)]
    pub id: String,

    /// Owner of the receipt.
    pub user_id: String,

    /// Merchant name.
    pub merchant: String,

    /// Purchase date.
    pub date: Option<NaiveDate>,

    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,

    #[serde(default, with = "rust_decimal::serde::float")]
    pub tax: Decimal,

    #[serde(default, with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,

    #[serde(default)]
    pub items: Vec<ReceiptItem>,

    /// Public URL of the scanned image, if any.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_url: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single purchased item on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(rename = "qty")]
    pub quantity: u32,

    /// Unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub currency: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
}

impl ReceiptItem {
    /// `qty * price`, saturating at the `Decimal` bounds.
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.price)
    }
}

impl Receipt {
    /// Build an unsaved receipt from an extracted invoice.
    ///
    /// Quantities keep only their integer part; categories are taken as
    /// already resolved on the invoice.
    pub fn from_invoice(invoice: &Invoice, user_id: &str) -> Self {
        let now = Utc::now();

        let items = invoice
            .items
            .iter()
            .map(|item| ReceiptItem {
                id: String::new(),
                name: item.description.clone(),
                quantity: item.quantity.trunc().to_u32().unwrap_or(0),
                price: item.unit_price,
                currency: String::new(),
                category: item.category.clone(),
            })
            .collect();

        Self {
            id: String::new(),
            user_id: user_id.to_string(),
            merchant: invoice.vendor_name.clone(),
            date: invoice.invoice_date,
            total: invoice.total_due,
            tax: invoice.tax_amount,
            subtotal: invoice.subtotal,
            items,
            image_url: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of `qty * price` over all items.
    pub fn items_total(&self) -> Decimal {
        self.items
            .iter()
            .map(ReceiptItem::amount)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }
}
