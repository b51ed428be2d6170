//! Turning a stage's raw draft into a canonical invoice.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::stages::StageError;
use crate::models::invoice::{Category, Invoice, LineItem};

/// Whatever a decode stage managed to recover, before normalization.
#[derive(Debug, Clone, Default)]
pub(crate) struct InvoiceDraft {
    pub vendor_name: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub items: Vec<ItemDraft>,
    pub subtotal: Option<Decimal>,
    pub tax_rate_percent: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub total_due: Option<Decimal>,
    /// Recoverable anomalies, e.g. dates that did not parse.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ItemDraft {
    pub description: Option<String>,
    pub details: Vec<String>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub total: Option<Decimal>,
    pub category: Option<String>,
}

/// Assemble a draft into an invoice.
///
/// Fails with [`StageError::NoFields`] when nothing usable survives.
pub(crate) fn assemble(draft: InvoiceDraft) -> Result<(Invoice, Vec<String>), StageError> {
    let mut invoice = Invoice {
        vendor_name: draft.vendor_name.unwrap_or_default(),
        invoice_number: draft.invoice_number.unwrap_or_default(),
        invoice_date: draft.invoice_date,
        due_date: draft.due_date,
        items: Vec::with_capacity(draft.items.len()),
        subtotal: draft.subtotal.unwrap_or_default(),
        tax_rate_percent: draft.tax_rate_percent.unwrap_or_default(),
        tax_amount: draft.tax_amount.unwrap_or_default(),
        discount: draft.discount.unwrap_or_default(),
        total_due: draft.total_due.unwrap_or_default(),
    };

    let mut dropped = 0;
    for item in draft.items {
        let description = match item.description {
            Some(d) if !d.trim().is_empty() => d,
            _ => {
                dropped += 1;
                continue;
            }
        };

        let category = Category::resolve(item.category.as_deref().unwrap_or(""), &description);

        invoice.add_line_item(LineItem {
            description,
            details: item.details,
            quantity: item.quantity.unwrap_or_default(),
            unit_price: item.unit_price.unwrap_or_default(),
            total: item.total.unwrap_or_default(),
            category,
        });
    }
    if dropped > 0 {
        debug!("Dropped {} line items without a description", dropped);
    }

    let mut warnings = draft.warnings;
    if invoice.total_due.is_zero() && !invoice.subtotal.is_zero() {
        match invoice.derived_total_due() {
            Some(total) => {
                invoice.total_due = total;
                debug!("Derived total_due {} from subtotal", total);
            }
            None => {
                warn!("total_due: subtotal + tax - discount overflows, leaving it unset");
                warnings.push("total_due: derived value out of range".to_string());
            }
        }
    }

    if !invoice.has_data() {
        return Err(StageError::NoFields);
    }

    Ok((invoice, warnings))
}
