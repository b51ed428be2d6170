//! Wire representations of the invoice model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::invoice::{Invoice, LineItem};
use crate::error::ExtractionError;

/// Invoice as exchanged with API clients.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceDto {
    pub vendor_name: String,
    pub invoice_number: String,
    /// `YYYY-MM-DD`, empty when unknown.
    pub invoice_date: String,
    pub due_date: String,
    pub items: Vec<LineItemDto>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_due: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItemDto {
    pub description: String,
    pub details: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,
}

/// Response envelope for invoice extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<InvoiceDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InvoiceResponse {
    pub fn ok(invoice: &Invoice) -> Self {
        Self {
            success: true,
            invoice: Some(InvoiceDto::from(invoice)),
            error: None,
        }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            invoice: None,
            error: Some(error.to_string()),
        }
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn parse_date(field: &str, value: &str) -> Result<Option<NaiveDate>, ExtractionError> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ExtractionError::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        })
}

impl From<&Invoice> for InvoiceDto {
    fn from(invoice: &Invoice) -> Self {
        Self {
            vendor_name: invoice.vendor_name.clone(),
            invoice_number: invoice.invoice_number.clone(),
            invoice_date: format_date(invoice.invoice_date),
            due_date: format_date(invoice.due_date),
            items: invoice.items.iter().map(LineItemDto::from).collect(),
            subtotal: invoice.subtotal,
            tax_rate_percent: invoice.tax_rate_percent,
            tax_amount: invoice.tax_amount,
            discount: invoice.discount,
            total_due: invoice.total_due,
        }
    }
}

impl From<&LineItem> for LineItemDto {
    fn from(item: &LineItem) -> Self {
        Self {
            description: item.description.clone(),
            details: item.details.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total: item.total,
            category: item.category.clone(),
        }
    }
}

impl InvoiceDto {
    /// Convert back to the domain model, rejecting malformed dates.
    pub fn to_domain(&self) -> Result<Invoice, ExtractionError> {
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if item.description.trim().is_empty() {
                    return Err(ExtractionError::Validation {
                        field: format!("items[{}].description", i),
                        reason: "must not be empty".to_string(),
                    });
                }
                Ok(LineItem {
                    description: item.description.clone(),
                    details: item.details.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    total: item.total,
                    category: item.category.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Invoice {
            vendor_name: self.vendor_name.clone(),
            invoice_number: self.invoice_number.clone(),
            invoice_date: parse_date("invoice_date", &self.invoice_date)?,
            due_date: parse_date("due_date", &self.due_date)?,
            items,
            subtotal: self.subtotal,
            tax_rate_percent: self.tax_rate_percent,
            tax_amount: self.tax_amount,
            discount: self.discount,
            total_due: self.total_due,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::str::FromStr;

    fn invoice() -> Invoice {
        Invoice {
            vendor_name: "PT Maju".to_string(),
            invoice_number: "INV-7".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            items: vec![LineItem {
                description: "Consulting".to_string(),
                quantity: Decimal::ONE,
                unit_price: Decimal::from_str("150.5").unwrap(),
                total: Decimal::from_str("150.5").unwrap(),
                category: "Professional Services".to_string(),
                ..LineItem::default()
            }],
            total_due: Decimal::from_str("150.5").unwrap(),
            ..Invoice::default()
        }
    }

    #[test]
    fn test_dto_wire_shape() {
        let dto = InvoiceDto::from(&invoice());
        let value = serde_json::to_value(&dto).unwrap();

        assert_eq!(value["invoice_date"], json!("2024-01-15"));
        assert_eq!(value["due_date"], json!(""));
        assert_eq!(value["total_due"], json!(150.5));
        assert_eq!(value["items"][0]["category"], json!("Professional Services"));
    }

    #[test]
    fn test_to_domain_roundtrip() {
        let original = invoice();
        let restored = InvoiceDto::from(&original).to_domain().unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_to_domain_rejects_bad_date() {
        let dto = InvoiceDto {
            invoice_date: "15/01/2024".to_string(),
            ..InvoiceDto::default()
        };

        match dto.to_domain() {
            Err(ExtractionError::InvalidDate { field, value }) => {
                assert_eq!(field, "invoice_date");
                assert_eq!(value, "15/01/2024");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_to_domain_rejects_empty_description() {
        let dto = InvoiceDto {
            items: vec![LineItemDto::default()],
            ..InvoiceDto::default()
        };
        assert!(matches!(
            dto.to_domain(),
            Err(ExtractionError::Validation { .. })
        ));
    }

    #[test]
    fn test_response_envelope() {
        let failed = serde_json::to_value(InvoiceResponse::failed("boom")).unwrap();
        assert_eq!(failed, json!({"success": false, "error": "boom"}));

        let ok = serde_json::to_value(InvoiceResponse::ok(&invoice())).unwrap();
        assert_eq!(ok["success"], json!(true));
        assert_eq!(ok["invoice"]["vendor_name"], json!("PT Maju"));
    }
}
