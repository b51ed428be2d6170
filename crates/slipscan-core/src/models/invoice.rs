//! Invoice data model produced by the extraction pipeline.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A structured invoice recovered from a single model completion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Invoice {
    /// Merchant/vendor display name. Empty if unrecoverable.
    pub vendor_name: String,

    /// External document identifier. Empty if unknown.
    pub invoice_number: String,

    /// Date the invoice was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,

    /// Payment due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Line items in the order they were recovered.
    pub items: Vec<LineItem>,

    /// Sum of line totals before tax.
    pub subtotal: Decimal,

    /// Tax rate as a percentage (e.g. 11 for 11%).
    pub tax_rate_percent: Decimal,

    /// Tax amount.
    pub tax_amount: Decimal,

    /// Discount subtracted from the total.
    pub discount: Decimal,

    /// Amount due.
    pub total_due: Decimal,
}

/// A single line item on the invoice.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineItem {
    /// Product/service description. Never empty on an assembled invoice.
    pub description: String,

    /// Free-form sub-notes.
    #[serde(default)]
    pub details: Vec<String>,

    /// Quantity.
    pub quantity: Decimal,

    /// Price per unit.
    pub unit_price: Decimal,

    /// Line total.
    pub total: Decimal,

    /// Spending category.
    #[serde(default)]
    pub category: String,
}

/// Spending categories known to the local keyword classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Transport,
    Accommodation,
    Travel,
    Food,
    #[serde(rename = "Office Supplies")]
    OfficeSupplies,
    #[serde(rename = "Professional Services")]
    ProfessionalServices,
    Other,
}

/// Keyword table, evaluated top to bottom, first match wins.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Transport, &["taxi", "uber", "grab"]),
    (Category::Accommodation, &["hotel", "inn"]),
    (Category::Travel, &["flight", "airfare"]),
    (Category::Food, &["meal", "food", "restaurant"]),
    (Category::OfficeSupplies, &["office", "stationery"]),
    (Category::ProfessionalServices, &["consult", "service"]),
];

impl Category {
    /// Classify an item description by case-insensitive keyword match.
    pub fn from_description(description: &str) -> Self {
        let description = description.to_lowercase();

        CATEGORY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| description.contains(k)))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Other)
    }

    /// Display name, as stored on line items.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Transport => "Transport",
            Category::Accommodation => "Accommodation",
            Category::Travel => "Travel",
            Category::Food => "Food",
            Category::OfficeSupplies => "Office Supplies",
            Category::ProfessionalServices => "Professional Services",
            Category::Other => "Other",
        }
    }

    /// Pick the category for a line item: the model's own answer if it gave
    /// one, the keyword classifier otherwise.
    pub fn resolve(model_category: &str, description: &str) -> String {
        if model_category.trim().is_empty() {
            Self::from_description(description).as_str().to_string()
        } else {
            model_category.to_string()
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Invoice {
    /// Create an empty invoice.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line item.
    pub fn add_line_item(&mut self, item: LineItem) {
        self.items.push(item);
    }

    /// Whether anything at all was recovered.
    ///
    /// An invoice with no vendor, no number, a zero total and no items
    /// carries no information and must be reported as a failure.
    pub fn has_data(&self) -> bool {
        !self.vendor_name.is_empty()
            || !self.invoice_number.is_empty()
            || !self.total_due.is_zero()
            || !self.items.is_empty()
    }

    /// `subtotal + tax_amount - discount`, or `None` if it does not fit in a `Decimal`.
    pub fn derived_total_due(&self) -> Option<Decimal> {
        self.subtotal
            .checked_add(self.tax_amount)?
            .checked_sub(self.discount)
    }

    /// Recompute the subtotal from line totals.
    ///
    /// On overflow the subtotal is left untouched and `None` is returned.
    pub fn calculate_subtotal(&mut self) -> Option<Decimal> {
        let subtotal = self
            .items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.total))?;
        self.subtotal = subtotal;
        Some(subtotal)
    }

    /// Recompute the tax amount from the subtotal and rate.
    pub fn calculate_tax_amount(&mut self) -> Option<Decimal> {
        let tax = self
            .subtotal
            .checked_mul(self.tax_rate_percent)?
            .checked_div(Decimal::ONE_HUNDRED)?
            .round_dp(2);
        self.tax_amount = tax;
        Some(tax)
    }

    /// Recompute subtotal, tax and total due from the line items.
    pub fn calculate_total_due(&mut self) -> Option<Decimal> {
        self.calculate_subtotal()?;
        self.calculate_tax_amount()?;
        let total = self.derived_total_due()?;
        self.total_due = total;
        Some(total)
    }
}
