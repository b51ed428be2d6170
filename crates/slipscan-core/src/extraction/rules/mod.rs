//! Pattern tables and field extractors for the recovery stage.

pub mod amounts;
pub mod dates;
pub mod fields;
pub mod patterns;
pub mod scan;

pub use amounts::parse_amount;
pub use dates::{parse_date, parse_iso_date};
pub use fields::{AmountField, StringField, StringList};
pub use scan::{array_body, object_spans};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}
