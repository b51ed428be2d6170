//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod parse;
pub mod scan;

use std::path::{Path, PathBuf};

use console::style;
use slipscan_core::models::dto::InvoiceDto;
use slipscan_core::{DecodeStage, Invoice, Receipt, ScanConfig};
use tracing::debug;

/// How to print an extracted invoice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Invoice JSON (snake_case)
    Invoice,
    /// Receipt JSON (camelCase)
    Receipt,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Invoice | OutputFormat::Receipt => "json",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("slipscan")
        .join("config.json")
}

/// Load the config file (explicit path, else the default location if it
/// exists, else defaults) and overlay the environment.
pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<ScanConfig> {
    let mut config = match config_path {
        Some(path) => ScanConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?,
        None => {
            let path = default_config_path();
            if path.exists() {
                debug!("Using config {}", path.display());
                ScanConfig::from_file(&path)?
            } else {
                ScanConfig::default()
            }
        }
    };

    config.apply_env();
    Ok(config)
}

/// Render an invoice. The receipt format converts it for `user_id` without
/// storing it.
pub fn format_invoice(
    invoice: &Invoice,
    user_id: &str,
    stage: Option<DecodeStage>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Invoice => Ok(serde_json::to_string_pretty(&InvoiceDto::from(invoice))?),
        OutputFormat::Receipt => Ok(serde_json::to_string_pretty(&Receipt::from_invoice(
            invoice, user_id,
        ))?),
        OutputFormat::Text => Ok(format_text(invoice, stage)),
    }
}

fn format_text(invoice: &Invoice, stage: Option<DecodeStage>) -> String {
    let mut output = String::new();
    let or_dash = |s: &str| if s.is_empty() { "-".to_string() } else { s.to_string() };

    output.push_str(&format!("Vendor:   {}\n", or_dash(&invoice.vendor_name)));
    output.push_str(&format!("Invoice:  {}\n", or_dash(&invoice.invoice_number)));
    if let Some(date) = invoice.invoice_date {
        output.push_str(&format!("Date:     {}\n", date));
    }
    if let Some(due) = invoice.due_date {
        output.push_str(&format!("Due:      {}\n", due));
    }

    if !invoice.items.is_empty() {
        output.push_str("\nItems:\n");
        for (i, item) in invoice.items.iter().enumerate() {
            output.push_str(&format!(
                "  {}. {}  {} x {} = {}  [{}]\n",
                i + 1,
                item.description,
                item.quantity,
                item.unit_price,
                item.total,
                item.category
            ));
            for detail in &item.details {
                output.push_str(&format!("     - {}\n", detail));
            }
        }
    }

    output.push('\n');
    output.push_str(&format!("Subtotal: {}\n", invoice.subtotal));
    output.push_str(&format!(
        "Tax:      {} ({}%)\n",
        invoice.tax_amount, invoice.tax_rate_percent
    ));
    if !invoice.discount.is_zero() {
        output.push_str(&format!("Discount: {}\n", invoice.discount));
    }
    output.push_str(&format!("Total:    {}\n", invoice.total_due));

    if let Some(stage) = stage {
        output.push_str(&format!("\nDecoded via {} stage\n", stage));
    }

    output
}

/// Write to `output` if given, stdout otherwise.
pub fn emit(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)?;
            println!(
                "{} Output written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{}", content),
    }
    Ok(())
}

pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }
}
