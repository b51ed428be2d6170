//! Batch command - scan many images concurrently through the worker pool.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use tracing::{debug, warn};

use slipscan_core::{CancellationToken, InMemoryReceiptRepository, Invoice, ReceiptScanner, ScanError};

use super::scan::{cancel_on_ctrl_c, spinner};
use super::{OutputFormat, format_invoice, load_config};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp", "tiff"];

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input images
    #[arg(required = true)]
    input: String,

    /// Directory for one output file per image
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "invoice")]
    format: OutputFormat,

    /// Write a summary CSV to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Report failures instead of exiting with an error
    #[arg(long)]
    continue_on_error: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    let images = files
        .iter()
        .map(fs::read)
        .collect::<Result<Vec<_>, _>>()?;

    let scanner = ReceiptScanner::from_config(&config, Arc::new(InMemoryReceiptRepository::new()))?;

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let pb = spinner(format!(
        "Scanning {} files with {} workers...",
        files.len(),
        scanner.pool().capacity()
    ));
    let results = scanner.scan_batch(&images, &cancel).await;
    pb.finish_and_clear();

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
        for (path, result) in files.iter().zip(&results) {
            if let Ok(invoice) = result {
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("invoice");
                let output_path = output_dir.join(format!("{}.{}", stem, args.format.extension()));
                fs::write(&output_path, format_invoice(invoice, "cli", None, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if let Some(ref summary_path) = args.summary {
        write_summary(summary_path, &files, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = files
        .iter()
        .zip(&results)
        .filter_map(|(path, result)| result.as_ref().err().map(|e| (path, e)))
        .collect();

    println!(
        "{} Scanned {} files in {:?}: {} succeeded, {} failed",
        style("✓").green(),
        files.len(),
        start.elapsed(),
        files.len() - failed.len(),
        failed.len()
    );

    for (path, error) in &failed {
        warn!("Failed to scan {}: {}", path.display(), error);
        eprintln!("  {} {}: {}", style("✗").red(), path.display(), error);
    }

    if !failed.is_empty() && !args.continue_on_error {
        anyhow::bail!("{} of {} scans failed", failed.len(), files.len());
    }

    Ok(())
}

fn write_summary(
    path: &Path,
    files: &[PathBuf],
    results: &[Result<Invoice, ScanError>],
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "file",
        "status",
        "vendor_name",
        "invoice_number",
        "invoice_date",
        "items",
        "total_due",
        "error",
    ])?;

    for (file, result) in files.iter().zip(results) {
        let file = file.display().to_string();
        match result {
            Ok(invoice) => {
                let date = invoice.invoice_date.map(|d| d.to_string()).unwrap_or_default();
                let items = invoice.items.len().to_string();
                let total = invoice.total_due.to_string();
                let record: [&str; 8] = [
                    &file,
                    "ok",
                    &invoice.vendor_name,
                    &invoice.invoice_number,
                    &date,
                    &items,
                    &total,
                    "",
                ];
                wtr.write_record(record)?;
            }
            Err(e) => {
                let status = format!("{:?}", e.kind()).to_lowercase();
                let error = e.to_string();
                let record: [&str; 8] = [&file, &status, "", "", "", "", "", &error];
                wtr.write_record(record)?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
