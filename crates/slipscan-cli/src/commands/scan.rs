//! Scan command - upload one image, call the model and parse the answer.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use slipscan_core::{CancellationToken, InMemoryReceiptRepository, ReceiptScanner};

use super::{OutputFormat, emit, format_invoice, load_config, print_warnings};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Receipt or invoice image
    #[arg(required = true)]
    image: PathBuf,

    /// Owner recorded on the receipt
    #[arg(short, long, default_value = "cli")]
    user: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "invoice")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Cancel `token` on Ctrl-C.
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling pending scans");
            token.cancel();
        }
    });
}

pub fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message);
    pb
}

pub async fn run(args: ScanArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.image.exists() {
        anyhow::bail!("Input file not found: {}", args.image.display());
    }
    let image = std::fs::read(&args.image)?;

    let scanner = ReceiptScanner::from_config(&config, Arc::new(InMemoryReceiptRepository::new()))?;

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let pb = spinner(format!("Scanning {} with {}...", args.image.display(), scanner.model_name()));

    let output = if args.format == OutputFormat::Receipt {
        let receipt = scanner.scan_receipt(&image, &args.user, &cancel).await;
        pb.finish_and_clear();
        serde_json::to_string_pretty(&receipt?)?
    } else {
        let result = scanner.extract(&image, &cancel).await;
        pb.finish_and_clear();
        let result = result?;
        print_warnings(&result.warnings);
        format_invoice(&result.invoice, &args.user, Some(result.stage), args.format)?
    };

    emit(&output, args.output.as_deref())?;

    eprintln!(
        "{} Scanned {} in {:?}",
        style("✓").green(),
        args.image.display(),
        start.elapsed()
    );
    Ok(())
}
