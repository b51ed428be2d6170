//! Parse command - run the recovery pipeline on a saved completion.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use slipscan_core::{CompletionParser, InvoiceParser};
use slipscan_vision::parse_chat_completion;

use super::{OutputFormat, emit, format_invoice, print_warnings};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Completion text file, or `-` for stdin
    #[arg(default_value = "-")]
    input: String,

    /// Input is a raw chat-completions response body
    #[arg(long)]
    envelope: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "invoice")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ParseArgs) -> anyhow::Result<()> {
    let raw = if args.input == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        let path = PathBuf::from(&args.input);
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }
        std::fs::read(&path)?
    };

    let completion = if args.envelope {
        parse_chat_completion(&raw)?
    } else {
        String::from_utf8(raw)?
    };
    debug!("Parsing {} chars of completion text", completion.len());

    let result = CompletionParser::new().parse(&completion)?;
    print_warnings(&result.warnings);

    let content = format_invoice(&result.invoice, "", Some(result.stage), args.format)?;
    emit(&content, args.output.as_deref())
}
