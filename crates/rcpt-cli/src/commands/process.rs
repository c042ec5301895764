//! Process command - extract fields from a single receipt file.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use rcpt_core::{
    render_for_display, LineRuleExtractor, ReceiptDraft, ReceiptParser, ReceiptStore, TextSource,
};

use super::output::{format_receipt, OutputFormat, ReceiptView};
use super::Context;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (.txt, .pdf, .jpg, .jpeg or .png)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Include the extracted raw text in the output
    #[arg(long)]
    raw: bool,

    /// Validate and save the receipt to the database
    #[arg(long)]
    save: bool,

    /// Corrected vendor
    #[arg(long)]
    vendor: Option<String>,

    /// Corrected date (DD/MM/YYYY)
    #[arg(long)]
    date: Option<String>,

    /// Corrected amount
    #[arg(long)]
    amount: Option<String>,

    /// Corrected currency (INR or USD)
    #[arg(long)]
    currency: Option<String>,
}

impl ProcessArgs {
    fn has_corrections(&self) -> bool {
        self.vendor.is_some() || self.date.is_some() || self.amount.is_some() || self.currency.is_some()
    }

    fn apply_corrections(&self, mut draft: ReceiptDraft) -> ReceiptDraft {
        if let Some(vendor) = &self.vendor {
            draft = draft.with_vendor(vendor.as_str());
        }
        if let Some(date) = &self.date {
            draft = draft.with_date(date.as_str());
        }
        if let Some(amount) = &self.amount {
            draft = draft.with_amount(amount.as_str());
        }
        if let Some(currency) = &self.currency {
            draft = draft.with_currency(currency.as_str());
        }
        draft
    }
}

pub async fn run(args: ProcessArgs, ctx: &Context) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = ctx.load_config()?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Extracting text...");

    let source = TextSource::from_config(&config)?;
    let input = args.input.clone();
    let timeout = Duration::from_secs(config.ocr.timeout_secs);
    let task = tokio::task::spawn_blocking(move || source.extract_text(&input));

    let text_result = match tokio::time::timeout(timeout, task).await {
        Ok(joined) => joined?,
        Err(_) => {
            pb.finish_and_clear();
            anyhow::bail!(
                "Timed out after {}s extracting text from {}",
                timeout.as_secs(),
                args.input.display()
            );
        }
    };

    pb.finish_and_clear();

    let text = match &text_result {
        Ok(text) => text.as_str(),
        Err(_) => anyhow::bail!("{}", render_for_display(&text_result)),
    };

    let extraction = LineRuleExtractor::new().parse(text);
    for warning in &extraction.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let validated = if args.save || args.has_corrections() {
        let draft = args.apply_corrections(ReceiptDraft::from(&extraction.receipt));
        match draft.validate() {
            Ok(receipt) => Some(receipt),
            Err(errors) => {
                eprintln!("{}", style("Validation errors:").red());
                for error in errors.iter() {
                    eprintln!("  - {}: {}", error.field(), error);
                }
                eprintln!("Correct the fields with --vendor, --date, --amount or --currency.");
                anyhow::bail!("Receipt failed validation");
            }
        }
    } else {
        None
    };

    let mut view = match &validated {
        Some(receipt) => ReceiptView::from(receipt),
        None => ReceiptView::from(&extraction.receipt),
    };
    if args.raw {
        view = view.with_raw_text(text);
    }

    let output = format_receipt(&view, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    if let Some(receipt) = validated.as_ref().filter(|_| args.save) {
        let store = ctx.open_store(&config)?;
        let id = store.insert(receipt)?;
        eprintln!("{} Saved receipt #{}", style("✓").green(), id);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
