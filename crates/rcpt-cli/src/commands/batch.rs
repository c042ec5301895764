//! Batch processing command for multiple receipt files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use futures_util::StreamExt;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use rcpt_core::{
    extract, render_for_display, validate, ExtractedReceipt, ReceiptStore, SourceKind, TextSource,
};

use super::output::{format_receipt, OutputFormat, ReceiptView};
use super::{display_name, Context};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching receipt files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Validate and save every extracted receipt to the database; receipts
    /// that fail validation are reported as failed and get no output file
    #[arg(long)]
    save: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    outcome: Result<ExtractedReceipt, String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, ctx: &Context) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = ctx.load_config()?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| SourceKind::is_supported(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let source = Arc::new(TextSource::from_config(&config)?);
    let timeout = Duration::from_secs(config.ocr.timeout_secs);

    let mut results: Vec<FileResult> = futures_util::stream::iter(files)
        .map(|path| {
            let source = Arc::clone(&source);
            let pb = pb.clone();
            async move {
                let result = process_file(source, path, timeout).await;
                pb.inc(1);
                result
            }
        })
        .buffer_unordered(args.jobs.max(1))
        .collect()
        .await;

    pb.finish_and_clear();
    results.sort_by(|a, b| a.path.cmp(&b.path));

    // Under --save, receipts failing validation get no output file
    if args.save {
        save_receipts(ctx, &config, &mut results)?;
    }

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Ok(receipt) = &result.outcome {
                write_output(output_dir, &result.path, receipt, args.format)?;
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<&FileResult> = results.iter().filter(|r| r.outcome.is_err()).collect();
    let successful = results.len() - failed.len();

    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let Err(error) = &result.outcome {
                println!("  - {}: {}", result.path.display(), error);
            }
        }
    }

    Ok(())
}

/// Extract one file on a blocking worker, bounded by `timeout`.
///
/// A timed-out worker is abandoned, not cancelled.
async fn process_file(source: Arc<TextSource>, path: PathBuf, timeout: Duration) -> FileResult {
    let start = Instant::now();
    let task_path = path.clone();

    let task = tokio::task::spawn_blocking(move || source.extract_text(&task_path));

    let outcome = match tokio::time::timeout(timeout, task).await {
        Err(_) => Err(format!("timed out after {}s", timeout.as_secs())),
        Ok(Err(join_error)) => Err(format!("worker failed: {}", join_error)),
        Ok(Ok(Err(e))) => Err(render_for_display(&Err(e))),
        Ok(Ok(Ok(text))) => Ok(extract(&text)),
    };

    if let Err(error) = &outcome {
        warn!("Failed to process {}: {}", path.display(), error);
    }

    FileResult {
        path,
        outcome,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }
}

fn write_output(
    output_dir: &Path,
    path: &Path,
    receipt: &ExtractedReceipt,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let output_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "receipt".to_string());
    let output_path = output_dir.join(format!("{}.{}", output_name, format.extension()));

    let content = format_receipt(&ReceiptView::from(receipt), format)?;
    fs::write(&output_path, content)?;
    debug!("Wrote output to {}", output_path.display());

    Ok(())
}

/// Insert every receipt that passes validation; the rest become failures.
fn save_receipts(
    ctx: &Context,
    config: &rcpt_core::RcptConfig,
    results: &mut [FileResult],
) -> anyhow::Result<()> {
    let store = ctx.open_store(config)?;
    let mut saved = 0;

    for result in results.iter_mut() {
        let validated = match &result.outcome {
            Ok(receipt) => validate(receipt),
            Err(_) => continue,
        };

        match validated {
            Ok(receipt) => {
                store.insert(&receipt)?;
                saved += 1;
            }
            Err(errors) => result.outcome = Err(format!("validation failed: {}", errors)),
        }
    }

    eprintln!("{} Saved {} receipts", style("✓").green(), saved);
    Ok(())
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "vendor",
        "date",
        "amount",
        "currency",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = display_name(&result.path);
        let time = result.processing_time_ms.to_string();

        match &result.outcome {
            Ok(receipt) => wtr.write_record([
                filename.as_str(),
                "success",
                &receipt.vendor,
                &receipt.date,
                &receipt.amount.to_string(),
                receipt.currency.code(),
                &time,
                "",
            ])?,
            Err(error) => wtr.write_record([
                filename.as_str(),
                "error",
                "",
                "",
                "",
                "",
                &time,
                error,
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}
