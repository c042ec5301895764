//! List command - filter, summarize and export saved receipts.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use rust_decimal::Decimal;

use rcpt_core::{
    monthly_totals, top_vendors, ReceiptFilter, ReceiptStore, SortOrder, StoredReceipt, Summary,
};

use super::output::money;
use super::Context;

/// Number of vendors shown in insights.
const TOP_VENDORS: usize = 5;

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Only receipts whose vendor contains this text (case-insensitive)
    #[arg(long)]
    vendor: Option<String>,

    /// Only receipts with at least this amount
    #[arg(long, default_value = "0")]
    min_amount: Decimal,

    /// Sort by amount
    #[arg(long, value_enum, default_value = "none")]
    sort: SortArg,

    /// Export the filtered receipts instead of printing a table
    #[arg(long, value_enum)]
    export: Option<ExportFormat>,

    /// Export file (default: stdout)
    #[arg(short, long, requires = "export")]
    output: Option<PathBuf>,

    /// Show top vendors and monthly spending
    #[arg(long)]
    insights: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum SortArg {
    /// Insertion order
    None,
    /// Lowest amount first
    Asc,
    /// Highest amount first
    Desc,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::None => SortOrder::None,
            SortArg::Asc => SortOrder::Ascending,
            SortArg::Desc => SortOrder::Descending,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ExportFormat {
    /// CSV with a header row
    Csv,
    /// JSON array of records
    Json,
}

pub async fn run(args: ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.load_config()?;
    let store = ctx.open_store(&config)?;

    let rows = store.fetch_all()?;
    if rows.is_empty() {
        println!("No receipts saved yet.");
        return Ok(());
    }

    let filter = ReceiptFilter {
        vendor: args.vendor.clone(),
        min_amount: args.min_amount,
        sort: args.sort.into(),
    };
    let filtered = filter.apply(&rows);

    if let Some(format) = args.export {
        let content = match format {
            ExportFormat::Csv => export_csv(&filtered)?,
            ExportFormat::Json => serde_json::to_string_pretty(&filtered)?,
        };

        match &args.output {
            Some(path) => {
                fs::write(path, content)?;
                eprintln!(
                    "{} Exported {} receipts to {}",
                    style("✓").green(),
                    filtered.len(),
                    path.display()
                );
            }
            None => println!("{}", content.trim_end()),
        }
        return Ok(());
    }

    print_table(&filtered);
    print_summary(&Summary::compute(&filtered));

    if args.insights {
        print_insights(&filtered);
    }

    Ok(())
}

fn export_csv(rows: &[StoredReceipt]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["id", "vendor", "date", "amount", "currency"])?;
    for row in rows {
        wtr.write_record([
            row.id.to_string().as_str(),
            &row.vendor,
            &row.date,
            &row.amount.to_string(),
            row.currency.code(),
        ])?;
    }
    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn print_table(rows: &[StoredReceipt]) {
    let vendor_width = rows
        .iter()
        .map(|r| r.vendor.chars().count())
        .max()
        .unwrap_or(0)
        .max("Vendor".len());

    println!(
        "{}",
        style(format!(
            "{:>4}  {:<vw$}  {:<10}  {:>12}  {}",
            "ID",
            "Vendor",
            "Date",
            "Amount",
            "Currency",
            vw = vendor_width
        ))
        .bold()
    );

    for row in rows {
        println!(
            "{:>4}  {:<vw$}  {:<10}  {:>12}  {}",
            row.id,
            row.vendor,
            row.date,
            format!("{:.2}", row.amount),
            row.currency,
            vw = vendor_width
        );
    }
}

fn print_summary(summary: &Summary) {
    let or_na = |value: Option<Decimal>| {
        value
            .map(|v| money(v, summary.currency))
            .unwrap_or_else(|| "n/a".to_string())
    };

    println!();
    println!("{}", style("Summary").bold());
    println!("  Receipts: {}", summary.count);
    println!("  Total:    {}", money(summary.total, summary.currency));
    println!("  Average:  {}", or_na(summary.average));
    println!("  Median:   {}", or_na(summary.median));
}

fn print_insights(rows: &[StoredReceipt]) {
    println!();
    println!("{}", style("Top vendors").bold());
    for (vendor, total) in top_vendors(rows, TOP_VENDORS) {
        println!("  {:<30} {:>12.2}", vendor, total);
    }

    println!();
    println!("{}", style("Monthly spending").bold());
    let months = monthly_totals(rows);
    if months.is_empty() {
        println!("  (no receipts with a DD/MM/YYYY date)");
    }
    for (month, total) in months {
        println!("  {}  {:>12.2}", month, total);
    }
}
