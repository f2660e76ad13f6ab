//! Delivery rate report by base and by courier
//!
//! Usage:
//!   delivery_rates --input orders.csv [--order ascending] [--base Norte]
//!   delivery_rates --url <csv export link> --json

use anyhow::{bail, Context, Result};
use clap::Parser;
use delivery_rates::{
    classifier::StatusClassifier,
    config::AppConfig,
    export,
    filter::RecordFilter,
    models::DeliveryStatus,
    report::{build_reports, DeliveryReports, Report, SortOrder},
    source::DataSource,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "delivery_rates")]
#[command(about = "Delivery rates grouped by base and by courier")]
struct Args {
    /// Order sheet as CSV
    #[arg(long)]
    input: Option<PathBuf>,

    /// Remote CSV export of the order sheet
    #[arg(long)]
    url: Option<String>,

    /// TOML config file (falls back to DELIVERY_RATES_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Row ordering by delivery rate
    #[arg(long, value_enum)]
    order: Option<SortOrder>,

    /// Fold "na base" receipts into not delivered
    #[arg(long)]
    no_at_base: bool,

    /// Only include these bases (repeatable)
    #[arg(long = "base")]
    bases: Vec<String>,

    /// Only include these couriers (repeatable)
    #[arg(long = "courier")]
    couriers: Vec<String>,

    /// Only include these destination cities (repeatable)
    #[arg(long = "city")]
    cities: Vec<String>,

    /// Write the annotated orders to this CSV file
    #[arg(long)]
    export_orders: Option<PathBuf>,

    /// Write both report tables as CSV into this directory
    #[arg(long)]
    export_report: Option<PathBuf>,

    /// Print the reports as JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref()).context("loading config")?;

    if args.no_at_base {
        config.classifier.at_base = false;
    }
    if let Some(order) = args.order {
        config.report.order = order;
    }

    let source = match (&args.input, &args.url) {
        (Some(path), _) => DataSource::File(path.clone()),
        (None, Some(url)) => DataSource::Url(url.clone()),
        (None, None) => match config.source.data_source() {
            Some(source) => source,
            None => bail!("no data source: pass --input, --url or set [source] in the config"),
        },
    };

    let classifier = StatusClassifier::new(&config.classifier);
    let dataset = source
        .load(&classifier, config.source.timeout())
        .await
        .with_context(|| format!("loading orders from {}", source.describe()))?;

    let filter = RecordFilter::default()
        .with_bases(args.bases)
        .with_couriers(args.couriers)
        .with_cities(args.cities);
    let records = filter.apply(&dataset.records);
    info!("{} of {} orders selected", records.len(), dataset.records.len());

    let reports = build_reports(&records, &config.report.options());

    if args.json {
        export::write_json(&reports, std::io::stdout().lock())?;
        println!();
    } else {
        print_reports(&reports, classifier.supports_at_base());
    }

    if let Some(path) = &args.export_orders {
        export::export_orders(&records, path)?;
    }
    if let Some(dir) = &args.export_report {
        export::export_reports(&reports, dir)?;
    }

    Ok(())
}

fn print_reports(reports: &DeliveryReports, at_base: bool) {
    println!("\n{}", "=".repeat(80));
    println!("                         DELIVERY RATE REPORT");
    println!("{}\n", "=".repeat(80));

    println!("  Orders:           {:>10}", reports.orders);
    for status in DeliveryStatus::ALL {
        if status == DeliveryStatus::AtBase && !at_base {
            continue;
        }
        println!("  {:17} {:>10}", format!("{}:", status.label()), reports.statuses.get(status));
    }

    print_report("RATE BY BASE", &reports.by_base, at_base);
    print_report("RATE BY COURIER", &reports.by_courier, at_base);

    println!("\n{}", "=".repeat(80));
    println!();
}

fn print_report(title: &str, report: &Report, at_base: bool) {
    println!("\n\n{}", title);
    println!("{}", "-".repeat(80));

    if at_base {
        println!(
            "  {:28} {:>9} {:>9} {:>9} {:>7} {:>8} {:>6}",
            report.group_by.label(), "Entregue", "N/Entr.", "Na base", "Total", "Taxa%", "Faixa"
        );
    } else {
        println!(
            "  {:28} {:>9} {:>9} {:>7} {:>8} {:>6}",
            report.group_by.label(), "Entregue", "N/Entr.", "Total", "Taxa%", "Faixa"
        );
    }
    println!("  {}", "-".repeat(78));

    for row in &report.rows {
        print_row(&row.key, &row.counts, row.total, row.rate.percentage, &row.rate.tier.to_string(), at_base);
    }

    println!("  {}", "-".repeat(78));
    print_row(
        export::TOTALS_LABEL,
        &report.totals,
        report.total,
        report.overall.percentage,
        &report.overall.tier.to_string(),
        at_base,
    );
}

fn print_row(
    key: &str,
    counts: &delivery_rates::aggregate::StatusCounts,
    total: u64,
    percentage: f64,
    tier: &str,
    at_base: bool,
) {
    let key: String = key.chars().take(28).collect();
    if at_base {
        println!(
            "  {:28} {:>9} {:>9} {:>9} {:>7} {:>7.2}% {:>6}",
            key, counts.delivered, counts.not_delivered, counts.at_base, total, percentage, tier
        );
    } else {
        println!(
            "  {:28} {:>9} {:>9} {:>7} {:>7.2}% {:>6}",
            key, counts.delivered, counts.not_delivered, total, percentage, tier
        );
    }
}
