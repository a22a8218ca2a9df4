use analytics::{
    AnalyticsEngine, PerformanceStats, PortfolioAnalysis, breakdown_by_tag, breakdown_by_ticker,
};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL};
use configuration::SettingsOverrides;
use configuration::settings::Config;
use core_types::Trade;
use risk::{ExposureAllocator, ExposureReport};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The main entry point for the journal analytics tool.
fn main() -> Result<()> {
    // JOURNAL__* overrides may live in a .env file; it is optional.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => configuration::load_config_from(path)?,
        None => configuration::load_config()?,
    };
    cli.overrides.apply(&mut config);
    config.validate()?;

    let _log_guard = configuration::init_logging(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Trades(args) => handle_trades(&config, &args),
        Commands::Stats(args) => handle_stats(&config, &args),
        Commands::Exposure(args) => handle_exposure(&config, &args),
        Commands::Breakdown(args) => handle_breakdown(&config, &args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance and exposure analytics for a discretionary trading journal.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a settings file (defaults to ./config.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: SettingsOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-trade metrics: P&L, risk, R-ratio, days held.
    Trades(SnapshotArgs),
    /// Portfolio statistics, raw and risk-normalized.
    Stats(SnapshotArgs),
    /// Allocation of open positions into exposure buckets.
    Exposure(SnapshotArgs),
    /// Raw statistics grouped by ticker or tag.
    Breakdown(BreakdownArgs),
}

#[derive(Args)]
struct SnapshotArgs {
    /// JSON file holding the trade snapshot exported by the content API.
    #[arg(long, short)]
    file: PathBuf,

    /// Date unfinished trades are measured up to (format: YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Print the result as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BreakdownArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,

    /// What to group trades by.
    #[arg(long, value_enum, default_value_t = GroupBy::Ticker)]
    by: GroupBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GroupBy {
    Ticker,
    Tag,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

fn handle_trades(config: &Config, args: &SnapshotArgs) -> Result<()> {
    let analysis = run_analysis(config, args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis.trades)?);
        return Ok(());
    }

    let mut table = new_table(&[
        "Trade", "Ticker", "Side", "Status", "Shares", "Entry", "Stop", "Risk", "Realized",
        "Unrealized", "P&L %", "R", "Days",
    ]);
    for trade in &analysis.trades {
        let m = &trade.metrics;
        table.add_row(vec![
            Cell::new(&m.trade_id),
            Cell::new(&m.ticker),
            Cell::new(format!("{:?}", m.direction)),
            Cell::new(format!("{:?}", m.status)),
            numeric(format!("{}/{}", m.remaining_shares, m.entry_shares)),
            numeric(fmt_decimal(m.entry_price)),
            numeric(fmt_decimal(m.effective_stop)),
            numeric(fmt_decimal(m.risk_amount)),
            numeric(fmt_optional(m.realized_pnl)),
            numeric(fmt_optional(m.unrealized_pnl)),
            numeric(fmt_optional(m.total_pnl_percent)),
            numeric(fmt_optional(m.r_ratio)),
            numeric(m.days_held.to_string()),
        ]);
    }
    println!("{table}");
    print_rejected(&analysis);
    Ok(())
}

fn handle_stats(config: &Config, args: &SnapshotArgs) -> Result<()> {
    let analysis = run_analysis(config, args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis.stats)?);
        return Ok(());
    }

    let stats = &analysis.stats;
    let mut columns = vec![("Raw".to_string(), &stats.raw)];
    if let Some(normalized) = &stats.normalized {
        columns.push(("Normalized".to_string(), normalized));
    }
    println!("{}", stats_table(&columns));
    println!("Open trades: {}", stats.open_trades);

    if let Some(reason) = &stats.normalization_unavailable {
        println!("Normalized view unavailable: {reason}");
    }
    if !stats.excluded_from_normalized.is_empty() {
        println!(
            "Excluded from normalized view (negligible risk): {}",
            stats.excluded_from_normalized.join(", ")
        );
    }
    print_rejected(&analysis);
    Ok(())
}

fn handle_exposure(config: &Config, args: &SnapshotArgs) -> Result<()> {
    let trades = load_snapshot(&args.file)?;
    let allocator = ExposureAllocator::new(&config.exposure)?;
    let report = allocator.allocate(&trades, config.account.equity)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    print_exposure(&report);
    Ok(())
}

fn handle_breakdown(config: &Config, args: &BreakdownArgs) -> Result<()> {
    let analysis = run_analysis(config, &args.snapshot)?;
    let groups = match args.by {
        GroupBy::Ticker => breakdown_by_ticker(&analysis.trades),
        GroupBy::Tag => breakdown_by_tag(&analysis.trades),
    };

    if args.snapshot.json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }
    println!("{}", breakdown_table(&groups));
    print_rejected(&analysis);
    Ok(())
}

// ==============================================================================
// Helpers
// ==============================================================================

/// Reads a trade snapshot: a JSON array of trades in the content API's shape.
fn load_snapshot(path: &Path) -> Result<Vec<Trade>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read trade snapshot {}", path.display()))?;
    let trades: Vec<Trade> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse trade snapshot {}", path.display()))?;
    tracing::debug!(count = trades.len(), path = %path.display(), "Loaded trade snapshot.");
    Ok(trades)
}

fn run_analysis(config: &Config, args: &SnapshotArgs) -> Result<PortfolioAnalysis> {
    let trades = load_snapshot(&args.file)?;
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let engine = AnalyticsEngine::new(config.normalization.clone());
    Ok(engine.evaluate(&trades, config.account.equity, as_of))
}

fn print_rejected(analysis: &PortfolioAnalysis) {
    for rejected in &analysis.rejected {
        eprintln!("Skipped {}: {}", rejected.trade_id, rejected.reason);
    }
}

fn print_exposure(report: &ExposureReport) {
    let mut table = new_table(&["Bucket", "Capacity %", "Exposure %", "Occupied %", "Trades", "Overflow"]);
    for bucket in &report.buckets {
        table.add_row(vec![
            Cell::new(bucket.index + 1),
            numeric(fmt_decimal(bucket.capacity_pct)),
            numeric(fmt_decimal(bucket.exposure_pct)),
            numeric(fmt_decimal(bucket.occupied_pct)),
            Cell::new(bucket.trade_ids.join(", ")),
            Cell::new(if bucket.overflow { "yes" } else { "" }),
        ]);
    }
    println!("{table}");
    println!(
        "Total exposure: {}% of equity ({}% of the {}% target)",
        fmt_decimal(report.total_exposure_pct),
        fmt_decimal(report.utilization_pct),
        fmt_decimal(report.target_exposure_pct)
    );
    for skipped in &report.skipped {
        eprintln!("Skipped {}: {}", skipped.trade_id, skipped.reason);
    }
}

fn stats_table(columns: &[(String, &PerformanceStats)]) -> Table {
    let mut header = vec!["Metric".to_string()];
    header.extend(columns.iter().map(|(name, _)| name.clone()));
    let header: Vec<&str> = header.iter().map(String::as_str).collect();
    let mut table = new_table(&header);

    for (label, value) in stats_rows() {
        let mut row = vec![Cell::new(label)];
        row.extend(columns.iter().map(|(_, stats)| numeric(value(*stats))));
        table.add_row(row);
    }
    table
}

fn breakdown_table(groups: &BTreeMap<String, PerformanceStats>) -> Table {
    let mut table = new_table(&[
        "Group", "Trades", "Batting avg", "Avg win %", "Avg loss %", "Profit factor", "Expectancy",
        "Total P&L",
    ]);
    for (key, stats) in groups {
        table.add_row(vec![
            Cell::new(key),
            numeric(stats.total_trades.to_string()),
            numeric(fmt_decimal(stats.batting_average)),
            numeric(fmt_optional(stats.average_win_percent)),
            numeric(fmt_optional(stats.average_loss_percent)),
            numeric(fmt_optional(stats.profit_factor)),
            numeric(fmt_optional(stats.expectancy)),
            numeric(fmt_decimal(stats.total_profit_loss)),
        ]);
    }
    table
}

type StatsRow = (&'static str, fn(&PerformanceStats) -> String);

fn stats_rows() -> [StatsRow; 19] {
    [
        ("Classified trades", |s| s.total_trades.to_string()),
        ("Winners / losers / flat", |s| {
            format!("{} / {} / {}", s.winning_trades, s.losing_trades, s.break_even_trades)
        }),
        ("Batting average", |s| fmt_decimal(s.batting_average)),
        ("Average win %", |s| fmt_optional(s.average_win_percent)),
        ("Average loss %", |s| fmt_optional(s.average_loss_percent)),
        ("Win/loss ratio", |s| fmt_optional(s.win_loss_ratio)),
        ("Adjusted win/loss ratio", |s| fmt_optional(s.adjusted_win_loss_ratio)),
        ("Average R", |s| fmt_optional(s.average_r_ratio)),
        ("Profit factor", |s| fmt_optional(s.profit_factor)),
        ("Expectancy %", |s| fmt_optional(s.expectancy)),
        ("Avg days held (winners)", |s| fmt_optional(s.average_days_held_winners)),
        ("Avg days held (losers)", |s| fmt_optional(s.average_days_held_losers)),
        ("Max gain %", |s| fmt_optional(s.max_gain_percent)),
        ("Max loss %", |s| fmt_optional(s.max_loss_percent)),
        ("Max gain/loss ratio", |s| fmt_optional(s.max_gain_loss_ratio)),
        ("Gross profit", |s| fmt_decimal(s.gross_profit)),
        ("Gross loss", |s| fmt_decimal(s.gross_loss)),
        ("Total P&L", |s| fmt_decimal(s.total_profit_loss)),
        ("Total P&L %", |s| fmt_decimal(s.total_profit_loss_percent)),
    ]
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

fn numeric(text: impl Into<String>) -> Cell {
    Cell::new(text.into()).set_alignment(CellAlignment::Right)
}

fn fmt_decimal(value: Decimal) -> String {
    value.round_dp(2).normalize().to_string()
}

fn fmt_optional(value: Option<Decimal>) -> String {
    value.map(fmt_decimal).unwrap_or_else(|| "n/a".to_string())
}
