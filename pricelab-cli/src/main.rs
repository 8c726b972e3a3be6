//! PriceLab CLI: fetch, returns and chart commands.
//!
//! Commands:
//! - `run`: fetch and resample prices, derive returns, show the three charts
//! - `fetch`: fetch and resample prices only, print the table and failures

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use pricelab_core::analysis::CorrelationMatrix;
use pricelab_core::config::PipelineConfig;
use pricelab_core::data::{
    Aggregator, DataProvider, FailureList, Period, PriceField, StdoutProgress, SyntheticProvider,
    YahooProvider,
};
use pricelab_core::export::{export_to_path, ExportOptions};
use pricelab_tui::viewer::{self, ChartSet, ViewerOutcome};
use pricelab_tui::Theme;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "pricelab",
    about = "PriceLab CLI: price history, returns and correlation charts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch prices, compute returns and show the price, returns and correlation charts.
    Run {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Write the resampled price table to this file (`;`-separated, decimal comma).
        #[arg(long)]
        export: Option<PathBuf>,

        /// Skip the chart viewer.
        #[arg(long, default_value_t = false)]
        no_plot: bool,
    },
    /// Fetch and resample prices only, printing the table and any failures.
    Fetch {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Write the resampled price table to this file (`;`-separated, decimal comma).
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

/// Flags shared by every pipeline command. Each one overrides the config file.
#[derive(Args, Debug)]
struct PipelineArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Symbols to fetch (e.g., BTC-USD ETH-USD USDT-USD).
    #[arg(long, num_args = 1..)]
    symbols: Vec<String>,

    /// Resampling period: D, W, M, Q or Y. Defaults to W.
    #[arg(long)]
    period: Option<Period>,

    /// Start date (YYYY-MM-DD). Defaults to 2015-01-01.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), exclusive. Defaults to today.
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Price field: adj_close, close, open, high or low. Defaults to adj_close.
    #[arg(long)]
    field: Option<PriceField>,

    /// Use the offline synthetic random walk instead of Yahoo Finance.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Rows shown in console previews.
    #[arg(long)]
    preview_rows: Option<usize>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            pipeline,
            export,
            no_plot,
        } => run_pipeline(&pipeline, export, !no_plot),
        Commands::Fetch { pipeline, export } => run_fetch(&pipeline, export),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(args: &PipelineArgs, export: Option<PathBuf>) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    if !args.symbols.is_empty() {
        config.symbols = args.symbols.clone();
    }
    if let Some(period) = args.period {
        config.period = period;
    }
    if let Some(start) = args.start {
        config.start_date = start;
    }
    if args.end.is_some() {
        config.end_date = args.end;
    }
    if let Some(field) = args.field {
        config.field = field;
    }
    if let Some(rows) = args.preview_rows {
        config.preview_rows = rows;
    }
    if export.is_some() {
        config.export = export;
    }

    if config.symbols.iter().any(|s| s.trim().is_empty()) {
        bail!("symbols must not be blank");
    }

    Ok(config)
}

fn build_provider(synthetic: bool) -> Result<Box<dyn DataProvider>> {
    if synthetic {
        info!("using synthetic data; prices are a seeded random walk, not market data");
        return Ok(Box::new(SyntheticProvider::new()));
    }
    let provider = YahooProvider::new()
        .context("failed to initialise the Yahoo Finance client")?;
    Ok(Box::new(provider))
}

fn report_failures(failures: &FailureList) {
    if failures.is_empty() {
        return;
    }
    warn!(failed = ?failures.symbols(), "some symbols could not be downloaded");
    println!("\nFailed to download {} symbol(s):", failures.len());
    for failure in failures.iter() {
        println!("  {}: {}", failure.symbol, failure.reason);
    }
}

fn write_export(config: &PipelineConfig, path: &Path, aggregator: &Aggregator<'_>) -> Result<()> {
    export_to_path(aggregator.prices(), path, &ExportOptions::default())
        .with_context(|| format!("failed to export prices to {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = aggregator.prices().len(),
        period = %config.period,
        "exported price table"
    );
    Ok(())
}

fn fetch_prices<'a>(
    config: &PipelineConfig,
    provider: &'a dyn DataProvider,
    progress: &'a StdoutProgress,
) -> Result<Aggregator<'a>> {
    let today = chrono::Local::now().date_naive();
    let request = config.fetch_request(today)?;

    let mut aggregator = Aggregator::new(provider, request).with_progress(progress);
    aggregator.historical_data(&config.symbol_refs(), config.period);

    report_failures(aggregator.failures());
    println!(
        "\nResampled prices ({}, tail preview):\n{}",
        config.period,
        aggregator.prices().preview(config.preview_rows)
    );
    Ok(aggregator)
}

fn run_fetch(args: &PipelineArgs, export: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(args, export)?;
    let provider = build_provider(args.synthetic)?;
    let progress = StdoutProgress {
        preview_rows: config.preview_rows,
    };

    let aggregator = fetch_prices(&config, provider.as_ref(), &progress)?;
    if let Some(path) = &config.export {
        write_export(&config, path, &aggregator)?;
    }
    Ok(())
}

fn run_pipeline(args: &PipelineArgs, export: Option<PathBuf>, plot: bool) -> Result<()> {
    let config = resolve_config(args, export)?;
    let provider = build_provider(args.synthetic)?;
    let progress = StdoutProgress {
        preview_rows: config.preview_rows,
    };

    let mut aggregator = fetch_prices(&config, provider.as_ref(), &progress)?;

    let returns = aggregator.compute_returns().clone();
    println!(
        "\nPeriod returns (tail preview):\n{}",
        returns.simple.preview(config.preview_rows)
    );
    println!(
        "\nCumulative returns (latest):\n{}",
        returns.cumulative.preview(1)
    );
    for (symbol, total) in returns.totals() {
        match total {
            Some(total) => info!(symbol, total_return = total, "cumulative return"),
            None => info!(symbol, "no defined returns"),
        }
    }

    if let Some(path) = &config.export {
        write_export(&config, path, &aggregator)?;
    }

    if !plot {
        return Ok(());
    }

    let correlation = CorrelationMatrix::pearson(aggregator.prices());
    let charts = ChartSet {
        prices: aggregator.prices(),
        returns: &returns.simple,
        correlation: &correlation,
    };

    viewer::install_panic_hook();
    match viewer::show(&charts, &Theme::default())? {
        ViewerOutcome::Completed => {}
        ViewerOutcome::Aborted { dismissed } => {
            info!(dismissed, "chart viewer closed early");
        }
    }
    Ok(())
}
