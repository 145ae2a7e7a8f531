//! Single- and multi-factor analysis CLI tool.
//!
//! Fetches daily adjusted closes for an asset and a market index from Yahoo
//! Finance, a monthly risk-free rate from a FRED-style CSV file, and oil and
//! FX series as macro factors, then runs the full analysis pipeline.
//!
//! Usage: `cargo run --features cli --bin analyze -- XOM --rates TB3MS.csv`

mod export;
mod render;
mod sources;

use std::{collections::HashMap, path::PathBuf, process};

use chrono::{NaiveDate, Utc};
use clap::Parser;
use lintner::{
    model::{
        AdfConfig, DiagnosticsConfig, LoadRequest, PipelineConfig, load_inputs, run_pipeline,
    },
    utils::{AlignConfig, EdgeGapPolicy},
};
use tracing_subscriber::EnvFilter;

use crate::{render::ConsoleRenderer, sources::AnalysisSource};

/// Name of the risk-free rate series inside the pipeline.
const RATE_SERIES: &str = "rate";

#[derive(Parser)]
#[command(name = "analyze")]
#[command(about = "CAPM and APT factor analysis of a single asset", long_about = None)]
#[command(version)]
struct Cli {
    /// Asset ticker
    asset: String,

    /// Market index ticker
    #[arg(long, default_value = "SPY")]
    market: String,

    /// First date of the analysis window
    #[arg(long, default_value = "2010-01-01")]
    from: NaiveDate,

    /// Last date of the analysis window (defaults to today)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// FRED-style CSV file (DATE,VALUE) with the monthly risk-free rate
    #[arg(long)]
    rates: PathBuf,

    /// Multiplier turning rate values into decimals
    #[arg(long, default_value_t = 0.01)]
    rate_scale: f64,

    /// Yahoo ticker of the oil factor
    #[arg(long, default_value = "CL=F")]
    oil: String,

    /// Yahoo ticker of the FX factor
    #[arg(long, default_value = "EURUSD=X")]
    fx: String,

    /// Load a macro series from a FRED-style CSV file instead, as NAME=PATH
    #[arg(long = "series", value_parser = parse_named_path)]
    series: Vec<(String, PathBuf)>,

    /// Fit the single-factor model only
    #[arg(long)]
    single_factor: bool,

    /// Drop leading and trailing rows that cannot be interpolated
    #[arg(long)]
    trim: bool,

    /// Abort when excess returns fail the unit-root test
    #[arg(long)]
    require_stationary: bool,

    /// Significance level of every test
    #[arg(long, default_value_t = 0.05)]
    significance: f64,

    /// Directory to write CSV exports to
    #[arg(long)]
    export: Option<PathBuf>,
}

fn parse_named_path(value: &str) -> Result<(String, PathBuf), String> {
    value
        .split_once('=')
        .filter(|(name, path)| !name.is_empty() && !path.is_empty())
        .map(|(name, path)| (name.to_string(), PathBuf::from(path)))
        .ok_or_else(|| format!("expected NAME=PATH, got {value}"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let to = cli.to.unwrap_or_else(|| Utc::now().date_naive());
    let asset = cli.asset.to_uppercase();

    let macro_factors: Vec<String> =
        if cli.single_factor { Vec::new() } else { vec!["oil".into(), "fx".into()] };

    let mut files: HashMap<String, PathBuf> = cli.series.into_iter().collect();
    files.insert(RATE_SERIES.to_string(), cli.rates);
    let tickers = HashMap::from([("oil".to_string(), cli.oil), ("fx".to_string(), cli.fx)]);
    let source = AnalysisSource::new(tickers, files)?;

    let request = LoadRequest {
        from: cli.from,
        to,
        asset: asset.clone(),
        market: cli.market.clone(),
        macro_factors: macro_factors.clone(),
        rate_series: RATE_SERIES.to_string(),
        rate_scale: cli.rate_scale,
    };
    println!("\nAnalyzing {asset} against {} from {} to {to}...\n", cli.market, cli.from);
    let inputs = load_inputs(&source, &request)?;

    let config = PipelineConfig {
        align: AlignConfig {
            edge_gaps: if cli.trim { EdgeGapPolicy::Trim } else { EdgeGapPolicy::Reject },
        },
        adf: AdfConfig { significance: cli.significance, ..AdfConfig::default() },
        diagnostics: DiagnosticsConfig {
            significance: cli.significance,
            ..DiagnosticsConfig::default()
        },
        require_stationary: cli.require_stationary,
        ..PipelineConfig::new(asset, cli.market).with_macro_factors(macro_factors)
    };

    let report = run_pipeline(&config, &inputs).map_err(|e| {
        tracing::error!(kind = ?e.kind(), "analysis failed");
        e
    })?;

    report.render(&mut ConsoleRenderer::default());

    if let Some(dir) = cli.export {
        export::write_report(&report, &dir)?;
        println!("\nExported CSV files to {}", dir.display());
    }

    Ok(())
}
