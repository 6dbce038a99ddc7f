//! CLI definition and dispatch.

use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::console_report::ConsoleReportAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_chart::SvgChartAdapter;
use crate::domain::config::{
    build_analysis_config, parse_tickers, validate_analysis_config, AnalysisConfig,
};
use crate::domain::error::AnalysisError;
use crate::domain::pipeline::{prepare, summarize};
use crate::ports::chart_port::ChartPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tickerlens", about = "Multi-ticker price analysis")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load, enrich and summarize price files
    Analyze {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Comma separated ticker list
        #[arg(long)]
        tickers: Option<String>,
        #[arg(long, conflicts_with = "no_chart")]
        chart: Option<PathBuf>,
        #[arg(long)]
        no_chart: bool,
        #[arg(long)]
        top_n: Option<usize>,
        #[arg(long)]
        top_n_per_ticker: Option<usize>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show row count and date range per ticker
    Info {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Command-line values that replace configured ones.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub tickers: Option<String>,
    pub chart: Option<PathBuf>,
    pub top_n: Option<usize>,
    pub top_n_per_ticker: Option<usize>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            config,
            data_dir,
            tickers,
            chart,
            no_chart,
            top_n,
            top_n_per_ticker,
        } => {
            let overrides = Overrides {
                data_dir,
                tickers,
                chart,
                top_n,
                top_n_per_ticker,
            };
            run_analyze(config.as_deref(), &overrides, no_chart)
        }
        Command::Validate { config } => run_validate(&config),
        Command::Info { config } => run_info(config.as_deref()),
    }
}

fn exit_with(result: Result<(), AnalysisError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, AnalysisError> {
    FileConfigAdapter::from_file(path).map_err(|e| AnalysisError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Built-in defaults when no file is given.
pub fn resolve_config(path: Option<&Path>) -> Result<AnalysisConfig, AnalysisError> {
    match path {
        Some(p) => {
            info!(path = %p.display(), "loading config");
            let adapter = load_config(p)?;
            build_analysis_config(&adapter)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

pub fn apply_overrides(
    mut config: AnalysisConfig,
    overrides: &Overrides,
) -> Result<AnalysisConfig, AnalysisError> {
    if let Some(list) = &overrides.tickers {
        config.tickers = parse_tickers(list).map_err(|e| AnalysisError::ConfigInvalid {
            section: "data".into(),
            key: "tickers".into(),
            reason: e.to_string(),
        })?;
    }
    if let Some(dir) = &overrides.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(chart) = &overrides.chart {
        config.report.chart_path = chart.clone();
    }
    if let Some(n) = overrides.top_n {
        config.report.top_n = n;
    }
    if let Some(n) = overrides.top_n_per_ticker {
        config.report.top_n_per_ticker = n;
    }
    validate_analysis_config(&config)?;
    Ok(config)
}

/// Runs the full pipeline against the given ports. The chart is skipped when
/// `chart` is `None`.
pub fn run_analysis(
    data_port: &dyn DataPort,
    config: &AnalysisConfig,
    report_port: &mut dyn ReportPort,
    chart: Option<&dyn ChartPort>,
) -> Result<(), AnalysisError> {
    let table = prepare(data_port, config)?;
    let report = summarize(&table, &config.report)?;
    report_port.write_report(&report)?;

    if let Some(chart) = chart {
        chart.render(&table, &config.report.chart_title, &config.report.chart_path)?;
    }
    Ok(())
}

fn run_analyze(config_path: Option<&Path>, overrides: &Overrides, no_chart: bool) -> ExitCode {
    let result = resolve_config(config_path)
        .and_then(|config| apply_overrides(config, overrides))
        .and_then(|config| {
            let data = CsvAdapter::new(config.skip_rows);
            let mut report = ConsoleReportAdapter::new(io::stdout().lock());
            let chart = SvgChartAdapter;
            let chart: Option<&dyn ChartPort> = if no_chart { None } else { Some(&chart) };
            run_analysis(&data, &config, &mut report, chart)
        });
    exit_with(result)
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let result = resolve_config(Some(config_path)).map(|config| {
        eprintln!("Tickers:  {}", config.tickers.join(", "));
        for source in config.sources() {
            eprintln!("  {}: {}", source.ticker, source.path.display());
        }
        eprintln!(
            "Windows:  short={} long={} volatility={}",
            config.windows.short, config.windows.long, config.windows.volatility
        );
        eprintln!(
            "Report:   top_n={} top_n_per_ticker={} chart={}",
            config.report.top_n,
            config.report.top_n_per_ticker,
            config.report.chart_path.display()
        );
        eprintln!("\nConfiguration is valid.");
    });
    exit_with(result)
}

/// Writes one summary line per ticker. Every ticker is attempted; the first
/// failure is returned after the rest have been reported.
pub fn describe_sources<W: Write>(
    data_port: &dyn DataPort,
    config: &AnalysisConfig,
    out: &mut W,
) -> Result<(), AnalysisError> {
    let mut first_error = None;

    for source in config.sources() {
        match data_port.load_series(&source) {
            Ok(series) => match series.date_range() {
                Some((first, last)) => writeln!(
                    out,
                    "{}: {} rows, {} to {}",
                    source.ticker,
                    series.len(),
                    first,
                    last
                )?,
                None => writeln!(out, "{}: no data found", source.ticker)?,
            },
            Err(e) => {
                eprintln!("error: {e}");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn run_info(config_path: Option<&Path>) -> ExitCode {
    let result = resolve_config(config_path).and_then(|config| {
        let data = CsvAdapter::new(config.skip_rows);
        describe_sources(&data, &config, &mut io::stdout().lock())
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => (&e).into(),
    }
}
