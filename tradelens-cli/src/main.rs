//! TradeLens CLI — broker statement analysis commands.
//!
//! Commands:
//! - `parse` — parse a statement and print the closed trades
//! - `metrics` — performance snapshot
//! - `risk` — risk-adjusted ratios
//! - `analyze` — full report (metrics, risk, breakdowns), optionally saved as a bundle
//! - `graph` — relationship graph with radial layout
//! - `related` — trades related to one ticket
//! - `entry` — build a trade from a manual-entry JSON file
//!
//! Results go to stdout as JSON (or CSV with `--csv`); logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tradelens_analytics::export::{
    export_equity_csv, export_graph_json, export_json, export_trades_csv, save_bundle,
};
use tradelens_analytics::graph::{find_by_ticket, related_trades_with_hops};
use tradelens_analytics::{
    analyze, build_graph, AnalysisConfig, GraphDepth, MetricsSnapshot, RiskSnapshot,
};
use tradelens_core::domain::{ManualTradeInput, Session, Trade};
use tradelens_core::report::{parse_report_detailed, ParsedReport};

#[derive(Parser)]
#[command(name = "tradelens", about = "TradeLens — broker statement analytics")]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a statement and print its closed trades.
    Parse {
        #[command(flatten)]
        input: InputArgs,

        /// Print CSV instead of JSON.
        #[arg(long, default_value_t = false)]
        csv: bool,

        /// Also print skipped lines to stderr.
        #[arg(long, default_value_t = false)]
        show_skipped: bool,
    },
    /// Performance metrics for the (filtered) trades.
    Metrics {
        #[command(flatten)]
        input: InputArgs,

        /// Print the equity curve as CSV instead of the JSON snapshot.
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
    /// Risk-adjusted statistics for the (filtered) trades.
    Risk {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Full analysis report.
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Save report.json, trades.csv, equity.csv and summary.md under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Relationship graph of trades, sessions, assets and dates.
    Graph {
        #[command(flatten)]
        input: InputArgs,

        /// Edge tiers: 1 = sessions, 2 = + assets, 3 = + dates.
        #[arg(long)]
        depth: Option<u8>,

        /// Drop group nodes with no edges.
        #[arg(long, default_value_t = false)]
        hide_orphans: bool,
    },
    /// Trades related to one ticket by symbol, close date or session.
    Related {
        #[command(flatten)]
        input: InputArgs,

        /// Ticket of the focal trade.
        #[arg(long)]
        ticket: String,

        /// Breadth-first hop limit.
        #[arg(long)]
        max_hops: Option<usize>,
    },
    /// Build a trade from a manual-entry JSON file.
    Entry {
        /// JSON file holding one manual trade input.
        path: PathBuf,
    },
}

/// Statement path plus config and filter overrides.
#[derive(Args)]
struct InputArgs {
    /// Broker statement (tab-separated text).
    report: PathBuf,

    /// TOML analysis config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Starting balance for the equity curve.
    #[arg(long)]
    initial_balance: Option<f64>,

    /// Keep only these symbols (repeatable).
    #[arg(long = "symbol")]
    symbols: Vec<String>,

    /// Keep only trades opened in this session (Asia, London, NY-Overlap, NewYork).
    #[arg(long)]
    session: Option<String>,

    /// Earliest close date (YYYY-MM-DD).
    #[arg(long)]
    from: Option<String>,

    /// Latest close date (YYYY-MM-DD).
    #[arg(long)]
    to: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Parse {
            input,
            csv,
            show_skipped,
        } => run_parse(&input, csv, show_skipped),
        Commands::Metrics { input, csv } => run_metrics(&input, csv),
        Commands::Risk { input } => run_risk(&input),
        Commands::Analyze { input, output_dir } => run_analyze(&input, output_dir.as_deref()),
        Commands::Graph {
            input,
            depth,
            hide_orphans,
        } => run_graph(&input, depth, hide_orphans),
        Commands::Related {
            input,
            ticket,
            max_hops,
        } => run_related(&input, &ticket, max_hops),
        Commands::Entry { path } => run_entry(&path),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tradelens={level},tradelens_core={level},tradelens_analytics={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ─── Input loading ──────────────────────────────────────────────────

fn load_report(path: &Path) -> Result<ParsedReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read statement {}", path.display()))?;
    let parsed = parse_report_detailed(&text);
    if !parsed.anchor_found {
        warn!(path = %path.display(), "no closed transactions section found");
    }
    Ok(parsed)
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(input: &InputArgs) -> Result<AnalysisConfig> {
    let mut config = match &input.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(balance) = input.initial_balance {
        config.initial_balance = balance;
    }
    if !input.symbols.is_empty() {
        config.filter.symbols = input.symbols.clone();
    }
    if let Some(label) = &input.session {
        match Session::from_label(label) {
            Some(session) => config.filter.session = Some(session),
            None => bail!("unknown session '{label}'. Valid: Asia, London, NY-Overlap, NewYork"),
        }
    }
    if let Some(from) = &input.from {
        config.filter.from = Some(parse_date(from)?);
    }
    if let Some(to) = &input.to {
        config.filter.to = Some(parse_date(to)?);
    }

    config.validate()?;
    Ok(config)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

/// Parsed and filtered trades plus the resolved config.
fn load_selection(input: &InputArgs) -> Result<(Vec<Trade>, AnalysisConfig)> {
    let config = resolve_config(input)?;
    let parsed = load_report(&input.report)?;
    let selected = config.filter.apply(&parsed.trades);
    info!(
        parsed = parsed.trades.len(),
        selected = selected.len(),
        "trades loaded"
    );
    Ok((selected, config))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize output")?
    );
    Ok(())
}

// ─── Commands ───────────────────────────────────────────────────────

fn run_parse(input: &InputArgs, csv: bool, show_skipped: bool) -> Result<()> {
    let parsed = load_report(&input.report)?;

    if show_skipped {
        for skipped in &parsed.skipped {
            eprintln!("line {}: {:?}", skipped.line_number, skipped.reason);
        }
    }
    eprintln!(
        "{} trades, {} skipped, fingerprint {}",
        parsed.trades.len(),
        parsed.skipped.len(),
        parsed.fingerprint.short()
    );

    if csv {
        print!("{}", export_trades_csv(&parsed.trades)?);
        Ok(())
    } else {
        print_json(&parsed.trades)
    }
}

fn run_metrics(input: &InputArgs, csv: bool) -> Result<()> {
    let (trades, config) = load_selection(input)?;
    let metrics = MetricsSnapshot::compute(&trades, config.initial_balance);
    if csv {
        print!("{}", export_equity_csv(&metrics.equity_curve)?);
        Ok(())
    } else {
        print_json(&metrics)
    }
}

fn run_risk(input: &InputArgs) -> Result<()> {
    let (trades, config) = load_selection(input)?;
    print_json(&RiskSnapshot::compute(&trades, config.initial_balance))
}

fn run_analyze(input: &InputArgs, output_dir: Option<&Path>) -> Result<()> {
    let config = resolve_config(input)?;
    let parsed = load_report(&input.report)?;
    let report = analyze(&parsed.trades, &config);

    if let Some(dir) = output_dir {
        let bundle = save_bundle(&report, dir)?;
        eprintln!("Bundle saved to: {}", bundle.display());
    }
    println!("{}", export_json(&report)?);
    Ok(())
}

fn run_graph(input: &InputArgs, depth: Option<u8>, hide_orphans: bool) -> Result<()> {
    let (trades, config) = load_selection(input)?;
    let depth = match depth {
        Some(level) => GraphDepth::try_from(level)?,
        None => config.graph.depth,
    };
    let graph = build_graph(&trades, depth, hide_orphans || config.graph.hide_orphans);
    println!("{}", export_graph_json(&graph)?);
    Ok(())
}

fn run_related(input: &InputArgs, ticket: &str, max_hops: Option<usize>) -> Result<()> {
    let (trades, config) = load_selection(input)?;
    let Some(focal) = find_by_ticket(&trades, ticket) else {
        bail!("ticket '{ticket}' not found among {} trades", trades.len());
    };
    let hops = max_hops.unwrap_or(config.related.max_hops);
    print_json(&related_trades_with_hops(focal, &trades, hops))
}

fn run_entry(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let input: ManualTradeInput =
        serde_json::from_str(&text).context("failed to parse manual trade input")?;
    let trade = Trade::from_manual(input)?;
    print_json(&trade)
}
