//! Export — JSON, CSV, and Markdown artifacts for an analysis.
//!
//! - **JSON**: the full `AnalysisReport`, schema-versioned
//! - **CSV**: trade tape and equity curve
//! - **Markdown**: a human-readable summary
//!
//! Unknown schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tradelens_core::domain::Trade;

use crate::analysis::{AnalysisReport, SCHEMA_VERSION};
use crate::breakdown::GroupBreakdown;
use crate::graph::TradeGraph;
use crate::metrics::EquityPoint;

const CSV_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisReport` to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize an `AnalysisReport`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

/// Serialize a relationship graph to pretty JSON.
pub fn export_graph_json(graph: &TradeGraph) -> Result<String> {
    serde_json::to_string_pretty(graph).context("failed to serialize TradeGraph to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export trades as CSV, one row per trade in input order.
///
/// Columns: ticket, symbol, side, size, open_time, open_price, close_time,
/// close_price, commission, swap, profit, net_profit, duration_minutes,
/// session, is_win
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "ticket",
        "symbol",
        "side",
        "size",
        "open_time",
        "open_price",
        "close_time",
        "close_price",
        "commission",
        "swap",
        "profit",
        "net_profit",
        "duration_minutes",
        "session",
        "is_win",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.ticket,
            &t.symbol,
            &t.side.to_string(),
            &format!("{:.2}", t.size),
            &t.open_time.format(CSV_TIME_FORMAT).to_string(),
            &format!("{:.5}", t.open_price),
            &t.close_time.format(CSV_TIME_FORMAT).to_string(),
            &format!("{:.5}", t.close_price),
            &format!("{:.2}", t.commission),
            &format!("{:.2}", t.swap),
            &format!("{:.2}", t.profit),
            &format!("{:.2}", t.net_profit),
            &t.duration_minutes.to_string(),
            t.session().label(),
            &t.is_win.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export an equity curve as CSV.
pub fn export_equity_csv(curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "ticket",
        "time",
        "balance",
        "peak",
        "drawdown",
        "drawdown_percent",
    ])?;
    for p in curve {
        wtr.write_record([
            &p.ticket,
            &p.time.format(CSV_TIME_FORMAT).to_string(),
            &format!("{:.2}", p.balance),
            &format!("{:.2}", p.peak),
            &format!("{:.2}", p.drawdown),
            &format!("{:.4}", p.drawdown_percent),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one analysis.
///
/// Creates `{fingerprint}_{timestamp}/` under `output_dir` containing
/// `report.json`, `trades.csv`, `equity.csv` and `summary.md`.
/// Returns the path to the created directory.
pub fn save_bundle(report: &AnalysisReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        report.fingerprint.short(),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let dir = output_dir.join(dirname);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create bundle dir: {}", dir.display()))?;

    std::fs::write(dir.join("report.json"), export_json(report)?)?;
    std::fs::write(dir.join("trades.csv"), export_trades_csv(&report.trades)?)?;
    std::fs::write(
        dir.join("equity.csv"),
        export_equity_csv(&report.metrics.equity_curve)?,
    )?;
    std::fs::write(dir.join("summary.md"), generate_summary(report))?;

    Ok(dir)
}

/// Load an `AnalysisReport` from a bundle directory.
pub fn load_bundle(dir: &Path) -> Result<AnalysisReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown summary ───────────────────────────────────────────────

/// Markdown summary of one analysis.
pub fn generate_summary(report: &AnalysisReport) -> String {
    let m = &report.metrics;
    let r = &report.risk;
    let mut md = String::with_capacity(2048);

    md.push_str("# Trade Analysis\n\n");
    md.push_str("| Field | Value |\n| --- | --- |\n");
    md.push_str(&format!("| Fingerprint | {} |\n", report.fingerprint.short()));
    md.push_str(&format!(
        "| Trades | {} of {} |\n",
        report.trades.len(),
        report.input_trades
    ));
    md.push_str(&format!("| Initial Balance | {:.2} |\n", m.initial_balance));
    md.push('\n');

    md.push_str("## Performance\n\n");
    md.push_str("| Metric | Value |\n| --- | --- |\n");
    md.push_str(&format!("| Net Profit | {:.2} |\n", m.total_pnl));
    md.push_str(&format!("| Return | {:.2}% |\n", m.return_percent));
    md.push_str(&format!(
        "| Win Rate | {:.2}% ({} / {}) |\n",
        m.win_rate, m.total_wins, m.total_trades
    ));
    md.push_str(&format!("| Profit Factor | {} |\n", m.profit_factor));
    md.push_str(&format!("| Expectancy | {:.2} |\n", m.expectancy));
    md.push_str(&format!(
        "| Max Drawdown | {:.2} ({:.2}%) |\n",
        m.max_drawdown, m.max_drawdown_percent
    ));
    md.push('\n');

    md.push_str("## Risk\n\n");
    md.push_str("| Metric | Value |\n| --- | --- |\n");
    md.push_str(&format!("| Sharpe | {:.2} |\n", r.sharpe));
    md.push_str(&format!("| Sortino | {} |\n", r.sortino));
    md.push_str(&format!("| Calmar | {} |\n", r.calmar));
    md.push_str(&format!("| Recovery Factor | {} |\n", r.recovery_factor));
    md.push_str(&format!("| Kelly | {:.2}% |\n", r.kelly_percent));
    md.push_str(&format!("| SQN | {:.2} ({}) |\n", r.sqn.value, r.sqn.grade));
    md.push('\n');

    push_breakdown(&mut md, "By Symbol", &report.by_symbol);
    push_breakdown(&mut md, "By Session", &report.by_session);
    md
}

fn push_breakdown(md: &mut String, title: &str, rows: &[GroupBreakdown]) {
    if rows.is_empty() {
        return;
    }
    md.push_str(&format!("## {title}\n\n"));
    md.push_str("| Group | Trades | Win Rate | Net Profit |\n| --- | --- | --- | --- |\n");
    for row in rows {
        md.push_str(&format!(
            "| {} | {} | {:.1}% | {:.2} |\n",
            row.group, row.trades, row.win_rate, row.net_profit
        ));
    }
    md.push('\n');
}
