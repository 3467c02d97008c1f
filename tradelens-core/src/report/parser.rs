//! Broker statement parser.
//!
//! The statement is plain text with tab-separated columns. Closed trades sit
//! between a "Closed Transactions" anchor (followed by one header row) and the
//! first footer row ("Total", "Closed P/L", "Open Trades"). Each trade row is
//! positional:
//!
//! ```text
//! ticket  open_time  type  size  symbol  open_price  s/l  t/p  close_time  close_price  commission  taxes  swap  profit
//! ```
//!
//! Parsing is best-effort. A row that cannot become a `Trade` is recorded as a
//! `SkippedLine`, logged, and the parser moves on.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::fields::{parse_number, parse_optional_number, parse_timestamp};
use crate::domain::{ReportFingerprint, Side, Trade, TradeParts};

/// Substring (lowercase) that opens the closed-trades section.
pub const ANCHOR_MARKER: &str = "closed transactions";

/// Substrings (lowercase) that close the section.
pub const TERMINATOR_MARKERS: [&str; 3] = ["total", "closed p/l", "open trades"];

/// Rows with fewer non-empty fields are not trades.
pub const MIN_FIELDS: usize = 10;

const LEDGER_MARKERS: [&str; 2] = ["balance", "deposit"];
const CANCELLED_MARKER: &str = "cancelled";

// Column positions after empty tokens are dropped.
const COL_TICKET: usize = 0;
const COL_OPEN_TIME: usize = 1;
const COL_TYPE: usize = 2;
const COL_SIZE: usize = 3;
const COL_SYMBOL: usize = 4;
const COL_OPEN_PRICE: usize = 5;
const COL_CLOSE_TIME: usize = 8;
const COL_CLOSE_PRICE: usize = 9;
const COL_COMMISSION: usize = 10;
const COL_SWAP: usize = 12;
const COL_PROFIT: usize = 13;

/// Why a single row could not be turned into a trade.
#[derive(Debug, Clone, Error, PartialEq, Serialize)]
pub enum LineError {
    #[error("expected at least 10 fields, found {0}")]
    TooFewFields(usize),

    #[error("invalid {field} timestamp '{value}'")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("unrecognized trade type '{0}'")]
    UnknownSide(String),

    #[error("net profit overflows ({0})")]
    NonFiniteNetProfit(f64),
}

/// Why a row inside the section was not turned into a trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "error", rename_all = "snake_case")]
pub enum SkipReason {
    /// Balance, deposit or similar account movement.
    Ledger,
    /// Order explicitly cancelled by the broker.
    Cancelled,
    /// Row could not be parsed.
    Malformed(LineError),
}

/// A row inside the closed-trades section that produced no trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedLine {
    /// 1-based line number in the report text.
    pub line_number: usize,
    pub reason: SkipReason,
    pub raw: String,
}

/// Trades plus diagnostics from one parse.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedReport {
    /// Trades in the order they appear in the report.
    pub trades: Vec<Trade>,
    pub skipped: Vec<SkippedLine>,
    /// False when the report has no closed-trades section at all.
    pub anchor_found: bool,
    pub fingerprint: ReportFingerprint,
}

impl ParsedReport {
    pub fn malformed_count(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| matches!(s.reason, SkipReason::Malformed(_)))
            .count()
    }
}

/// Parse a report and return only the trades.
///
/// A report without a closed-trades section yields an empty list.
pub fn parse_report(text: &str) -> Vec<Trade> {
    parse_report_detailed(text).trades
}

/// Parse a report, keeping skipped rows and a content fingerprint.
pub fn parse_report_detailed(text: &str) -> ParsedReport {
    let mut trades = Vec::new();
    let mut skipped = Vec::new();

    let mut lines = text.lines().enumerate();

    let anchor = lines
        .by_ref()
        .find(|(_, line)| line.to_lowercase().contains(ANCHOR_MARKER));
    let Some((anchor_idx, _)) = anchor else {
        debug!("no closed transactions section found");
        return ParsedReport {
            fingerprint: fingerprint_trades(&trades),
            trades,
            skipped,
            anchor_found: false,
        };
    };
    debug!(line = anchor_idx + 1, "closed transactions section starts");

    // Column header row.
    lines.next();

    for (idx, line) in lines {
        let line_number = idx + 1;
        let lower = line.to_lowercase();

        if TERMINATOR_MARKERS.iter().any(|m| lower.contains(m)) {
            debug!(line = line_number, "closed transactions section ends");
            break;
        }

        let fields: Vec<&str> = line
            .split('\t')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        if fields.is_empty() {
            continue;
        }

        let skip = |reason: SkipReason| SkippedLine {
            line_number,
            reason,
            raw: line.to_string(),
        };

        if LEDGER_MARKERS.iter().any(|m| lower.contains(m)) {
            skipped.push(skip(SkipReason::Ledger));
            continue;
        }
        if lower.contains(CANCELLED_MARKER) {
            skipped.push(skip(SkipReason::Cancelled));
            continue;
        }

        match parse_trade_fields(&fields) {
            Ok(trade) => trades.push(trade),
            Err(e) => {
                warn!(line = line_number, error = %e, "skipping malformed report line");
                skipped.push(skip(SkipReason::Malformed(e)));
            }
        }
    }

    let report = ParsedReport {
        fingerprint: fingerprint_trades(&trades),
        trades,
        skipped,
        anchor_found: true,
    };
    info!(
        trades = report.trades.len(),
        skipped = report.skipped.len(),
        malformed = report.malformed_count(),
        "parsed report"
    );
    report
}

/// Map one row's non-empty fields onto a `Trade`.
///
/// Numeric columns fall back to 0.0; timestamps and the trade type must parse,
/// and the derived net profit must be finite.
pub fn parse_trade_fields(fields: &[&str]) -> Result<Trade, LineError> {
    if fields.len() < MIN_FIELDS {
        return Err(LineError::TooFewFields(fields.len()));
    }

    let open_time = parse_timestamp(fields[COL_OPEN_TIME]).ok_or_else(|| {
        LineError::InvalidTimestamp {
            field: "open",
            value: fields[COL_OPEN_TIME].to_string(),
        }
    })?;
    let close_time = parse_timestamp(fields[COL_CLOSE_TIME]).ok_or_else(|| {
        LineError::InvalidTimestamp {
            field: "close",
            value: fields[COL_CLOSE_TIME].to_string(),
        }
    })?;
    let side = Side::from_label(fields[COL_TYPE])
        .ok_or_else(|| LineError::UnknownSide(fields[COL_TYPE].to_string()))?;

    let trade = Trade::new(TradeParts {
        ticket: fields[COL_TICKET].to_string(),
        open_time,
        close_time,
        side,
        size: parse_number(fields[COL_SIZE]),
        symbol: fields[COL_SYMBOL].to_uppercase(),
        open_price: parse_number(fields[COL_OPEN_PRICE]),
        close_price: parse_number(fields[COL_CLOSE_PRICE]),
        commission: parse_optional_number(fields.get(COL_COMMISSION)),
        swap: parse_optional_number(fields.get(COL_SWAP)),
        profit: parse_optional_number(fields.get(COL_PROFIT)),
    });
    // Each column is finite on its own; their sum may not be.
    if !trade.net_profit.is_finite() {
        return Err(LineError::NonFiniteNetProfit(trade.net_profit));
    }
    Ok(trade)
}

/// Fingerprint over the normalized trade rows, in order.
pub fn fingerprint_trades(trades: &[Trade]) -> ReportFingerprint {
    let mut canonical = String::new();
    for t in trades {
        canonical.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            t.ticket,
            t.open_time,
            t.side,
            t.size,
            t.symbol,
            t.open_price,
            t.close_time,
            t.close_price,
            t.commission,
            t.swap,
            t.profit,
            t.net_profit,
        ));
    }
    ReportFingerprint::from_bytes(canonical.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Ticket\tOpen Time\tType\tSize\tItem\tPrice\tS / L\tT / P\tClose Time\tPrice\tCommission\tTaxes\tSwap\tProfit";

    fn row(ticket: &str, open: &str, kind: &str, symbol: &str, close: &str, profit: &str) -> String {
        format!(
            "{ticket}\t{open}\t{kind}\t0.10\t{symbol}\t1.1000\t0.0000\t0.0000\t{close}\t1.1050\t-0.70\t0.00\t-0.30\t{profit}"
        )
    }

    fn report(rows: &[String]) -> String {
        let mut text = String::from("Statement: 123456\nAccount: Demo\nClosed Transactions:\n");
        text.push_str(HEADER);
        text.push('\n');
        for r in rows {
            text.push_str(r);
            text.push('\n');
        }
        text.push_str("\t\t\t\t\t\t\t\t\tClosed P/L:\t-0.70\t0.00\t-0.30\t50.00\n");
        text.push_str("Open Trades:\n");
        text
    }

    #[test]
    fn single_trade_report() {
        let text = report(&[row("1001", "2024.01.05 09:30", "buy", "eurusd", "2024.01.05 11:00", "50.00")]);
        let trades = parse_report(&text);
        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert_eq!(t.ticket, "1001");
        assert_eq!(t.symbol, "EURUSD");
        assert_eq!(t.side, Side::Buy);
        assert!((t.size - 0.1).abs() < 1e-12);
        assert!((t.net_profit - (t.profit + t.commission + t.swap)).abs() < 1e-12);
        assert!((t.net_profit - 49.0).abs() < 1e-9);
        assert_eq!(t.is_win, t.net_profit > 0.0);
        assert_eq!(t.duration_minutes, 90);
    }

    #[test]
    fn missing_anchor_is_empty_not_error() {
        let parsed = parse_report_detailed("Account statement\nnothing to see\n");
        assert!(parsed.trades.is_empty());
        assert!(!parsed.anchor_found);
    }

    #[test]
    fn anchor_is_case_insensitive() {
        let text = report(&[row("1", "2024.01.05 09:30", "sell", "GBPUSD", "2024.01.05 10:00", "-5")])
            .replace("Closed Transactions:", "CLOSED TRANSACTIONS");
        assert_eq!(parse_report(&text).len(), 1);
    }

    #[test]
    fn stops_at_terminator() {
        let mut text = report(&[row("1", "2024.01.05 09:30", "buy", "EURUSD", "2024.01.05 10:00", "5")]);
        text.push_str(&row("2", "2024.01.06 09:30", "buy", "EURUSD", "2024.01.06 10:00", "5"));
        text.push('\n');
        let trades = parse_report(&text);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].ticket, "1");
    }

    #[test]
    fn total_row_terminates() {
        let text = format!(
            "Closed Transactions:\n{HEADER}\n{}\nTotal:\t1\n{}\n",
            row("1", "2024.01.05 09:30", "buy", "EURUSD", "2024.01.05 10:00", "5"),
            row("2", "2024.01.06 09:30", "buy", "EURUSD", "2024.01.06 10:00", "5"),
        );
        assert_eq!(parse_report(&text).len(), 1);
    }

    #[test]
    fn skips_ledger_and_cancelled_rows() {
        let text = report(&[
            "5000\t2024.01.02 08:00\tbalance\tDeposit\t10 000.00".to_string(),
            "5001\t2024.01.03 08:00\tbuy limit\t0.10\teurusd\t1.1000\t0.0000\t0.0000\t2024.01.03 09:00\t1.1000\tcancelled".to_string(),
            row("1002", "2024.01.05 09:30", "sell", "gbpusd", "2024.01.05 12:00", "-20.00"),
        ]);
        let parsed = parse_report_detailed(&text);
        assert_eq!(parsed.trades.len(), 1);
        assert_eq!(parsed.trades[0].ticket, "1002");
        assert_eq!(parsed.skipped.len(), 2);
        assert_eq!(parsed.skipped[0].reason, SkipReason::Ledger);
        assert_eq!(parsed.skipped[1].reason, SkipReason::Cancelled);
        assert_eq!(parsed.malformed_count(), 0);
    }

    #[test]
    fn short_rows_are_skipped_not_fatal() {
        let text = report(&[
            "1003\t2024.01.05 09:30\tbuy\t0.10".to_string(),
            row("1004", "2024.01.05 09:30", "buy", "EURUSD", "2024.01.05 10:00", "5"),
        ]);
        let parsed = parse_report_detailed(&text);
        assert_eq!(parsed.trades.len(), 1);
        assert_eq!(parsed.malformed_count(), 1);
        assert_eq!(
            parsed.skipped[0].reason,
            SkipReason::Malformed(LineError::TooFewFields(4))
        );
    }

    #[test]
    fn bad_timestamp_skips_line() {
        let text = report(&[
            row("1005", "yesterday", "buy", "EURUSD", "2024.01.05 10:00", "5"),
            row("1006", "2024.01.05 09:30", "buy", "EURUSD", "2024.01.05 10:00", "5"),
        ]);
        let parsed = parse_report_detailed(&text);
        assert_eq!(parsed.trades.len(), 1);
        assert!(matches!(
            parsed.skipped[0].reason,
            SkipReason::Malformed(LineError::InvalidTimestamp { field: "open", .. })
        ));
    }

    #[test]
    fn unknown_type_skips_line() {
        let text = report(&[row("1007", "2024.01.05 09:30", "credit", "EURUSD", "2024.01.05 10:00", "5")]);
        let parsed = parse_report_detailed(&text);
        assert!(parsed.trades.is_empty());
        assert_eq!(
            parsed.skipped[0].reason,
            SkipReason::Malformed(LineError::UnknownSide("credit".into()))
        );
    }

    #[test]
    fn bad_numbers_default_to_zero() {
        let text = report(&[row("1008", "2024.01.05 09:30", "buy", "EURUSD", "2024.01.05 10:00", "oops")]);
        let trades = parse_report(&text);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].profit, 0.0);
        assert!((trades[0].net_profit - (-1.0)).abs() < 1e-9);
    }

    #[test]
    fn overflowing_net_profit_skips_line() {
        let huge = "1009\t2024.01.05 09:30\tbuy\t0.10\tEURUSD\t1.1000\t0\t0\t2024.01.05 10:00\t1.1050\t0.00\t0.00\t1e308\t1e308";
        let text = report(&[
            huge.to_string(),
            row("1010", "2024.01.05 09:30", "buy", "EURUSD", "2024.01.05 10:00", "-5"),
        ]);
        let parsed = parse_report_detailed(&text);
        assert_eq!(parsed.trades.len(), 1);
        assert_eq!(parsed.trades[0].ticket, "1010");
        assert!(matches!(
            parsed.skipped[0].reason,
            SkipReason::Malformed(LineError::NonFiniteNetProfit(v)) if v.is_infinite()
        ));
    }

    #[test]
    fn trailing_columns_are_optional() {
        let fields = [
            "1009",
            "2024.01.05 09:30",
            "sell",
            "1.00",
            "xauusd",
            "2050.10",
            "0",
            "0",
            "2024.01.05 16:45",
            "2045.10",
        ];
        let t = parse_trade_fields(&fields).unwrap();
        assert_eq!(t.symbol, "XAUUSD");
        assert_eq!(t.commission, 0.0);
        assert_eq!(t.swap, 0.0);
        assert_eq!(t.profit, 0.0);
        assert!(!t.is_win);
    }

    #[test]
    fn preserves_encounter_order() {
        let text = report(&[
            row("3", "2024.01.07 09:30", "buy", "EURUSD", "2024.01.07 10:00", "5"),
            row("1", "2024.01.05 09:30", "buy", "EURUSD", "2024.01.05 10:00", "5"),
            row("2", "2024.01.06 09:30", "buy", "EURUSD", "2024.01.06 10:00", "5"),
        ]);
        let tickets: Vec<String> = parse_report(&text).into_iter().map(|t| t.ticket).collect();
        assert_eq!(tickets, vec!["3", "1", "2"]);
    }

    #[test]
    fn parsing_is_idempotent() {
        let text = report(&[
            row("1", "2024.01.05 09:30", "buy", "EURUSD", "2024.01.05 10:00", "5"),
            row("2", "2024.01.06 14:30", "sell", "USDJPY", "2024.01.06 18:00", "-12.5"),
        ]);
        let a = parse_report_detailed(&text);
        let b = parse_report_detailed(&text);
        assert_eq!(a.trades, b.trades);
        assert_eq!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn fingerprint_ignores_ledger_rows() {
        let trade_row = row("1", "2024.01.05 09:30", "buy", "EURUSD", "2024.01.05 10:00", "5");
        let plain = report(&[trade_row.clone()]);
        let with_deposit = report(&[
            "5000\t2024.01.02 08:00\tbalance\tDeposit\t10 000.00".to_string(),
            trade_row,
        ]);
        assert_eq!(
            parse_report_detailed(&plain).fingerprint,
            parse_report_detailed(&with_deposit).fingerprint
        );
    }
}
