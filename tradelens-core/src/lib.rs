//! TradeLens Core — domain types and broker report parsing.
//!
//! This crate contains everything upstream of the statistics:
//! - Domain types (trades, sides, market sessions, report fingerprints)
//! - Tolerant parser for tab-separated broker statements
//! - Manual trade entry with the notional-value profit formula
//! - Trade filters for selecting the subset an analysis runs on
//!
//! Everything here is a pure transform of its input. There is no shared state.

pub mod domain;
pub mod filter;
pub mod report;

pub use domain::{ManualTradeInput, ReportFingerprint, Session, Side, Trade, TradeParts};
pub use filter::{Outcome, TradeFilter};
pub use report::{parse_report, parse_report_detailed, ParsedReport};
