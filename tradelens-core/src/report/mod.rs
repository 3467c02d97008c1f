//! Broker report parsing: statement text in, ordered `Trade`s out.

pub mod fields;
pub mod parser;

pub use fields::{parse_number, parse_timestamp, TIMESTAMP_FORMAT};
pub use parser::{
    fingerprint_trades, parse_report, parse_report_detailed, parse_trade_fields, LineError,
    ParsedReport, SkipReason, SkippedLine,
};
