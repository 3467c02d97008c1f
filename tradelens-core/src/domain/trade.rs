//! Trade — one closed position with entry/exit, costs and net result.

use super::session::Session;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a closed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Normalize a broker "type" column by substring match.
    ///
    /// `"buy"`, `"Buy Limit"`, `"BUY"` all map to `Buy`. Returns `None` when
    /// neither direction is present.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.to_ascii_lowercase();
        if lower.contains("buy") {
            Some(Side::Buy)
        } else if lower.contains("sell") {
            Some(Side::Sell)
        } else {
            None
        }
    }

    /// +1 for buy, -1 for sell.
    pub fn sign(self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Raw trade fields as they come out of a report row or an entry form.
///
/// `Trade::new` derives everything else from these.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeParts {
    pub ticket: String,
    pub open_time: NaiveDateTime,
    pub close_time: NaiveDateTime,
    pub side: Side,
    pub size: f64,
    pub symbol: String,
    pub open_price: f64,
    pub close_price: f64,
    pub commission: f64,
    pub swap: f64,
    pub profit: f64,
}

/// A closed trade.
///
/// `net_profit`, `duration_minutes` and `is_win` are derived once in
/// [`Trade::new`] and never recomputed. `duration_minutes` may be negative
/// when the source timestamps are out of order; it is not corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // ── Identification ──
    pub ticket: String,
    pub symbol: String,
    pub side: Side,
    pub size: f64,

    // ── Entry / exit ──
    pub open_time: NaiveDateTime,
    pub open_price: f64,
    pub close_time: NaiveDateTime,
    pub close_price: f64,

    // ── PnL ──
    pub commission: f64,
    pub swap: f64,
    /// Gross profit as reported by the broker.
    pub profit: f64,
    /// `profit + commission + swap`.
    pub net_profit: f64,

    // ── Derived ──
    pub duration_minutes: i64,
    pub is_win: bool,
}

impl Trade {
    pub fn new(parts: TradeParts) -> Self {
        let net_profit = parts.profit + parts.commission + parts.swap;
        let duration_minutes = (parts.close_time - parts.open_time).num_minutes();
        Self {
            ticket: parts.ticket,
            symbol: parts.symbol,
            side: parts.side,
            size: parts.size,
            open_time: parts.open_time,
            open_price: parts.open_price,
            close_time: parts.close_time,
            close_price: parts.close_price,
            commission: parts.commission,
            swap: parts.swap,
            profit: parts.profit,
            net_profit,
            duration_minutes,
            is_win: net_profit > 0.0,
        }
    }

    /// Calendar date of the close, used for date grouping.
    pub fn close_date(&self) -> NaiveDate {
        self.close_time.date()
    }

    /// Market session of the open.
    ///
    /// The naive open time is read as UTC. Reports written in broker-local
    /// time are classified by that local hour.
    pub fn session(&self) -> Session {
        Session::of(&self.open_time)
    }

    pub fn is_loss(&self) -> bool {
        !self.is_win
    }
}
