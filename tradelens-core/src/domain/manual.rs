//! Manual trade entry — build a `Trade` from form inputs instead of a report row.
//!
//! Gross profit is the notional price move:
//! `(close - open) × size × contract_multiplier`, sign-flipped for sells.

use super::trade::{Side, Trade, TradeParts};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lots-to-units multiplier for a standard FX contract.
pub const STANDARD_LOT: f64 = 100_000.0;

#[derive(Debug, Error, PartialEq)]
pub enum ManualTradeError {
    #[error("ticket must not be empty")]
    EmptyTicket,
    #[error("symbol must not be empty")]
    EmptySymbol,
    #[error("size must be positive and finite, got {0}")]
    InvalidSize(f64),
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("contract multiplier must be positive, got {0}")]
    InvalidMultiplier(f64),
}

/// Fields collected by a manual entry form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualTradeInput {
    pub ticket: String,
    pub symbol: String,
    pub side: Side,
    pub size: f64,
    pub open_time: NaiveDateTime,
    pub close_time: NaiveDateTime,
    pub open_price: f64,
    pub close_price: f64,
    #[serde(default)]
    pub commission: f64,
    #[serde(default)]
    pub swap: f64,
    #[serde(default = "default_multiplier")]
    pub contract_multiplier: f64,
}

fn default_multiplier() -> f64 {
    STANDARD_LOT
}

impl ManualTradeInput {
    /// Notional profit before costs.
    pub fn gross_profit(&self) -> f64 {
        (self.close_price - self.open_price) * self.size * self.contract_multiplier * self.side.sign()
    }
}

impl Trade {
    /// Build a trade from manual input, validating what a report row can't get wrong.
    pub fn from_manual(input: ManualTradeInput) -> Result<Trade, ManualTradeError> {
        if input.ticket.trim().is_empty() {
            return Err(ManualTradeError::EmptyTicket);
        }
        if input.symbol.trim().is_empty() {
            return Err(ManualTradeError::EmptySymbol);
        }
        if !(input.size.is_finite() && input.size > 0.0) {
            return Err(ManualTradeError::InvalidSize(input.size));
        }
        if !(input.contract_multiplier.is_finite() && input.contract_multiplier > 0.0) {
            return Err(ManualTradeError::InvalidMultiplier(input.contract_multiplier));
        }
        for (field, value) in [
            ("open price", input.open_price),
            ("close price", input.close_price),
            ("commission", input.commission),
            ("swap", input.swap),
        ] {
            if !value.is_finite() {
                return Err(ManualTradeError::NonFinite { field, value });
            }
        }

        let profit = input.gross_profit();
        let trade = Trade::new(TradeParts {
            ticket: input.ticket.trim().to_string(),
            open_time: input.open_time,
            close_time: input.close_time,
            side: input.side,
            size: input.size,
            symbol: input.symbol.trim().to_uppercase(),
            open_price: input.open_price,
            close_price: input.close_price,
            commission: input.commission,
            swap: input.swap,
            profit,
        });
        if !trade.net_profit.is_finite() {
            return Err(ManualTradeError::NonFinite {
                field: "net profit",
                value: trade.net_profit,
            });
        }
        Ok(trade)
    }
}
