//! Trade filters — select the subset an analysis runs on.
//!
//! Metrics are never updated incrementally. Changing a filter means
//! re-applying it to the full trade list and recomputing from the result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Session, Side, Trade};

/// Which trades to keep by outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Wins,
    Losses,
}

/// Conjunctive trade filter. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeFilter {
    /// Symbols to keep (compared case-insensitively). Empty keeps all.
    #[serde(default)]
    pub symbols: Vec<String>,
    pub side: Option<Side>,
    pub session: Option<Session>,
    /// Earliest close date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest close date, inclusive.
    pub to: Option<NaiveDate>,
    pub outcome: Option<Outcome>,
}

impl TradeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbols.push(symbol.into());
        self
    }

    pub fn side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, trade: &Trade) -> bool {
        if !self.symbols.is_empty()
            && !self
                .symbols
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&trade.symbol))
        {
            return false;
        }
        if self.side.is_some_and(|s| s != trade.side) {
            return false;
        }
        if self.session.is_some_and(|s| s != trade.session()) {
            return false;
        }
        let date = trade.close_date();
        if self.from.is_some_and(|from| date < from) || self.to.is_some_and(|to| date > to) {
            return false;
        }
        match self.outcome {
            Some(Outcome::Wins) => trade.is_win,
            Some(Outcome::Losses) => !trade.is_win,
            None => true,
        }
    }

    /// Matching trades, in input order.
    pub fn apply(&self, trades: &[Trade]) -> Vec<Trade> {
        trades.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}
