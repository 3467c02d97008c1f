//! Per-group breakdowns — the same trade set sliced by one key.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};
use tradelens_core::domain::{Session, Side, Trade};

use crate::ratio::Ratio;

/// What to group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Symbol,
    /// Session of the open.
    Session,
    Side,
    /// Weekday of the close.
    Weekday,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupKey::Symbol => "symbol",
            GroupKey::Session => "session",
            GroupKey::Side => "side",
            GroupKey::Weekday => "weekday",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBreakdown {
    pub group: String,
    pub trades: usize,
    pub wins: usize,
    /// Percentage, 0..=100.
    pub win_rate: f64,
    pub net_profit: f64,
    pub avg_profit: f64,
    pub profit_factor: Ratio,
}

/// Sort position plus display label of a trade's group.
fn group_of(trade: &Trade, key: GroupKey) -> (u32, String) {
    match key {
        GroupKey::Symbol => (0, trade.symbol.clone()),
        GroupKey::Session => {
            let session = trade.session();
            let rank = Session::ALL.iter().position(|s| *s == session).unwrap_or(0);
            (rank as u32, session.label().to_string())
        }
        GroupKey::Side => match trade.side {
            Side::Buy => (0, Side::Buy.to_string()),
            Side::Sell => (1, Side::Sell.to_string()),
        },
        GroupKey::Weekday => {
            let day: Weekday = trade.close_time.weekday();
            (day.num_days_from_monday(), day.to_string())
        }
    }
}

/// One row per group present in `trades`.
///
/// Symbols sort alphabetically, sessions in ring order, buy before sell and
/// weekdays Monday first. Groups with no trades are omitted.
pub fn group_breakdown(trades: &[Trade], key: GroupKey) -> Vec<GroupBreakdown> {
    let mut groups: BTreeMap<(u32, String), Vec<&Trade>> = BTreeMap::new();
    for trade in trades {
        groups.entry(group_of(trade, key)).or_default().push(trade);
    }

    groups
        .into_iter()
        .map(|((_, group), members)| {
            let count = members.len();
            let wins = members.iter().filter(|t| t.is_win).count();
            let net_profit: f64 = members.iter().map(|t| t.net_profit).sum();
            let gross_profit: f64 = members
                .iter()
                .filter(|t| t.is_win)
                .map(|t| t.net_profit)
                .sum();
            let gross_loss: f64 = members
                .iter()
                .filter(|t| !t.is_win)
                .map(|t| t.net_profit)
                .sum::<f64>()
                .abs();
            GroupBreakdown {
                group,
                trades: count,
                wins,
                win_rate: wins as f64 / count as f64 * 100.0,
                net_profit,
                avg_profit: net_profit / count as f64,
                profit_factor: Ratio::of(gross_profit, gross_loss),
            }
        })
        .collect()
}
