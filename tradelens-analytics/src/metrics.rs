//! Performance metrics — pure functions over a set of closed trades.
//!
//! Every metric is a pure function: trade list in, value out. A snapshot is
//! never updated in place; filter the trades again and recompute.
//!
//! Time-series metrics (equity curve, drawdown, streaks) always sort by close
//! time first. Callers may pass trades in any order.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tradelens_core::domain::Trade;

use crate::ratio::{Ratio, ZERO_EPSILON};

/// Aggregate statistics for one set of trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    // ── Counts ──
    pub total_trades: usize,
    pub total_wins: usize,
    pub total_losses: usize,
    /// Trades with exactly zero net profit; also counted in `total_losses`.
    pub break_even_trades: usize,
    /// Percentage, 0..=100.
    pub win_rate: f64,

    // ── PnL ──
    pub total_pnl: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub profit_factor: Ratio,
    pub expectancy: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub total_commission: f64,
    pub total_swap: f64,

    // ── Balance ──
    pub initial_balance: f64,
    pub final_balance: f64,
    pub return_percent: f64,
    pub max_drawdown: f64,
    pub max_drawdown_percent: f64,

    // ── Activity ──
    pub total_volume: f64,
    pub avg_duration_minutes: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,

    pub equity_curve: Vec<EquityPoint>,
}

/// Balance after one trade, in close-time order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub ticket: String,
    pub time: NaiveDateTime,
    pub balance: f64,
    pub peak: f64,
    /// `balance - peak`; never positive.
    pub drawdown: f64,
    /// `drawdown / peak × 100`; 0 when the peak is not positive.
    pub drawdown_percent: f64,
}

impl MetricsSnapshot {
    /// Compute all metrics from a trade list and the starting balance.
    pub fn compute(trades: &[Trade], initial_balance: f64) -> Self {
        let curve = equity_curve(trades, initial_balance);
        let total_pnl = total_pnl(trades);
        let chronological = sort_chronological(trades);

        Self {
            total_trades: trades.len(),
            total_wins: trades.iter().filter(|t| t.is_win).count(),
            total_losses: trades.iter().filter(|t| !t.is_win).count(),
            break_even_trades: trades.iter().filter(|t| t.net_profit == 0.0).count(),
            win_rate: win_rate(trades),
            total_pnl,
            gross_profit: gross_profit(trades),
            gross_loss: gross_loss(trades),
            profit_factor: profit_factor(trades),
            expectancy: expectancy(trades),
            avg_win: avg_win(trades),
            avg_loss: avg_loss(trades),
            largest_win: largest_win(trades),
            largest_loss: largest_loss(trades),
            total_commission: trades.iter().map(|t| t.commission).sum(),
            total_swap: trades.iter().map(|t| t.swap).sum(),
            initial_balance,
            final_balance: initial_balance + total_pnl,
            return_percent: if initial_balance > 0.0 {
                total_pnl / initial_balance * 100.0
            } else {
                0.0
            },
            max_drawdown: max_drawdown(&curve),
            max_drawdown_percent: max_drawdown_percent(&curve),
            total_volume: trades.iter().map(|t| t.size).sum(),
            avg_duration_minutes: mean_f64(
                &trades
                    .iter()
                    .map(|t| t.duration_minutes as f64)
                    .collect::<Vec<_>>(),
            ),
            max_consecutive_wins: max_consecutive(&chronological, true),
            max_consecutive_losses: max_consecutive(&chronological, false),
            equity_curve: curve,
        }
    }

    /// Drawdown series in close-time order.
    pub fn drawdown_series(&self) -> Vec<f64> {
        self.equity_curve.iter().map(|p| p.drawdown).collect()
    }
}

/// Shorthand for [`MetricsSnapshot::compute`].
pub fn snapshot(trades: &[Trade], initial_balance: f64) -> MetricsSnapshot {
    MetricsSnapshot::compute(trades, initial_balance)
}

// ─── Individual metric functions ────────────────────────────────────

/// Sum of net profit.
pub fn total_pnl(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.net_profit).sum()
}

/// Win rate as a percentage.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_win).count();
    winners as f64 / trades.len() as f64 * 100.0
}

/// Sum of net profit over winners.
pub fn gross_profit(trades: &[Trade]) -> f64 {
    trades
        .iter()
        .filter(|t| t.is_win)
        .map(|t| t.net_profit)
        .sum()
}

/// Absolute sum of net profit over losers.
pub fn gross_loss(trades: &[Trade]) -> f64 {
    trades
        .iter()
        .filter(|t| !t.is_win)
        .map(|t| t.net_profit)
        .sum::<f64>()
        .abs()
}

/// Gross profit / gross loss.
///
/// Unbounded with profits and no losses; 0 when both are zero.
pub fn profit_factor(trades: &[Trade]) -> Ratio {
    Ratio::of(gross_profit(trades), gross_loss(trades))
}

/// Mean net profit per trade.
pub fn expectancy(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    total_pnl(trades) / trades.len() as f64
}

/// Mean net profit of winners (0 with no winners).
pub fn avg_win(trades: &[Trade]) -> f64 {
    mean_f64(&net_profits(trades.iter().filter(|t| t.is_win)))
}

/// Mean net profit of losers (0 with no losers). Not positive.
pub fn avg_loss(trades: &[Trade]) -> f64 {
    mean_f64(&net_profits(trades.iter().filter(|t| !t.is_win)))
}

/// Best winning trade (0 with no winners).
pub fn largest_win(trades: &[Trade]) -> f64 {
    trades
        .iter()
        .filter(|t| t.is_win)
        .map(|t| t.net_profit)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
        .unwrap_or(0.0)
}

/// Worst losing trade (0 with no losers).
pub fn largest_loss(trades: &[Trade]) -> f64 {
    trades
        .iter()
        .filter(|t| !t.is_win)
        .map(|t| t.net_profit)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
        .unwrap_or(0.0)
}

/// Running balance after each trade, in close-time order.
///
/// The peak starts at `initial_balance`, so a losing first trade already
/// shows a drawdown.
pub fn equity_curve(trades: &[Trade], initial_balance: f64) -> Vec<EquityPoint> {
    let mut balance = initial_balance;
    let mut peak = initial_balance;

    sort_chronological(trades)
        .into_iter()
        .map(|t| {
            balance += t.net_profit;
            if balance > peak {
                peak = balance;
            }
            let drawdown = balance - peak;
            let drawdown_percent = if peak > ZERO_EPSILON {
                drawdown / peak * 100.0
            } else {
                0.0
            };
            EquityPoint {
                ticket: t.ticket.clone(),
                time: t.close_time,
                balance,
                peak,
                drawdown,
                drawdown_percent,
            }
        })
        .collect()
}

/// Largest peak-to-trough decline, as a non-negative amount.
pub fn max_drawdown(curve: &[EquityPoint]) -> f64 {
    curve
        .iter()
        .map(|p| p.drawdown)
        .fold(0.0_f64, f64::min)
        .abs()
}

/// Largest percentage decline from a peak, as a non-negative percentage.
pub fn max_drawdown_percent(curve: &[EquityPoint]) -> f64 {
    curve
        .iter()
        .map(|p| p.drawdown_percent)
        .fold(0.0_f64, f64::min)
        .abs()
}

/// Longest run of winners (`winners = true`) or losers in the given order.
pub fn max_consecutive(trades: &[&Trade], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for trade in trades {
        if trade.is_win == winners {
            current += 1;
            if current > max_streak {
                max_streak = current;
            }
        } else {
            current = 0;
        }
    }
    max_streak
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Trades ordered by close time. Ties keep input order.
pub fn sort_chronological(trades: &[Trade]) -> Vec<&Trade> {
    let mut sorted: Vec<&Trade> = trades.iter().collect();
    sorted.sort_by_key(|t| t.close_time);
    sorted
}

pub(crate) fn net_profits<'a>(trades: impl Iterator<Item = &'a Trade>) -> Vec<f64> {
    trades.map(|t| t.net_profit).collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1). Zero below two observations or when
/// the variance overflows.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    if !variance.is_finite() {
        return 0.0;
    }
    variance.sqrt()
}


#[cfg(test)]
mod tests {
    use super::test_support::{trade_at, trades};
    use super::*;

    // ── Counts ──

    #[test]
    fn win_rate_mixed() {
        let t = trades(&[500.0, -200.0, 300.0, -100.0]);
        assert!((win_rate(&t) - 50.0).abs() < 1e-10);
    }

    #[test]
    fn win_rate_empty() {
        assert_eq!(win_rate(&[]), 0.0);
    }

    #[test]
    fn break_even_counts_as_loss() {
        let m = MetricsSnapshot::compute(&trades(&[100.0, 0.0]), 1_000.0);
        assert_eq!(m.total_wins, 1);
        assert_eq!(m.total_losses, 1);
        assert_eq!(m.break_even_trades, 1);
        assert_eq!(m.largest_loss, 0.0);
    }

    // ── Profit factor ──

    #[test]
    fn profit_factor_mixed() {
        let t = trades(&[500.0, -200.0, 300.0]);
        assert_eq!(profit_factor(&t), Ratio::Finite(4.0));
    }

    #[test]
    fn profit_factor_all_winners_is_unbounded() {
        let t = trades(&[500.0, 300.0]);
        assert_eq!(profit_factor(&t), Ratio::Unbounded);
    }

    #[test]
    fn profit_factor_no_trades_is_zero() {
        assert_eq!(profit_factor(&[]), Ratio::Finite(0.0));
    }

    #[test]
    fn profit_factor_all_losers_is_zero() {
        let t = trades(&[-500.0, -300.0]);
        assert_eq!(profit_factor(&t), Ratio::Finite(0.0));
    }

    // ── Averages and extremes ──

    #[test]
    fn averages_and_extremes() {
        let t = trades(&[500.0, -200.0, 300.0, -100.0]);
        assert!((avg_win(&t) - 400.0).abs() < 1e-10);
        assert!((avg_loss(&t) + 150.0).abs() < 1e-10);
        assert_eq!(largest_win(&t), 500.0);
        assert_eq!(largest_loss(&t), -200.0);
        assert!((expectancy(&t) - 125.0).abs() < 1e-10);
    }

    #[test]
    fn extremes_default_to_zero() {
        let winners = trades(&[10.0, 20.0]);
        assert_eq!(largest_loss(&winners), 0.0);
        assert_eq!(avg_loss(&winners), 0.0);
        let losers = trades(&[-10.0, -20.0]);
        assert_eq!(largest_win(&losers), 0.0);
        assert_eq!(avg_win(&losers), 0.0);
    }

    // ── Equity curve and drawdown ──

    #[test]
    fn equity_curve_sorts_by_close_time() {
        let t = vec![
            trade_at("late", "EURUSD", "2024-01-03 09:00", "2024-01-03 10:00", -50.0),
            trade_at("early", "EURUSD", "2024-01-01 09:00", "2024-01-01 10:00", 100.0),
        ];
        let curve = equity_curve(&t, 1_000.0);
        assert_eq!(curve[0].ticket, "early");
        assert_eq!(curve[0].balance, 1_100.0);
        assert_eq!(curve[1].ticket, "late");
        assert_eq!(curve[1].balance, 1_050.0);
        assert_eq!(curve[1].peak, 1_100.0);
        assert_eq!(curve[1].drawdown, -50.0);
    }

    #[test]
    fn max_drawdown_known() {
        let t = trades(&[100.0, -300.0, 50.0, 200.0, -100.0]);
        let curve = equity_curve(&t, 1_000.0);
        // Peak 1100, trough 800 → 300.
        assert!((max_drawdown(&curve) - 300.0).abs() < 1e-10);
        let expected_pct = 300.0 / 1_100.0 * 100.0;
        assert!((max_drawdown_percent(&curve) - expected_pct).abs() < 1e-10);
    }

    #[test]
    fn first_trade_loss_is_a_drawdown() {
        let curve = equity_curve(&trades(&[-100.0]), 1_000.0);
        assert_eq!(curve[0].peak, 1_000.0);
        assert_eq!(max_drawdown(&curve), 100.0);
    }

    #[test]
    fn zero_peak_guards_percent() {
        let curve = equity_curve(&trades(&[-100.0, 50.0]), 0.0);
        assert!(curve.iter().all(|p| p.drawdown_percent == 0.0));
        assert_eq!(max_drawdown(&curve), 100.0);
        assert_eq!(max_drawdown_percent(&curve), 0.0);
    }

    #[test]
    fn monotonic_equity_has_no_drawdown() {
        let curve = equity_curve(&trades(&[10.0, 20.0, 30.0]), 1_000.0);
        assert!(curve.iter().all(|p| p.drawdown == 0.0));
        assert_eq!(max_drawdown(&curve), 0.0);
    }

    // ── Streaks ──

    #[test]
    fn consecutive_streaks() {
        let m = MetricsSnapshot::compute(&trades(&[100.0, 200.0, 300.0, -100.0, -5.0, 200.0]), 0.0);
        assert_eq!(m.max_consecutive_wins, 3);
        assert_eq!(m.max_consecutive_losses, 2);
    }

    #[test]
    fn streaks_use_close_order() {
        let t = vec![
            trade_at("a", "EURUSD", "2024-01-01 09:00", "2024-01-01 10:00", 10.0),
            trade_at("c", "EURUSD", "2024-01-03 09:00", "2024-01-03 10:00", 10.0),
            trade_at("b", "EURUSD", "2024-01-02 09:00", "2024-01-02 10:00", -10.0),
        ];
        let m = MetricsSnapshot::compute(&t, 0.0);
        assert_eq!(m.max_consecutive_wins, 1);
    }

    // ── Aggregate ──

    #[test]
    fn compute_no_trades() {
        let m = MetricsSnapshot::compute(&[], 10_000.0);
        assert_eq!(m.total_trades, 0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.expectancy, 0.0);
        assert_eq!(m.profit_factor, Ratio::Finite(0.0));
        assert_eq!(m.final_balance, 10_000.0);
        assert!(m.equity_curve.is_empty());
    }

    #[test]
    fn compute_with_trades() {
        let m = MetricsSnapshot::compute(&trades(&[500.0, -200.0, 300.0]), 10_000.0);
        assert_eq!(m.total_trades, 3);
        assert_eq!(m.total_wins, 2);
        assert_eq!(m.total_losses, 1);
        assert!((m.total_pnl - 600.0).abs() < 1e-10);
        assert!((m.gross_profit - 800.0).abs() < 1e-10);
        assert!((m.gross_loss - 200.0).abs() < 1e-10);
        assert!((m.final_balance - 10_600.0).abs() < 1e-10);
        assert!((m.return_percent - 6.0).abs() < 1e-10);
        assert_eq!(m.total_volume, 3.0);
        assert_eq!(m.avg_duration_minutes, 30.0);
        assert_eq!(m.equity_curve.len(), 3);
        assert_eq!(m.drawdown_series().len(), 3);
    }

    // ── Helpers ──

    #[test]
    fn std_dev_sample() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // Sample variance = 32 / 7.
        assert!((std_dev(&v) - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(std_dev(&[1.0]), 0.0);
        assert_eq!(std_dev(&[f64::MAX, -f64::MAX]), 0.0);
        assert_eq!(std_dev(&[f64::INFINITY, 1.0]), 0.0);
    }
}
