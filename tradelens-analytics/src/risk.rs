//! Risk statistics — risk-adjusted ratios built on the trade PnL distribution.
//!
//! These complement `MetricsSnapshot` with Sharpe, Sortino, Kelly, Calmar,
//! CPC and Van Tharp's SQN. All inputs are per-trade net profits, not daily
//! returns. Every zero denominator resolves through [`Ratio::of`] or to 0,
//! so nothing here panics or yields NaN.

use serde::{Deserialize, Serialize};
use std::fmt;
use tradelens_core::domain::Trade;

use crate::metrics::{mean_f64, net_profits, std_dev, MetricsSnapshot};
use crate::ratio::{Ratio, ZERO_EPSILON};

/// Cap on the annualization factor: `sqrt(min(n, 252))`.
pub const SHARPE_PERIOD_CAP: usize = 252;

/// Cap on the SQN sample factor: `sqrt(min(n, 100))`.
pub const SQN_SAMPLE_CAP: usize = 100;

/// SQN is not graded below this many trades.
pub const SQN_MIN_TRADES: usize = 10;

/// Risk-adjusted statistics for one set of trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSnapshot {
    pub sample_size: usize,
    /// Mean net profit per trade.
    pub mean: f64,
    /// Sample standard deviation of net profit.
    pub std_dev: f64,

    pub sharpe: f64,
    /// `sqrt(Σ min(pnl, 0)² / n)` over all trades.
    pub downside_deviation: f64,
    pub sortino: Ratio,

    pub recovery_factor: Ratio,
    pub payoff_ratio: Ratio,
    /// Percentage of capital per trade suggested by the Kelly criterion.
    pub kelly_percent: f64,
    pub calmar: Ratio,
    /// Return over max drawdown, as a percentage (`calmar × 100`).
    pub romad: Ratio,
    pub cpc_index: f64,
    pub sqn: Sqn,
}

/// Van Tharp's System Quality Number with its grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sqn {
    pub value: f64,
    pub grade: SqnGrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqnGrade {
    /// Fewer than ten trades, or no variance.
    Insufficient,
    Poor,
    BelowAverage,
    Average,
    Good,
    Excellent,
    Superb,
    HolyGrail,
}

impl SqnGrade {
    pub fn classify(value: f64) -> Self {
        if value < 1.6 {
            SqnGrade::Poor
        } else if value < 1.9 {
            SqnGrade::BelowAverage
        } else if value < 2.4 {
            SqnGrade::Average
        } else if value < 2.9 {
            SqnGrade::Good
        } else if value < 5.0 {
            SqnGrade::Excellent
        } else if value < 7.0 {
            SqnGrade::Superb
        } else {
            SqnGrade::HolyGrail
        }
    }
}

impl fmt::Display for SqnGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SqnGrade::Insufficient => "Insufficient",
            SqnGrade::Poor => "Poor",
            SqnGrade::BelowAverage => "Below Average",
            SqnGrade::Average => "Average",
            SqnGrade::Good => "Good",
            SqnGrade::Excellent => "Excellent",
            SqnGrade::Superb => "Superb",
            SqnGrade::HolyGrail => "Holy Grail",
        };
        f.write_str(label)
    }
}

impl RiskSnapshot {
    /// Compute all risk statistics from a trade list.
    pub fn compute(trades: &[Trade], initial_balance: f64) -> Self {
        let metrics = MetricsSnapshot::compute(trades, initial_balance);
        Self::from_metrics(trades, &metrics)
    }

    /// Compute from a snapshot already built for the same trades.
    pub fn from_metrics(trades: &[Trade], metrics: &MetricsSnapshot) -> Self {
        let pnl = net_profits(trades.iter());
        let mean = finite_or_zero(mean_f64(&pnl));
        let std = std_dev(&pnl);

        let payoff = payoff_ratio(metrics.avg_win, metrics.avg_loss);
        let calmar = calmar_ratio(metrics.total_pnl, metrics.max_drawdown);

        Self {
            sample_size: pnl.len(),
            mean,
            std_dev: std,
            sharpe: sharpe_ratio(&pnl),
            downside_deviation: downside_deviation(&pnl),
            sortino: sortino_ratio(&pnl),
            recovery_factor: recovery_factor(metrics.total_pnl, metrics.max_drawdown),
            payoff_ratio: payoff,
            kelly_percent: kelly_percent(metrics.win_rate, payoff),
            calmar,
            romad: calmar.scale(100.0),
            cpc_index: cpc_index(metrics.win_rate, payoff),
            sqn: sqn(&pnl),
        }
    }
}

/// Shorthand for [`RiskSnapshot::compute`].
pub fn risk_stats(trades: &[Trade], initial_balance: f64) -> RiskSnapshot {
    RiskSnapshot::compute(trades, initial_balance)
}

// ─── Individual ratio functions ─────────────────────────────────────

/// Sharpe = mean / std × sqrt(min(n, 252)). 0 without variance.
pub fn sharpe_ratio(pnl: &[f64]) -> f64 {
    let std = std_dev(pnl);
    if std < ZERO_EPSILON {
        return 0.0;
    }
    finite_or_zero(mean_f64(pnl) / std * period_factor(pnl.len(), SHARPE_PERIOD_CAP))
}

/// Root mean square of the losing part of each trade.
///
/// The denominator is the total trade count, not the number of losers.
pub fn downside_deviation(pnl: &[f64]) -> f64 {
    finite_or_zero(raw_downside_deviation(pnl))
}

fn raw_downside_deviation(pnl: &[f64]) -> f64 {
    if pnl.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = pnl.iter().map(|&p| p.min(0.0).powi(2)).sum();
    (sum_sq / pnl.len() as f64).sqrt()
}

/// Sortino = mean / downside deviation × sqrt(min(n, 252)).
///
/// With no downside: unbounded for a positive mean, otherwise 0.
pub fn sortino_ratio(pnl: &[f64]) -> Ratio {
    // An overflowed downside divides to 0 instead of reading as "no downside".
    let mean = mean_f64(pnl);
    Ratio::of(mean, raw_downside_deviation(pnl))
        .scale(period_factor(pnl.len(), SHARPE_PERIOD_CAP))
}

/// Total PnL / max drawdown.
pub fn recovery_factor(total_pnl: f64, max_drawdown: f64) -> Ratio {
    Ratio::of(total_pnl, max_drawdown)
}

/// Average win / |average loss|.
pub fn payoff_ratio(avg_win: f64, avg_loss: f64) -> Ratio {
    Ratio::of(avg_win, avg_loss.abs())
}

/// Kelly% = (w − (1 − w) / payoff) × 100 with `w = win_rate / 100`.
///
/// 0 when the payoff ratio is zero or unbounded.
pub fn kelly_percent(win_rate: f64, payoff: Ratio) -> f64 {
    match payoff {
        Ratio::Finite(p) if p > ZERO_EPSILON => {
            let w = win_rate / 100.0;
            (w - (1.0 - w) / p) * 100.0
        }
        _ => 0.0,
    }
}

/// Calmar = total PnL / max drawdown, in currency terms.
pub fn calmar_ratio(total_pnl: f64, max_drawdown: f64) -> Ratio {
    Ratio::of(total_pnl, max_drawdown)
}

/// CPC index = (w × payoff) / (1 + payoff) with `w = win_rate / 100`.
///
/// An unbounded payoff takes the limit, `w`.
pub fn cpc_index(win_rate: f64, payoff: Ratio) -> f64 {
    let w = win_rate / 100.0;
    match payoff {
        Ratio::Finite(p) => {
            let denom = 1.0 + p;
            if denom.abs() < ZERO_EPSILON {
                0.0
            } else {
                w * p / denom
            }
        }
        Ratio::Unbounded => w,
    }
}

/// SQN = mean / std × sqrt(min(n, 100)), graded on Van Tharp's ladder.
pub fn sqn(pnl: &[f64]) -> Sqn {
    let std = std_dev(pnl);
    if pnl.len() < SQN_MIN_TRADES || std < ZERO_EPSILON {
        return Sqn {
            value: 0.0,
            grade: SqnGrade::Insufficient,
        };
    }
    let value = finite_or_zero(mean_f64(pnl) / std * period_factor(pnl.len(), SQN_SAMPLE_CAP));
    Sqn {
        value,
        grade: SqnGrade::classify(value),
    }
}

fn period_factor(n: usize, cap: usize) -> f64 {
    (n.min(cap) as f64).sqrt()
}

/// Overflowed sums and quotients collapse to 0 rather than leak inf or NaN.
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
