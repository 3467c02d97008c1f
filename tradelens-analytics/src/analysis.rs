//! One-call analysis: filter, snapshot, risk and breakdowns together.

use serde::{Deserialize, Serialize};
use tracing::info;
use tradelens_core::domain::{ReportFingerprint, Trade};
use tradelens_core::report::fingerprint_trades;

use crate::breakdown::{group_breakdown, GroupBreakdown, GroupKey};
use crate::config::AnalysisConfig;
use crate::metrics::MetricsSnapshot;
use crate::risk::RiskSnapshot;

/// Current schema version for serialized reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Everything derived from one trade set under one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config: AnalysisConfig,
    /// Trades before the filter was applied.
    pub input_trades: usize,
    /// Fingerprint of the analysed (filtered) trades.
    pub fingerprint: ReportFingerprint,
    pub trades: Vec<Trade>,
    pub metrics: MetricsSnapshot,
    pub risk: RiskSnapshot,
    pub by_symbol: Vec<GroupBreakdown>,
    pub by_session: Vec<GroupBreakdown>,
}

/// Apply the configured filter, then compute every aggregate from the result.
pub fn analyze(trades: &[Trade], config: &AnalysisConfig) -> AnalysisReport {
    let selected = config.filter.apply(trades);
    let metrics = MetricsSnapshot::compute(&selected, config.initial_balance);
    let risk = RiskSnapshot::from_metrics(&selected, &metrics);

    info!(
        input = trades.len(),
        selected = selected.len(),
        total_pnl = metrics.total_pnl,
        "analysis complete"
    );

    AnalysisReport {
        schema_version: SCHEMA_VERSION,
        config: config.clone(),
        input_trades: trades.len(),
        fingerprint: fingerprint_trades(&selected),
        by_symbol: group_breakdown(&selected, GroupKey::Symbol),
        by_session: group_breakdown(&selected, GroupKey::Session),
        metrics,
        risk,
        trades: selected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{trade_at, trades};
    use tradelens_core::filter::TradeFilter;

    #[test]
    fn analyze_without_filter_uses_every_trade() {
        let t = trades(&[100.0, -50.0, 20.0]);
        let report = analyze(&t, &AnalysisConfig::default());
        assert_eq!(report.input_trades, 3);
        assert_eq!(report.metrics.total_trades, 3);
        assert_eq!(report.risk.sample_size, 3);
        assert_eq!(report.metrics, MetricsSnapshot::compute(&t, 10_000.0));
        assert_eq!(report.by_symbol.len(), 1);
    }

    #[test]
    fn filter_narrows_the_subset() {
        let t = vec![
            trade_at("1", "EURUSD", "2024-01-01 09:00", "2024-01-01 10:00", 100.0),
            trade_at("2", "GBPUSD", "2024-01-01 09:00", "2024-01-01 10:00", -30.0),
        ];
        let config = AnalysisConfig {
            filter: TradeFilter::new().symbol("gbpusd"),
            ..AnalysisConfig::default()
        };
        let report = analyze(&t, &config);
        assert_eq!(report.input_trades, 2);
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.metrics.total_pnl, -30.0);
        assert_eq!(report.fingerprint, fingerprint_trades(&t[1..]));
    }

    #[test]
    fn report_survives_json() {
        let report = analyze(&trades(&[10.0, 20.0]), &AnalysisConfig::default());
        let json = serde_json::to_string(&report).unwrap();
        let back: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.trades, report.trades);
        assert_eq!(back.config, report.config);
        assert_eq!(back.risk.sortino, report.risk.sortino);
        assert!((back.risk.sharpe - report.risk.sharpe).abs() < 1e-9);
    }
}
