//! TradeLens Analytics — statistics and relationships over closed trades.
//!
//! This crate builds on `tradelens-core` to provide:
//! - Performance metrics and equity curve (`metrics`)
//! - Risk-adjusted ratios: Sharpe, Sortino, Kelly, Calmar, CPC, SQN (`risk`)
//! - Relationship graph with radial layout and related-trade search (`graph`)
//! - Per-symbol / per-session breakdowns
//! - TOML analysis configuration and JSON / CSV / Markdown export
//!
//! Every entry point is a pure function of the trades passed in.

pub mod analysis;
pub mod breakdown;
pub mod config;
pub mod export;
pub mod graph;
pub mod metrics;
pub mod ratio;
pub mod risk;

pub use analysis::{analyze, AnalysisReport, SCHEMA_VERSION};
pub use breakdown::{group_breakdown, GroupBreakdown, GroupKey};
pub use config::{AnalysisConfig, ConfigError, GraphConfig, RelatedConfig};
pub use graph::{
    build_graph, related_trades, DepthError, EdgeKind, GraphDepth, GraphEdge, GraphNode,
    NodeId, NodeKind, TradeGraph,
};
pub use metrics::{snapshot, EquityPoint, MetricsSnapshot};
pub use ratio::Ratio;
pub use risk::{risk_stats, RiskSnapshot, Sqn, SqnGrade};
