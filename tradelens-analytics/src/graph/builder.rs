//! Relationship graph construction.
//!
//! Trades are grouped by session, symbol and close date. Every trade becomes a
//! node, every referenced group becomes a node, and the depth tier decides
//! which trade→group edges exist.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;
use tradelens_core::domain::{Session, Trade};

use super::layout::{
    ring, ASSET_RADIUS, DATE_PHASE, DATE_RADIUS, SESSION_RADIUS, TRADE_PHASE, TRADE_RADIUS,
};
use super::model::{
    EdgeKind, GraphDepth, GraphEdge, GraphNode, GroupStats, NodeId, NodeKind, Position, TradeGraph,
};

/// Only the most recent distinct close dates get a node.
pub const MAX_DATE_NODES: usize = 30;

/// Trade membership of every group, gathered in one pass.
#[derive(Debug, Default)]
struct Groups {
    sessions: BTreeMap<Session, GroupStats>,
    /// First-seen order.
    assets: Vec<(String, GroupStats)>,
    asset_index: HashMap<String, usize>,
    dates: BTreeMap<NaiveDate, GroupStats>,
}

impl Groups {
    fn collect(trades: &[Trade]) -> Self {
        let mut groups = Groups::default();
        for trade in trades {
            groups.sessions.entry(trade.session()).or_default().add(trade);

            let slot = match groups.asset_index.get(&trade.symbol) {
                Some(&i) => i,
                None => {
                    groups
                        .assets
                        .push((trade.symbol.clone(), GroupStats::default()));
                    let i = groups.assets.len() - 1;
                    groups.asset_index.insert(trade.symbol.clone(), i);
                    i
                }
            };
            groups.assets[slot].1.add(trade);

            groups.dates.entry(trade.close_date()).or_default().add(trade);
        }
        groups.retain_recent_dates(MAX_DATE_NODES);
        groups
    }

    fn retain_recent_dates(&mut self, cap: usize) {
        let excess = self.dates.len().saturating_sub(cap);
        if excess == 0 {
            return;
        }
        if let Some(&cutoff) = self.dates.keys().nth(excess) {
            self.dates = self.dates.split_off(&cutoff);
        }
    }
}

/// Build the full node/edge graph for `trades`.
///
/// Node order is trades (input order), then sessions, assets and dates.
/// Edges run from each trade to its groups, in input order, filtered by
/// `depth`. With `hide_orphans`, group nodes that end up with no edges are
/// dropped; trade nodes are always kept. Duplicate tickets are not merged.
pub fn build_graph(trades: &[Trade], depth: GraphDepth, hide_orphans: bool) -> TradeGraph {
    let groups = Groups::collect(trades);

    let mut nodes = Vec::with_capacity(
        trades.len() + groups.sessions.len() + groups.assets.len() + groups.dates.len(),
    );
    let trade_positions = trade_ring(trades);
    for (trade, position) in trades.iter().zip(trade_positions) {
        nodes.push(GraphNode {
            id: NodeId::trade(&trade.ticket),
            label: trade_label(trade),
            kind: NodeKind::Trade {
                trade: trade.clone(),
            },
            position,
        });
    }

    let session_positions = ring(groups.sessions.len(), SESSION_RADIUS, 0.0);
    for ((&session, &stats), position) in groups.sessions.iter().zip(session_positions) {
        nodes.push(GraphNode {
            id: NodeId::session(session),
            label: session.label().to_string(),
            kind: NodeKind::Session { session, stats },
            position,
        });
    }

    let asset_positions = ring(groups.assets.len(), ASSET_RADIUS, 0.0);
    for ((symbol, stats), position) in groups.assets.iter().zip(asset_positions) {
        nodes.push(GraphNode {
            id: NodeId::asset(symbol),
            label: symbol.clone(),
            kind: NodeKind::Asset {
                symbol: symbol.clone(),
                stats: *stats,
            },
            position,
        });
    }

    let date_positions = ring(groups.dates.len(), DATE_RADIUS, DATE_PHASE);
    for ((&date, &stats), position) in groups.dates.iter().zip(date_positions) {
        nodes.push(GraphNode {
            id: NodeId::date(date),
            label: date.format("%Y-%m-%d").to_string(),
            kind: NodeKind::Date { date, stats },
            position,
        });
    }

    let mut edges = Vec::new();
    for trade in trades {
        let source = NodeId::trade(&trade.ticket);
        edges.push(GraphEdge {
            source: source.clone(),
            target: NodeId::session(trade.session()),
            kind: EdgeKind::Session,
        });
        if depth.includes(EdgeKind::Asset) {
            edges.push(GraphEdge {
                source: source.clone(),
                target: NodeId::asset(&trade.symbol),
                kind: EdgeKind::Asset,
            });
        }
        let date = trade.close_date();
        if depth.includes(EdgeKind::Date) && groups.dates.contains_key(&date) {
            edges.push(GraphEdge {
                source,
                target: NodeId::date(date),
                kind: EdgeKind::Date,
            });
        }
    }

    if hide_orphans {
        let linked: HashSet<&NodeId> = edges.iter().map(|e| &e.target).collect();
        let before = nodes.len();
        nodes.retain(|n| n.kind.is_trade() || linked.contains(&n.id));
        debug!(dropped = before - nodes.len(), "hid orphan group nodes");
    }

    debug!(
        depth = depth.level(),
        nodes = nodes.len(),
        edges = edges.len(),
        "built trade graph"
    );
    TradeGraph { nodes, edges }
}

/// Trade ring positions in input order, with angular slot by close-time rank.
fn trade_ring(trades: &[Trade]) -> Vec<Position> {
    let slots = ring(trades.len(), TRADE_RADIUS, TRADE_PHASE);
    let mut order: Vec<usize> = (0..trades.len()).collect();
    order.sort_by_key(|&i| trades[i].close_time);

    let mut positions = vec![Position { x: 0.0, y: 0.0 }; trades.len()];
    for (rank, &i) in order.iter().enumerate() {
        positions[i] = slots[rank];
    }
    positions
}

fn trade_label(trade: &Trade) -> String {
    format!("{} {} {:+.2}", trade.symbol, trade.side, trade.net_profit)
}
