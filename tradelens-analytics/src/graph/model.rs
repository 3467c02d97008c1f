//! Graph data model: nodes, edges, and the depth tiers that gate edge kinds.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tradelens_core::domain::{Session, Trade};

/// Which edge kinds a graph contains.
///
/// Each tier includes the ones below it: sessions, then assets, then dates.
/// This is unrelated to the hop limit of a related-trades search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GraphDepth {
    Sessions = 1,
    Assets = 2,
    Dates = 3,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DepthError {
    #[error("graph depth must be 1, 2 or 3, got {0}")]
    OutOfRange(i64),
}

impl GraphDepth {
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Clamp any integer into 1..=3.
    pub fn clamped(level: i64) -> Self {
        match level {
            i64::MIN..=1 => GraphDepth::Sessions,
            2 => GraphDepth::Assets,
            _ => GraphDepth::Dates,
        }
    }

    pub fn includes(self, kind: EdgeKind) -> bool {
        match kind {
            EdgeKind::Session => true,
            EdgeKind::Asset => self >= GraphDepth::Assets,
            EdgeKind::Date => self >= GraphDepth::Dates,
        }
    }
}

impl TryFrom<u8> for GraphDepth {
    type Error = DepthError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(GraphDepth::Sessions),
            2 => Ok(GraphDepth::Assets),
            3 => Ok(GraphDepth::Dates),
            other => Err(DepthError::OutOfRange(other as i64)),
        }
    }
}

impl From<GraphDepth> for u8 {
    fn from(depth: GraphDepth) -> u8 {
        depth.level()
    }
}

impl Default for GraphDepth {
    fn default() -> Self {
        GraphDepth::Dates
    }
}

/// Stable node identifier, e.g. `trade:1001`, `asset:EURUSD`,
/// `date:2024-01-05`, `session:London`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn trade(ticket: &str) -> Self {
        Self(format!("trade:{ticket}"))
    }

    pub fn asset(symbol: &str) -> Self {
        Self(format!("asset:{symbol}"))
    }

    pub fn date(date: NaiveDate) -> Self {
        Self(format!("date:{}", date.format("%Y-%m-%d")))
    }

    pub fn session(session: Session) -> Self {
        Self(format!("session:{}", session.label()))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Member count and summed net profit of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub trades_count: usize,
    pub total_profit: f64,
}

impl GroupStats {
    pub fn add(&mut self, trade: &Trade) {
        self.trades_count += 1;
        self.total_profit += trade.net_profit;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Trade { trade: Trade },
    Asset { symbol: String, stats: GroupStats },
    Date { date: NaiveDate, stats: GroupStats },
    Session { session: Session, stats: GroupStats },
}

impl NodeKind {
    pub fn is_trade(&self) -> bool {
        matches!(self, NodeKind::Trade { .. })
    }

    /// Group aggregates; `None` for trade nodes.
    pub fn stats(&self) -> Option<&GroupStats> {
        match self {
            NodeKind::Trade { .. } => None,
            NodeKind::Asset { stats, .. }
            | NodeKind::Date { stats, .. }
            | NodeKind::Session { stats, .. } => Some(stats),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Session,
    Asset,
    Date,
}

/// Undirected link from a trade node (`source`) to a group node (`target`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

/// A complete graph, rebuilt from scratch on every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl TradeGraph {
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of edges touching `id`.
    pub fn degree(&self, id: &NodeId) -> usize {
        self.edges
            .iter()
            .filter(|e| &e.source == id || &e.target == id)
            .count()
    }

    /// Nodes on the other end of every edge touching `id`.
    pub fn neighbors<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a NodeId> + 'a {
        self.edges.iter().filter_map(move |e| {
            if &e.source == id {
                Some(&e.target)
            } else if &e.target == id {
                Some(&e.source)
            } else {
                None
            }
        })
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    pub fn trade_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|n| n.kind.is_trade())
    }

    pub fn group_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|n| !n.kind.is_trade())
    }

    /// True when `a` and `b` share at least one group node.
    pub fn linked_through_group(&self, a: &NodeId, b: &NodeId) -> bool {
        self.neighbors(a).any(|g| self.neighbors(b).any(|h| h == g))
    }
}
