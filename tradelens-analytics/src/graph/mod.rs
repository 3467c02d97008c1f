//! Relationship graph — trades linked to their session, asset and date groups.

pub mod builder;
pub mod layout;
pub mod model;
pub mod related;

pub use builder::{build_graph, MAX_DATE_NODES};
pub use model::{
    DepthError, EdgeKind, GraphDepth, GraphEdge, GraphNode, GroupStats, NodeId, NodeKind,
    Position, TradeGraph,
};
pub use related::{find_by_ticket, related_trades, related_trades_with_hops, RelatedTrade};
